use std::sync::Arc;

use reqwest::{Client, Url};

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::errors::Error;
use crate::idempotency::{IdempotencyKeys, UuidKeys};
use crate::interceptor::RequestInterceptor;
use crate::refresh::{HttpTokenRefresher, Navigator, NoopNavigator, RefreshCoordinator, TokenRefresher};
use crate::retry::RetryCoordinator;

mod impls;
mod response;

pub use response::Response;

/// Authenticated client shared by every caller of the API.
///
/// Clones share the same credential store, retry coordinator and refresh
/// coordinator; two clients built separately share nothing.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<dyn CredentialStore>,
    interceptor: RequestInterceptor,
    retry: Arc<RetryCoordinator>,
    refresh: Arc<RefreshCoordinator>,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    http: Option<Client>,
    store: Option<Arc<dyn CredentialStore>>,
    keys: Option<Arc<dyn IdempotencyKeys>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Transport to use. Must keep cookies if the default refresher is used.
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn idempotency_keys(mut self, keys: Arc<dyn IdempotencyKeys>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn build(self) -> Result<ApiClient, Error> {
        let config = self.config;
        let base_url = config.normalized_base_url()?;
        let retry_plan = config.retry.to_plan()?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = Client::builder()
                    .cookie_store(true)
                    .user_agent(config.user_agent.clone());
                if let Some(timeout) = config.timeout() {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| Error::Config(format!("Invalid HTTP client settings: {}", e)))?
            }
        };

        let store: Arc<dyn CredentialStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryCredentialStore::new()),
        };
        let keys: Arc<dyn IdempotencyKeys> = match self.keys {
            Some(keys) => keys,
            None => Arc::new(UuidKeys),
        };
        let navigator: Arc<dyn Navigator> = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(NoopNavigator),
        };
        let refresher: Arc<dyn TokenRefresher> = match self.refresher {
            Some(refresher) => refresher,
            None => {
                let url = join_url(&base_url, &config.refresh_path)?;
                Arc::new(HttpTokenRefresher::new(
                    http.clone(),
                    url,
                    config.user_agent.clone(),
                ))
            }
        };

        Ok(ApiClient {
            http,
            base_url,
            interceptor: RequestInterceptor::new(Arc::clone(&store), keys),
            retry: Arc::new(RetryCoordinator::new(retry_plan)),
            refresh: Arc::new(RefreshCoordinator::new(
                Arc::clone(&store),
                refresher,
                navigator,
                config.login_route.clone(),
            )),
            store,
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            http: None,
            store: None,
            keys: None,
            refresher: None,
            navigator: None,
        }
    }

    /// Client with an in-memory credential store and no navigation hook.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.store)
    }

    pub fn retry(&self) -> Arc<RetryCoordinator> {
        Arc::clone(&self.retry)
    }

    pub fn refresh(&self) -> Arc<RefreshCoordinator> {
        Arc::clone(&self.refresh)
    }

    pub(crate) fn resolve(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        join_url(&self.base_url, path)
    }
}

/// Appends `path` to the base URL, keeping any path prefix the base carries.
fn join_url(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let url = if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };
    Ok(Url::parse(&url)?)
}
