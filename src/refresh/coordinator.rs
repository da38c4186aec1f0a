use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::SystemTime;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use crate::credentials::{CredentialSlot, CredentialStore};
use crate::errors::{Error, RefreshFailure};
use crate::telemetry::refresh::RefreshTelemetry;

use super::{Navigator, TokenRefresher};

type RefreshResult = Result<String, RefreshFailure>;
type Flight = Shared<BoxFuture<'static, RefreshResult>>;

/// Single-flight session renewal.
///
/// `None` in `in_flight` is IDLE; `Some` is REFRESHING. The first caller to
/// observe IDLE starts one refresh and every caller arriving while it runs
/// awaits the same shared future. The flight resets the state to IDLE and
/// applies its side effects (token write, or credential wipe plus login
/// redirect) before any waiter sees the result.
///
/// The flight only holds the coordinator weakly. Dropping the coordinator
/// while a flight is pending releases the store, refresher and navigator;
/// the abandoned flight resolves with a failure and writes nothing.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    in_flight: Mutex<Option<(Flight, RefreshTelemetry)>>,
}

enum Renewal {
    Current(String),
    Flight(Flight),
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                refresher,
                navigator,
                login_route: login_route.into(),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Starts a refresh or joins the one already running; resolves with the
    /// new token, or with the shared failure.
    ///
    /// A waiter that is dropped does not cancel the refresh while another
    /// waiter still polls it.
    pub async fn renew(&self) -> Result<String, Error> {
        self.settle(self.join_or_start(|_| false)).await
    }

    /// Renewal on behalf of a request that was rejected while carrying
    /// `rejected` as its bearer token.
    ///
    /// When no refresh is running and the store already holds a different
    /// token, a refresh settled after that request went out; the stored token
    /// is returned without another refresh call.
    pub async fn renew_after(&self, rejected: Option<&str>) -> Result<String, Error> {
        let renewal = self.join_or_start(|current| Some(current) != rejected);
        self.settle(renewal).await
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.state().is_some()
    }

    async fn settle(&self, renewal: Renewal) -> Result<String, Error> {
        match renewal {
            Renewal::Current(token) => Ok(token),
            Renewal::Flight(flight) => flight.await.map_err(Error::RefreshFailed),
        }
    }

    // The whole check-then-start step runs under one lock acquisition.
    fn join_or_start(&self, reuse: impl FnOnce(&str) -> bool) -> Renewal {
        let mut state = self.inner.state();
        if let Some((flight, telemetry)) = state.as_ref() {
            telemetry.emit_joined();
            return Renewal::Flight(flight.clone());
        }
        if let Some(token) = self.inner.store.current_token().filter(|token| reuse(token)) {
            debug!(token_len = token.len(), "refresh.skipped store already holds a newer token");
            return Renewal::Current(token);
        }
        let telemetry = RefreshTelemetry::new("session");
        let flight = Inner::run(Arc::downgrade(&self.inner), telemetry.clone())
            .boxed()
            .shared();
        *state = Some((flight.clone(), telemetry));
        Renewal::Flight(flight)
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, Option<(Flight, RefreshTelemetry)>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Upgrades only around the synchronous steps, so a pending flight parked in
    // `in_flight` never owns the `Inner` that owns it.
    async fn run(inner: Weak<Self>, telemetry: RefreshTelemetry) -> RefreshResult {
        let (slot, refresher) = {
            let this = inner.upgrade().ok_or_else(abandoned)?;
            // Keep the user's remember-me choice: the new token goes where the old one was.
            let slot = this.store.active_slot().unwrap_or(CredentialSlot::Ephemeral);
            (slot, Arc::clone(&this.refresher))
        };
        telemetry.emit_start(SystemTime::now());

        let outcome = refresher.refresh().await;
        drop(refresher);
        let this = inner.upgrade().ok_or_else(abandoned)?;

        let settled = match outcome {
            Ok(token) => {
                telemetry.emit_success(slot, token.len(), SystemTime::now());
                this.store.set(slot, token.clone());
                Ok(token)
            }
            Err(err) => {
                let failure = RefreshFailure::from(&err);
                telemetry.emit_failure(&failure, SystemTime::now());
                this.store.clear_all();
                this.expire_session();
                Err(failure)
            }
        };

        this.state().take();
        settled
    }

    fn expire_session(&self) {
        let on_login = self
            .navigator
            .current_route()
            .is_some_and(|route| route.split('?').next() == Some(self.login_route.as_str()));
        if on_login {
            debug!(route = %self.login_route, "session.expired already on login route");
            return;
        }
        let target = format!("{}?expired=true", self.login_route);
        warn!(target = %target, "session.expired");
        self.navigator.redirect(&target);
    }
}

fn abandoned() -> RefreshFailure {
    RefreshFailure::new(None, "refresh coordinator dropped before the refresh settled")
}
