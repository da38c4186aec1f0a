use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::errors::Error;

use super::{RetryOutcome, plan::RetryPlan};

/// Runs one logical request through the transient-failure retry loop.
pub struct RetryCoordinator {
    plan: RetryPlan,
    rng: Mutex<StdRng>,
}

impl RetryCoordinator {
    pub fn new(plan: RetryPlan) -> Self {
        Self {
            plan,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn plan(&self) -> RetryPlan {
        self.plan.clone()
    }

    /// Calls `op` with the 1-based attempt number until it succeeds, fails with
    /// a non-transient error, or the plan's attempt budget is spent. The last
    /// error is returned unchanged.
    ///
    /// With `allow_retry == false` the operation runs exactly once.
    pub async fn execute<F, Fut, T>(
        &self,
        request: &str,
        allow_retry: bool,
        mut op: F,
    ) -> Result<(T, RetryOutcome), Error>
    where
        F: FnMut(u8) -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, Error>> + Send,
    {
        let max_attempts = if allow_retry { self.plan.max_attempts } else { 1 };
        let mut attempt: u8 = 1;
        let start = Instant::now();
        loop {
            match op(attempt).await {
                Ok(value) => {
                    let outcome = RetryOutcome {
                        request: request.to_string(),
                        attempts: attempt,
                        success: true,
                        total_delay: start.elapsed(),
                    };
                    outcome.log();
                    return Ok((value, outcome));
                }
                Err(err) => {
                    if attempt >= max_attempts || !Self::is_retriable(&err) {
                        let outcome = RetryOutcome {
                            request: request.to_string(),
                            attempts: attempt,
                            success: false,
                            total_delay: start.elapsed(),
                        };
                        outcome.log();
                        return Err(err);
                    }
                    let delay = {
                        let mut rng = self.rng.lock().await;
                        self.plan.delay_for_attempt(attempt, &mut *rng)
                    };
                    warn!(
                        request = %request,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retry.scheduling"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Network failures and 5xx only. 401 belongs to the refresh path and the
    /// remaining 4xx go straight back to the caller.
    pub fn is_retriable(err: &Error) -> bool {
        err.is_transient()
    }
}

impl Default for RetryCoordinator {
    fn default() -> Self {
        Self::new(RetryPlan::default_plan())
    }
}
