//! Bounded retry of optimistic transactions.

use std::future::Future;
use std::time::Duration;

use crate::error::DomainError;

/// How often, and how patiently, a conflicting transaction is re-run.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `initial_delay`: 5ms
/// - `max_delay`: 100ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on every further attempt.
    pub initial_delay: Duration,
    /// Cap for the delay between attempts.
    pub max_delay: Duration,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
        }
    }
}

impl TransactionPolicy {
    /// Creates a policy with the default delays and `max_attempts` attempts.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Runs `attempt` until it succeeds, fails with a non-conflict error, or the
/// policy's attempts are used up.
///
/// Each run must load fresh state. Exhaustion surfaces as
/// [`DomainError::Contention`].
pub async fn run_transaction<T, F, Fut>(
    policy: &TransactionPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut tries = 0;

    loop {
        tries += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                if tries >= max_attempts {
                    tracing::warn!(operation, attempts = tries, "transaction contention exhausted retries");
                    return Err(DomainError::Contention { attempts: tries });
                }
                metrics::counter!("transaction_retries_total", "operation" => operation).increment(1);
                tracing::debug!(operation, attempt = tries, error = %e, "retrying conflicting transaction");
                tokio::time::sleep(policy.delay_after(tries)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
