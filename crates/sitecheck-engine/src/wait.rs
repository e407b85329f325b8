use crate::error::DriverError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `attempt` every `interval` until it yields `Some`, or until `timeout`.
///
/// Retryable driver errors (element missing, hidden, disabled) count as "not yet" and the
/// last one is kept for the timeout message. Any other error returns immediately.
pub async fn poll_until<T, F, Fut>(
    operation: &str,
    timeout: Duration,
    interval: Duration,
    mut attempt: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, DriverError>>,
{
    let deadline = Instant::now() + timeout;
    let mut last_error: Option<DriverError> = None;

    loop {
        match attempt().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_retryable() => last_error = Some(e),
            Err(e) => return Err(e),
        }

        if Instant::now() >= deadline {
            let operation = match last_error {
                Some(e) => format!("{} after {:?} ({})", operation, timeout, e),
                None => format!("{} after {:?}", operation, timeout),
            };
            return Err(DriverError::TimeoutWithContext { operation });
        }
        tokio::time::sleep(interval).await;
    }
}
