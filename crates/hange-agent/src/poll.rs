//! Fixed-interval polling with an optional attempt limit.

use crate::error::{AgentError, AgentResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    Pending,
}

/// Call `probe` every `interval` until it reports [`Probe::Ready`].
///
/// `max_attempts == 0` polls until the probe errors or `token` is cancelled.
/// Probe errors are returned as is, without retrying. Cancellation is checked
/// before each probe and interrupts both the probe and the sleep.
pub async fn poll<T, F, Fut>(
    token: &CancellationToken,
    mut probe: F,
    interval: Duration,
    max_attempts: u32,
) -> AgentResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AgentResult<Probe<T>>>,
{
    let mut attempts = 0;

    loop {
        if token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AgentError::Cancelled),
            outcome = probe() => outcome?,
        };

        if let Probe::Ready(value) = outcome {
            return Ok(value);
        }

        attempts += 1;
        if attempts == max_attempts {
            return Err(AgentError::TooManyAttempts { attempts });
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AgentError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
