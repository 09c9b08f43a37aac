//! Reconnecting supervision of long-lived connections.
//!
//! The notification stream and the chat socket both follow the same
//! lifecycle: connect, run until the connection ends, wait, connect
//! again. [`supervise`] drives that loop for any [`Session`] using a
//! [`ReconnectPolicy`], and stops as soon as the view's
//! [`CancellationToken`] fires.

use async_trait::async_trait;
use careers_core::reconnect::ReconnectPolicy;
use tokio_util::sync::CancellationToken;

use crate::error::DashboardResult;

/// One connection attempt of a long-lived channel.
#[async_trait]
pub trait Session: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Connect and run until the connection ends.
    ///
    /// `Ok` means a connection was established and later closed; the
    /// backoff restarts from its initial delay. `Err` covers failed
    /// connects and broken connections alike.
    async fn run_once(&self) -> DashboardResult<()>;
}

/// Run `session` until `cancel` fires, reconnecting after each end.
///
/// Exactly one attempt is made per backoff delay. Returns the number of
/// attempts that ran to completion.
pub async fn supervise<S>(session: &S, policy: &ReconnectPolicy, cancel: &CancellationToken) -> u32
where
    S: Session + ?Sized,
{
    let mut backoff = policy.backoff();
    let mut attempts = 0u32;

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(session = session.name(), attempts, "Session cancelled");
                return attempts;
            }
            result = session.run_once() => result,
        };
        attempts += 1;

        match result {
            Ok(()) => {
                tracing::info!(session = session.name(), "Connection closed, reconnecting");
                backoff.reset();
            }
            Err(e) => {
                tracing::warn!(
                    session = session.name(),
                    attempt = attempts,
                    error = %e,
                    "Connection failed",
                );
            }
        }

        let delay = backoff.next_wait();
        tracing::debug!(
            session = session.name(),
            retry = backoff.attempt(),
            delay_ms = delay.as_millis() as u64,
            "Waiting before reconnect",
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return attempts,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
