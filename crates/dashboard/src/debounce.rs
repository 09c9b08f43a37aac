//! Trailing-edge debounce for search inputs and live re-renders.
//!
//! Values pushed into a [`Debouncer`] are forwarded only after the input
//! has been quiet for the configured delay; intermediate values are
//! dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delay the institution views wait after the last keystroke.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

const CHANNEL_CAPACITY: usize = 32;

/// Input side of a debounced channel.
pub struct Debouncer<T> {
    tx: mpsc::Sender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task. Settled values arrive on the returned
    /// receiver.
    pub fn spawn(delay: Duration) -> (Self, mpsc::Receiver<T>) {
        let (tx, input) = mpsc::channel(CHANNEL_CAPACITY);
        let (output, settled) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run(delay, input, output));
        (Self { tx, task }, settled)
    }

    /// Record a new value, restarting the quiet period.
    pub async fn push(&self, value: T) -> bool {
        self.tx.send(value).await.is_ok()
    }

    /// Stop accepting input. A pending value is still delivered.
    pub async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Debounce task failed");
        }
    }
}

async fn run<T>(delay: Duration, mut input: mpsc::Receiver<T>, output: mpsc::Sender<T>) {
    while let Some(mut latest) = input.recv().await {
        loop {
            match tokio::time::timeout(delay, input.recv()).await {
                Ok(Some(next)) => latest = next,
                Ok(None) => {
                    let _ = output.send(latest).await;
                    return;
                }
                Err(_) => {
                    if output.send(latest).await.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_value_of_a_burst_is_delivered() {
        let (debouncer, mut settled) = Debouncer::spawn(SEARCH_DEBOUNCE);
        let start = Instant::now();

        for text in ["p", "ph", "phy"] {
            assert!(debouncer.push(text.to_string()).await);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(settled.recv().await.as_deref(), Some("phy"));
        // Last push at 200ms plus the 300ms quiet period.
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_each_settle() {
        let (debouncer, mut settled) = Debouncer::spawn(SEARCH_DEBOUNCE);

        debouncer.push(1).await;
        assert_eq!(settled.recv().await, Some(1));

        debouncer.push(2).await;
        debouncer.push(3).await;
        assert_eq!(settled.recv().await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_flushes_the_pending_value() {
        let (debouncer, mut settled) = Debouncer::spawn(SEARCH_DEBOUNCE);
        debouncer.push("draft").await;
        debouncer.finish().await;

        assert_eq!(settled.recv().await, Some("draft"));
        assert_eq!(settled.recv().await, None);
    }
}
