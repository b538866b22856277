//! Trailing-edge debouncing, shared by the search coordinator and the
//! change feed.

use std::time::Duration;

use tokio::sync::mpsc;

enum Message<T> {
    Update(T),
    Reset,
}

/// Coalesces a burst of updates into one commit of the latest value after a
/// quiet period with no further input.
///
/// The worker task ends when every handle is dropped; a pending draft is
/// discarded at that point, not committed.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the worker; `commit` runs once per completed quiet period with
    /// the latest value seen.
    pub fn new<F>(window: Duration, mut commit: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message<T>>();

        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(Message::Update(value)) => pending = Some(value),
                        Some(Message::Reset) => pending = None,
                        None => break,
                    },
                    // The sleep is recreated on every iteration, so each
                    // update restarts the quiet period.
                    _ = tokio::time::sleep(window), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            commit(value);
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Replace the pending draft and restart the quiet period.
    pub fn update(&self, value: T) {
        let _ = self.tx.send(Message::Update(value));
    }

    /// Drop the pending draft without committing.
    pub fn reset(&self) {
        let _ = self.tx.send(Message::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, Duration};

    fn collector() -> (Debouncer<u32>, mpsc::UnboundedReceiver<u32>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(50), move |value| {
            let _ = tx.send(value);
        });
        (debouncer, rx)
    }

    #[tokio::test]
    async fn commits_only_the_latest_value_once() {
        let (debouncer, mut commits) = collector();

        debouncer.update(1);
        debouncer.update(2);
        debouncer.update(3);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(commits.try_recv().ok(), Some(3));
        assert!(commits.try_recv().is_err());
    }

    #[tokio::test]
    async fn updates_restart_the_quiet_period() {
        let (debouncer, mut commits) = collector();

        debouncer.update(1);
        sleep(Duration::from_millis(30)).await;
        debouncer.update(2);
        // 60ms after the first update but only 30ms after the second:
        // nothing may have committed yet
        sleep(Duration::from_millis(30)).await;
        assert!(commits.try_recv().is_err());

        sleep(Duration::from_millis(120)).await;
        assert_eq!(commits.try_recv().ok(), Some(2));
    }

    #[tokio::test]
    async fn separate_bursts_commit_separately() {
        let (debouncer, mut commits) = collector();

        debouncer.update(1);
        sleep(Duration::from_millis(150)).await;
        debouncer.update(2);
        sleep(Duration::from_millis(150)).await;

        assert_eq!(commits.try_recv().ok(), Some(1));
        assert_eq!(commits.try_recv().ok(), Some(2));
        assert!(commits.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_drops_the_pending_draft() {
        let (debouncer, mut commits) = collector();

        debouncer.update(1);
        debouncer.reset();
        sleep(Duration::from_millis(150)).await;

        assert!(commits.try_recv().is_err());
    }
}
