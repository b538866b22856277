//! Change notification: sources observe store mutations, the broadcaster
//! coalesces them, subscribers get one signal per quiet window.

pub mod watcher;

pub use watcher::FileWatcher;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::debounce::Debouncer;

/// Default quiet window for coalescing store mutations.
pub const FEED_DEBOUNCE: Duration = Duration::from_millis(50);

/// Debounced fan-out of "data changed" signals.
///
/// Sources report raw mutations with [`notify`](ChangeBroadcaster::notify);
/// after the quiet window one signal goes out, and every connected
/// subscriber receives it.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    debouncer: Debouncer<()>,
    output: broadcast::Sender<()>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::with_window(FEED_DEBOUNCE)
    }

    pub fn with_window(window: Duration) -> Self {
        let (output, _) = broadcast::channel(16);
        let tx = output.clone();
        let debouncer = Debouncer::new(window, move |()| match tx.send(()) {
            Ok(subscribers) => debug!("data change delivered to {subscribers} subscribers"),
            Err(_) => debug!("data change dropped, no subscribers"),
        });
        Self { debouncer, output }
    }

    /// Report one raw store mutation.
    pub fn notify(&self) {
        self.debouncer.update(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.output.subscribe()
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// A source of raw store-mutation observations.
///
/// Implementations block until they see a mutation; coalescing belongs to
/// the broadcaster, not the source.
#[async_trait]
pub trait ChangeSource: Send {
    /// Wait for the next observed mutation. `None` ends the source for good.
    async fn next_change(&mut self) -> Option<()>;
}

/// Pump a change source into the broadcaster until shutdown.
pub fn drive(
    mut source: impl ChangeSource + 'static,
    broadcaster: ChangeBroadcaster,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                change = source.next_change() => match change {
                    Some(()) => broadcaster.notify(),
                    None => {
                        debug!("change source exhausted");
                        break;
                    }
                },
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!("change feed shutting down");
                        break;
                    }
                }
            }
        }
    })
}
