//! Long-lived subscription to the record store's change feed.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RECONNECT_BASE: Duration = Duration::from_millis(200);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Subscribes to the `/events` stream and forwards each `dataUpdated`
/// notification as a ping. Lost connections are re-established with a
/// doubling backoff, capped at five seconds.
pub struct ChangeListener {
    http: reqwest::Client,
    base_url: String,
}

impl ChangeListener {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // No total timeout: the stream is meant to stay open indefinitely.
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build HTTP client for the change feed")?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run until shutdown, reconnecting whenever the stream drops.
    pub async fn run(self, pings: mpsc::Sender<()>, mut shutdown: watch::Receiver<bool>) {
        let mut delay = RECONNECT_BASE;
        loop {
            tokio::select! {
                result = self.listen(&pings, &mut delay) => {
                    match result {
                        Ok(()) => debug!("change feed stream ended, reconnecting"),
                        Err(err) => warn!("change feed connection lost: {err:#}"),
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
            delay = (delay * 2).min(MAX_RECONNECT_DELAY);
        }
        debug!("change listener stopped");
    }

    async fn listen(&self, pings: &mpsc::Sender<()>, delay: &mut Duration) -> Result<()> {
        let url = format!("{}/events", self.base_url);
        let mut response = self
            .http
            .get(&url)
            .header("accept", "text/event-stream")
            .send()
            .await
            .context("failed to connect to the change feed")?
            .error_for_status()
            .context("change feed endpoint returned an error status")?;

        debug!("change feed connected");
        *delay = RECONNECT_BASE;

        let mut buffer = String::new();
        while let Some(chunk) = response.chunk().await? {
            buffer.push_str(&String::from_utf8_lossy(&chunk));
            // frames are separated by a blank line
            while let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                if frame_names_event(&frame, "dataUpdated") {
                    // a full channel means a refetch is already queued
                    if pings.try_send(()).is_err() {
                        debug!("dropping change ping, a refetch is already pending");
                    }
                }
            }
        }

        Ok(())
    }
}

/// Whether any `event:` line of the frame names the given event. Comment
/// keep-alives and bare data lines never match.
fn frame_names_event(frame: &str, name: &str) -> bool {
    frame
        .lines()
        .filter_map(|line| line.strip_prefix("event:"))
        .any(|value| value.trim() == name)
}
