use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::feed::ChangeSource;

/// Default polling interval for the backing file.
pub const WATCH_INTERVAL: Duration = Duration::from_millis(200);

/// Watches the store file by polling its mtime.
///
/// The baseline is taken at construction, so a file that already exists
/// does not fire on startup; a file that appears later does.
pub struct FileWatcher {
    path: PathBuf,
    interval: Duration,
    last_seen: Option<SystemTime>,
}

impl FileWatcher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        let path = path.into();
        let last_seen = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            path,
            interval,
            last_seen,
        }
    }
}

#[async_trait]
impl ChangeSource for FileWatcher {
    async fn next_change(&mut self) -> Option<()> {
        loop {
            tokio::time::sleep(self.interval).await;

            // A missing file may be mid-replace; keep polling.
            let Ok(meta) = tokio::fs::metadata(&self.path).await else {
                continue;
            };
            let Ok(modified) = meta.modified() else {
                continue;
            };

            if self.last_seen != Some(modified) {
                self.last_seen = Some(modified);
                return Some(());
            }
        }
    }
}
