//! Orchestrates dashboard fetches: one page-of-records request and one
//! aggregate-counts request per trigger, committed through the reducer
//! under a generation stamp so a superseded fetch can never overwrite a
//! newer one.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::fetch::api::{ApiClient, FetchError};
use crate::fetch::{filter_params, page_params};
use crate::metrics;
use crate::state::{Action, Dashboard, DashboardState};

#[derive(Clone)]
pub struct Orchestrator {
    dashboard: Dashboard,
    api: Arc<ApiClient>,
}

impl Orchestrator {
    pub fn new(dashboard: Dashboard, api: ApiClient) -> Self {
        Self {
            dashboard,
            api: Arc::new(api),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Start a fetch and return without waiting for it to land.
    pub fn trigger(&self) {
        let snapshot = self.dashboard.dispatch(Action::FetchStarted);
        self.spawn_requests(&snapshot);
    }

    /// Start a fetch and wait for both requests to land.
    pub async fn fetch_once(&self) {
        let snapshot = self.dashboard.dispatch(Action::FetchStarted);
        let generation = snapshot.fetch_gen;
        let (page, counts) = self.spawn_requests(&snapshot);
        for handle in [page, counts] {
            if let Err(err) = handle.await {
                error!("request task panicked: {err}");
                self.dashboard.dispatch(Action::FetchFailed {
                    generation,
                    reason: FetchError::Unknown.to_string(),
                });
            }
        }
    }

    /// Spawn the two independent requests for the given post-start
    /// snapshot. Each commits its own result or failure.
    fn spawn_requests(&self, snapshot: &DashboardState) -> (JoinHandle<()>, JoinHandle<()>) {
        let generation = snapshot.fetch_gen;
        // captured once so both requests resolve date ranges the same way
        let today = Local::now().date_naive();

        let page_task = {
            let dashboard = self.dashboard.clone();
            let api = Arc::clone(&self.api);
            let params = page_params(snapshot, today);
            tokio::spawn(async move {
                match api.get_clients(&params).await {
                    Ok(page) => {
                        let metrics = metrics::derive(&page.records, today);
                        dashboard.dispatch(Action::PageLoaded {
                            generation,
                            page,
                            metrics,
                        });
                    }
                    Err(err) => {
                        warn!("record page fetch failed: {err}");
                        dashboard.dispatch(Action::FetchFailed {
                            generation,
                            reason: err.to_string(),
                        });
                    }
                }
            })
        };

        let counts_task = {
            let dashboard = self.dashboard.clone();
            let api = Arc::clone(&self.api);
            let params = filter_params(&snapshot.filters, today);
            tokio::spawn(async move {
                match api.get_active_counts(&params).await {
                    Ok(counts) => {
                        dashboard.dispatch(Action::CountsLoaded { generation, counts });
                    }
                    Err(err) => {
                        warn!("active counts fetch failed: {err}");
                        dashboard.dispatch(Action::FetchFailed {
                            generation,
                            reason: err.to_string(),
                        });
                    }
                }
            })
        };

        (page_task, counts_task)
    }

    /// Drive refetches until shutdown: an initial load, then one fetch per
    /// committed query change and per change-feed ping.
    ///
    /// Commits from fetches themselves never bump `query_rev`, so they pass
    /// through here without triggering another fetch.
    pub async fn run(self, mut pings: mpsc::Receiver<()>, mut shutdown: watch::Receiver<bool>) {
        let mut states = self.dashboard.subscribe();
        let mut last_rev = states.borrow_and_update().query_rev;
        self.trigger();

        let mut feed_open = true;
        loop {
            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let rev = states.borrow_and_update().query_rev;
                    if rev != last_rev {
                        last_rev = rev;
                        self.trigger();
                    }
                }
                ping = pings.recv(), if feed_open => {
                    match ping {
                        Some(()) => {
                            debug!("data change signalled, refetching");
                            self.trigger();
                        }
                        None => feed_open = false,
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("fetch driver stopped");
    }
}
