//! Dashboard state: one shared store, mutated only through dispatched
//! actions, published as whole snapshots.

pub mod reducer;

pub use reducer::{reduce, Action};

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::metrics::DerivedMetrics;
use crate::models::{ActiveCounts, ClientPage, SortDirection, SortField};

/// Date-range mode of the filter bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    LastThreeMonths,
    LastSixMonths,
    ThisYear,
    LastYear,
    Custom,
}

/// Filter intent. `None` industry/tier means "all".
///
/// Invariant: custom dates are `None` unless `date_range` is `Custom`;
/// selecting a custom date forces `Custom`. The reducer maintains this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub industry: Option<String>,
    pub tier: Option<String>,
    pub date_range: DateRange,
    pub custom_start: Option<NaiveDate>,
    pub custom_end: Option<NaiveDate>,
}

/// Pagination and sort intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// 1-indexed.
    pub current: u32,
    pub per_page: u32,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current: 1,
            per_page: 10,
            sort_by: SortField::Id,
            sort_order: SortDirection::Asc,
        }
    }
}

/// Lifecycle of the in-flight fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

/// The whole dashboard state, published atomically on every action.
///
/// `fetch_gen` stamps each fetch; results carrying an older stamp are
/// dropped instead of committed. `query_rev` moves only on user intent, so
/// the orchestration driver can tell "refetch needed" apart from the state
/// churn its own commits produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub filters: FilterState,
    pub page: PageState,
    pub lifecycle: Lifecycle,
    /// Last committed page, with the request's page/limit echoed alongside.
    pub result: ClientPage,
    pub counts: ActiveCounts,
    pub metrics: DerivedMetrics,
    pub fetch_gen: u64,
    pub query_rev: u64,
}

/// Shared state container.
///
/// Dispatch runs the pure reducer inside `send_modify`, so every published
/// snapshot is one whole post-action state; readers never observe a
/// half-applied action.
#[derive(Clone)]
pub struct Dashboard {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl Dashboard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(DashboardState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Apply one action and return the snapshot it produced.
    pub fn dispatch(&self, action: Action) -> DashboardState {
        let mut snapshot = DashboardState::default();
        self.tx.send_modify(|state| {
            *state = reduce(state, action);
            snapshot = state.clone();
        });
        snapshot
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Watch every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
