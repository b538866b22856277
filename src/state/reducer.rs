use chrono::NaiveDate;

use crate::metrics::DerivedMetrics;
use crate::models::{ActiveCounts, ClientPage, SortDirection, SortField};
use crate::state::{DashboardState, DateRange, FilterState, Lifecycle};

/// Everything that can happen to the dashboard.
///
/// User-intent actions bump `query_rev` when they change anything; fetch
/// commits never do. An intent that would not change state at all is a
/// no-op: no page reset, no revision bump, no refetch.
#[derive(Debug, Clone)]
pub enum Action {
    SetPage(u32),
    SetPerPage(u32),
    SetSort(SortField, SortDirection),
    CommitSearch(String),
    SetIndustry(Option<String>),
    SetTier(Option<String>),
    SetDateRange(DateRange),
    SetCustomStart(Option<NaiveDate>),
    SetCustomEnd(Option<NaiveDate>),
    ClearFilters,
    FetchStarted,
    PageLoaded {
        generation: u64,
        page: ClientPage,
        metrics: DerivedMetrics,
    },
    CountsLoaded {
        generation: u64,
        counts: ActiveCounts,
    },
    FetchFailed {
        generation: u64,
        reason: String,
    },
}

/// Pure transition function.
pub fn reduce(state: &DashboardState, action: Action) -> DashboardState {
    let mut next = state.clone();

    match action {
        Action::SetPage(page) => {
            let page = page.max(1);
            if page != state.page.current {
                next.page.current = page;
                next.query_rev += 1;
            }
        }
        Action::SetPerPage(per_page) => {
            let per_page = per_page.max(1);
            if per_page != state.page.per_page {
                next.page.per_page = per_page;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetSort(field, order) => {
            // sort changes deliberately keep the current page
            if field != state.page.sort_by || order != state.page.sort_order {
                next.page.sort_by = field;
                next.page.sort_order = order;
                next.query_rev += 1;
            }
        }
        Action::CommitSearch(term) => {
            if term != state.filters.search {
                next.filters.search = term;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetIndustry(industry) => {
            if industry != state.filters.industry {
                next.filters.industry = industry;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetTier(tier) => {
            if tier != state.filters.tier {
                next.filters.tier = tier;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetDateRange(mode) => {
            if mode != state.filters.date_range {
                next.filters.date_range = mode;
                if mode != DateRange::Custom {
                    next.filters.custom_start = None;
                    next.filters.custom_end = None;
                }
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetCustomStart(date) => {
            let already = state.filters.date_range == DateRange::Custom
                && state.filters.custom_start == date;
            if !already {
                next.filters.custom_start = date;
                next.filters.date_range = DateRange::Custom;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::SetCustomEnd(date) => {
            let already = state.filters.date_range == DateRange::Custom
                && state.filters.custom_end == date;
            if !already {
                next.filters.custom_end = date;
                next.filters.date_range = DateRange::Custom;
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::ClearFilters => {
            // per-page and sort survive a filter reset
            if state.filters != FilterState::default() || state.page.current != 1 {
                next.filters = FilterState::default();
                next.page.current = 1;
                next.query_rev += 1;
            }
        }
        Action::FetchStarted => {
            next.fetch_gen += 1;
            next.lifecycle = Lifecycle::Loading;
        }
        Action::PageLoaded {
            generation,
            page,
            metrics,
        } => {
            if generation == state.fetch_gen {
                next.result = page;
                next.metrics = metrics;
                // a failure already recorded for this generation stays up
                if !matches!(state.lifecycle, Lifecycle::Failed(_)) {
                    next.lifecycle = Lifecycle::Succeeded;
                }
            }
        }
        Action::CountsLoaded { generation, counts } => {
            if generation == state.fetch_gen {
                next.counts = counts;
            }
        }
        Action::FetchFailed { generation, reason } => {
            // stale-while-error: the last good data stays untouched
            if generation == state.fetch_gen {
                next.lifecycle = Lifecycle::Failed(reason);
            }
        }
    }

    next
}
