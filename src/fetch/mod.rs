//! Client side of the dashboard: API client with retry, the fetch
//! orchestrator, the change-feed listener, and the search debouncer.

pub mod api;
pub mod listener;
pub mod orchestrator;
pub mod search;

pub use api::{ApiClient, FetchError, RetryPolicy};
pub use listener::ChangeListener;
pub use orchestrator::Orchestrator;
pub use search::SearchDebouncer;

use chrono::{Datelike, Months, NaiveDate};

use crate::models::ListParams;
use crate::state::{DashboardState, DateRange, FilterState};

/// Resolves the active date-range mode to concrete `(gte, lte)` bounds.
///
/// A custom range only applies once both ends are set; a half-set range
/// applies no bounds at all. Month arithmetic clamps at month ends, so
/// six months before Aug 31 is Feb 29 on a leap year.
pub fn date_bounds(
    filters: &FilterState,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match filters.date_range {
        DateRange::All => (None, None),
        DateRange::LastThreeMonths => (today.checked_sub_months(Months::new(3)), Some(today)),
        DateRange::LastSixMonths => (today.checked_sub_months(Months::new(6)), Some(today)),
        DateRange::ThisYear => (NaiveDate::from_ymd_opt(today.year(), 1, 1), Some(today)),
        DateRange::LastYear => (
            NaiveDate::from_ymd_opt(today.year() - 1, 1, 1),
            NaiveDate::from_ymd_opt(today.year() - 1, 12, 31),
        ),
        DateRange::Custom => match (filters.custom_start, filters.custom_end) {
            (Some(start), Some(end)) => (Some(start), Some(end)),
            _ => (None, None),
        },
    }
}

/// Query parameters for the aggregate endpoint: filters only, never
/// pagination or sort.
pub fn filter_params(filters: &FilterState, today: NaiveDate) -> ListParams {
    let (gte, lte) = date_bounds(filters, today);
    ListParams {
        name_like: (!filters.search.is_empty()).then(|| filters.search.clone()),
        industry: filters.industry.clone(),
        subscription_tier: filters.tier.clone(),
        signup_date_gte: gte.map(|d| d.to_string()),
        signup_date_lte: lte.map(|d| d.to_string()),
        ..ListParams::default()
    }
}

/// Query parameters for the record-page endpoint: the filters plus the
/// page window and sort order.
pub fn page_params(state: &DashboardState, today: NaiveDate) -> ListParams {
    ListParams {
        page: Some(state.page.current),
        limit: Some(state.page.per_page),
        sort: Some(state.page.sort_by),
        order: Some(state.page.sort_order),
        ..filter_params(&state.filters, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn all_time_sets_no_bounds() {
        let (gte, lte) = date_bounds(&FilterState::default(), today());
        assert_eq!(gte, None);
        assert_eq!(lte, None);
    }

    #[test]
    fn last_year_covers_the_full_previous_calendar_year() {
        let filters = FilterState {
            date_range: DateRange::LastYear,
            ..FilterState::default()
        };

        let (gte, lte) = date_bounds(&filters, today());
        assert_eq!(gte, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(lte, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn this_year_runs_from_january_to_today() {
        let filters = FilterState {
            date_range: DateRange::ThisYear,
            ..FilterState::default()
        };

        let (gte, lte) = date_bounds(&filters, today());
        assert_eq!(gte, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(lte, Some(today()));
    }

    #[test]
    fn month_subtraction_clamps_at_month_ends() {
        let filters = FilterState {
            date_range: DateRange::LastSixMonths,
            ..FilterState::default()
        };
        let end_of_august = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();

        let (gte, lte) = date_bounds(&filters, end_of_august);
        assert_eq!(gte, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(lte, Some(end_of_august));
    }

    #[test]
    fn half_set_custom_range_applies_no_bounds() {
        let filters = FilterState {
            date_range: DateRange::Custom,
            custom_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            custom_end: None,
            ..FilterState::default()
        };

        assert_eq!(date_bounds(&filters, today()), (None, None));
    }

    #[test]
    fn complete_custom_range_passes_both_ends_through() {
        let filters = FilterState {
            date_range: DateRange::Custom,
            custom_start: NaiveDate::from_ymd_opt(2024, 3, 1),
            custom_end: NaiveDate::from_ymd_opt(2024, 9, 30),
            ..FilterState::default()
        };

        let (gte, lte) = date_bounds(&filters, today());
        assert_eq!(gte, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(lte, NaiveDate::from_ymd_opt(2024, 9, 30));
    }

    #[test]
    fn empty_search_stays_out_of_the_filter_params() {
        let params = filter_params(&FilterState::default(), today());
        assert_eq!(params.name_like, None);

        let filters = FilterState {
            search: "acme".to_string(),
            ..FilterState::default()
        };
        let params = filter_params(&filters, today());
        assert_eq!(params.name_like.as_deref(), Some("acme"));
    }

    #[test]
    fn aggregate_params_never_carry_pagination() {
        let filters = FilterState {
            industry: Some("Finance".to_string()),
            ..FilterState::default()
        };

        let params = filter_params(&filters, today());
        assert_eq!(params.page, None);
        assert_eq!(params.limit, None);
        assert_eq!(params.sort, None);
        assert_eq!(params.order, None);
    }

    #[test]
    fn page_params_carry_the_window_and_the_filters() {
        let mut state = DashboardState::default();
        state.page.current = 3;
        state.page.per_page = 25;
        state.filters.tier = Some("Premium".to_string());

        let params = page_params(&state, today());
        assert_eq!(params.page, Some(3));
        assert_eq!(params.limit, Some(25));
        assert_eq!(params.subscription_tier.as_deref(), Some("Premium"));
    }
}
