//! List-query evaluation: filter, sort, paginate.
//!
//! Matches the json-server conventions the dashboard client was written
//! against: `name_like` is a case-insensitive substring match, the other
//! filters are exact, date bounds compare the raw date strings
//! lexicographically, and `_page` without `_limit` falls back to a page
//! size of 10.

use crate::models::{ActiveCounts, ClientRecord, ListParams, SortDirection, SortField};

/// Page size applied when `_page` is present but `_limit` is not.
pub const DEFAULT_LIMIT: u32 = 10;

/// Records surviving the query plus the match count before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub records: Vec<ClientRecord>,
    pub total: usize,
}

/// Evaluate a list query over the full record set.
pub fn evaluate(records: Vec<ClientRecord>, params: &ListParams) -> QueryOutcome {
    let mut matched: Vec<ClientRecord> = records
        .into_iter()
        .filter(|record| matches_filters(record, params))
        .collect();

    if let Some(field) = params.sort {
        sort_records(&mut matched, field, params.order.unwrap_or_default());
    }

    let total = matched.len();

    let records = match params.page {
        Some(page) => {
            let limit = params.limit.unwrap_or(DEFAULT_LIMIT) as usize;
            let start = (page.max(1) as usize - 1).saturating_mul(limit);
            matched.into_iter().skip(start).take(limit).collect()
        }
        // No _page means the whole filtered set, json-server style.
        None => matched,
    };

    QueryOutcome { records, total }
}

/// Apply only the filter parameters; pagination and sort are ignored.
pub fn matches_filters(record: &ClientRecord, params: &ListParams) -> bool {
    if let Some(ref term) = params.name_like {
        if !record.name.to_lowercase().contains(&term.to_lowercase()) {
            return false;
        }
    }
    if let Some(ref industry) = params.industry {
        if &record.industry != industry {
            return false;
        }
    }
    if let Some(ref tier) = params.subscription_tier {
        if &record.subscription_tier != tier {
            return false;
        }
    }
    if let Some(ref gte) = params.signup_date_gte {
        if record.signup_date.as_str() < gte.as_str() {
            return false;
        }
    }
    if let Some(ref lte) = params.signup_date_lte {
        if record.signup_date.as_str() > lte.as_str() {
            return false;
        }
    }
    true
}

/// Tally the strict active/inactive flags. A record without the flag lands
/// in neither bucket.
pub fn count_active<'a>(records: impl IntoIterator<Item = &'a ClientRecord>) -> ActiveCounts {
    let mut counts = ActiveCounts::default();
    for record in records {
        match record.is_active {
            Some(true) => counts.active_clients += 1,
            Some(false) => counts.inactive_clients += 1,
            None => {}
        }
    }
    counts
}

fn sort_records(records: &mut [ClientRecord], field: SortField, order: SortDirection) {
    // sort_by is stable, so equal keys keep their file order
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Industry => a.industry.cmp(&b.industry),
            SortField::Location => a.location.cmp(&b.location),
            SortField::SubscriptionTier => a.subscription_tier.cmp(&b.subscription_tier),
            SortField::SignupDate => a.signup_date.cmp(&b.signup_date),
        };
        match order {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
