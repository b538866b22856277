//! Page-scoped metrics derivation.
//!
//! Pure functions over one page of records. The active/inactive counts are
//! NOT derived here: they come from the aggregate endpoint and cover the
//! full filtered set, while everything below covers only the returned page.
//! That asymmetry is deliberate and mirrors the two query shapes the server
//! exposes.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::ClientRecord;

/// Average month length in days, used to express tenure in months.
const DAYS_PER_MONTH: f64 = 30.44;

/// One point of the monthly signup series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthPoint {
    /// "YYYY-MM"
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedMetrics {
    pub industry_distribution: HashMap<String, u64>,
    pub location_distribution: HashMap<String, u64>,
    /// Sorted ascending by month key.
    pub monthly_growth: Vec<GrowthPoint>,
    pub avg_tenure_months: f64,
}

/// Derive metrics from one page of records.
///
/// Deterministic for a given `records` and `today`. Records with an empty
/// dimension value are left out of that dimension's distribution (no
/// synthetic "unknown" bucket); records with an unparseable signup date are
/// left out of growth and tenure.
pub fn derive(records: &[ClientRecord], today: NaiveDate) -> DerivedMetrics {
    let mut industry_distribution: HashMap<String, u64> = HashMap::new();
    let mut location_distribution: HashMap<String, u64> = HashMap::new();
    let mut by_month: HashMap<String, u64> = HashMap::new();
    let mut tenure_days: i64 = 0;
    let mut dated_records: u64 = 0;

    for record in records {
        if !record.industry.is_empty() {
            *industry_distribution
                .entry(record.industry.clone())
                .or_insert(0) += 1;
        }
        if !record.location.is_empty() {
            *location_distribution
                .entry(record.location.clone())
                .or_insert(0) += 1;
        }

        if let Ok(signup) = NaiveDate::parse_from_str(&record.signup_date, "%Y-%m-%d") {
            *by_month.entry(signup.format("%Y-%m").to_string()).or_insert(0) += 1;
            tenure_days += (today - signup).num_days().abs();
            dated_records += 1;
        }
    }

    let mut monthly_growth: Vec<GrowthPoint> = by_month
        .into_iter()
        .map(|(month, count)| GrowthPoint { month, count })
        .collect();
    monthly_growth.sort_by(|a, b| a.month.cmp(&b.month));

    let avg_tenure_months = if dated_records > 0 {
        tenure_days as f64 / dated_records as f64 / DAYS_PER_MONTH
    } else {
        0.0
    };

    DerivedMetrics {
        industry_distribution,
        location_distribution,
        monthly_growth,
        avg_tenure_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(industry: &str, location: &str, signup_date: &str) -> ClientRecord {
        ClientRecord {
            id: 0,
            name: "Client".to_string(),
            industry: industry.to_string(),
            location: location.to_string(),
            subscription_tier: String::new(),
            signup_date: signup_date.to_string(),
            is_active: Some(true),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn industry_distribution_counts_per_value() {
        let records = vec![
            record("IT", "Berlin", "2024-01-10"),
            record("IT", "Berlin", "2024-02-05"),
            record("Finance", "London", "2024-02-20"),
        ];

        let metrics = derive(&records, today());
        assert_eq!(metrics.industry_distribution.get("IT"), Some(&2));
        assert_eq!(metrics.industry_distribution.get("Finance"), Some(&1));
        assert_eq!(metrics.industry_distribution.len(), 2);
    }

    #[test]
    fn empty_dimension_values_are_excluded_entirely() {
        let records = vec![
            record("IT", "", "2024-01-10"),
            record("", "Berlin", "2024-01-11"),
        ];

        let metrics = derive(&records, today());
        let location_total: u64 = metrics.location_distribution.values().sum();
        assert_eq!(location_total, 1);
        assert!(!metrics.location_distribution.contains_key(""));
        assert!(!metrics.industry_distribution.contains_key(""));
    }

    #[test]
    fn monthly_growth_is_sorted_ascending() {
        let records = vec![
            record("IT", "Berlin", "2024-02-01"),
            record("IT", "Berlin", "2024-01-15"),
        ];

        let metrics = derive(&records, today());
        assert_eq!(
            metrics.monthly_growth,
            vec![
                GrowthPoint {
                    month: "2024-01".to_string(),
                    count: 1
                },
                GrowthPoint {
                    month: "2024-02".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn unparseable_dates_are_excluded_from_growth_and_tenure() {
        let records = vec![
            record("IT", "Berlin", "not-a-date"),
            record("IT", "Berlin", "2025-05-16"),
        ];

        let metrics = derive(&records, today());
        assert_eq!(metrics.monthly_growth.len(), 1);
        // only the parseable record participates: 30 days / 30.44
        assert!((metrics.avg_tenure_months - 30.0 / 30.44).abs() < 1e-9);
        // the unparseable record still counts in distributions
        assert_eq!(metrics.industry_distribution.get("IT"), Some(&2));
    }

    #[test]
    fn tenure_averages_whole_day_distances() {
        let records = vec![
            record("IT", "Berlin", "2025-05-16"), // 30 days back
            record("IT", "Berlin", "2025-04-15"), // 61 days back
        ];

        let metrics = derive(&records, today());
        let expected = (30.0 + 61.0) / 2.0 / 30.44;
        assert!((metrics.avg_tenure_months - expected).abs() < 1e-9);
    }

    #[test]
    fn future_signup_dates_count_by_absolute_distance() {
        let records = vec![record("IT", "Berlin", "2025-06-25")];

        let metrics = derive(&records, today());
        assert!((metrics.avg_tenure_months - 10.0 / 30.44).abs() < 1e-9);
    }

    #[test]
    fn no_valid_dates_means_zero_tenure() {
        let records = vec![record("IT", "Berlin", "")];

        let metrics = derive(&records, today());
        assert_eq!(metrics.avg_tenure_months, 0.0);
        assert!(metrics.monthly_growth.is_empty());
    }

    #[test]
    fn derivation_is_deterministic() {
        let records = vec![
            record("IT", "Berlin", "2024-01-10"),
            record("Finance", "London", "2024-03-15"),
            record("Retail", "", "2023-07-02"),
        ];

        let first = derive(&records, today());
        let second = derive(&records, today());
        assert_eq!(first, second);
    }
}
