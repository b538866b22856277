use serde::{Deserialize, Serialize};

/// A client record as stored in the flat file and served over the wire.
///
/// Dimension fields default to empty strings when absent; the metrics layer
/// treats empty as missing. `signup_date` stays a string end to end: range
/// filters compare it lexicographically and unparseable values are real data
/// the derivation has to tolerate, not a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub subscription_tier: String,
    #[serde(default)]
    pub signup_date: String,
    /// Absent in some records; such records count in neither aggregate bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Active/inactive totals over the full filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCounts {
    #[serde(default)]
    pub active_clients: u64,
    #[serde(default)]
    pub inactive_clients: u64,
}

/// On-disk shape of the flat-file store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbFile {
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
}

/// One page of records plus the collection-wide match count.
///
/// `page` and `per_page` echo the request that produced the response; the
/// server does not send them back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPage {
    pub records: Vec<ClientRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}
