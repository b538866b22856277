use serde::{Deserialize, Serialize};

/// Fields the record list can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Industry,
    Location,
    SubscriptionTier,
    SignupDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Query parameters understood by the record-store list endpoint.
///
/// One type serves both sides of the wire: the client serializes it into a
/// query string (`reqwest .query(&params)`) and the server parses it back
/// (`axum::extract::Query`). `None` fields stay out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_page", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "_limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "_sort", skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortField>,
    #[serde(rename = "_order", skip_serializing_if = "Option::is_none")]
    pub order: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_date_gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_date_lte: Option<String>,
}
