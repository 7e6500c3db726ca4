//! Request and response value structs for the Reporting API v4 wire format.
//!
//! These are plain immutable values; `ReportFetcher` assembles them in one
//! place rather than through per-object setters.

use serde::{Deserialize, Serialize};

/// Metric expression counted for every report.
pub const PAGEVIEWS_EXPRESSION: &str = "ga:pageviews";

/// Alias the pageviews metric is referenced by downstream.
pub const PAGEVIEWS_ALIAS: &str = "pageviews";

/// Literal end-date token; every report runs up to the current day.
pub const END_DATE_TODAY: &str = "today";

/// Date range with a relative or absolute start and a literal end token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// A requested metric expression with its alias.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub expression: String,
    pub alias: String,
}

/// A requested dimension.
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
}

/// Match operator for a dimension filter.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Exact,
}

/// A single dimension filter; `expressions` are the values matched against.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub dimension_name: String,
    pub operator: FilterOperator,
    pub expressions: Vec<String>,
}

/// How the filters within a clause combine. The API defaults to OR when
/// unspecified, so AND must be sent explicitly.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterLogicalOperator {
    And,
}

/// A group of dimension filters combined with logical AND.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionFilterClause {
    pub operator: FilterLogicalOperator,
    pub filters: Vec<DimensionFilter>,
}

/// Sort direction for an order-by.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Descending,
}

/// Order-by on a metric or dimension field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sort_order: SortOrder,
}

/// One report request within a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_filter_clauses: Vec<DimensionFilterClause>,
    pub order_bys: Vec<OrderBy>,
    pub page_size: i32,
}

/// Batch envelope for `reports:batchGet`. The API accepts up to five
/// requests per call; this client always submits one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsRequest {
    pub report_requests: Vec<ReportRequest>,
}

/// Top-level `reports:batchGet` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GetReportsResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// One report section of the response.
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub data: ReportData,
}

/// Row data within a report section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default)]
    pub row_count: Option<i64>,
}

/// A single row: dimension values in request order plus metric values.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<DateRangeValues>,
}

/// Metric values for one date range of a row.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeValues {
    #[serde(default)]
    pub values: Vec<String>,
}
