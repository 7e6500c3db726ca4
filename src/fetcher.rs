//! Popular-posts report fetcher: configuration, request assembly, flattening.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;

use crate::credentials::ServiceAccountKey;
use crate::error::{ConfigError, FetchError};
use crate::report::{
    DateRange, Dimension, DimensionFilter, DimensionFilterClause, FilterLogicalOperator,
    FilterOperator, GetReportsRequest, Metric, OrderBy, ReportRequest, SortOrder, END_DATE_TODAY,
    PAGEVIEWS_ALIAS, PAGEVIEWS_EXPRESSION,
};
use crate::service::ReportingService;

/// Default lookback window.
const DEFAULT_TIME_WINDOW: &str = "30daysAgo";

/// Default number of rows fetched per report.
const DEFAULT_PAGE_SIZE: i32 = 100;

fn default_dimensions() -> Vec<String> {
    vec!["ga:pageTitle".to_string(), "ga:pagePath".to_string()]
}

/// Flattened report, one entry in `data` per returned row.
///
/// `raw` carries the response body verbatim for caller-side debugging;
/// nothing here interprets it further.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub fetched_at: String,
    pub view_id: String,
    pub time_window: String,
    pub raw: String,
    pub filters: HashMap<String, String>,
    pub data: Vec<Vec<String>>,
}

/// Fetches a pageview report and reshapes it into [`ReportResult`].
///
/// Configuration persists across fetches; each `fetch_report` call builds a
/// fresh request from the current settings. Credentials and view id must be
/// set before the first fetch, everything else has defaults.
pub struct ReportFetcher<S> {
    service: S,
    credentials: Option<String>,
    view_id: Option<String>,
    time_window: String,
    dimensions: Vec<String>,
    filters: HashMap<String, String>,
    page_size: i32,
}

impl<S: ReportingService> ReportFetcher<S> {
    /// Create a fetcher over the given reporting service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            credentials: None,
            view_id: None,
            time_window: DEFAULT_TIME_WINDOW.to_string(),
            dimensions: default_dimensions(),
            filters: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the service-account key document (JSON text).
    pub fn set_credentials(&mut self, credentials: impl Into<String>) {
        self.credentials = Some(credentials.into());
    }

    /// Set the Analytics view id. Distinct from the tracking/property id.
    pub fn set_view_id(&mut self, view_id: impl ToString) {
        self.view_id = Some(view_id.to_string());
    }

    /// Set the lookback window, e.g. `"30daysAgo"` or an explicit start date.
    pub fn set_time_window(&mut self, time_window: impl Into<String>) {
        self.time_window = time_window.into();
    }

    /// Set the dimensions to fetch, in the order they should appear per row.
    ///
    /// For example:
    ///
    /// ```ignore
    /// fetcher.set_dimensions(vec![
    ///     "ga:pageTitle".to_string(),
    ///     "ga:pagePath".to_string(),
    ///     "ga:dimension1".to_string(),
    /// ]);
    /// ```
    pub fn set_dimensions(&mut self, dimensions: Vec<String>) {
        self.dimensions = dimensions;
    }

    /// Set exact-match filters: dimension name to required value.
    ///
    /// For example:
    ///
    /// ```ignore
    /// fetcher.set_filters(HashMap::from([(
    ///     "ga:contentGroup1".to_string(),
    ///     "Single Posts".to_string(),
    /// )]));
    /// ```
    pub fn set_filters(&mut self, filters: HashMap<String, String>) {
        self.filters = filters;
    }

    /// Set how many rows are fetched per report.
    pub fn set_page_size(&mut self, page_size: i32) {
        self.page_size = page_size;
    }

    /// Fetch the report and flatten it.
    ///
    /// Fails with a `ConfigError` before any network call if credentials or
    /// view id are missing, the key document does not decode, or the page
    /// size is not positive. Service-side failures propagate unmodified; an
    /// empty report is not an error.
    pub async fn fetch_report(&self) -> Result<ReportResult, FetchError> {
        let credentials = self
            .credentials
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("credentials".to_string()))?;
        let key = ServiceAccountKey::from_json(credentials)?;

        let view_id = self
            .view_id
            .clone()
            .ok_or_else(|| ConfigError::MissingField("view_id".to_string()))?;

        if self.page_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "page size must be positive, got {}",
                self.page_size
            ))
            .into());
        }

        self.service.authenticate(&key).await?;

        let envelope = self.build_request(&view_id);
        let response = self.service.batch_get_reports(&envelope).await?;

        let mut data = Vec::new();
        for report in &response.reports {
            for row in &report.data.rows {
                data.push(row.dimensions.clone());
            }
        }

        Ok(ReportResult {
            fetched_at: Utc::now().to_rfc2822(),
            view_id,
            time_window: self.time_window.clone(),
            raw: response.raw,
            filters: self.filters.clone(),
            data,
        })
    }

    /// Assemble the batch envelope from the current configuration.
    fn build_request(&self, view_id: &str) -> GetReportsRequest {
        let date_range = DateRange {
            start_date: self.time_window.clone(),
            end_date: END_DATE_TODAY.to_string(),
        };

        let metric = Metric {
            expression: PAGEVIEWS_EXPRESSION.to_string(),
            alias: PAGEVIEWS_ALIAS.to_string(),
        };

        let dimensions = self
            .dimensions
            .iter()
            .map(|name| Dimension { name: name.clone() })
            .collect();

        // All filters go into one clause: logical AND across them.
        let dimension_filter_clauses = if self.filters.is_empty() {
            vec![]
        } else {
            let filters = self
                .filters
                .iter()
                .map(|(dimension, value)| DimensionFilter {
                    dimension_name: dimension.clone(),
                    operator: FilterOperator::Exact,
                    expressions: vec![value.clone()],
                })
                .collect();
            vec![DimensionFilterClause {
                operator: FilterLogicalOperator::And,
                filters,
            }]
        };

        let order_by = OrderBy {
            field_name: PAGEVIEWS_EXPRESSION.to_string(),
            sort_order: SortOrder::Descending,
        };

        GetReportsRequest {
            report_requests: vec![ReportRequest {
                view_id: view_id.to_string(),
                date_ranges: vec![date_range],
                metrics: vec![metric],
                dimensions,
                dimension_filter_clauses,
                order_bys: vec![order_by],
                page_size: self.page_size,
            }],
        }
    }
}

impl<S> std::fmt::Debug for ReportFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportFetcher")
            .field("view_id", &self.view_id)
            .field("time_window", &self.time_window)
            .field("dimensions", &self.dimensions)
            .field("page_size", &self.page_size)
            .finish()
    }
}
