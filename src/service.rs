//! Reporting service abstraction and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::AuthClient;
use crate::credentials::ServiceAccountKey;
use crate::error::{ApiError, AuthError};
use crate::report::{GetReportsRequest, GetReportsResponse, Report};

/// Production endpoint for the Reporting API v4.
const REPORTING_BASE_URL: &str = "https://analyticsreporting.googleapis.com";

/// Result of a batch fetch: parsed report sections plus the verbatim body.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    /// Response body exactly as received, kept for caller-side diagnostics.
    pub raw: String,
    pub reports: Vec<Report>,
}

/// Minimal capability interface over the reporting backend.
///
/// Implemented by [`HttpReportingService`] for production and by in-process
/// doubles in tests.
#[async_trait]
pub trait ReportingService: Send + Sync {
    /// Establish credentials for subsequent report calls.
    async fn authenticate(&self, key: &ServiceAccountKey) -> Result<(), ApiError>;

    /// Execute one batch of report requests.
    async fn batch_get_reports(
        &self,
        request: &GetReportsRequest,
    ) -> Result<BatchResponse, ApiError>;
}

/// Google error envelope on non-2xx responses.
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
    #[serde(default)]
    status: String,
}

/// HTTP client for the Reporting API v4.
#[derive(Clone)]
pub struct HttpReportingService {
    base_url: String,
    http_client: Client,
    auth_client: AuthClient,
    token: Arc<RwLock<Option<String>>>,
    debug: bool,
}

impl HttpReportingService {
    /// Create a service against the production endpoint.
    ///
    /// # Errors
    /// Returns `ApiError::HttpClientInit` if the HTTP client cannot be created.
    pub fn new(debug: bool) -> Result<Self, ApiError> {
        Self::with_base_url(REPORTING_BASE_URL.to_string(), debug)
    }

    /// Create a service against a non-default endpoint (test servers).
    pub fn with_base_url(base_url: String, debug: bool) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::HttpClientInit(e.to_string()))?;

        Ok(Self {
            base_url,
            auth_client: AuthClient::new(http_client.clone(), debug),
            http_client,
            token: Arc::new(RwLock::new(None)),
            debug,
        })
    }

    /// Parse a non-2xx response body, preferring the Google error envelope.
    fn parse_error_response<T>(&self, status: StatusCode, body: &str) -> Result<T, ApiError> {
        if let Ok(envelope) = serde_json::from_str::<GoogleErrorResponse>(body) {
            Err(ApiError::Service {
                status,
                code: envelope.error.status,
                message: envelope.error.message,
            })
        } else {
            Err(ApiError::Http {
                status,
                body: body.to_string(),
            })
        }
    }
}

#[async_trait]
impl ReportingService for HttpReportingService {
    async fn authenticate(&self, key: &ServiceAccountKey) -> Result<(), ApiError> {
        let token = self.auth_client.get_token(key).await?;

        let mut guard = self.token.write().await;
        *guard = Some(token);
        Ok(())
    }

    async fn batch_get_reports(
        &self,
        request: &GetReportsRequest,
    ) -> Result<BatchResponse, ApiError> {
        let token = {
            let guard = self.token.read().await;
            guard.clone()
        }
        .ok_or(ApiError::Auth(AuthError::NoToken))?;

        let url = format!("{}/v4/reports:batchGet", self.base_url);
        if self.debug {
            tracing::debug!(url = %url, "Reporting API POST request");
        }

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            if self.debug {
                tracing::debug!(bytes = body.len(), "Reporting API response received");
            }
            let parsed: GetReportsResponse = serde_json::from_str(&body)?;
            Ok(BatchResponse {
                raw: body,
                reports: parsed.reports,
            })
        } else {
            if self.debug {
                tracing::debug!(status = %status, "Reporting API error response");
            }
            self.parse_error_response(status, &body)
        }
    }
}

impl std::fmt::Debug for HttpReportingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReportingService")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{
        DateRange, Dimension, Metric, OrderBy, ReportRequest, SortOrder, END_DATE_TODAY,
        PAGEVIEWS_ALIAS, PAGEVIEWS_EXPRESSION,
    };
    use crate::testkey;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_envelope() -> GetReportsRequest {
        GetReportsRequest {
            report_requests: vec![ReportRequest {
                view_id: "12345678".to_string(),
                date_ranges: vec![DateRange {
                    start_date: "30daysAgo".to_string(),
                    end_date: END_DATE_TODAY.to_string(),
                }],
                metrics: vec![Metric {
                    expression: PAGEVIEWS_EXPRESSION.to_string(),
                    alias: PAGEVIEWS_ALIAS.to_string(),
                }],
                dimensions: vec![
                    Dimension {
                        name: "ga:pageTitle".to_string(),
                    },
                    Dimension {
                        name: "ga:pagePath".to_string(),
                    },
                ],
                dimension_filter_clauses: vec![],
                order_bys: vec![OrderBy {
                    field_name: PAGEVIEWS_EXPRESSION.to_string(),
                    sort_order: SortOrder::Descending,
                }],
                page_size: 100,
            }],
        }
    }

    async fn authenticated_service(mock_server: &MockServer) -> HttpReportingService {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.service-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(mock_server)
            .await;

        let service = HttpReportingService::with_base_url(mock_server.uri(), false).unwrap();
        let key = testkey::service_account_key(&format!("{}/token", mock_server.uri()));
        service.authenticate(&key).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_batch_get_reports_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v4/reports:batchGet"))
            .and(header("Authorization", "Bearer ya29.service-token"))
            .and(body_partial_json(serde_json::json!({
                "reportRequests": [{"viewId": "12345678"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reports": [{
                    "data": {
                        "rows": [
                            {"dimensions": ["Post A", "/a"], "metrics": [{"values": ["120"]}]}
                        ],
                        "rowCount": 1
                    }
                }]
            })))
            .mount(&mock_server)
            .await;

        let service = authenticated_service(&mock_server).await;
        let response = service.batch_get_reports(&sample_envelope()).await.unwrap();

        assert_eq!(response.reports.len(), 1);
        assert_eq!(
            response.reports[0].data.rows[0].dimensions,
            vec!["Post A", "/a"]
        );
        assert!(response.raw.contains("Post A"));
    }

    #[tokio::test]
    async fn test_batch_get_reports_without_authenticate_fails() {
        let mock_server = MockServer::start().await;
        let service = HttpReportingService::with_base_url(mock_server.uri(), false).unwrap();

        let err = service
            .batch_get_reports(&sample_envelope())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::NoToken)));
    }

    #[tokio::test]
    async fn test_google_error_envelope_is_mapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v4/reports:batchGet"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "User does not have sufficient permissions for this view.",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&mock_server)
            .await;

        let service = authenticated_service(&mock_server).await;
        let err = service
            .batch_get_reports(&sample_envelope())
            .await
            .unwrap_err();

        match err {
            ApiError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(code, "PERMISSION_DENIED");
                assert!(message.contains("sufficient permissions"));
            }
            other => panic!("expected Service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_http_error_is_mapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v4/reports:batchGet"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let service = authenticated_service(&mock_server).await;
        let err = service
            .batch_get_reports(&sample_envelope())
            .await
            .unwrap_err();

        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}
