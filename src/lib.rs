//! Popular-posts client for the Google Analytics Reporting API v4.
//!
//! Simplifies the Reporting API to the point it can be used to fetch the
//! data needed to rank the most popular posts on a site: configure a
//! [`ReportFetcher`] with a service-account key and a view id, and get back
//! flattened dimension rows sorted by pageviews.
//!
//! ```no_run
//! use ga_popular_posts::{HttpReportingService, ReportFetcher};
//!
//! # async fn run(key_json: String) -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpReportingService::new(false)?;
//! let mut fetcher = ReportFetcher::new(service);
//! fetcher.set_credentials(key_json);
//! fetcher.set_view_id(12345678u64);
//!
//! let report = fetcher.fetch_report().await?;
//! for row in &report.data {
//!     println!("{} ({})", row[0], row[1]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod report;
pub mod service;

#[cfg(test)]
mod testkey;

pub use credentials::ServiceAccountKey;
pub use error::{ApiError, AuthError, ConfigError, FetchError};
pub use fetcher::{ReportFetcher, ReportResult};
pub use service::{BatchResponse, HttpReportingService, ReportingService};
