//! Client side of the report service HTTP API.
//!
//! ## Endpoints
//!
//! - `GET /api/reports?project={id}` - list reports of a project
//! - `POST /api/uploads` - multipart upload of a report archive (bearer auth)
//! - `DELETE /api/reports/{id}` - remove a report (bearer auth)
//! - `GET /api/health` - liveness probe
//!
//! Rendered reports are served separately under `/reports/{project}/{id}/`
//! and are only linked to, never fetched.

mod http;

#[cfg(test)]
pub(crate) mod mock;

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::core::models::{Report, UploadIntent, UploadReceipt};

pub use http::{HttpReportApi, viewer_url};

/// Error returned by report API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// The operations the client needs from the report service.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn list_reports(&self, project: &str) -> Result<Vec<Report>, ApiError>;

    async fn upload(&self, intent: &UploadIntent) -> Result<UploadReceipt, ApiError>;

    async fn delete_report(&self, id: &str) -> Result<(), ApiError>;

    async fn health(&self) -> Result<(), ApiError>;
}
