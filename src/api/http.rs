use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, Url};
use tokio_util::io::ReaderStream;

use super::{ApiError, ReportApi};
use crate::config::AppConfig;
use crate::core::models::{Report, UploadIntent, UploadReceipt};

/// `ReportApi` over HTTP using reqwest.
pub struct HttpReportApi {
    base: Url,
    token: String,
    client: Client,
}

impl HttpReportApi {
    pub fn new(
        base: &str,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base: parse_base(base)?,
            token: token.into(),
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.server,
            config.token.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn list_reports(&self, project: &str) -> Result<Vec<Report>, ApiError> {
        let url = self.endpoint("api/reports")?;
        tracing::debug!(%url, project, "Listing reports");

        let resp = self.client.get(url).query(&[("project", project)]).send().await?;
        let resp = check_status(resp, "GET /api/reports")?;

        // An empty project comes back as `null`.
        let reports: Option<Vec<Report>> = resp.json().await?;
        Ok(reports.unwrap_or_default())
    }

    async fn upload(&self, intent: &UploadIntent) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint("api/uploads")?;
        let file_err = |source| ApiError::File {
            path: intent.file.clone(),
            source,
        };

        let file = tokio::fs::File::open(&intent.file).await.map_err(file_err)?;
        let len = file.metadata().await.map_err(file_err)?.len();
        let file_name = intent
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::debug!(
            %url,
            project = %intent.project,
            file = %intent.file.display(),
            bytes = len,
            key = %intent.idempotency_key,
            "Uploading report archive"
        );

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text("project", intent.project.clone())
            .part("file", part);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Idempotency-Key", intent.idempotency_key.to_string())
            .multipart(form)
            .send()
            .await?;
        let resp = check_status(resp, "POST /api/uploads")?;

        // The body is informational; a 2xx is what counts.
        let body = resp.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn delete_report(&self, id: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("api/reports/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(id);
        tracing::debug!(%url, "Deleting report");

        let resp = self.client.delete(url).bearer_auth(&self.token).send().await?;
        check_status(resp, "DELETE /api/reports/{id}")?;
        Ok(())
    }

    async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint("api/health")?;
        let resp = self.client.get(url).send().await?;
        check_status(resp, "GET /api/health")?;
        Ok(())
    }
}

/// URL of the rendered report page: `{viewer}/reports/{project}/{id}/`.
pub fn viewer_url(viewer_base: &str, project: &str, id: &str) -> Result<Url, ApiError> {
    let mut url = parse_base(viewer_base)?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(viewer_base.to_string()))?
        .pop_if_empty()
        .extend(["reports", project, id, ""]);
    Ok(url)
}

fn check_status(resp: Response, endpoint: &'static str) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        tracing::warn!(endpoint, %status, "Report service returned an error");
        Err(ApiError::Status { endpoint, status })
    }
}

/// Parse a base URL, making sure relative joins land below its path.
fn parse_base(base: &str) -> Result<Url, ApiError> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    let url = Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(base.to_string()));
    }
    Ok(url)
}
