//! Recording `ReportApi` double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ApiError, ReportApi};
use crate::core::models::{Report, UploadIntent, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Upload(UploadIntent),
    Delete(String),
    Health,
}

#[derive(Default)]
pub struct MockApi {
    /// Reports served per project; missing projects list as empty.
    pub reports: Mutex<HashMap<String, Vec<Report>>>,
    /// When set, the next list call fails with this status.
    pub fail_list: Mutex<VecDeque<StatusCode>>,
    pub fail_upload: Mutex<Option<StatusCode>>,
    pub fail_delete: Mutex<Option<StatusCode>>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn with_reports(project: &str, reports: Vec<Report>) -> Self {
        let mock = Self::default();
        mock.set_reports(project, reports);
        mock
    }

    pub fn set_reports(&self, project: &str, reports: Vec<Report>) {
        self.reports
            .lock()
            .unwrap()
            .insert(project.to_string(), reports);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn status_error(endpoint: &'static str, status: StatusCode) -> ApiError {
    ApiError::Status { endpoint, status }
}

#[async_trait]
impl ReportApi for MockApi {
    async fn list_reports(&self, project: &str) -> Result<Vec<Report>, ApiError> {
        self.record(Call::List(project.to_string()));
        if let Some(status) = self.fail_list.lock().unwrap().pop_front() {
            return Err(status_error("GET /api/reports", status));
        }
        Ok(self
            .reports
            .lock()
            .unwrap()
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload(&self, intent: &UploadIntent) -> Result<UploadReceipt, ApiError> {
        self.record(Call::Upload(intent.clone()));
        match *self.fail_upload.lock().unwrap() {
            Some(status) => Err(status_error("POST /api/uploads", status)),
            None => Ok(UploadReceipt {
                ok: true,
                id: Some("uploaded-1".to_string()),
            }),
        }
    }

    async fn delete_report(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(id.to_string()));
        if let Some(status) = *self.fail_delete.lock().unwrap() {
            return Err(status_error("DELETE /api/reports/{id}", status));
        }
        let mut reports = self.reports.lock().unwrap();
        for list in reports.values_mut() {
            list.retain(|r| r.id != id);
        }
        Ok(())
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.record(Call::Health);
        Ok(())
    }
}

pub fn report(id: &str, project: &str) -> Report {
    Report {
        id: id.to_string(),
        project: project.to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        status: "ready".to_string(),
        total: 10,
        passed: 9,
        failed: 1,
    }
}
