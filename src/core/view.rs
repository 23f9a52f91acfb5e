//! Display form of a report row, shared by the TUI table and `list`.

use crate::core::models::Report;

pub const INVALID_DATE: &str = "Invalid Date";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const HEADERS: [&str; 6] = ["ID", "Date", "Status", "Total", "Passed", "Failed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: String,
    pub date: String,
    pub status: String,
    pub total: String,
    pub passed: String,
    pub failed: String,
}

impl ReportRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.id,
            &self.date,
            &self.status,
            &self.total,
            &self.passed,
            &self.failed,
        ]
    }

    pub fn into_cells(self) -> [String; 6] {
        [
            self.id,
            self.date,
            self.status,
            self.total,
            self.passed,
            self.failed,
        ]
    }
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        Self {
            id: report.short_id().to_string(),
            date: format_date(report),
            status: report.status.clone(),
            total: report.total.to_string(),
            passed: report.passed.to_string(),
            failed: report.failed.to_string(),
        }
    }
}

/// `created_at` in local time, or `Invalid Date`.
pub fn format_date(report: &Report) -> String {
    match report.created_local() {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}
