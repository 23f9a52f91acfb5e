use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A report as registered by the server. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub project: String,
    pub created_at: String,
    pub status: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
}

impl Report {
    /// First 8 characters of the id.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// `created_at` converted to local time, if it is valid RFC 3339.
    pub fn created_local(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Local))
    }
}

/// Body returned by the upload endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: Option<String>,
}

/// One submission of a local archive to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadIntent {
    pub project: String,
    pub file: PathBuf,
    /// Stable across resubmissions of the same file selection.
    pub idempotency_key: Uuid,
}

/// Extensions the server knows how to ingest. Advisory only.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".zip", ".tar", ".zst", ".tar.zst"];

pub fn is_accepted_archive(path: &std::path::Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_ascii_lowercase(),
        None => return false,
    };
    ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn report(id: &str, created_at: &str) -> Report {
        Report {
            id: id.to_string(),
            project: "demo".to_string(),
            created_at: created_at.to_string(),
            status: "ready".to_string(),
            total: 10,
            passed: 9,
            failed: 1,
        }
    }

    #[test]
    fn short_id_truncates_to_eight_chars() {
        assert_eq!(report("abc123ef-4567-89ab", "").short_id(), "abc123ef");
        assert_eq!(report("abc", "").short_id(), "abc");
        assert_eq!(report("ééééééééé", "").short_id(), "éééééééé");
    }

    #[test]
    fn created_local_rejects_malformed_timestamps() {
        assert!(report("a", "2024-01-01T00:00:00Z").created_local().is_some());
        assert!(report("a", "yesterday").created_local().is_none());
    }

    #[test]
    fn report_deserializes_from_server_json() {
        let json = r#"{"id":"abc123ef99","project":"demo","created_at":"2024-01-01T00:00:00Z",
            "status":"passed","total":3,"passed":3,"failed":0}"#;
        let r: Report = serde_json::from_str(json).unwrap();
        assert_eq!(r.total, 3);
        assert_eq!(r.status, "passed");
    }

    #[test]
    fn receipt_tolerates_missing_fields() {
        let r: UploadReceipt = serde_json::from_str("{}").unwrap();
        assert_eq!(r, UploadReceipt::default());
        let r: UploadReceipt = serde_json::from_str(r#"{"ok":true,"id":"x"}"#).unwrap();
        assert_eq!(r.id.as_deref(), Some("x"));
    }

    #[test]
    fn archive_hints() {
        assert!(is_accepted_archive(Path::new("results.zip")));
        assert!(is_accepted_archive(Path::new("/tmp/allure.TAR.ZST")));
        assert!(is_accepted_archive(Path::new("a.tar")));
        assert!(!is_accepted_archive(Path::new("notes.txt")));
    }
}
