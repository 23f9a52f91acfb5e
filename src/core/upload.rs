//! Upload form state machine.
//!
//! `Idle -> FileSelected -> Uploading -> {Done, Failed}`. A failed upload
//! keeps the selected file so it can be resubmitted; a successful one clears
//! it and asks for a delayed reload of the report list.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::api::ApiError;
use crate::core::models::{UploadIntent, UploadReceipt, is_accepted_archive};

pub const UPLOADING_MESSAGE: &str = "Uploading...";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const PROCESSING_MESSAGE: &str = "Processing... refresh in a bit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FileSelected,
    Uploading,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    path: PathBuf,
    key: Uuid,
}

/// Result of feeding an upload response into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Accepted by the server. The caller should schedule a reload.
    Accepted(UploadReceipt),
    Rejected,
    /// No upload was in progress; nothing changed.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct UploadForm {
    state: UploadState,
    selection: Option<Selection>,
    message: Option<String>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
            selection: None,
            message: None,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn file(&self) -> Option<&Path> {
        self.selection.as_ref().map(|s| s.path.as_path())
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == UploadState::Uploading
    }

    /// Submit is enabled only with a file picked and no upload running.
    pub fn can_submit(&self) -> bool {
        self.selection.is_some() && !self.is_loading()
    }

    /// Pick a file. Refused while an upload is running.
    ///
    /// Returns `false` if the pick was refused.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> bool {
        if self.is_loading() {
            return false;
        }
        let path = path.into();
        if !is_accepted_archive(&path) {
            tracing::warn!(file = %path.display(), "File does not look like a report archive");
        }
        self.selection = Some(Selection {
            path,
            key: Uuid::now_v7(),
        });
        self.state = UploadState::FileSelected;
        true
    }

    /// Drop the picked file. Refused while an upload is running.
    pub fn clear_file(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.selection = None;
        self.state = UploadState::Idle;
        true
    }

    /// Move to `Uploading` and return what to send, or `None` if submit is
    /// currently disabled.
    pub fn submit(&mut self, project: &str) -> Option<UploadIntent> {
        if !self.can_submit() {
            return None;
        }
        let selection = self.selection.as_ref()?;
        let intent = UploadIntent {
            project: project.to_string(),
            file: selection.path.clone(),
            idempotency_key: selection.key,
        };
        self.state = UploadState::Uploading;
        self.message = Some(UPLOADING_MESSAGE.to_string());
        Some(intent)
    }

    /// Record the response of the running upload.
    pub fn finish(&mut self, result: Result<UploadReceipt, ApiError>) -> UploadOutcome {
        if self.state != UploadState::Uploading {
            return UploadOutcome::Ignored;
        }
        match result {
            Ok(receipt) => {
                tracing::info!(report = ?receipt.id, "Upload accepted");
                self.selection = None;
                self.state = UploadState::Done;
                self.message = Some(PROCESSING_MESSAGE.to_string());
                UploadOutcome::Accepted(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed");
                self.state = UploadState::Failed;
                self.message = Some(UPLOAD_FAILED_MESSAGE.to_string());
                UploadOutcome::Rejected
            }
        }
    }
}
