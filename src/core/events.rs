//! Messages delivered back to the UI loop when background work finishes.
//!
//! Network calls run on spawned tasks; their outcomes come back through an
//! unbounded channel so every state change happens on the loop that owns
//! the state.

use tokio::sync::mpsc;

use crate::api::ApiError;
use crate::core::models::{Report, UploadReceipt};

#[derive(Debug)]
pub enum AppEvent {
    /// Something asked for a fresh listing of the active project.
    ReloadRequested { reason: ReloadReason },
    /// A listing request finished.
    ReportsLoaded {
        generation: u64,
        result: Result<Vec<Report>, ApiError>,
    },
    /// The upload request finished.
    UploadFinished(Result<UploadReceipt, ApiError>),
    /// A delete request finished.
    DeleteFinished {
        id: String,
        result: Result<(), ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    Manual,
    ProjectChanged,
    AfterUpload,
    AfterDelete,
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
