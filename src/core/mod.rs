pub mod boundary;
pub mod browser;
pub mod events;
pub mod models;
pub mod refresh;
pub mod upload;
pub mod view;

pub use boundary::{DiagnosticSink, ErrorBoundary, Fault, TracingSink};
pub use browser::{ConfirmedDelete, PendingDelete, ReloadOutcome, ReloadTicket, ReportBrowser};
pub use events::{AppEvent, ReloadReason};
pub use models::{Report, UploadIntent, UploadReceipt};
pub use refresh::RefreshScheduler;
pub use upload::{UploadForm, UploadOutcome, UploadState};
pub use view::ReportRow;
