//! TUI application state and logic.

use std::path::PathBuf;

use anyhow::Result;
use reqwest::Url;

use crate::api::viewer_url;
use crate::context::AppContext;
use crate::core::browser::{
    ConfirmedDelete, PendingDelete, ReloadOutcome, ReloadTicket, ReportBrowser,
};
use crate::core::events::{AppEvent, EventSender, ReloadReason};
use crate::core::models::Report;
use crate::core::refresh::RefreshScheduler;
use crate::core::upload::{UploadForm, UploadOutcome};

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Moving around the report table.
    Browse,
    /// Typing the path of the archive to upload.
    ChooseFile { input: String },
    /// Waiting for the user to confirm a delete.
    ConfirmDelete(PendingDelete),
}

/// How key presses should be interpreted in the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Text,
    Confirm,
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Refresh,
    NextProject,
    ChooseFile,
    Upload,
    Delete,
    Open,
    Input(char),
    Backspace,
    Accept,
    Cancel,
    Confirm,
    Deny,
}

/// Transient message in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Main TUI application state.
pub struct TuiApp {
    ctx: AppContext,
    events: EventSender,
    refresh: RefreshScheduler,
    pub browser: ReportBrowser,
    pub upload: UploadForm,
    pub mode: Mode,
    pub selected: usize,
    pub running: bool,
    pub status: Option<Status>,
}

impl TuiApp {
    /// Create the app. Background results are posted to `events`.
    pub fn new(ctx: AppContext, events: EventSender) -> Result<Self> {
        let browser = ReportBrowser::new(ctx.config.projects.clone(), ctx.config.project.clone())?;
        let refresh = RefreshScheduler::new(ctx.config.refresh_delay(), events.clone());
        Ok(Self {
            ctx,
            events,
            refresh,
            browser,
            upload: UploadForm::new(),
            mode: Mode::Browse,
            selected: 0,
            running: true,
            status: None,
        })
    }

    /// Kick off the first listing.
    pub fn init(&mut self) {
        self.spawn_reload(ReloadReason::Manual);
    }

    pub fn input_mode(&self) -> InputMode {
        match self.mode {
            Mode::Browse => InputMode::Browse,
            Mode::ChooseFile { .. } => InputMode::Text,
            Mode::ConfirmDelete(_) => InputMode::Confirm,
        }
    }

    pub fn selected_report(&self) -> Option<&Report> {
        self.browser.reports().get(self.selected)
    }

    /// Viewer page of the highlighted report.
    pub fn selected_viewer_url(&self) -> Option<Url> {
        let report = self.selected_report()?;
        viewer_url(self.ctx.config.viewer_base(), &report.project, &report.id).ok()
    }

    /// Handle an action and update state accordingly.
    pub fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.running = false;
            return;
        }
        match self.input_mode() {
            InputMode::Browse => self.handle_browse_action(action),
            InputMode::Text => self.handle_text_action(action),
            InputMode::Confirm => self.handle_confirm_action(action),
        }
    }

    fn handle_browse_action(&mut self, action: Action) {
        match action {
            Action::Up => self.selected = self.selected.saturating_sub(1),
            Action::Down => {
                if self.selected + 1 < self.browser.reports().len() {
                    self.selected += 1;
                }
            }
            Action::Refresh => self.spawn_reload(ReloadReason::Manual),
            Action::NextProject => self.next_project(),
            Action::ChooseFile => {
                if !self.upload.is_loading() {
                    self.mode = Mode::ChooseFile {
                        input: String::new(),
                    };
                }
            }
            Action::Upload => self.submit_upload(),
            Action::Delete => {
                if let Some(id) = self.selected_report().map(|r| r.id.clone()) {
                    self.mode = Mode::ConfirmDelete(PendingDelete::new(id));
                }
            }
            Action::Open => self.open_selected(),
            _ => {}
        }
    }

    fn handle_text_action(&mut self, action: Action) {
        let Mode::ChooseFile { input } = &mut self.mode else {
            return;
        };
        match action {
            Action::Input(c) => input.push(c),
            Action::Backspace => {
                input.pop();
            }
            Action::Accept => {
                let path = std::mem::take(input);
                self.mode = Mode::Browse;
                self.choose_file(path.trim());
            }
            Action::Cancel => self.mode = Mode::Browse,
            _ => {}
        }
    }

    /// Only an explicit confirm lets the delete through; anything else
    /// dismisses the prompt.
    fn handle_confirm_action(&mut self, action: Action) {
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        if let (Mode::ConfirmDelete(pending), Action::Confirm) = (mode, action) {
            self.spawn_delete(pending.confirm());
        }
    }

    /// Apply the outcome of background work.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ReloadRequested { reason } => self.spawn_reload(reason),
            AppEvent::ReportsLoaded { generation, result } => {
                match self.browser.apply_reload(generation, result) {
                    ReloadOutcome::Applied => {
                        let len = self.browser.reports().len();
                        self.selected = self.selected.min(len.saturating_sub(1));
                        self.status = None;
                    }
                    // The load error takes over the footer.
                    ReloadOutcome::Failed => self.status = None,
                    ReloadOutcome::Stale => {}
                }
            }
            AppEvent::UploadFinished(result) => {
                if let UploadOutcome::Accepted(_) = self.upload.finish(result) {
                    self.refresh.schedule();
                }
            }
            AppEvent::DeleteFinished { id, result } => match result {
                Ok(()) => {
                    tracing::info!(report = %id, "Report deleted");
                    self.status = None;
                    self.spawn_reload(ReloadReason::AfterDelete);
                }
                Err(e) => {
                    tracing::warn!(report = %id, error = %e, "Delete failed");
                    self.status = Some(Status::Error("Delete failed".to_string()));
                }
            },
        }
    }

    fn next_project(&mut self) {
        let next = self.browser.next_project().to_string();
        match self.browser.select_project(&next) {
            Ok(Some(ticket)) => {
                self.selected = 0;
                self.spawn_fetch(ticket, ReloadReason::ProjectChanged);
            }
            Ok(None) => {}
            Err(e) => self.status = Some(Status::Error(e.to_string())),
        }
    }

    fn choose_file(&mut self, path: &str) {
        if path.is_empty() {
            self.upload.clear_file();
            return;
        }
        let path = PathBuf::from(path);
        if !path.is_file() {
            self.status = Some(Status::Error(format!("No such file: {}", path.display())));
            return;
        }
        self.status = None;
        self.upload.select_file(path);
    }

    fn submit_upload(&mut self) {
        let Some(intent) = self.upload.submit(self.browser.project()) else {
            return;
        };
        let api = self.ctx.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.upload(&intent).await;
            let _ = events.send(AppEvent::UploadFinished(result));
        });
    }

    fn spawn_reload(&mut self, reason: ReloadReason) {
        let ticket = self.browser.begin_reload();
        self.spawn_fetch(ticket, reason);
    }

    fn spawn_fetch(&mut self, ticket: ReloadTicket, reason: ReloadReason) {
        tracing::debug!(generation = ticket.generation, ?reason, "Reloading reports");
        let api = self.ctx.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Some(result) = ticket.fetch(api.as_ref()).await {
                let _ = events.send(AppEvent::ReportsLoaded {
                    generation: ticket.generation,
                    result,
                });
            }
        });
    }

    fn spawn_delete(&mut self, delete: ConfirmedDelete) {
        let api = self.ctx.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = delete.send(api.as_ref()).await;
            let _ = events.send(AppEvent::DeleteFinished {
                id: delete.id().to_string(),
                result,
            });
        });
    }

    fn open_selected(&mut self) {
        let Some(url) = self.selected_viewer_url() else {
            return;
        };
        self.status = Some(match crate::cli::open_in_browser(&url) {
            Ok(()) => Status::Info(format!("Opened {url}")),
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to launch browser");
                Status::Info(format!("Open {url} in a browser"))
            }
        });
    }
}
