//! Report list state for the active project.
//!
//! The browser owns the authoritative list and the project selection. Every
//! reload is tagged with a generation number and a cancellation token:
//! starting a new reload cancels the previous one, and a response that is
//! not from the latest generation is dropped. The list is only ever replaced
//! wholesale by a successful response.

use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, ReportApi};
use crate::core::models::Report;

/// Prompt shown before a report is deleted.
pub const DELETE_PROMPT: &str = "Delete report?";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("unknown project `{0}`")]
    UnknownProject(String),
}

/// A started reload. Hand it to [`ReloadTicket::fetch`] and feed the result
/// back through [`ReportBrowser::apply_reload`].
#[derive(Debug, Clone)]
pub struct ReloadTicket {
    pub generation: u64,
    pub project: String,
    cancel: CancellationToken,
}

impl ReloadTicket {
    /// Run the listing request. Returns `None` if a newer reload cancelled
    /// this one before the response arrived.
    pub async fn fetch(&self, api: &dyn ReportApi) -> Option<Result<Vec<Report>, ApiError>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(generation = self.generation, "Reload cancelled");
                None
            }
            result = api.list_reports(&self.project) => Some(result),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// What happened to a reload response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The list was replaced.
    Applied,
    /// A newer reload had already started; the response was dropped.
    Stale,
    /// The request failed; the previous list is kept.
    Failed,
}

/// A delete that still needs the user's consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    id: String,
}

/// A delete the user agreed to. Only this reaches the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
    id: String,
}

impl PendingDelete {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &'static str {
        DELETE_PROMPT
    }

    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete { id: self.id }
    }
}

impl ConfirmedDelete {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issue the delete request.
    pub async fn send(&self, api: &dyn ReportApi) -> Result<(), ApiError> {
        tracing::info!(report = %self.id, "Deleting report");
        api.delete_report(&self.id).await
    }
}

pub struct ReportBrowser {
    projects: Vec<String>,
    project: String,
    reports: Vec<Report>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    last_error: Option<String>,
}

impl ReportBrowser {
    /// Create a browser over a fixed set of projects, starting on `project`.
    pub fn new(projects: Vec<String>, project: impl Into<String>) -> Result<Self, BrowserError> {
        let project = project.into();
        if !projects.contains(&project) {
            return Err(BrowserError::UnknownProject(project));
        }
        Ok(Self {
            projects,
            project,
            reports: Vec::new(),
            generation: 0,
            in_flight: None,
            last_error: None,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Switch to another project. Returns the reload the switch implies, or
    /// `None` if `id` is already active.
    pub fn select_project(&mut self, id: &str) -> Result<Option<ReloadTicket>, BrowserError> {
        if !self.projects.iter().any(|p| p == id) {
            return Err(BrowserError::UnknownProject(id.to_string()));
        }
        if self.project == id {
            return Ok(None);
        }
        tracing::info!(project = id, "Selected project");
        self.project = id.to_string();
        Ok(Some(self.begin_reload()))
    }

    /// The project after the active one, wrapping around.
    pub fn next_project(&self) -> &str {
        let idx = self
            .projects
            .iter()
            .position(|p| *p == self.project)
            .unwrap_or(0);
        &self.projects[(idx + 1) % self.projects.len()]
    }

    /// Start a reload of the active project, superseding any reload in flight.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        ReloadTicket {
            generation: self.generation,
            project: self.project.clone(),
            cancel,
        }
    }

    /// Apply the response of the reload tagged `generation`.
    pub fn apply_reload(
        &mut self,
        generation: u64,
        result: Result<Vec<Report>, ApiError>,
    ) -> ReloadOutcome {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "Dropping stale report listing"
            );
            return ReloadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(reports) => {
                tracing::debug!(project = %self.project, count = reports.len(), "Reports loaded");
                self.reports = reports;
                self.last_error = None;
                ReloadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(project = %self.project, error = %e, "Failed to load reports");
                self.last_error = Some(format!("Failed to load reports: {}", e));
                ReloadOutcome::Failed
            }
        }
    }

    /// Reload and wait for the result.
    pub async fn reload(&mut self, api: &dyn ReportApi) -> ReloadOutcome {
        let ticket = self.begin_reload();
        match ticket.fetch(api).await {
            Some(result) => self.apply_reload(ticket.generation, result),
            None => ReloadOutcome::Stale,
        }
    }

    /// Run a confirmed delete, reloading only if the server accepted it.
    pub async fn delete_report(
        &mut self,
        api: &dyn ReportApi,
        delete: ConfirmedDelete,
    ) -> Result<ReloadOutcome, ApiError> {
        delete.send(api).await?;
        Ok(self.reload(api).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockApi, report};
    use reqwest::StatusCode;

    fn browser() -> ReportBrowser {
        ReportBrowser::new(vec!["demo".to_string(), "web".to_string()], "demo").unwrap()
    }

    #[test]
    fn new_rejects_project_outside_option_set() {
        let err = ReportBrowser::new(vec!["demo".to_string()], "other").err();
        assert_eq!(err, Some(BrowserError::UnknownProject("other".to_string())));
    }

    #[tokio::test]
    async fn reload_replaces_whole_list() {
        let api = MockApi::with_reports("demo", vec![report("a", "demo"), report("b", "demo")]);
        let mut b = browser();

        assert_eq!(b.reload(&api).await, ReloadOutcome::Applied);
        assert_eq!(b.reports().len(), 2);

        api.set_reports("demo", vec![report("c", "demo")]);
        assert_eq!(b.reload(&api).await, ReloadOutcome::Applied);
        let ids: Vec<_> = b.reports().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c"]);

        api.set_reports("demo", vec![]);
        b.reload(&api).await;
        assert!(b.reports().is_empty());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_list() {
        let api = MockApi::with_reports("demo", vec![report("a", "demo")]);
        let mut b = browser();
        b.reload(&api).await;

        api.fail_list
            .lock()
            .unwrap()
            .push_back(StatusCode::INTERNAL_SERVER_ERROR);
        api.set_reports("demo", vec![]);

        assert_eq!(b.reload(&api).await, ReloadOutcome::Failed);
        assert_eq!(b.reports().len(), 1);
        assert!(b.last_error().unwrap().starts_with("Failed to load reports"));
        assert!(!b.is_loading());

        assert_eq!(b.reload(&api).await, ReloadOutcome::Applied);
        assert!(b.last_error().is_none());
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut b = browser();
        let first = b.begin_reload();
        let second = b.begin_reload();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        let outcome = b.apply_reload(second.generation, Ok(vec![report("new", "demo")]));
        assert_eq!(outcome, ReloadOutcome::Applied);

        let outcome = b.apply_reload(first.generation, Ok(vec![report("old", "demo")]));
        assert_eq!(outcome, ReloadOutcome::Stale);
        assert_eq!(b.reports()[0].id, "new");
    }

    #[tokio::test]
    async fn cancelled_ticket_does_not_fetch_result() {
        let api = MockApi::default();
        let mut b = browser();
        let first = b.begin_reload();
        let _second = b.begin_reload();
        assert!(first.fetch(&api).await.is_none());
    }

    #[test]
    fn select_project_validates_and_reloads() {
        let mut b = browser();
        assert_eq!(
            b.select_project("nope").unwrap_err(),
            BrowserError::UnknownProject("nope".to_string())
        );
        assert!(b.select_project("demo").unwrap().is_none());

        let ticket = b.select_project("web").unwrap().unwrap();
        assert_eq!(ticket.project, "web");
        assert_eq!(b.project(), "web");
        assert!(b.is_loading());
    }

    #[test]
    fn next_project_wraps() {
        let mut b = browser();
        assert_eq!(b.next_project(), "web");
        b.select_project("web").unwrap();
        assert_eq!(b.next_project(), "demo");
    }

    #[tokio::test]
    async fn response_for_abandoned_project_is_dropped() {
        let api = MockApi::with_reports("demo", vec![report("d", "demo")]);
        let mut b = browser();
        let demo = b.begin_reload();
        let result = demo.fetch(&api).await;

        b.select_project("web").unwrap();
        assert!(demo.is_cancelled());
        assert_eq!(b.apply_reload(demo.generation, result.unwrap()), ReloadOutcome::Stale);
        assert!(b.reports().is_empty());
    }

    #[test]
    fn unconfirmed_delete_never_reaches_api() {
        let api = MockApi::with_reports("demo", vec![report("a", "demo")]);
        let pending = PendingDelete::new("a");
        assert_eq!(pending.prompt(), "Delete report?");
        drop(pending);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_reloads_on_success() {
        let api = MockApi::with_reports("demo", vec![report("a", "demo"), report("b", "demo")]);
        let mut b = browser();
        b.reload(&api).await;

        let outcome = b
            .delete_report(&api, PendingDelete::new("a").confirm())
            .await
            .unwrap();
        assert_eq!(outcome, ReloadOutcome::Applied);
        assert_eq!(b.reports().len(), 1);
        assert_eq!(
            api.calls(),
            [
                Call::List("demo".to_string()),
                Call::Delete("a".to_string()),
                Call::List("demo".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_delete_skips_reload() {
        let api = MockApi::with_reports("demo", vec![report("a", "demo")]);
        *api.fail_delete.lock().unwrap() = Some(StatusCode::NOT_FOUND);
        let mut b = browser();
        b.reload(&api).await;

        let err = b
            .delete_report(&api, PendingDelete::new("a").confirm())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: StatusCode::NOT_FOUND, .. }));
        assert_eq!(b.reports().len(), 1);
        assert_eq!(api.count(|c| matches!(c, Call::List(_))), 1);
    }
}
