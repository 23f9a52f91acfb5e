//! Delayed reload after an accepted upload.
//!
//! The server does not announce when an uploaded archive has been turned
//! into a report, so the list is refreshed once after a fixed delay. The
//! request goes out on the shared event channel rather than calling into
//! the browser directly.

use std::time::Duration;

use crate::core::events::{AppEvent, EventSender, ReloadReason};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(2000);

#[derive(Clone)]
pub struct RefreshScheduler {
    delay: Duration,
    events: EventSender,
}

impl RefreshScheduler {
    pub fn new(delay: Duration, events: EventSender) -> Self {
        Self { delay, events }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Post exactly one `ReloadRequested` after the delay.
    pub fn schedule(&self) -> tokio::task::JoinHandle<()> {
        let delay = self.delay;
        let events = self.events.clone();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Scheduling reload");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(AppEvent::ReloadRequested {
                reason: ReloadReason::AfterUpload,
            });
        })
    }
}
