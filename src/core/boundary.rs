//! Render-fault containment.
//!
//! An [`ErrorBoundary`] wraps one region of the UI. The region's render code
//! runs under `catch_unwind`; the first panic latches the boundary into its
//! errored state, is reported to a [`DiagnosticSink`], and from then on the
//! caller draws a fallback instead of the region. There is no reset: a
//! restart of the application is the only way back.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub const FALLBACK_TITLE: &str = "Something went wrong.";
pub const FALLBACK_HINT: &str = "Please restart allure-lite or contact support.";

/// A captured render fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub region: String,
    pub message: String,
}

/// Where boundaries report faults.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, fault: &Fault);
}

/// Default sink: an error event on the `tracing` subscriber.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, fault: &Fault) {
        tracing::error!(region = %fault.region, error = %fault.message, "ErrorBoundary caught an error");
    }
}

pub struct ErrorBoundary {
    region: String,
    fault: Option<Fault>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ErrorBoundary {
    pub fn new(region: impl Into<String>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            region: region.into(),
            fault: None,
            sink,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.fault.is_some()
    }

    /// Run `f` unless the boundary has already tripped.
    ///
    /// Returns `None` when the caller should draw the fallback: either `f`
    /// panicked just now or an earlier call did.
    pub fn guard<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
        if self.fault.is_some() {
            return None;
        }
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let fault = Fault {
                    region: self.region.clone(),
                    message: panic_message(payload.as_ref()),
                };
                self.sink.report(&fault);
                self.fault = Some(fault);
                None
            }
        }
    }
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<Fault>>);

    impl DiagnosticSink for RecordingSink {
        fn report(&self, fault: &Fault) {
            self.0.lock().unwrap().push(fault.clone());
        }
    }

    fn boundary(sink: &Arc<RecordingSink>) -> ErrorBoundary {
        ErrorBoundary::new("reports", sink.clone())
    }

    #[test]
    fn passes_through_when_healthy() {
        let sink = Arc::new(RecordingSink::default());
        let mut b = boundary(&sink);
        assert_eq!(b.guard(|| 42), Some(42));
        assert_eq!(b.guard(|| 7), Some(7));
        assert!(!b.has_error());
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn first_fault_latches_and_is_reported_once() {
        let sink = Arc::new(RecordingSink::default());
        let mut b = boundary(&sink);

        let result: Option<()> = b.guard(|| panic!("bad created_at"));
        assert!(result.is_none());
        assert!(b.has_error());
        assert_eq!(b.fault().unwrap().message, "bad created_at");

        let mut ran = false;
        assert!(b.guard(|| ran = true).is_none());
        assert!(!ran, "errored boundary must not run its region again");

        let faults = sink.0.lock().unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].region, "reports");
    }

    #[test]
    fn sibling_boundaries_are_independent() {
        let sink = Arc::new(RecordingSink::default());
        let mut reports = boundary(&sink);
        let mut upload = ErrorBoundary::new("upload", sink.clone());

        let _: Option<()> = reports.guard(|| panic!("{}", String::from("formatted")));
        assert!(reports.has_error());
        assert_eq!(upload.guard(|| "ok"), Some("ok"));
        assert!(!upload.has_error());
        assert_eq!(reports.fault().unwrap().message, "formatted");
    }
}
