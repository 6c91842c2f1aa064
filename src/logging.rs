//! Debug-level diagnostics emitted while criteria are evaluated.
//!
//! The evaluator never logs through a global; it is handed an
//! `Arc<dyn DebugSink>` when it is built. [`TracingSink`] forwards events to
//! `tracing`, [`NoopSink`] drops them.

use std::fmt::{self, Display};

use crate::error::Violation;
use crate::path::FieldPath;

/// Something worth a debug line during evaluation.
#[derive(Debug, Clone, Copy)]
pub enum EvalEvent<'a> {
    /// A request section is about to be evaluated.
    SectionStarted { section: &'a str },
    /// A field path was resolved against its scope.
    FieldResolved { path: &'a FieldPath, present: bool },
    /// Evaluation descended into nested criteria.
    Descended { path: &'a FieldPath, depth: usize },
    /// Evaluation stopped at a violation.
    Rejected { violation: &'a Violation },
    /// A section passed.
    SectionPassed { section: &'a str },
}

impl Display for EvalEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalEvent::SectionStarted { section } => write!(f, "validating section {}", section),
            EvalEvent::FieldResolved { path, present } => {
                write!(f, "resolved {} (present: {})", path, present)
            }
            EvalEvent::Descended { path, depth } => {
                write!(f, "descending into {} at depth {}", path, depth)
            }
            EvalEvent::Rejected { violation } => write!(f, "rejected: {}", violation),
            EvalEvent::SectionPassed { section } => write!(f, "section {} passed", section),
        }
    }
}

/// A debug-level sink for evaluation events.
pub trait DebugSink: Send + Sync {
    /// Records one event.
    fn debug(&self, event: &EvalEvent<'_>);
}

/// Forwards events to `tracing` at debug level under the `reqguard` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn debug(&self, event: &EvalEvent<'_>) {
        match event {
            EvalEvent::SectionStarted { section } => {
                tracing::debug!(target: "reqguard", section = %section, "validating section");
            }
            EvalEvent::FieldResolved { path, present } => {
                tracing::debug!(target: "reqguard", path = %path, present, "field resolved");
            }
            EvalEvent::Descended { path, depth } => {
                tracing::debug!(target: "reqguard", path = %path, depth, "descending into nested criteria");
            }
            EvalEvent::Rejected { violation } => {
                tracing::debug!(
                    target: "reqguard",
                    path = %violation.path,
                    code = violation.code(),
                    message = %violation.message,
                    "request rejected"
                );
            }
            EvalEvent::SectionPassed { section } => {
                tracing::debug!(target: "reqguard", section = %section, "section passed");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn debug(&self, _event: &EvalEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let path = FieldPath::parse("body.address").unwrap();
        let event = EvalEvent::Descended {
            path: &path,
            depth: 2,
        };
        assert_eq!(event.to_string(), "descending into body.address at depth 2");

        let violation = Violation::missing(path.join(&FieldPath::from_field("city")));
        let event = EvalEvent::Rejected {
            violation: &violation,
        };
        assert!(event.to_string().contains("body.address.city is required"));
    }

    #[test]
    fn test_sinks_accept_events() {
        let event = EvalEvent::SectionStarted { section: "body" };
        TracingSink.debug(&event);
        NoopSink.debug(&event);
    }
}
