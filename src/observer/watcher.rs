//! Outcome observer: logs every terminal outcome, captures evidence on failure

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::event::{LifecycleEvent, Outcome, TestContext};
use super::evidence::{sanitize_file_name, EvidenceCapture};
use super::session::SharedSession;
use crate::common::Error;

/// Reason logged when a disabled test carries none
pub const DEFAULT_DISABLED_REASON: &str = "No reason";

/// What the observer did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Outcome logged, no capture attempted
    Logged,
    /// Failure logged and screenshot written
    Captured(PathBuf),
    /// Failure logged, screenshot could not be taken
    CaptureFailed(String),
}

impl Observation {
    pub fn artifact(&self) -> Option<&PathBuf> {
        match self {
            Observation::Captured(path) => Some(path),
            _ => None,
        }
    }
}

/// Reacts to terminal test outcomes
///
/// Holds an optional session reference. A failure reported with a session
/// fills the reference if it is still empty; an already set session is never
/// replaced. Capture problems are logged and swallowed so they can't mask the
/// test failure itself.
pub struct OutcomeObserver {
    session: Mutex<Option<SharedSession>>,
    evidence: EvidenceCapture,
}

impl OutcomeObserver {
    /// Create an observer writing screenshots into `directory`
    pub fn new(session: Option<SharedSession>, directory: impl Into<PathBuf>) -> Self {
        Self {
            session: Mutex::new(session),
            evidence: EvidenceCapture::new(directory),
        }
    }

    pub fn has_session(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Adopt `candidate` if no session is set yet; returns the session in use
    pub fn ensure_session(&self, candidate: Option<SharedSession>) -> Option<SharedSession> {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            if let Some(candidate) = candidate {
                tracing::debug!(session = %candidate.describe(), "Adopting session from failure report");
                *slot = Some(candidate);
            }
        }
        slot.clone()
    }

    /// Handle one terminal event
    pub async fn observe(&self, event: LifecycleEvent) -> Observation {
        let LifecycleEvent {
            context,
            outcome,
            session,
        } = event;

        match outcome {
            Outcome::Aborted { cause } => {
                tracing::info!(
                    test_id = %context.unique_id,
                    cause = cause.as_deref().unwrap_or("unknown"),
                    "Test aborted"
                );
                Observation::Logged
            }
            Outcome::Disabled { reason } => {
                tracing::info!(
                    test_id = %context.unique_id,
                    reason = reason.as_deref().unwrap_or(DEFAULT_DISABLED_REASON),
                    "Test disabled"
                );
                Observation::Logged
            }
            Outcome::Failed { cause } => {
                let observation = self.capture_failure(&context, session).await;
                tracing::info!(
                    test = %context.display_name,
                    cause = cause.as_deref().unwrap_or(""),
                    "TEST END (FAILED)"
                );
                observation
            }
            Outcome::Succeeded => {
                tracing::info!(test = %context.display_name, "TEST END (PASSED)");
                Observation::Logged
            }
        }
    }

    /// Handle events in order
    pub async fn observe_all<I>(&self, events: I) -> Vec<Observation>
    where
        I: IntoIterator<Item = LifecycleEvent>,
    {
        let mut observations = Vec::new();
        for event in events {
            observations.push(self.observe(event).await);
        }
        observations
    }

    async fn capture_failure(
        &self,
        context: &TestContext,
        candidate: Option<SharedSession>,
    ) -> Observation {
        let name = sanitize_file_name(&context.display_name);

        let result = match self.ensure_session(candidate) {
            Some(session) => self.evidence.capture(session.as_ref(), &name).await,
            None => Err(Error::NoSession),
        };

        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Screenshot saved");
                Observation::Captured(path)
            }
            Err(e) => {
                tracing::warn!(test_id = %context.unique_id, error = %e, "Screenshot failed");
                Observation::CaptureFailed(e.to_string())
            }
        }
    }
}
