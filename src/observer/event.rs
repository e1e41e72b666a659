//! Terminal lifecycle events reported by the test engine

use serde::{Deserialize, Serialize};
use std::fmt;

use super::session::SharedSession;

/// Identity of a test case as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestContext {
    /// Opaque engine identifier (e.g. `[engine:x]/[class:Login]/[method:ok]`)
    pub unique_id: String,
    /// Human readable name; used to name evidence files
    pub display_name: String,
}

impl TestContext {
    pub fn new(unique_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Terminal state of a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed {
        #[serde(default)]
        cause: Option<String>,
    },
    Aborted {
        #[serde(default)]
        cause: Option<String>,
    },
    Disabled {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl Outcome {
    /// Only failures produce evidence
    pub fn captures_evidence(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::Failed { .. } => write!(f, "failed"),
            Outcome::Aborted { .. } => write!(f, "aborted"),
            Outcome::Disabled { .. } => write!(f, "disabled"),
        }
    }
}

/// A test case reaching its terminal state
///
/// `session` is the automation session the engine had at hand when it
/// reported the outcome, if any. It is only consulted for failures.
#[derive(Clone, Deserialize)]
pub struct LifecycleEvent {
    #[serde(flatten)]
    pub context: TestContext,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip)]
    pub session: Option<SharedSession>,
}

impl LifecycleEvent {
    pub fn new(context: TestContext, outcome: Outcome) -> Self {
        Self {
            context,
            outcome,
            session: None,
        }
    }

    pub fn succeeded(context: TestContext) -> Self {
        Self::new(context, Outcome::Succeeded)
    }

    pub fn failed(context: TestContext, cause: Option<String>) -> Self {
        Self::new(context, Outcome::Failed { cause })
    }

    pub fn aborted(context: TestContext, cause: Option<String>) -> Self {
        Self::new(context, Outcome::Aborted { cause })
    }

    pub fn disabled(context: TestContext, reason: Option<String>) -> Self {
        Self::new(context, Outcome::Disabled { reason })
    }

    /// Attach the session the engine reported alongside the outcome
    pub fn with_session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("context", &self.context)
            .field("outcome", &self.outcome)
            .field("session", &self.session.as_ref().map(|s| s.describe()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_failures_capture() {
        assert!(Outcome::Failed { cause: None }.captures_evidence());
        assert!(!Outcome::Succeeded.captures_evidence());
        assert!(!Outcome::Aborted { cause: None }.captures_evidence());
        assert!(!Outcome::Disabled { reason: None }.captures_evidence());
    }

    #[test]
    fn test_deserialize_recorded_events() {
        let yaml = r#"
- unique_id: "[class:Login]/[method:ok]"
  display_name: "Login ok"
  outcome: succeeded
- unique_id: "[class:Login]/[method:bad]"
  display_name: "Login bad #2"
  outcome: failed
  cause: "element not found"
- unique_id: "[class:Search]/[method:slow]"
  display_name: "Search slow"
  outcome: disabled
"#;
        let events: Vec<LifecycleEvent> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].outcome, Outcome::Succeeded);
        assert_eq!(events[1].context.display_name, "Login bad #2");
        assert_eq!(
            events[1].outcome,
            Outcome::Failed {
                cause: Some("element not found".to_string())
            }
        );
        assert_eq!(events[2].outcome, Outcome::Disabled { reason: None });
        assert!(events.iter().all(|e| e.session.is_none()));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Aborted { cause: None }.to_string(), "aborted");
        assert_eq!(Outcome::Succeeded.to_string(), "succeeded");
    }
}
