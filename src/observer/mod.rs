//! Test outcome observation and failure evidence
//!
//! The test engine reports each test case once, when it reaches its terminal
//! state. Every outcome is logged; failures additionally get a screenshot of
//! the automation session stored as `screenshot-<display name>.png`.

mod event;
mod evidence;
mod session;
mod watcher;

pub use event::{LifecycleEvent, Outcome, TestContext};
pub use evidence::{sanitize_file_name, EvidenceCapture, FILE_EXTENSION, FILE_PREFIX};
pub use session::{SessionHandle, SharedSession};
pub use watcher::{Observation, OutcomeObserver, DEFAULT_DISABLED_REASON};
