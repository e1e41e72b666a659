//! Automation session capability used for evidence capture

use async_trait::async_trait;
use std::sync::Arc;

use crate::common::Result;

/// A live automation session that can render its current visual state
///
/// The observer never creates or closes sessions; it only borrows them to
/// take a screenshot when a test fails.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Capture the current visual state as PNG bytes
    async fn capture_png(&self) -> Result<Vec<u8>>;

    /// Short label for logs
    fn describe(&self) -> String {
        "session".to_string()
    }
}

/// Session reference shared between the engine and observers
pub type SharedSession = Arc<dyn SessionHandle>;
