//! Screenshot evidence written to disk

use std::path::PathBuf;

use super::session::SessionHandle;
use crate::common::Result;

/// Prefix of every evidence file name
pub const FILE_PREFIX: &str = "screenshot-";

/// Evidence file extension
pub const FILE_EXTENSION: &str = "png";

/// Replace every character other than ASCII letters, digits, `.` and `-`
/// with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes `screenshot-<name>.png` files into one directory
///
/// Names are not made unique: capturing twice under the same name replaces
/// the earlier file.
#[derive(Debug, Clone)]
pub struct EvidenceCapture {
    directory: PathBuf,
}

impl EvidenceCapture {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path the artifact for `name` is written to
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!(
            "{}{}.{}",
            FILE_PREFIX,
            sanitize_file_name(name),
            FILE_EXTENSION
        ))
    }

    /// Take a screenshot from `session` and store it under `name`
    pub async fn capture(&self, session: &dyn SessionHandle, name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let png = session.capture_png().await?;
        let path = self.artifact_path(name);
        tokio::fs::write(&path, &png).await?;

        tracing::debug!(
            path = %path.display(),
            bytes = png.len(),
            session = %session.describe(),
            "Wrote screenshot"
        );
        Ok(path)
    }
}
