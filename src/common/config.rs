//! Harness settings file handling
//!
//! These settings describe the harness itself (where evidence goes, which
//! WebDriver server to talk to). The SUT configuration lives in the
//! properties file handled by [`crate::sut`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main settings structure
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    /// SUT properties source
    #[serde(default)]
    pub properties: PropertiesSettings,

    /// Screenshot storage
    #[serde(default)]
    pub evidence: EvidenceSettings,

    /// WebDriver server
    #[serde(default)]
    pub webdriver: WebDriverSettings,

    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Location of the SUT properties file
#[derive(Debug, Deserialize, Default)]
pub struct PropertiesSettings {
    /// Explicit properties file; `run.properties` in the working directory if unset
    pub file: Option<PathBuf>,
}

/// Screenshot storage settings
#[derive(Debug, Deserialize)]
pub struct EvidenceSettings {
    /// Directory receiving `screenshot-*.png` files
    #[serde(default = "default_evidence_dir")]
    pub directory: PathBuf,
}

impl Default for EvidenceSettings {
    fn default() -> Self {
        Self {
            directory: default_evidence_dir(),
        }
    }
}

fn default_evidence_dir() -> PathBuf {
    PathBuf::from("target").join("screenshots")
}

/// WebDriver server settings
#[derive(Debug, Deserialize)]
pub struct WebDriverSettings {
    /// Base URL of the WebDriver server
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_webdriver_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            timeout_secs: default_webdriver_timeout(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_webdriver_timeout() -> u64 {
    30
}

/// Log output settings
#[derive(Debug, Deserialize, Default)]
pub struct LoggingSettings {
    /// Also write logs to `<file_dir>/sut-harness.log`
    pub file_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the default settings file
    ///
    /// Returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::parse("").unwrap();
        assert!(settings.properties.file.is_none());
        assert_eq!(settings.evidence.directory, PathBuf::from("target/screenshots"));
        assert_eq!(settings.webdriver.url, "http://localhost:4444");
        assert_eq!(settings.webdriver.timeout_secs, 30);
        assert!(settings.logging.file_dir.is_none());
    }

    #[test]
    fn test_partial_settings() {
        let settings = Settings::parse(
            r#"
            [properties]
            file = "/etc/sut/run.properties"

            [webdriver]
            url = "http://grid:4444/wd/hub"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.properties.file,
            Some(PathBuf::from("/etc/sut/run.properties"))
        );
        assert_eq!(settings.webdriver.url, "http://grid:4444/wd/hub");
        assert_eq!(settings.webdriver.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_settings() {
        let err = Settings::parse("[evidence]\ndirectory = 5").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::load_from(Path::new("/nonexistent/sut-harness.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::FileRead { .. }));
    }
}
