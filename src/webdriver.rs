//! W3C WebDriver session handle
//!
//! Talks to an already running session on a WebDriver server (chromedriver,
//! Selenium Grid, ...). Only the screenshot endpoint is used.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::time::Duration;

use crate::common::config::WebDriverSettings;
use crate::common::{Error, Result};
use crate::observer::SessionHandle;

/// Response envelope of every WebDriver command
#[derive(Deserialize)]
struct WireResponse {
    value: serde_json::Value,
}

/// Error payload inside `value`
#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// Handle to an existing WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Attach to `session_id` on the server at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sut-harness/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        })
    }

    /// Attach using the configured server
    pub fn from_settings(settings: &WebDriverSettings, session_id: impl Into<String>) -> Result<Self> {
        Self::new(
            settings.url.clone(),
            session_id,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn screenshot_url(&self) -> String {
        format!("{}/session/{}/screenshot", self.base_url, self.session_id)
    }
}

#[async_trait]
impl SessionHandle for WebDriverSession {
    async fn capture_png(&self) -> Result<Vec<u8>> {
        let url = self.screenshot_url();
        tracing::debug!(%url, "Requesting screenshot");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        decode_screenshot(&body).map_err(|e| match e {
            Error::Json(_) if !status.is_success() => {
                Error::Driver(format!("Screenshot request failed with status {}", status))
            }
            other => other,
        })
    }

    fn describe(&self) -> String {
        format!("webdriver:{}", self.session_id)
    }
}

/// Decode the PNG from a screenshot response body
fn decode_screenshot(body: &[u8]) -> Result<Vec<u8>> {
    let response: WireResponse = serde_json::from_slice(body)?;

    match response.value {
        serde_json::Value::String(encoded) => {
            let compact: String = encoded.split_whitespace().collect();
            STANDARD
                .decode(compact)
                .map_err(|e| Error::Driver(format!("Invalid screenshot encoding: {}", e)))
        }
        value @ serde_json::Value::Object(_) => {
            let err: WireError = serde_json::from_value(value)?;
            Err(Error::Driver(if err.message.is_empty() {
                err.error
            } else {
                format!("{}: {}", err.error, err.message)
            }))
        }
        other => Err(Error::Driver(format!("Unexpected screenshot payload: {}", other))),
    }
}
