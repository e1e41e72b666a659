//! CLI command handling
//!
//! Dispatches CLI commands to the library and formats output.

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::commands::{Commands, FolderKind};
use crate::common::config::Settings;
use crate::common::{paths, Error, Result};
use crate::observer::{EvidenceCapture, LifecycleEvent, Observation, OutcomeObserver, SharedSession};
use crate::sut::{self, ConfigStore};
use crate::webdriver::WebDriverSession;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Config { properties } => {
            let store = ConfigStore::new(properties_source(properties, settings));
            let config = store.snapshot()?;

            println!(
                "{} {}",
                "SUT properties:".blue().bold(),
                store.source().display()
            );
            for (key, value) in config.redacted() {
                println!("  {:<34} {}", key, value);
            }
            Ok(())
        }

        Commands::Resolve { folder, path } => {
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?.to_string_lossy().into_owned(),
            };
            let resolved = match folder {
                FolderKind::Lib => paths::lib_folder(&path),
                FolderKind::TestData => paths::test_data_folder(&path),
            };
            println!("{}", resolved);
            Ok(())
        }

        Commands::Capture {
            session_id,
            name,
            url,
            dir,
        } => {
            let session = webdriver_session(settings, url, session_id)?;
            let capture = EvidenceCapture::new(dir.unwrap_or_else(|| settings.evidence.directory.clone()));
            let path = capture.capture(&session, &name).await?;
            println!("{} {}", "✓".green(), path.display());
            Ok(())
        }

        Commands::Replay {
            events,
            session,
            url,
            dir,
        } => {
            let session: Option<SharedSession> = match session {
                Some(id) => Some(Arc::new(webdriver_session(settings, url, id)?) as SharedSession),
                None => None,
            };
            let dir = dir.unwrap_or_else(|| settings.evidence.directory.clone());
            replay(&events, session, dir).await
        }
    }
}

/// Properties file for the `config` command
///
/// An explicit path wins over the regular lookup.
fn properties_source(explicit: Option<PathBuf>, settings: &Settings) -> PathBuf {
    explicit.unwrap_or_else(|| sut::source_for(settings))
}

fn webdriver_session(
    settings: &Settings,
    url: Option<String>,
    session_id: String,
) -> Result<WebDriverSession> {
    match url {
        Some(url) => WebDriverSession::new(
            url,
            session_id,
            Duration::from_secs(settings.webdriver.timeout_secs),
        ),
        None => WebDriverSession::from_settings(&settings.webdriver, session_id),
    }
}

async fn replay(events_path: &Path, session: Option<SharedSession>, dir: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(events_path).map_err(|e| Error::FileRead {
        path: events_path.display().to_string(),
        error: e.to_string(),
    })?;
    let events: Vec<LifecycleEvent> = serde_yaml::from_str(&content)?;

    println!(
        "\n{} {} ({} events)",
        "Replaying:".blue().bold(),
        events_path.display(),
        events.len()
    );

    let observer = OutcomeObserver::new(session, dir);
    let mut captured = 0;
    let mut failed_captures = 0;

    for event in events {
        let label = format!("{} [{}]", event.context.display_name, event.outcome);
        match observer.observe(event).await {
            Observation::Logged => println!("  {} {}", "·".dimmed(), label),
            Observation::Captured(path) => {
                captured += 1;
                println!("  {} {} -> {}", "✓".green(), label, path.display());
            }
            Observation::CaptureFailed(reason) => {
                failed_captures += 1;
                println!("  {} {} ({})", "✗".red(), label, reason.dimmed());
            }
        }
    }

    println!(
        "\n{} screenshots saved, {} failed",
        captured.to_string().green().bold(),
        failed_captures.to_string().red()
    );
    Ok(())
}
