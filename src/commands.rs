//! CLI command definitions
//!
//! Defines the clap commands for the SUT harness CLI.

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Load the SUT properties and print them (passwords masked)
    Config {
        /// Properties file (default: $SUT_PROPERTIES, settings file, ./run.properties)
        #[arg(long)]
        properties: Option<PathBuf>,
    },

    /// Resolve a project folder for a working directory
    Resolve {
        /// Folder to resolve
        #[arg(value_enum)]
        folder: FolderKind,

        /// Absolute path to resolve from (default: current directory)
        path: Option<String>,
    },

    /// Capture a screenshot from a running WebDriver session
    Capture {
        /// WebDriver session id
        session_id: String,

        /// Name of the screenshot (sanitized into the file name)
        #[arg(long, default_value = "manual")]
        name: String,

        /// WebDriver server URL (default: from settings)
        #[arg(long)]
        url: Option<String>,

        /// Screenshot directory (default: from settings)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Replay recorded lifecycle events through the outcome observer
    Replay {
        /// YAML file with a list of events
        events: PathBuf,

        /// WebDriver session id used for failure screenshots
        #[arg(long)]
        session: Option<String>,

        /// WebDriver server URL (default: from settings)
        #[arg(long)]
        url: Option<String>,

        /// Screenshot directory (default: from settings)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Project folders known to the path resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FolderKind {
    /// Driver binaries
    Lib,
    /// Test definition data
    TestData,
}
