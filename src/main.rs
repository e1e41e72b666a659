//! SUT harness CLI
//!
//! Operator commands around the test-execution support library: inspect the
//! SUT configuration, resolve project folders, take screenshots from a live
//! WebDriver session and replay recorded test outcomes.

use clap::Parser;
use std::path::PathBuf;

use sut_harness::commands::Commands;
use sut_harness::common::config::Settings;
use sut_harness::{cli, common::logging};

#[derive(Parser)]
#[command(name = "sut-harness", about = "Test-execution support for end-to-end suites")]
#[command(version, long_about = None)]
struct Cli {
    /// Harness settings file (default: platform config dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let _guard = match &settings.logging.file_dir {
        Some(dir) => logging::init_with_file(dir).map(|(_, guard)| guard),
        None => {
            logging::init_cli();
            None
        }
    };

    if let Err(e) = cli::dispatch(cli.command, &settings).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
