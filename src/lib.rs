//! SUT Harness - test-execution support for end-to-end GUI/API suites
//!
//! Loads the configuration of the system under test once per process and
//! observes test outcomes, keeping a screenshot of the automation session
//! whenever a GUI-driven test fails.

pub mod cli;
pub mod commands;
pub mod common;
pub mod observer;
pub mod sut;
pub mod webdriver;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use observer::{LifecycleEvent, Observation, OutcomeObserver, SessionHandle, TestContext};
pub use sut::ConfigStore;
