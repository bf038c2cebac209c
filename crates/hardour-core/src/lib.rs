//! # hardour-core
//!
//! Core types for the hardour headless session runner.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other hardour crates. It provides:
//!
//! - Error types and exit statuses
//! - Startup configuration (command-line and YAML file)
//! - Debug flag parsing
//! - The process state machine
//! - `Notifier`, the callback subscription primitive used by collaborators
//! - Severity-tagged diagnostic streams
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other hardour crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod debug;
pub mod diagnostics;
pub mod error;
pub mod notifier;
pub mod state;

pub use config::{EngineSettings, FileConfig, LoggingSettings, StartupConfig};
pub use debug::{DebugFlag, DebugFlags};
pub use diagnostics::{DiagnosticStreams, Severity};
pub use error::{Error, Result, EXIT_FAILURE, EXIT_SUCCESS};
pub use notifier::{Connection, ConnectionList, Notifier};
pub use state::ProcessState;

/// Program name used for the version banner and the default client name.
pub const PROGRAM_NAME: &str = "Hardour";

/// File suffix of session state files. Snapshot names are given without it.
pub const STATE_FILE_SUFFIX: &str = ".ardour";
