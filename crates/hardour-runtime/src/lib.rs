//! # hardour-runtime
//!
//! Process lifecycle for the hardour session runner.
//!
//! This crate provides:
//! - The termination channel every wake source delivers to
//! - The diagnostic listener forwarding collaborator messages to stdio
//! - The startup and shutdown sequencers
//! - OS signal installation and wake-source wiring
//! - [`run_process`], which ties them together
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on hardour-core and
//! hardour-engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod context;
pub mod listener;
pub mod process;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod wake;

pub use channel::TerminationChannel;
pub use context::ProcessContext;
pub use listener::DiagnosticListener;
pub use process::{run_process, wait_for_wake};
pub use shutdown::shutdown;
pub use startup::{normalize_snapshot, Running, StartupError, StartupSequencer};
pub use wake::WakeSource;
