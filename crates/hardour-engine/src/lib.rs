//! # hardour-engine
//!
//! Collaborator interfaces for the hardour session runner.
//!
//! This crate provides:
//! - The [`Host`], [`AudioEngine`] and [`Session`] traits the runtime drives
//! - Option structs handed to collaborators at each startup step
//! - A dummy backend that needs no audio hardware
//! - A call-recording mock host for tests
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on hardour-core only.
//! Everything behind these traits (DSP, session persistence, driver
//! selection) is outside the runner's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dummy;
pub mod host;
pub mod options;
pub mod testing;

pub use dummy::{DummyEngine, DummyHost, DummySession};
pub use host::{AudioEngine, Host, Session};
pub use options::{EngineOptions, LibraryOptions, SessionOptions, UiAction};
