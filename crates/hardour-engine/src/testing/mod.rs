//! Testing utilities for hardour.
//!
//! Provides a call-recording mock host with failure injection, so tests can
//! assert the order in which the runner drives its collaborators.

pub mod mock;

pub use mock::{Call, MockBehavior, MockEngine, MockHandle, MockHost, MockSession, SessionFailure};
