//! Collaborator traits driven by the startup and shutdown sequencers.
//!
//! The runner owns the engine and session values exclusively; collaborators
//! only reach back into the runner through the notifiers they expose.

use std::path::Path;

use hardour_core::{DiagnosticStreams, Notifier, Result};

use crate::options::{EngineOptions, LibraryOptions, SessionOptions, UiAction};

/// Entry point to an engine implementation.
pub trait Host {
    /// Engine handle type
    type Engine: AudioEngine;
    /// Session handle type
    type Session: Session;

    /// Initialize process-wide library state (locale, plugin formats,
    /// optimized code paths). Called once, before any engine exists.
    fn initialize(&mut self, options: &LibraryOptions) -> Result<()>;

    /// Create the engine handle. Creation itself cannot fail.
    fn create_engine(&mut self) -> Self::Engine;

    /// Construct the session stored in `dir` under `snapshot` and attach it to
    /// the running `engine`.
    ///
    /// Fails with [`hardour_core::Error::Construction`] when the session cannot
    /// be built and [`hardour_core::Error::PortRegistration`] when the engine
    /// cannot allocate a port the session needs.
    fn load_session(
        &mut self,
        engine: &mut Self::Engine,
        dir: &Path,
        snapshot: &str,
        options: &SessionOptions,
    ) -> Result<Self::Session>;

    /// UI action stream (control surfaces, scripted UIs).
    fn ui_actions(&self) -> &Notifier<UiAction>;

    /// Severity-tagged diagnostic streams published by every collaborator.
    fn diagnostics(&self) -> &DiagnosticStreams;
}

/// Connection to an audio/MIDI backend.
pub trait AudioEngine {
    /// Bind the named backend under `client_name`.
    fn set_backend(
        &mut self,
        backend: &str,
        client_name: &str,
        options: &EngineOptions,
    ) -> Result<()>;

    /// Start the bound backend.
    fn start(&mut self) -> Result<()>;

    /// Whether the backend is running.
    fn is_running(&self) -> bool;

    /// Emitted from a backend thread when the backend stops on its own. The
    /// payload is the reason, possibly empty.
    fn halted(&self) -> &Notifier<String>;

    /// Detach the current session, if any.
    fn remove_session(&mut self);

    /// Stop the backend.
    fn stop(&mut self) -> Result<()>;

    /// Release the engine and any process-wide engine state.
    fn destroy(self);
}

/// A loaded project.
pub trait Session {
    /// Snapshot name the session was loaded from.
    fn name(&self) -> &str;

    /// Ask the transport to roll at `speed` (1.0 is normal playback).
    fn request_transport_speed(&mut self, speed: f64);

    /// Tear the session down. The engine must no longer reference it.
    fn destroy(self);
}
