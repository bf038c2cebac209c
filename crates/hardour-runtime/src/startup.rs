//! Startup sequencer: the ordered, fail-fast walk from an empty process to a
//! rolling transport.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use hardour_core::{Error, ProcessState, EXIT_FAILURE, STATE_FILE_SUFFIX};
use hardour_engine::{
    AudioEngine, EngineOptions, Host, LibraryOptions, Session, SessionOptions,
};

use crate::context::ProcessContext;
use crate::signals;
use crate::wake::{self, WakeSource};

/// Why startup stopped. Every variant is fatal to the process.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The startup configuration was rejected before any step ran
    #[error("{0}")]
    Config(#[source] Error),

    /// Process-wide library initialization failed
    #[error("Hardour failed to initialize: {0}")]
    Initialization(#[source] Error),

    /// The backend could not be bound to the engine
    #[error("Cannot set Audio/MIDI engine backend: {0}")]
    Backend(#[source] Error),

    /// The bound backend did not start
    #[error("Cannot start Audio/MIDI engine: {0}")]
    EngineStart(#[source] Error),

    /// The session could not be constructed or attached
    #[error("{}: {}", .0.tag(), .0)]
    SessionLoad(#[source] Error),

    /// Session loading panicked
    #[error("unknown exception.")]
    SessionPanic,
}

impl StartupError {
    /// State the process reached before the failing step.
    pub fn reached(&self) -> ProcessState {
        match self {
            StartupError::Config(_) | StartupError::Initialization(_) => {
                ProcessState::Uninitialized
            }
            StartupError::Backend(_) => ProcessState::EngineCreated,
            StartupError::EngineStart(_) => ProcessState::BackendBound,
            StartupError::SessionLoad(_) | StartupError::SessionPanic => {
                ProcessState::EngineStarted
            }
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// Engine and session of a process that reached [`ProcessState::Running`].
pub struct Running<H: Host> {
    engine: H::Engine,
    session: H::Session,
}

impl<H: Host> Running<H> {
    /// The running engine.
    pub fn engine(&self) -> &H::Engine {
        &self.engine
    }

    /// The loaded session.
    pub fn session(&self) -> &H::Session {
        &self.session
    }

    /// Split into engine and session.
    pub fn into_parts(self) -> (H::Engine, H::Session) {
        (self.engine, self.session)
    }
}

impl<H: Host> std::fmt::Debug for Running<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Running")
            .field("session", &self.session.name())
            .finish_non_exhaustive()
    }
}

/// Drives a [`Host`] through the startup states.
///
/// Each step runs only if every earlier step succeeded. A failing step is
/// never retried: the error is returned and the engine, if one exists, is
/// dropped without the ordered teardown.
pub struct StartupSequencer<'h, H: Host> {
    host: &'h mut H,
    state: ProcessState,
}

impl<'h, H: Host> StartupSequencer<'h, H> {
    /// Sequencer for `host`, starting from [`ProcessState::Uninitialized`].
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            state: ProcessState::Uninitialized,
        }
    }

    /// Current state.
    pub fn state(&self) -> ProcessState {
        self.state
    }

    fn advance(&mut self, to: ProcessState) {
        debug_assert_eq!(self.state.next(), Some(to));
        debug!(target: "hardour::startup", "state {} -> {}", self.state, to);
        self.state = to;
    }

    /// Run every startup step against the context's configuration.
    ///
    /// On success the transport is rolling and wake sources deliver to the
    /// context's termination channel.
    pub fn run(&mut self, ctx: &mut ProcessContext) -> Result<Running<H>, StartupError> {
        ctx.config().validate().map_err(StartupError::Config)?;

        // Subscribe before anything can emit, so early messages reach output.
        let connections = ctx.listener().listen_to(self.host.diagnostics());
        ctx.keep_all(connections);

        let config = ctx.config().clone();

        self.host
            .initialize(&LibraryOptions::from(&config))
            .map_err(StartupError::Initialization)?;
        self.advance(ProcessState::GloballyInitialized);

        let mut engine = self.host.create_engine();
        self.advance(ProcessState::EngineCreated);

        engine
            .set_backend(
                &config.backend,
                &config.client_name,
                &EngineOptions::from(&config),
            )
            .map_err(StartupError::Backend)?;
        self.advance(ProcessState::BackendBound);

        engine.start().map_err(StartupError::EngineStart)?;
        self.advance(ProcessState::EngineStarted);

        let snapshot = normalize_snapshot(&config.snapshot);
        let options = SessionOptions::from(&config);
        let host = &mut *self.host;
        let loaded = panic::catch_unwind(AssertUnwindSafe(|| {
            host.load_session(&mut engine, &config.session_dir, snapshot, &options)
        }));
        let mut session = match loaded {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(StartupError::SessionLoad(e)),
            Err(_) => return Err(StartupError::SessionPanic),
        };
        self.advance(ProcessState::SessionLoaded);
        info!(
            target: "hardour::session",
            "loaded session '{}' from {}", session.name(), config.session_dir.display()
        );

        self.wire(ctx, &engine);
        self.advance(ProcessState::ListenersWired);

        session.request_transport_speed(1.0);
        self.advance(ProcessState::Running);
        debug!(target: "hardour::transport", "transport rolling");

        Ok(Running { engine, session })
    }

    fn wire(&self, ctx: &mut ProcessContext, engine: &H::Engine) {
        let channel = Arc::clone(ctx.channel());

        ctx.keep(wake::connect_ui_actions(
            self.host.ui_actions(),
            Arc::clone(&channel),
        ));
        ctx.keep(wake::connect_engine_halted(
            engine.halted(),
            Arc::clone(&channel),
        ));

        if ctx.installs_signal_handlers() {
            // The quit action and backend halt still end the process.
            if let Err(e) = signals::install(&channel) {
                warn!(target: "hardour::signals", "{}", e);
            }
        }

        // A halt emitted before the subscription above would otherwise be lost.
        if !engine.is_running() {
            debug!(target: "hardour::startup", "engine halted before wake wiring");
            channel.deliver(WakeSource::BackendHalt.token());
        }
    }
}

/// Snapshot name without the state-file suffix.
pub fn normalize_snapshot(snapshot: &str) -> &str {
    match snapshot.strip_suffix(STATE_FILE_SUFFIX) {
        Some(stem) if !stem.is_empty() => {
            warn!(
                target: "hardour::session",
                "snapshot name '{}' has the {} suffix, using '{}'",
                snapshot,
                STATE_FILE_SUFFIX,
                stem
            );
            stem
        }
        _ => snapshot,
    }
}
