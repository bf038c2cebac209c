//! Process state machine.

use std::fmt;

/// Startup progress of the process.
///
/// States are strictly ordered; the startup sequence only ever moves forward
/// by one step, and stops at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProcessState {
    /// Nothing has been done yet
    #[default]
    Uninitialized,
    /// Process-wide library state is initialized
    GloballyInitialized,
    /// The engine handle exists
    EngineCreated,
    /// A backend is bound to the engine
    BackendBound,
    /// The backend is running
    EngineStarted,
    /// The session is constructed and attached
    SessionLoaded,
    /// Wake sources and signal handlers are wired
    ListenersWired,
    /// Transport started, waiting for a wake-up
    Running,
}

impl ProcessState {
    /// The state that follows this one, if any.
    pub fn next(&self) -> Option<ProcessState> {
        use ProcessState::*;
        match self {
            Uninitialized => Some(GloballyInitialized),
            GloballyInitialized => Some(EngineCreated),
            EngineCreated => Some(BackendBound),
            BackendBound => Some(EngineStarted),
            EngineStarted => Some(SessionLoaded),
            SessionLoaded => Some(ListenersWired),
            ListenersWired => Some(Running),
            Running => None,
        }
    }

    /// Whether an engine handle exists in this state.
    pub fn has_engine(&self) -> bool {
        *self >= ProcessState::EngineCreated
    }

    /// Whether a session handle exists in this state.
    pub fn has_session(&self) -> bool {
        *self >= ProcessState::SessionLoaded
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
