//! Call-recording mock collaborators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hardour_core::{DiagnosticStreams, Error, Notifier, Result};

use crate::host::{AudioEngine, Host, Session};
use crate::options::{EngineOptions, LibraryOptions, SessionOptions, UiAction};

/// A collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `Host::initialize`
    Initialize(LibraryOptions),
    /// `Host::create_engine`
    CreateEngine,
    /// `AudioEngine::set_backend`
    SetBackend {
        /// Backend name
        backend: String,
        /// Client name
        client_name: String,
    },
    /// `AudioEngine::start`
    Start,
    /// `Host::load_session`
    LoadSession {
        /// Session directory
        dir: PathBuf,
        /// Snapshot name
        snapshot: String,
        /// Session options
        options: SessionOptions,
    },
    /// `Session::request_transport_speed`
    RequestTransportSpeed(f64),
    /// `AudioEngine::remove_session`
    RemoveSession,
    /// `Session::destroy`
    DestroySession,
    /// `AudioEngine::stop`
    Stop,
    /// `AudioEngine::destroy`
    DestroyEngine,
}

/// How session loading should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFailure {
    /// Return a construction failure
    Construction,
    /// Return a port registration failure
    PortRegistration,
    /// Return an untyped error
    Other,
    /// Panic inside `load_session`
    Panic,
}

/// Failure injection for [`MockHost`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBehavior {
    /// `initialize` fails
    pub fail_initialize: bool,
    /// `set_backend` fails
    pub fail_backend: bool,
    /// `start` fails
    pub fail_start: bool,
    /// `start` succeeds but the backend halts before anyone subscribes
    pub halt_on_start: bool,
    /// `load_session` fails this way
    pub session_failure: Option<SessionFailure>,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().unwrap_or_else(|e| e.into_inner()).push(call);
}

/// Mock [`Host`] that records every call.
#[derive(Debug, Default)]
pub struct MockHost {
    behavior: MockBehavior,
    calls: CallLog,
    ui_actions: Notifier<UiAction>,
    halted: Notifier<String>,
    diagnostics: DiagnosticStreams,
}

impl MockHost {
    /// Host where every step succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with injected failures.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Handle that stays usable after the host is moved into the runner.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            calls: Arc::clone(&self.calls),
            ui_actions: self.ui_actions.clone(),
            halted: self.halted.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

impl Host for MockHost {
    type Engine = MockEngine;
    type Session = MockSession;

    fn initialize(&mut self, options: &LibraryOptions) -> Result<()> {
        record(&self.calls, Call::Initialize(options.clone()));
        if self.behavior.fail_initialize {
            return Err(Error::Initialization("mock initialization failure".to_string()));
        }
        Ok(())
    }

    fn create_engine(&mut self) -> MockEngine {
        record(&self.calls, Call::CreateEngine);
        MockEngine {
            behavior: self.behavior,
            calls: Arc::clone(&self.calls),
            halted: self.halted.clone(),
            running: false,
        }
    }

    fn load_session(
        &mut self,
        _engine: &mut MockEngine,
        dir: &Path,
        snapshot: &str,
        options: &SessionOptions,
    ) -> Result<MockSession> {
        record(
            &self.calls,
            Call::LoadSession {
                dir: dir.to_path_buf(),
                snapshot: snapshot.to_string(),
                options: *options,
            },
        );
        match self.behavior.session_failure {
            Some(SessionFailure::Construction) => Err(Error::Construction(format!(
                "cannot load snapshot '{snapshot}'"
            ))),
            Some(SessionFailure::PortRegistration) => Err(Error::PortRegistration(
                "cannot register master outputs".to_string(),
            )),
            Some(SessionFailure::Other) => Err(Error::Other("mock failure".to_string())),
            Some(SessionFailure::Panic) => panic!("mock session panic"),
            None => Ok(MockSession {
                name: snapshot.to_string(),
                calls: Arc::clone(&self.calls),
            }),
        }
    }

    fn ui_actions(&self) -> &Notifier<UiAction> {
        &self.ui_actions
    }

    fn diagnostics(&self) -> &DiagnosticStreams {
        &self.diagnostics
    }
}

/// Mock [`AudioEngine`].
#[derive(Debug)]
pub struct MockEngine {
    behavior: MockBehavior,
    calls: CallLog,
    halted: Notifier<String>,
    running: bool,
}

impl AudioEngine for MockEngine {
    fn set_backend(
        &mut self,
        backend: &str,
        client_name: &str,
        _options: &EngineOptions,
    ) -> Result<()> {
        record(
            &self.calls,
            Call::SetBackend {
                backend: backend.to_string(),
                client_name: client_name.to_string(),
            },
        );
        if self.behavior.fail_backend {
            return Err(Error::BackendBind {
                backend: backend.to_string(),
                reason: "mock backend failure".to_string(),
            });
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        record(&self.calls, Call::Start);
        if self.behavior.fail_start {
            return Err(Error::EngineStart("mock start failure".to_string()));
        }
        self.running = !self.behavior.halt_on_start;
        if self.behavior.halt_on_start {
            self.halted.emit(&"mock backend halted at start".to_string());
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn halted(&self) -> &Notifier<String> {
        &self.halted
    }

    fn remove_session(&mut self) {
        record(&self.calls, Call::RemoveSession);
    }

    fn stop(&mut self) -> Result<()> {
        record(&self.calls, Call::Stop);
        self.running = false;
        Ok(())
    }

    fn destroy(self) {
        record(&self.calls, Call::DestroyEngine);
    }
}

/// Mock [`Session`].
#[derive(Debug)]
pub struct MockSession {
    name: String,
    calls: CallLog,
}

impl Session for MockSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_transport_speed(&mut self, speed: f64) {
        record(&self.calls, Call::RequestTransportSpeed(speed));
    }

    fn destroy(self) {
        record(&self.calls, Call::DestroySession);
    }
}

/// Observation and stimulus handle for a [`MockHost`].
#[derive(Debug, Clone)]
pub struct MockHandle {
    calls: CallLog,
    ui_actions: Notifier<UiAction>,
    halted: Notifier<String>,
    diagnostics: DiagnosticStreams,
}

impl MockHandle {
    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether a call equal to `call` was recorded.
    pub fn was_called(&self, call: &Call) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    /// Calls after the transport-start request.
    pub fn teardown_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .skip_while(|c| !matches!(c, Call::RequestTransportSpeed(_)))
            .skip(1)
            .collect()
    }

    /// Poll until `predicate` holds for the call log, or `timeout` passes.
    pub fn wait_for<F>(&self, timeout: Duration, predicate: F) -> bool
    where
        F: Fn(&[Call]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if predicate(&self.calls()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    /// Wait until the transport-start request was recorded.
    pub fn wait_for_transport_start(&self, timeout: Duration) -> bool {
        self.wait_for(timeout, |calls| {
            calls
                .iter()
                .any(|c| matches!(c, Call::RequestTransportSpeed(_)))
        })
    }

    /// Publish a UI action.
    pub fn access_action(&self, group: &str, item: &str) {
        self.ui_actions.emit(&UiAction::new(group, item));
    }

    /// Report an engine halt, as a backend thread would.
    pub fn halt_engine(&self, reason: &str) {
        self.halted.emit(&reason.to_string());
    }

    /// Diagnostic streams of the host.
    pub fn diagnostics(&self) -> &DiagnosticStreams {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut host = MockHost::new();
        let handle = host.handle();
        let mut engine = host.create_engine();
        engine
            .set_backend("Dummy", "hardour", &EngineOptions::default())
            .unwrap();
        engine.start().unwrap();
        engine.stop().unwrap();
        engine.destroy();

        assert_eq!(
            handle.calls(),
            vec![
                Call::CreateEngine,
                Call::SetBackend {
                    backend: "Dummy".to_string(),
                    client_name: "hardour".to_string()
                },
                Call::Start,
                Call::Stop,
                Call::DestroyEngine,
            ]
        );
    }

    #[test]
    fn test_injected_backend_failure() {
        let mut host = MockHost::with_behavior(MockBehavior {
            fail_backend: true,
            ..Default::default()
        });
        let mut engine = host.create_engine();
        assert!(engine
            .set_backend("Dummy", "x", &EngineOptions::default())
            .is_err());
    }

    #[test]
    fn test_teardown_calls() {
        let mut host = MockHost::new();
        let handle = host.handle();
        let mut engine = host.create_engine();
        let mut session = host
            .load_session(&mut engine, Path::new("/s"), "snap", &SessionOptions::default())
            .unwrap();
        session.request_transport_speed(1.0);
        engine.remove_session();
        session.destroy();

        assert_eq!(
            handle.teardown_calls(),
            vec![Call::RemoveSession, Call::DestroySession]
        );
    }
}
