//! Dummy backend.
//!
//! Runs process cycles on a timer thread instead of talking to audio
//! hardware, so a session can be exercised on machines without a sound
//! server. Sessions are directories holding a `<snapshot>.ardour` state file;
//! the file's contents are not interpreted.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use hardour_core::{DiagnosticStreams, Error, Notifier, Result};

use crate::host::{AudioEngine, Host};
use crate::options::{LibraryOptions, SessionOptions, UiAction};

mod engine;
mod session;

pub use engine::{DummyEngine, Transport, DUMMY_BACKENDS, SYSTEM_PLAYBACK_PORTS};
pub use session::{DummySession, MASTER_OUTPUTS};

/// Host for the dummy backend.
#[derive(Debug, Default)]
pub struct DummyHost {
    diagnostics: DiagnosticStreams,
    ui_actions: Notifier<UiAction>,
    initialized: AtomicBool,
    halt_after: Option<Duration>,
}

impl DummyHost {
    /// Create a host whose engines run until stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose engines halt on their own after `duration`.
    pub fn with_halt_after(duration: Duration) -> Self {
        Self {
            halt_after: Some(duration),
            ..Self::default()
        }
    }

    /// Publish a UI action, as a control surface would.
    pub fn access_action(&self, group: &str, item: &str) {
        self.ui_actions.emit(&UiAction::new(group, item));
    }

    /// Handle for publishing UI actions from another thread.
    pub fn ui_action_sender(&self) -> Notifier<UiAction> {
        self.ui_actions.clone()
    }
}

impl Host for DummyHost {
    type Engine = DummyEngine;
    type Session = DummySession;

    fn initialize(&mut self, options: &LibraryOptions) -> Result<()> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(Error::Initialization(
                "library is already initialized".to_string(),
            ));
        }
        if let Some(dir) = &options.locale_dir {
            if !dir.is_dir() {
                self.diagnostics
                    .warning(format!("locale directory '{}' not found", dir.display()));
            }
        }

        let mix_functions = if options.try_hw_optimization {
            "optimized"
        } else {
            "generic"
        };
        info!(target: "hardour::engine", "using {} mix functions", mix_functions);
        self.diagnostics
            .info(format!("using {mix_functions} mix functions"));
        if !options.use_vst {
            self.diagnostics.info("VST support disabled");
        }
        Ok(())
    }

    fn create_engine(&mut self) -> DummyEngine {
        debug!(target: "hardour::engine", "creating dummy engine");
        DummyEngine::new(self.diagnostics.clone(), self.halt_after)
    }

    fn load_session(
        &mut self,
        engine: &mut DummyEngine,
        dir: &Path,
        snapshot: &str,
        options: &SessionOptions,
    ) -> Result<DummySession> {
        if !engine.is_running() {
            return Err(Error::PortRegistration(
                "engine is not running".to_string(),
            ));
        }
        let connecting_blocked = engine
            .options()
            .map(|o| o.connecting_blocked)
            .unwrap_or(false);
        DummySession::load(engine.shared(), dir, snapshot, options, connecting_blocked)
    }

    fn ui_actions(&self) -> &Notifier<UiAction> {
        &self.ui_actions
    }

    fn diagnostics(&self) -> &DiagnosticStreams {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Session;
    use crate::options::EngineOptions;
    use std::sync::{Arc, Mutex};

    fn session_dir(snapshot: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{snapshot}.ardour")), "<Session/>").unwrap();
        dir
    }

    fn running_engine(host: &mut DummyHost, connecting_blocked: bool) -> DummyEngine {
        let mut engine = host.create_engine();
        let options = EngineOptions {
            connecting_blocked,
            sample_rate: 48_000,
            buffer_size: 48,
        };
        engine.set_backend("Dummy", "hardour", &options).unwrap();
        engine.start().unwrap();
        engine
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut host = DummyHost::new();
        let options = LibraryOptions {
            use_vst: true,
            try_hw_optimization: true,
            locale_dir: None,
        };
        assert!(host.initialize(&options).is_ok());
        assert!(matches!(
            host.initialize(&options),
            Err(Error::Initialization(_))
        ));
    }

    #[test]
    fn test_load_session_registers_and_connects_ports() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, false);

        let session = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap();
        assert_eq!(session.name(), "snap");
        assert!(engine.has_session());
        assert!(engine.ports().contains(&"master/audio_out 1".to_string()));
        assert_eq!(engine.connections().len(), 2);

        engine.remove_session();
        session.destroy();
        assert!(!engine.ports().contains(&"master/audio_out 1".to_string()));
        engine.stop().unwrap();
    }

    #[test]
    fn test_connecting_blocked_skips_connections() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, true);

        let _session = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap();
        assert!(engine.connections().is_empty());
        engine.stop().unwrap();
    }

    #[test]
    fn test_missing_snapshot_is_construction_failure() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, false);

        let err = host
            .load_session(&mut engine, dir.path(), "other", &SessionOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
        assert!(!engine.has_session());
        engine.stop().unwrap();
    }

    #[test]
    fn test_missing_directory_is_construction_failure() {
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, false);
        let err = host
            .load_session(
                &mut engine,
                Path::new("/nonexistent/hardour/session"),
                "snap",
                &SessionOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
        engine.stop().unwrap();
    }

    #[test]
    fn test_second_session_fails_port_registration() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, false);

        let _first = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap();
        let err = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::PortRegistration(_)));
        engine.stop().unwrap();
    }

    #[test]
    fn test_partial_registration_rolled_back() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = running_engine(&mut host, false);
        engine.shared().register_port(MASTER_OUTPUTS[1]).unwrap();

        let err = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::PortRegistration(_)));
        assert!(!engine.ports().contains(&MASTER_OUTPUTS[0].to_string()));
        assert!(engine.ports().contains(&MASTER_OUTPUTS[1].to_string()));
        assert!(!engine.has_session());
        engine.stop().unwrap();
    }

    #[test]
    fn test_load_on_stopped_engine_fails() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let mut engine = host.create_engine();
        let err = host
            .load_session(&mut engine, dir.path(), "snap", &SessionOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::PortRegistration(_)));
    }

    #[test]
    fn test_plugin_options_reported_on_info_stream() {
        let dir = session_dir("snap");
        let mut host = DummyHost::new();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let _conn = host
            .diagnostics()
            .stream(hardour_core::Severity::Info)
            .connect(move |m: &String| sink.lock().unwrap().push(m.clone()));

        let mut engine = running_engine(&mut host, false);
        let options = SessionOptions {
            bypass_all_plugins: true,
            disable_all_plugins: true,
        };
        let _session = host
            .load_session(&mut engine, dir.path(), "snap", &options)
            .unwrap();

        let messages = messages.lock().unwrap();
        assert!(messages.iter().any(|m| m == "all plugins bypassed"));
        assert!(messages.iter().any(|m| m == "all plugins disabled"));
        drop(messages);
        engine.stop().unwrap();
    }

    #[test]
    fn test_access_action_reaches_subscribers() {
        let host = DummyHost::new();
        let got = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&got);
        let _conn = host
            .ui_actions()
            .connect(move |a: &UiAction| *sink.lock().unwrap() = Some(a.clone()));

        host.access_action("Common", "Quit");
        assert_eq!(*got.lock().unwrap(), Some(UiAction::quit()));
    }
}
