//! Dummy session: a directory-backed project with a master bus.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use hardour_core::{Error, Result, STATE_FILE_SUFFIX};

use super::engine::{EngineShared, Transport, SYSTEM_PLAYBACK_PORTS};
use crate::host::Session;
use crate::options::SessionOptions;

/// Output ports registered by every session's master bus.
pub const MASTER_OUTPUTS: [&str; 2] = ["master/audio_out 1", "master/audio_out 2"];

/// Session handle for the dummy backend.
#[derive(Debug)]
pub struct DummySession {
    name: String,
    transport: Arc<Transport>,
    ports: Vec<String>,
    engine: Arc<EngineShared>,
}

impl DummySession {
    /// Build the session and attach it to the engine behind `engine`.
    pub(crate) fn load(
        engine: Arc<EngineShared>,
        dir: &Path,
        snapshot: &str,
        options: &SessionOptions,
        connecting_blocked: bool,
    ) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Construction(format!(
                "session directory '{}' does not exist",
                dir.display()
            )));
        }
        let state_file = dir.join(format!("{snapshot}{STATE_FILE_SUFFIX}"));
        if !state_file.is_file() {
            return Err(Error::Construction(format!(
                "session state file '{}' not found",
                state_file.display()
            )));
        }
        debug!(target: "hardour::session", "loading session state from {}", state_file.display());

        let mut ports: Vec<String> = Vec::with_capacity(MASTER_OUTPUTS.len());
        for port in MASTER_OUTPUTS {
            if let Err(e) = engine.register_port(port) {
                for registered in &ports {
                    engine.unregister_port(registered);
                }
                return Err(e);
            }
            ports.push(port.to_string());
        }

        if connecting_blocked {
            debug!(target: "hardour::ports", "automatic port connection blocked");
        } else {
            for (source, destination) in ports.iter().zip(SYSTEM_PLAYBACK_PORTS) {
                engine.connect(source, destination);
            }
        }

        if options.bypass_all_plugins {
            engine.diagnostics.info("all plugins bypassed");
        }
        if options.disable_all_plugins {
            engine.diagnostics.info("all plugins disabled");
        }

        let transport = Arc::new(Transport::default());
        engine.attach(Arc::clone(&transport));
        engine
            .diagnostics
            .info(format!("loaded session '{}' from {}", snapshot, dir.display()));
        info!(target: "hardour::session", "session '{}' attached to engine", snapshot);

        Ok(Self {
            name: snapshot.to_string(),
            transport,
            ports,
            engine,
        })
    }

    /// Transport state.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Ports owned by this session.
    pub fn ports(&self) -> &[String] {
        &self.ports
    }
}

impl Session for DummySession {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_transport_speed(&mut self, speed: f64) {
        debug!(target: "hardour::transport", "transport speed requested: {}", speed);
        self.transport.set_speed(speed);
    }

    fn destroy(self) {
        for port in &self.ports {
            self.engine.unregister_port(port);
        }
        debug!(target: "hardour::session", "session '{}' destroyed", self.name);
    }
}
