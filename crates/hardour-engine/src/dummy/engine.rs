//! Dummy engine: a backend that runs process cycles on a timer thread.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use hardour_core::{DiagnosticStreams, Error, Notifier, Result};

use crate::host::AudioEngine;
use crate::options::EngineOptions;

/// Backend names the dummy engine accepts.
pub const DUMMY_BACKENDS: [&str; 2] = ["Dummy", "None (Dummy)"];

/// Physical playback ports the dummy backend exposes once running.
pub const SYSTEM_PLAYBACK_PORTS: [&str; 2] = ["system:playback_1", "system:playback_2"];

/// Transport state shared between a session and the process thread.
#[derive(Debug, Default)]
pub struct Transport {
    speed_bits: AtomicU64,
    position: AtomicU64,
}

impl Transport {
    /// Current speed.
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Acquire))
    }

    /// Set the speed.
    pub fn set_speed(&self, speed: f64) {
        self.speed_bits.store(speed.to_bits(), Ordering::Release);
    }

    /// Position in frames.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Acquire)
    }

    fn advance(&self, frames: u32) {
        let speed = self.speed();
        if speed > 0.0 {
            let delta = (speed * f64::from(frames)) as u64;
            self.position.fetch_add(delta, Ordering::AcqRel);
        }
    }
}

#[derive(Debug, Default)]
struct PortRegistry {
    ports: BTreeSet<String>,
    connections: Vec<(String, String)>,
}

#[derive(Debug)]
pub(crate) struct EngineShared {
    running: AtomicBool,
    cycles: AtomicU64,
    halted: Notifier<String>,
    transport: Mutex<Option<Arc<Transport>>>,
    ports: Mutex<PortRegistry>,
    pub(crate) diagnostics: DiagnosticStreams,
}

impl EngineShared {
    pub(crate) fn register_port(&self, name: &str) -> Result<()> {
        if !self.running.load(Ordering::Acquire) {
            return Err(Error::PortRegistration(format!(
                "cannot register port '{name}': engine is not running"
            )));
        }
        let mut registry = self.ports.lock().unwrap_or_else(|e| e.into_inner());
        if !registry.ports.insert(name.to_string()) {
            return Err(Error::PortRegistration(format!(
                "port '{name}' is already registered"
            )));
        }
        debug!(target: "hardour::ports", "registered port {}", name);
        Ok(())
    }

    pub(crate) fn unregister_port(&self, name: &str) {
        let mut registry = self.ports.lock().unwrap_or_else(|e| e.into_inner());
        registry.ports.remove(name);
        registry.connections.retain(|(src, _)| src != name);
        debug!(target: "hardour::ports", "unregistered port {}", name);
    }

    pub(crate) fn connect(&self, source: &str, destination: &str) {
        let mut registry = self.ports.lock().unwrap_or_else(|e| e.into_inner());
        registry
            .connections
            .push((source.to_string(), destination.to_string()));
        debug!(target: "hardour::ports", "connected {} -> {}", source, destination);
    }

    pub(crate) fn attach(&self, transport: Arc<Transport>) {
        *self.transport.lock().unwrap_or_else(|e| e.into_inner()) = Some(transport);
    }
}

#[derive(Debug, Clone)]
struct BoundBackend {
    name: String,
    options: EngineOptions,
}

/// Engine handle for the dummy backend.
#[derive(Debug)]
pub struct DummyEngine {
    shared: Arc<EngineShared>,
    backend: Option<BoundBackend>,
    halt_after: Option<Duration>,
    thread: Option<JoinHandle<()>>,
}

impl DummyEngine {
    pub(crate) fn new(diagnostics: DiagnosticStreams, halt_after: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                running: AtomicBool::new(false),
                cycles: AtomicU64::new(0),
                halted: Notifier::new(),
                transport: Mutex::new(None),
                ports: Mutex::new(PortRegistry::default()),
                diagnostics,
            }),
            backend: None,
            halt_after,
            thread: None,
        }
    }

    pub(crate) fn shared(&self) -> Arc<EngineShared> {
        Arc::clone(&self.shared)
    }

    /// Options the bound backend was configured with.
    pub fn options(&self) -> Option<&EngineOptions> {
        self.backend.as_ref().map(|b| &b.options)
    }

    /// Number of process cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::Acquire)
    }

    /// Whether a session is attached.
    pub fn has_session(&self) -> bool {
        self.shared
            .transport
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Registered port names.
    pub fn ports(&self) -> Vec<String> {
        let registry = self.shared.ports.lock().unwrap_or_else(|e| e.into_inner());
        registry.ports.iter().cloned().collect()
    }

    /// Current port connections as (source, destination).
    pub fn connections(&self) -> Vec<(String, String)> {
        let registry = self.shared.ports.lock().unwrap_or_else(|e| e.into_inner());
        registry.connections.clone()
    }

    fn join_process_thread(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!(target: "hardour::engine", "dummy process thread panicked");
            }
        }
    }
}

impl AudioEngine for DummyEngine {
    fn set_backend(
        &mut self,
        backend: &str,
        client_name: &str,
        options: &EngineOptions,
    ) -> Result<()> {
        if self.is_running() {
            return Err(Error::BackendBind {
                backend: backend.to_string(),
                reason: "engine is running".to_string(),
            });
        }
        if !DUMMY_BACKENDS.contains(&backend) {
            return Err(Error::BackendBind {
                backend: backend.to_string(),
                reason: format!("not available (known backends: {})", DUMMY_BACKENDS.join(", ")),
            });
        }
        if client_name.trim().is_empty() {
            return Err(Error::BackendBind {
                backend: backend.to_string(),
                reason: "client name cannot be empty".to_string(),
            });
        }
        if options.sample_rate == 0 || options.buffer_size == 0 {
            return Err(Error::BackendBind {
                backend: backend.to_string(),
                reason: format!(
                    "invalid period {} frames at {} Hz",
                    options.buffer_size, options.sample_rate
                ),
            });
        }

        info!(
            target: "hardour::engine",
            "bound backend '{}' as client '{}' ({} Hz, {} frames)",
            backend, client_name, options.sample_rate, options.buffer_size
        );
        self.backend = Some(BoundBackend {
            name: backend.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let backend = self
            .backend
            .clone()
            .ok_or_else(|| Error::EngineStart("no backend selected".to_string()))?;
        if self.is_running() {
            return Ok(());
        }
        // A previous run may have halted on its own; reap it first.
        self.join_process_thread();

        let period = Duration::from_secs_f64(
            f64::from(backend.options.buffer_size) / f64::from(backend.options.sample_rate),
        );
        let buffer_size = backend.options.buffer_size;
        let halt_after = self.halt_after;
        let shared = Arc::clone(&self.shared);

        shared.running.store(true, Ordering::Release);
        {
            let mut registry = shared.ports.lock().unwrap_or_else(|e| e.into_inner());
            for port in SYSTEM_PLAYBACK_PORTS {
                registry.ports.insert(port.to_string());
            }
        }

        let handle = std::thread::Builder::new()
            .name("hardour-dummy-process".to_string())
            .spawn(move || process_loop(shared, period, buffer_size, halt_after))
            .map_err(|e| {
                self.shared.running.store(false, Ordering::Release);
                Error::EngineStart(format!("cannot spawn process thread: {e}"))
            })?;
        self.thread = Some(handle);

        info!(target: "hardour::engine", "backend '{}' started", backend.name);
        self.shared
            .diagnostics
            .info(format!("{} backend running", backend.name));
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    fn halted(&self) -> &Notifier<String> {
        &self.shared.halted
    }

    fn remove_session(&mut self) {
        let previous = self
            .shared
            .transport
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if previous.is_some() {
            debug!(target: "hardour::session", "session detached from engine");
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.join_process_thread();
        let mut registry = self.shared.ports.lock().unwrap_or_else(|e| e.into_inner());
        for port in SYSTEM_PLAYBACK_PORTS {
            registry.ports.remove(port);
        }
        info!(target: "hardour::engine", "engine stopped after {} cycles", self.cycles());
        Ok(())
    }

    fn destroy(mut self) {
        self.join_process_thread();
        debug!(target: "hardour::engine", "engine destroyed");
    }
}

impl Drop for DummyEngine {
    fn drop(&mut self) {
        self.join_process_thread();
    }
}

fn process_loop(
    shared: Arc<EngineShared>,
    period: Duration,
    buffer_size: u32,
    halt_after: Option<Duration>,
) {
    let started = Instant::now();
    debug!(target: "hardour::engine", "process thread running, period {:?}", period);

    while shared.running.load(Ordering::Acquire) {
        std::thread::sleep(period);
        shared.cycles.fetch_add(1, Ordering::AcqRel);

        let transport = shared
            .transport
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(transport) = transport {
            transport.advance(buffer_size);
        }

        if let Some(limit) = halt_after {
            if started.elapsed() >= limit {
                shared.running.store(false, Ordering::Release);
                warn!(target: "hardour::engine", "dummy backend run time exhausted");
                shared
                    .halted
                    .emit(&"dummy backend run time exhausted".to_string());
                break;
            }
        }
    }
}
