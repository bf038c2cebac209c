//! Process context: the state shared by startup, wake wiring and shutdown.

use std::sync::Arc;

use hardour_core::{Connection, ConnectionList, Result, StartupConfig};

use crate::channel::TerminationChannel;
use crate::listener::DiagnosticListener;

/// Everything the runner needs across its lifetime, built once at process
/// start and passed explicitly to each stage.
#[derive(Debug)]
pub struct ProcessContext {
    config: StartupConfig,
    channel: Arc<TerminationChannel>,
    listener: Arc<DiagnosticListener>,
    connections: ConnectionList,
    signal_handlers: bool,
}

impl ProcessContext {
    /// Context with a stdout/stderr diagnostic listener and OS signal
    /// handling.
    pub fn new(config: StartupConfig) -> Result<Self> {
        Self::with_listener(config, DiagnosticListener::stdio())
    }

    /// Context with a custom diagnostic listener.
    pub fn with_listener(config: StartupConfig, listener: Arc<DiagnosticListener>) -> Result<Self> {
        Ok(Self {
            config,
            channel: Arc::new(TerminationChannel::new()?),
            listener,
            connections: ConnectionList::new(),
            signal_handlers: true,
        })
    }

    /// Skip installing OS signal handlers. Handlers are process-wide, so
    /// contexts sharing a process with another runner should not install them.
    pub fn without_signal_handlers(mut self) -> Self {
        self.signal_handlers = false;
        self
    }

    /// Startup configuration.
    pub fn config(&self) -> &StartupConfig {
        &self.config
    }

    /// The termination channel.
    pub fn channel(&self) -> &Arc<TerminationChannel> {
        &self.channel
    }

    /// The diagnostic listener.
    pub fn listener(&self) -> &Arc<DiagnosticListener> {
        &self.listener
    }

    /// Whether OS signal handlers are installed during wiring.
    pub fn installs_signal_handlers(&self) -> bool {
        self.signal_handlers
    }

    /// Number of live subscriptions held by the context.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub(crate) fn keep(&mut self, connection: Connection) {
        self.connections.add(connection);
    }

    pub(crate) fn keep_all(&mut self, connections: ConnectionList) {
        self.connections.append(connections);
    }

    /// Drop every subscription.
    pub fn disconnect_all(&mut self) {
        self.connections.drop_connections();
    }
}
