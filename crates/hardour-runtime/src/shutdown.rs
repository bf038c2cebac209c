//! Shutdown sequencer.

use tracing::{debug, error, info};

use hardour_core::EXIT_SUCCESS;
use hardour_engine::{AudioEngine, Host, Session};

use crate::startup::Running;

/// Tear down a running process in fixed order: detach the session from the
/// engine, destroy the session, stop the engine, destroy the engine.
///
/// Runs exactly once per process, on the main thread, after the wake-up. A
/// failing stop is logged and teardown continues. Returns the exit status.
pub fn shutdown<H: Host>(running: Running<H>) -> u8 {
    let (mut engine, session) = running.into_parts();
    info!(target: "hardour::shutdown", "shutting down session '{}'", session.name());

    engine.remove_session();
    debug!(target: "hardour::shutdown", "session detached from engine");

    session.destroy();
    debug!(target: "hardour::shutdown", "session destroyed");

    if let Err(e) = engine.stop() {
        error!(target: "hardour::shutdown", "engine stop failed: {}", e);
    } else {
        debug!(target: "hardour::shutdown", "engine stopped");
    }

    engine.destroy();
    debug!(target: "hardour::shutdown", "engine destroyed");

    EXIT_SUCCESS
}
