//! Whole-process orchestration: startup, wait, shutdown.

use std::io;

use tracing::{debug, error, info};

use hardour_engine::Host;

use crate::channel::TerminationChannel;
use crate::context::ProcessContext;
use crate::shutdown::shutdown;
use crate::startup::StartupSequencer;
use crate::wake::WakeSource;

/// Block until a wake source fires and report which one did.
pub fn wait_for_wake(channel: &TerminationChannel) -> io::Result<WakeSource> {
    loop {
        if let Some(token) = channel.receive(true)? {
            return Ok(WakeSource::from_token(token));
        }
    }
}

/// Run `host` to completion and return the process exit status.
///
/// Startup failures are printed to standard error and yield 1. Otherwise the
/// calling thread sleeps until the first wake-up, runs the shutdown sequence
/// and yields 0.
pub fn run_process<H: Host>(mut host: H, mut ctx: ProcessContext) -> u8 {
    let started = StartupSequencer::new(&mut host).run(&mut ctx);
    let running = match started {
        Ok(running) => running,
        Err(e) => {
            debug!(target: "hardour::startup", "startup stopped after {}: {:?}", e.reached(), e);
            eprintln!("{}", e);
            ctx.disconnect_all();
            return e.exit_code();
        }
    };
    info!(target: "hardour::startup", "{:?} running, waiting for termination", running);

    match wait_for_wake(ctx.channel()) {
        Ok(source) => info!(target: "hardour::shutdown", "woken by {}", source),
        Err(e) => error!(target: "hardour::shutdown", "termination channel failed: {}", e),
    }

    let status = shutdown(running);
    ctx.disconnect_all();
    status
}
