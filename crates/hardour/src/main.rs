//! # hardour
//!
//! Loads `DIR/SNAPSHOT_NAME` on the bundled dummy backend, starts the
//! transport and runs until SIGINT/SIGTERM, a backend halt or a quit action.

use std::process::ExitCode;

use anyhow::Context;
use hardour::{logging, RunOptions};
use hardour_core::{EXIT_FAILURE, PROGRAM_NAME};
use hardour_engine::DummyHost;
use hardour_runtime::{run_process, ProcessContext};

fn launch(options: RunOptions) -> anyhow::Result<u8> {
    logging::init_logging(&options.config)?;
    tracing::info!(
        "{} {} starting: session '{}' in {}",
        PROGRAM_NAME,
        env!("CARGO_PKG_VERSION"),
        options.config.snapshot,
        options.config.session_dir.display()
    );

    let host = match options.halt_after {
        Some(after) => DummyHost::with_halt_after(after),
        None => DummyHost::new(),
    };
    let ctx = ProcessContext::new(options.config).context("cannot create termination channel")?;

    Ok(run_process(host, ctx))
}

fn main() -> ExitCode {
    let status = hardour::run(
        std::env::args_os(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
        |options| {
            launch(options).unwrap_or_else(|e| {
                eprintln!("{e:#}");
                EXIT_FAILURE
            })
        },
    );
    ExitCode::from(status)
}
