//! # hardour
//!
//! Headless session runner: boots an audio engine, loads a session, rolls
//! the transport and waits until a signal, a backend halt or a quit action
//! tells it to stop.
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary that ties together:
//! - hardour-core: Configuration, errors and debug flags
//! - hardour-engine: Collaborator traits and the dummy backend
//! - hardour-runtime: Startup, wake-up and shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod logging;

use std::ffi::OsString;
use std::io::Write;

use hardour_core::{Error, EXIT_FAILURE, EXIT_SUCCESS};

pub use cli::{Invocation, RunOptions};

/// Handle one command line.
///
/// Help and version requests are answered on `out`. Argument and
/// configuration errors are reported on `err` and yield 1 without touching
/// any engine. A valid run is handed to `launch`, whose status is returned.
pub fn run<I, T, O, E, F>(args: I, out: &mut O, err: &mut E, launch: F) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    O: Write,
    E: Write,
    F: FnOnce(RunOptions) -> u8,
{
    // Output failures (closed pipes) must not change the exit status.
    match cli::parse(args) {
        Ok(Invocation::Help) => {
            let _ = out.write_all(cli::usage_text().as_bytes());
            EXIT_SUCCESS
        }
        Ok(Invocation::Version) => {
            let _ = writeln!(out, "{}", cli::version_text());
            EXIT_SUCCESS
        }
        Ok(Invocation::Run(options)) => launch(*options),
        Err(Error::Usage(message)) => {
            let _ = writeln!(err, "{message}");
            let _ = out.write_all(cli::usage_text().as_bytes());
            EXIT_FAILURE
        }
        Err(Error::DebugOptions(message)) => {
            let _ = write!(err, "{message}");
            if !message.ends_with('\n') {
                let _ = writeln!(err);
            }
            EXIT_FAILURE
        }
        Err(e) => {
            let _ = writeln!(err, "{e}");
            e.exit_code()
        }
    }
}
