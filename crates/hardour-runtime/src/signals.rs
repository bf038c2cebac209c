//! OS termination-signal handling.
//!
//! SIGINT and SIGTERM write a fixed notice to stderr and deliver on the
//! termination channel. The handler touches nothing but an atomic-backed
//! `OnceLock`, the channel's flag and `write(2)`.

#[cfg(unix)]
pub use unix::{install, TERMINATION_SIGNALS};

#[cfg(not(unix))]
pub use fallback::install;

#[cfg(unix)]
mod unix {
    use std::os::fd::BorrowedFd;
    use std::sync::{Arc, OnceLock};

    use nix::errno::Errno;
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use tracing::debug;

    use hardour_core::{Error, Result};

    use crate::channel::TerminationChannel;
    use crate::wake::WakeSource;

    /// Signals that end the process.
    pub const TERMINATION_SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];

    const NOTICE: &[u8] = b"caught signal - terminating.\n";

    static TARGET: OnceLock<Arc<TerminationChannel>> = OnceLock::new();

    /// Route SIGINT and SIGTERM to `channel`.
    ///
    /// Handlers are process-wide: once installed they keep targeting the
    /// first channel, and installing for a different channel fails.
    pub fn install(channel: &Arc<TerminationChannel>) -> Result<()> {
        let target = TARGET.get_or_init(|| Arc::clone(channel));
        if !Arc::ptr_eq(target, channel) {
            return Err(Error::SignalHandlers(
                "handlers already deliver to another channel".to_string(),
            ));
        }

        let action = SigAction::new(
            SigHandler::Handler(on_termination_signal),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        for signal in TERMINATION_SIGNALS {
            // SAFETY: the handler only performs async-signal-safe work.
            unsafe { sigaction(signal, &action) }.map_err(|errno| {
                Error::SignalHandlers(format!("sigaction({signal:?}) failed: {errno}"))
            })?;
            debug!(target: "hardour::signals", "installed handler for {:?}", signal);
        }
        Ok(())
    }

    extern "C" fn on_termination_signal(_signum: nix::libc::c_int) {
        let saved = Errno::last_raw();
        // SAFETY: stderr stays open for the life of the process.
        let stderr = unsafe { BorrowedFd::borrow_raw(nix::libc::STDERR_FILENO) };
        let _ = nix::unistd::write(stderr, NOTICE);
        if let Some(channel) = TARGET.get() {
            channel.deliver(WakeSource::Signal.token());
        }
        // The interrupted code must not observe our errno.
        Errno::set_raw(saved);
    }
}

#[cfg(not(unix))]
mod fallback {
    use std::sync::Arc;

    use tracing::warn;

    use hardour_core::Result;

    use crate::channel::TerminationChannel;

    /// Termination signals are not routed on this platform.
    pub fn install(_channel: &Arc<TerminationChannel>) -> Result<()> {
        warn!(target: "hardour::signals", "termination signals are not handled on this platform");
        Ok(())
    }
}
