//! Wake sources wired to the termination channel.
//!
//! Each source's only effect on the process is a `deliver` on the channel;
//! the token records which source fired first.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use hardour_core::{Connection, Notifier};
use hardour_engine::UiAction;

use crate::channel::TerminationChannel;

/// Which wake source delivered the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    /// SIGINT or SIGTERM
    Signal,
    /// The backend stopped on its own
    BackendHalt,
    /// The `Common`/`Quit` UI action
    UiQuit,
    /// A token this process does not send
    Unknown(u8),
}

impl WakeSource {
    /// Token written to the channel.
    pub fn token(&self) -> u8 {
        match self {
            WakeSource::Signal => b's',
            WakeSource::BackendHalt => b'h',
            WakeSource::UiQuit => b'q',
            WakeSource::Unknown(token) => *token,
        }
    }

    /// Source for a received token.
    pub fn from_token(token: u8) -> Self {
        match token {
            b's' => WakeSource::Signal,
            b'h' => WakeSource::BackendHalt,
            b'q' => WakeSource::UiQuit,
            other => WakeSource::Unknown(other),
        }
    }
}

impl fmt::Display for WakeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WakeSource::Signal => write!(f, "termination signal"),
            WakeSource::BackendHalt => write!(f, "backend halt"),
            WakeSource::UiQuit => write!(f, "quit action"),
            WakeSource::Unknown(token) => write!(f, "unknown token {token:#04x}"),
        }
    }
}

/// Message printed when the backend halts.
pub fn halt_message(reason: &str) -> String {
    if reason.is_empty() {
        "The audio backend has been shutdown.".to_string()
    } else {
        format!("The audio backend has been shutdown: {reason}")
    }
}

/// Wake the channel on the `Common`/`Quit` UI action.
pub fn connect_ui_actions(
    actions: &Notifier<UiAction>,
    channel: Arc<TerminationChannel>,
) -> Connection {
    actions.connect(move |action: &UiAction| {
        if action.is_quit() {
            debug!(target: "hardour::signals", "quit action received");
            channel.deliver(WakeSource::UiQuit.token());
        }
    })
}

/// Wake the channel when the backend halts.
pub fn connect_engine_halted(
    halted: &Notifier<String>,
    channel: Arc<TerminationChannel>,
) -> Connection {
    halted.connect(move |reason: &String| {
        eprintln!("{}", halt_message(reason));
        channel.deliver(WakeSource::BackendHalt.token());
    })
}
