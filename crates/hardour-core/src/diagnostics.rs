//! Severity-tagged diagnostic streams.

use std::fmt;

use crate::notifier::Notifier;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Recoverable error reported by a collaborator
    Error,
    /// Warning
    Warning,
    /// Informational message
    Info,
    /// Unrecoverable error reported by a collaborator
    Fatal,
}

impl Severity {
    /// All severities, in subscription order.
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Fatal,
    ];

    /// Prefix written in front of forwarded messages.
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Error => "[ERROR]: ",
            Severity::Warning => "[WARNING]: ",
            Severity::Info => "[INFO]: ",
            Severity::Fatal => "[FATAL]: ",
        }
    }

    /// Whether messages of this severity go to standard error.
    pub fn is_stderr(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// The four independent message streams collaborators publish on.
///
/// Cloning shares the underlying streams.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticStreams {
    error: Notifier<String>,
    warning: Notifier<String>,
    info: Notifier<String>,
    fatal: Notifier<String>,
}

impl DiagnosticStreams {
    /// Create four empty streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stream for `severity`.
    pub fn stream(&self, severity: Severity) -> &Notifier<String> {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
            Severity::Fatal => &self.fatal,
        }
    }

    /// Publish `message` on the `severity` stream.
    pub fn emit(&self, severity: Severity, message: impl Into<String>) {
        self.stream(severity).emit(&message.into());
    }

    /// Publish on the error stream.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    /// Publish on the warning stream.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    /// Publish on the info stream.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    /// Publish on the fatal stream.
    pub fn fatal(&self, message: impl Into<String>) {
        self.emit(Severity::Fatal, message);
    }
}
