//! Error types for hardour.

use thiserror::Error;

/// Exit status after a normal, signalled shutdown.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for every startup failure.
pub const EXIT_FAILURE: u8 = 1;

/// Main error type for hardour operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad command line (missing positionals, unknown flag)
    #[error("Usage error: {0}")]
    Usage(String),

    /// Debug option string could not be parsed
    #[error("Invalid debug options: {0}")]
    DebugOptions(String),

    /// Configuration file or value error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process-wide library initialization failed
    #[error("{0}")]
    Initialization(String),

    /// The named backend could not be bound to the engine
    #[error("backend '{backend}' unavailable: {reason}")]
    BackendBind {
        /// Backend name that was requested
        backend: String,
        /// Why binding failed
        reason: String,
    },

    /// The engine refused to start
    #[error("engine start failed: {0}")]
    EngineStart(String),

    /// The session could not be built from the given directory and snapshot
    #[error("{0}")]
    Construction(String),

    /// The engine could not allocate a port the session needs
    #[error("{0}")]
    PortRegistration(String),

    /// OS signal handlers could not be installed
    #[error("Cannot install signal handlers: {0}")]
    SignalHandlers(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short type tag printed in front of session-load failures.
    pub fn tag(&self) -> &'static str {
        match self {
            Error::Construction(_) => "construction failure",
            Error::PortRegistration(_) => "port registration failure",
            _ => "error",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
