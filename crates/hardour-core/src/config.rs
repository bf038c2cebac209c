//! Configuration types for hardour.
//!
//! [`StartupConfig`] is built once from the command line (optionally seeded
//! from a YAML [`FileConfig`]) and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{DebugFlags, Error, PROGRAM_NAME};

/// Name of the bundled backend, used when nothing else is configured.
pub const DEFAULT_BACKEND: &str = "Dummy";

/// Immutable startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    /// Backend to bind to the engine
    pub backend: String,
    /// Client name registered with the backend
    pub client_name: String,
    /// Bypass every plugin of the loaded session
    pub bypass_plugins: bool,
    /// Disable every plugin of the loaded session
    pub disable_plugins: bool,
    /// Use hardware-specific optimized code paths
    pub try_hw_optimization: bool,
    /// Block automatic port connection at startup
    pub connecting_blocked: bool,
    /// Enable the VST plugin-format backend
    pub use_vst: bool,
    /// Enabled debug flags
    pub debug: DebugFlags,
    /// Session directory
    pub session_dir: PathBuf,
    /// Snapshot name, without the state-file suffix
    pub snapshot: String,
    /// Engine sample rate
    pub sample_rate: u32,
    /// Engine buffer size in frames
    pub buffer_size: u32,
    /// Base log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl StartupConfig {
    /// Configuration for `session_dir`/`snapshot` with every other value
    /// taken from `file`.
    pub fn from_file_config(
        file: &FileConfig,
        session_dir: impl Into<PathBuf>,
        snapshot: impl Into<String>,
    ) -> Self {
        Self {
            backend: file.engine.backend.clone(),
            client_name: file
                .engine
                .client_name
                .clone()
                .unwrap_or_else(default_client_name),
            bypass_plugins: false,
            disable_plugins: false,
            try_hw_optimization: true,
            connecting_blocked: false,
            use_vst: true,
            debug: DebugFlags::new(),
            session_dir: session_dir.into(),
            snapshot: snapshot.into(),
            sample_rate: file.engine.sample_rate,
            buffer_size: file.engine.buffer_size,
            log_level: file.logging.level.clone(),
        }
    }

    /// Configuration with built-in defaults.
    pub fn new(session_dir: impl Into<PathBuf>, snapshot: impl Into<String>) -> Self {
        Self::from_file_config(&FileConfig::default(), session_dir, snapshot)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.backend.trim().is_empty() {
            return Err(Error::Config("backend name cannot be empty".to_string()));
        }
        if self.client_name.trim().is_empty() {
            return Err(Error::Config("client name cannot be empty".to_string()));
        }
        if self.snapshot.trim().is_empty() {
            return Err(Error::Config("snapshot name cannot be empty".to_string()));
        }
        if self.sample_rate == 0 || self.buffer_size == 0 {
            return Err(Error::Config(
                "sample rate and buffer size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default backend client name: the lowercased program name.
pub fn default_client_name() -> String {
    PROGRAM_NAME.to_lowercase()
}

/// Optional configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Engine settings
    pub engine: EngineSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl FileConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: FileConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.engine.backend.trim().is_empty() {
            return Err(Error::Config("engine.backend cannot be empty".to_string()));
        }

        if let Some(name) = &self.engine.client_name {
            if name.trim().is_empty() {
                return Err(Error::Config(
                    "engine.client_name cannot be empty".to_string(),
                ));
            }
        }

        if self.engine.sample_rate == 0 || self.engine.buffer_size == 0 {
            return Err(Error::Config(
                "engine.sample_rate and engine.buffer_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Backend name
    pub backend: String,
    /// Client name (defaults to the lowercased program name)
    pub client_name: Option<String>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            client_name: None,
            sample_rate: 48_000,
            buffer_size: 1024,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StartupConfig::new("/tmp/session", "snap");
        assert_eq!(config.backend, "Dummy");
        assert_eq!(config.client_name, "hardour");
        assert!(config.try_hw_optimization);
        assert!(config.use_vst);
        assert!(!config.connecting_blocked);
        assert!(config.debug.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_client_name_rejected() {
        let mut config = StartupConfig::new("/tmp/session", "snap");
        config.client_name = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_snapshot_rejected() {
        let config = StartupConfig::new("/tmp/session", "");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
engine:
  backend: "None (Dummy)"
  client_name: harness
  sample_rate: 44100
  buffer_size: 256

logging:
  level: debug
"#;

        let file = FileConfig::from_yaml(yaml).unwrap();
        assert_eq!(file.engine.backend, "None (Dummy)");
        assert_eq!(file.engine.client_name.as_deref(), Some("harness"));
        assert_eq!(file.engine.sample_rate, 44100);
        assert_eq!(file.logging.level, "debug");

        let config = StartupConfig::from_file_config(&file, "/s", "snap");
        assert_eq!(config.client_name, "harness");
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let file = FileConfig::from_yaml("logging:\n  level: info\n").unwrap();
        assert_eq!(file.engine, EngineSettings::default());
        assert_eq!(file.logging.level, "info");
    }

    #[test]
    fn test_invalid_buffer_size() {
        let result = FileConfig::from_yaml("engine:\n  buffer_size: 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = FileConfig::from_yaml("engine: [unclosed");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  backend: Dummy\n  sample_rate: 96000").unwrap();

        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.engine.sample_rate, 96000);
    }

    #[test]
    fn test_missing_file() {
        let result = FileConfig::from_file("/nonexistent/hardour.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
