//! Options handed to collaborators during startup.

use std::path::PathBuf;

use hardour_core::StartupConfig;

/// Process-wide library initialization options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Enable the VST plugin-format backend
    pub use_vst: bool,
    /// Use hardware-specific optimized code paths
    pub try_hw_optimization: bool,
    /// Directory holding message catalogs, if any
    pub locale_dir: Option<PathBuf>,
}

impl From<&StartupConfig> for LibraryOptions {
    fn from(config: &StartupConfig) -> Self {
        Self {
            use_vst: config.use_vst,
            try_hw_optimization: config.try_hw_optimization,
            locale_dir: option_env!("HARDOUR_LOCALEDIR").map(PathBuf::from),
        }
    }
}

/// Options applied when binding a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Do not connect any ports automatically
    pub connecting_blocked: bool,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
}

impl From<&StartupConfig> for EngineOptions {
    fn from(config: &StartupConfig) -> Self {
        Self {
            connecting_blocked: config.connecting_blocked,
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            connecting_blocked: false,
            sample_rate: 48_000,
            buffer_size: 1024,
        }
    }
}

/// Options applied to a session at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// Bypass every loaded plugin
    pub bypass_all_plugins: bool,
    /// Disable every loaded plugin
    pub disable_all_plugins: bool,
}

impl From<&StartupConfig> for SessionOptions {
    fn from(config: &StartupConfig) -> Self {
        Self {
            bypass_all_plugins: config.bypass_plugins,
            disable_all_plugins: config.disable_plugins,
        }
    }
}

/// A named action triggered from a control surface or UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiAction {
    /// Action group, e.g. `Common`
    pub group: String,
    /// Action item within the group, e.g. `Quit`
    pub item: String,
}

impl UiAction {
    /// Create a new action.
    pub fn new(group: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            item: item.into(),
        }
    }

    /// The quit action (`Common`/`Quit`).
    pub fn quit() -> Self {
        Self::new("Common", "Quit")
    }

    /// Whether this action asks the process to quit.
    pub fn is_quit(&self) -> bool {
        self.group == "Common" && self.item == "Quit"
    }
}
