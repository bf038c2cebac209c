//! Command-line surface.
//!
//! clap does the tokenizing; help and version output use the fixed texts
//! below rather than clap's generated ones.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use hardour_core::{DebugFlags, Error, FileConfig, Result, StartupConfig, PROGRAM_NAME};

/// Build revision shown in the version banner.
pub const REVISION: &str = match option_env!("HARDOUR_REVISION") {
    Some(revision) => revision,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Parser, Debug)]
#[command(name = "hardour", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Show version information
    #[arg(short = 'v', long)]
    version: bool,

    /// Print usage
    #[arg(short = 'h', long)]
    help: bool,

    /// Backend client name
    #[arg(short = 'c', long = "name", value_name = "NAME")]
    name: Option<String>,

    /// Audio/MIDI backend to use
    #[arg(short = 'b', long, value_name = "BACKEND")]
    backend: Option<String>,

    /// Bypass all plugins in the session
    #[arg(short = 'B', long)]
    bypass_plugins: bool,

    /// Disable all plugins in the session
    #[arg(short = 'd', long)]
    disable_plugins: bool,

    /// Debug flags, may be repeated
    #[arg(short = 'D', long, value_name = "OPTIONS")]
    debug: Vec<String>,

    /// Disable hardware-specific optimizations
    #[arg(short = 'O', long)]
    no_hw_optimizations: bool,

    /// Do not connect any ports at startup
    #[arg(short = 'P', long)]
    no_connect_ports: bool,

    /// Do not use VST support
    #[arg(short = 'V', long)]
    novst: bool,

    /// YAML configuration file
    #[arg(short = 'C', long, value_name = "FILE", env = "HARDOUR_CONFIG")]
    config: Option<PathBuf>,

    /// Halt the dummy backend after this many seconds
    #[arg(long, value_name = "SECS")]
    halt_after: Option<f64>,

    /// DIR SNAPSHOT_NAME
    #[arg(value_name = "ARGS")]
    positional: Vec<String>,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Print usage and exit 0
    Help,
    /// Print the version banner and exit 0
    Version,
    /// Load and run a session
    Run(Box<RunOptions>),
}

/// Everything needed to run a session.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Startup configuration
    pub config: StartupConfig,
    /// Halt the dummy backend after this long
    pub halt_after: Option<Duration>,
}

/// Parse a full argument vector, program name first.
pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command()
        .try_get_matches_from(args)
        .map_err(usage_error)?;
    let cli = Cli::from_arg_matches(&matches).map_err(usage_error)?;
    cli.into_invocation(&matches)
}

fn usage_error(e: clap::Error) -> Error {
    let message = e.to_string();
    let first = message.lines().next().unwrap_or_default();
    Error::Usage(first.trim_start_matches("error: ").to_string())
}

impl Cli {
    /// Options take effect in argv order: the first `-v` or `-h` ends the
    /// run, and only `-D` values before it are checked.
    fn into_invocation(self, matches: &ArgMatches) -> Result<Invocation> {
        let early_exit = [
            (self.version, "version", Invocation::Version),
            (self.help, "help", Invocation::Help),
        ]
        .into_iter()
        .filter(|(present, _, _)| *present)
        .map(|(_, id, invocation)| (matches.index_of(id).unwrap_or(0), invocation))
        .min_by_key(|(index, _)| *index);
        let cutoff = early_exit.as_ref().map_or(usize::MAX, |(index, _)| *index);

        let mut debug = DebugFlags::new();
        let indices = matches.indices_of("debug").into_iter().flatten();
        for (options, index) in self.debug.iter().zip(indices) {
            if index > cutoff {
                break;
            }
            debug = debug.union(DebugFlags::parse(options)?);
        }
        if let Some((_, invocation)) = early_exit {
            return Ok(invocation);
        }

        let [dir, snapshot]: [String; 2] = self.positional.try_into().map_err(|p: Vec<String>| {
            Error::Usage(format!(
                "expected DIR and SNAPSHOT_NAME, got {} argument(s)",
                p.len()
            ))
        })?;

        let file = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        let mut config = StartupConfig::from_file_config(&file, dir, snapshot);
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(name) = self.name {
            config.client_name = name;
        }
        config.bypass_plugins = self.bypass_plugins;
        config.disable_plugins = self.disable_plugins;
        config.try_hw_optimization = !self.no_hw_optimizations;
        config.connecting_blocked = self.no_connect_ports;
        // -V is accepted everywhere but only honoured with VST support built in.
        config.use_vst = !(cfg!(feature = "vst") && self.novst);
        config.debug = debug;
        config.validate()?;

        let halt_after = self
            .halt_after
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| Error::Usage(format!("invalid --halt-after value {secs}: {e}")))
            })
            .transpose()?;

        Ok(Invocation::Run(Box::new(RunOptions { config, halt_after })))
    }
}

/// Version banner.
pub fn version_text() -> String {
    format!(
        "{}{} (built using {} and rustc)",
        PROGRAM_NAME,
        env!("CARGO_PKG_VERSION"),
        REVISION
    )
}

/// Usage text.
pub fn usage_text() -> String {
    let mut text = String::from(
        "Usage: hardour [OPTIONS]... DIR SNAPSHOT_NAME\n\n\
  DIR                         Directory/Folder to load session from\n\
  SNAPSHOT_NAME               Name of session/snapshot to load (without .ardour at end)\n\
  -v, --version               Show version information\n\
  -h, --help                  Print this message\n\
  -c, --name <name>           Use a specific backend client name, default is hardour\n\
  -b, --backend <name>        Audio/MIDI backend to use, default is Dummy\n\
  -B, --bypass-plugins        Bypass all plugins in an existing session\n\
  -d, --disable-plugins       Disable all plugins in an existing session\n\
  -D, --debug <options>       Set debug flags. Use \"-D list\" to see available options\n\
  -O, --no-hw-optimizations   Disable h/w specific optimizations\n\
  -P, --no-connect-ports      Do not connect any ports at startup\n",
    );
    if cfg!(feature = "vst") {
        text.push_str("  -V, --novst                 Do not use VST support\n");
    }
    text.push_str(
        "  -C, --config <file>         Read engine and logging settings from a YAML file\n\
  --halt-after <secs>         Stop the dummy backend after the given time\n",
    );
    text
}
