//! Tracing subscriber setup.

use anyhow::Context;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use hardour_core::StartupConfig;

/// Filter from `RUST_LOG`, else the configured level, plus one `debug`
/// directive per enabled debug flag.
pub fn env_filter(config: &StartupConfig) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;
    for directive in config.debug.directives() {
        filter = filter.add_directive(
            directive
                .parse::<Directive>()
                .with_context(|| format!("invalid log directive '{directive}'"))?,
        );
    }
    Ok(filter)
}

/// Install the global subscriber. Logs go to standard error; standard output
/// carries only diagnostic pass-through.
pub fn init_logging(config: &StartupConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardour_core::DebugFlags;

    #[test]
    fn test_debug_flags_become_directives() {
        let mut config = StartupConfig::new("/s", "snap");
        config.debug = DebugFlags::parse("startup,signals").unwrap();
        let filter = env_filter(&config).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("hardour::startup=debug"), "{rendered}");
        assert!(rendered.contains("hardour::signals=debug"), "{rendered}");
    }

    #[test]
    fn test_bad_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let mut config = StartupConfig::new("/s", "snap");
        config.log_level = "hardour=loud".to_string();
        assert!(env_filter(&config).is_err());
    }
}
