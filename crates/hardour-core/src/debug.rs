//! Debug flags selected with `-D`.
//!
//! Each flag names a subsystem whose `tracing` target is raised to `debug`.

use std::fmt;

use crate::{Error, Result};

/// A single debuggable subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugFlag {
    /// Startup sequencing
    Startup,
    /// Shutdown sequencing
    Shutdown,
    /// OS signal handling and the termination channel
    Signals,
    /// Engine and backend
    Engine,
    /// Session construction
    Session,
    /// Transport requests
    Transport,
    /// Port registration and connection
    Ports,
    /// Diagnostic pass-through
    Diagnostics,
}

impl DebugFlag {
    /// Every flag, in listing order.
    pub const ALL: [DebugFlag; 8] = [
        DebugFlag::Startup,
        DebugFlag::Shutdown,
        DebugFlag::Signals,
        DebugFlag::Engine,
        DebugFlag::Session,
        DebugFlag::Transport,
        DebugFlag::Ports,
        DebugFlag::Diagnostics,
    ];

    /// Flag name as accepted by `-D`.
    pub fn name(&self) -> &'static str {
        match self {
            DebugFlag::Startup => "Startup",
            DebugFlag::Shutdown => "Shutdown",
            DebugFlag::Signals => "Signals",
            DebugFlag::Engine => "Engine",
            DebugFlag::Session => "Session",
            DebugFlag::Transport => "Transport",
            DebugFlag::Ports => "Ports",
            DebugFlag::Diagnostics => "Diagnostics",
        }
    }

    /// `tracing` target raised to `debug` when this flag is set.
    pub fn target(&self) -> &'static str {
        match self {
            DebugFlag::Startup => "hardour::startup",
            DebugFlag::Shutdown => "hardour::shutdown",
            DebugFlag::Signals => "hardour::signals",
            DebugFlag::Engine => "hardour::engine",
            DebugFlag::Session => "hardour::session",
            DebugFlag::Transport => "hardour::transport",
            DebugFlag::Ports => "hardour::ports",
            DebugFlag::Diagnostics => "hardour::diagnostics",
        }
    }

    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl fmt::Display for DebugFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of enabled debug flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugFlags(u32);

impl DebugFlags {
    /// Empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Every flag enabled.
    pub fn all() -> Self {
        DebugFlag::ALL
            .iter()
            .fold(Self::new(), |acc, flag| acc.with(*flag))
    }

    /// Parse a `-D` option string.
    ///
    /// Tokens are separated by commas or whitespace. `all` enables every flag;
    /// any other token is a case-insensitive prefix that enables every flag it
    /// matches. `list` and tokens matching nothing are errors; the `list` error
    /// carries the available names.
    pub fn parse(options: &str) -> Result<Self> {
        let mut flags = Self::new();
        let tokens: Vec<&str> = options
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(Error::DebugOptions("no debug options given".to_string()));
        }

        for token in tokens {
            if token.eq_ignore_ascii_case("list") {
                return Err(Error::DebugOptions(Self::listing()));
            }
            if token.eq_ignore_ascii_case("all") {
                flags = flags.union(Self::all());
                continue;
            }

            let lowered = token.to_ascii_lowercase();
            let mut matched = false;
            for flag in DebugFlag::ALL {
                if flag.name().to_ascii_lowercase().starts_with(&lowered) {
                    flags = flags.with(flag);
                    matched = true;
                }
            }
            if !matched {
                return Err(Error::DebugOptions(format!(
                    "unknown debug option '{token}' (use \"-D list\" to see available options)"
                )));
            }
        }

        Ok(flags)
    }

    /// Human-readable list of available flags.
    pub fn listing() -> String {
        let mut out = String::from("The following debug options are available:\n");
        for flag in DebugFlag::ALL {
            out.push('\t');
            out.push_str(flag.name());
            out.push('\n');
        }
        out
    }

    /// Return a copy with `flag` enabled.
    pub fn with(self, flag: DebugFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `flag` is enabled.
    pub fn contains(&self, flag: DebugFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Whether no flag is enabled.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled flags in listing order.
    pub fn iter(&self) -> impl Iterator<Item = DebugFlag> + '_ {
        DebugFlag::ALL.into_iter().filter(|f| self.contains(*f))
    }

    /// `EnvFilter` directives for the enabled flags, e.g. `hardour::startup=debug`.
    pub fn directives(&self) -> Vec<String> {
        self.iter()
            .map(|flag| format!("{}=debug", flag.target()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_single() {
        let flags = DebugFlags::parse("Startup").unwrap();
        assert!(flags.contains(DebugFlag::Startup));
        assert!(!flags.contains(DebugFlag::Shutdown));
    }

    #[test]
    fn test_parse_case_insensitive_prefix() {
        let flags = DebugFlags::parse("sig,TRANS").unwrap();
        assert!(flags.contains(DebugFlag::Signals));
        assert!(flags.contains(DebugFlag::Transport));
        assert_eq!(flags.iter().count(), 2);
    }

    #[test]
    fn test_ambiguous_prefix_enables_every_match() {
        // "s" matches Startup, Shutdown, Signals and Session
        let flags = DebugFlags::parse("s").unwrap();
        assert!(flags.contains(DebugFlag::Startup));
        assert!(flags.contains(DebugFlag::Shutdown));
        assert!(flags.contains(DebugFlag::Signals));
        assert!(flags.contains(DebugFlag::Session));
        assert!(!flags.contains(DebugFlag::Engine));
    }

    #[test]
    fn test_parse_all() {
        assert_eq!(DebugFlags::parse("all").unwrap(), DebugFlags::all());
    }

    #[test]
    fn test_parse_unknown_fails() {
        let err = DebugFlags::parse("badoption").unwrap_err();
        assert!(matches!(err, Error::DebugOptions(_)));
        assert!(err.to_string().contains("badoption"));
    }

    #[test]
    fn test_parse_list_fails_with_listing() {
        let err = DebugFlags::parse("list").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Startup"));
        assert!(msg.contains("Diagnostics"));
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(DebugFlags::parse("").is_err());
        assert!(DebugFlags::parse(" , ").is_err());
    }

    #[test]
    fn test_directives() {
        let flags = DebugFlags::new()
            .with(DebugFlag::Startup)
            .with(DebugFlag::Ports);
        assert_eq!(
            flags.directives(),
            vec![
                "hardour::startup=debug".to_string(),
                "hardour::ports=debug".to_string()
            ]
        );
    }

    proptest! {
        /// Any full flag name, in any case, parses to exactly that flag.
        #[test]
        fn full_names_parse_exactly(idx in 0usize..8, upper in any::<bool>()) {
            let flag = DebugFlag::ALL[idx];
            let name = if upper {
                flag.name().to_ascii_uppercase()
            } else {
                flag.name().to_ascii_lowercase()
            };
            let flags = DebugFlags::parse(&name).unwrap();
            prop_assert!(flags.contains(flag));
            prop_assert_eq!(flags.iter().count(), 1);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_never_panics(input in ".{0,40}") {
            let _ = DebugFlags::parse(&input);
        }
    }
}
