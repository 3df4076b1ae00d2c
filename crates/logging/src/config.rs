//! crates/logging/src/config.rs
//! Verbosity configuration mapping `-v` counts onto tracing levels.

use std::fmt;

/// Severity threshold understood by the subscriber initialiser.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Informational output.
    Info,
    /// Dispatch and capability decisions.
    Debug,
    /// Per-level Merkle reduction events.
    Trace,
}

impl Level {
    /// Directive string accepted by `EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity configuration for the engine binaries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Default level applied to every target.
    pub level: Level,
    /// Whether the subscriber prints event targets.
    pub show_targets: bool,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (0-3+).
    ///
    /// Zero keeps warnings only; each additional `-v` raises the threshold one
    /// step, saturating at [`Level::Trace`]. Targets are shown from level 2 on.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let level = match level {
            0 => Level::Warn,
            1 => Level::Info,
            2 => Level::Debug,
            _ => Level::Trace,
        };

        Self {
            level,
            show_targets: level >= Level::Debug,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directive(&self) -> &'static str {
        self.level.as_str()
    }
}
