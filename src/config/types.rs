//! Core configuration types.
//! - Config holds normalizer and logging settings with host defaults.
//! - LogLevel and CapabilityMode parse from the strings used in config.xml.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::normalize::{Capability, LongPathNormalizer, PrefixPolicy, WorkingDir};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// Adds per-path rewrites
    Info,
    /// Adds per-call forwarding traces
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Configured capability: follow the host, or force it either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapabilityMode {
    #[default]
    Auto,
    /// Always apply the legacy-limit rules (useful for testing on any host).
    On,
    /// Never rewrite paths.
    Off,
}

impl CapabilityMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "detect" => Some(CapabilityMode::Auto),
            "on" | "true" | "legacy" => Some(CapabilityMode::On),
            "off" | "false" | "unrestricted" => Some(CapabilityMode::Off),
            _ => None,
        }
    }

    pub fn resolve(self) -> Capability {
        match self {
            CapabilityMode::Auto => Capability::detect(),
            CapabilityMode::On => Capability::LegacyPathLimit,
            CapabilityMode::Off => Capability::Unrestricted,
        }
    }
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityMode::Auto => "auto",
            CapabilityMode::On => "on",
            CapabilityMode::Off => "off",
        };
        f.write_str(s)
    }
}

impl FromStr for CapabilityMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid capability: '{s}' (expected auto, on or off)"))
    }
}

/// Settings for building a forwarder and its logging.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub capability: CapabilityMode,
    pub prefix_policy: PrefixPolicy,
    /// Fixed base for relative paths; the process working directory when unset.
    pub working_dir: Option<String>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// The normalizer these settings describe.
    pub fn normalizer(&self) -> LongPathNormalizer {
        let working_dir = match &self.working_dir {
            Some(dir) => WorkingDir::Fixed(dir.clone()),
            None => WorkingDir::Process,
        };
        LongPathNormalizer::new()
            .with_capability(self.capability.resolve())
            .with_working_dir(working_dir)
            .with_policy(self.prefix_policy)
    }
}
