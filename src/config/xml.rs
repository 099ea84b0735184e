//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Unknown elements are rejected so typos surface instead of being ignored.
//! - A missing file means defaults; loading never creates anything.

use anyhow::{Context, Result, anyhow};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{CapabilityMode, Config, LogLevel};
use crate::normalize::PrefixPolicy;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    capability: Option<String>,
    prefix_policy: Option<String>,
    working_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

fn trimmed(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config. Bad values are errors, empty ones mean "default".
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = trimmed(parsed.capability.as_deref()) {
        cfg.capability = s.parse::<CapabilityMode>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = trimmed(parsed.prefix_policy.as_deref()) {
        cfg.prefix_policy =
            PrefixPolicy::parse(s).ok_or_else(|| anyhow!("invalid prefix_policy: '{s}' (expected always or when_long)"))?;
    }
    cfg.working_dir = trimmed(parsed.working_dir.as_deref()).map(str::to_owned);
    if let Some(s) = trimmed(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    cfg.log_file = trimmed(parsed.log_file.as_deref()).map(PathBuf::from);

    Ok(cfg)
}

/// Parse config XML text.
pub fn parse_config_xml(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;
    xml_to_config(parsed)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let cfg = parse_config_xml(&contents).with_context(|| format!("load config '{}'", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config '{}'", path.display()))?;
    Ok(cfg)
}

/// Load the config from `LONG_PATH_FS_CONFIG` or the default location.
/// A missing file yields defaults.
pub fn load_config() -> Result<Config> {
    let Some(path) = default_config_path() else {
        debug!("no config directory on this host; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "config file not found; using defaults");
        return Ok(Config::default());
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let cfg = parse_config_xml("<config></config>").unwrap();
        assert_eq!(cfg.capability, CapabilityMode::Auto);
        assert_eq!(cfg.prefix_policy, PrefixPolicy::Always);
        assert_eq!(cfg.working_dir, None);
        assert_eq!(cfg.log_level, LogLevel::Normal);
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn all_fields_are_read() {
        let xml = r"<config>
  <capability>on</capability>
  <prefix_policy>when_long</prefix_policy>
  <working_dir> C:\work </working_dir>
  <log_level>debug</log_level>
  <log_file>/tmp/lpfs.log</log_file>
</config>";
        let cfg = parse_config_xml(xml).unwrap();
        assert_eq!(cfg.capability, CapabilityMode::On);
        assert_eq!(cfg.prefix_policy, PrefixPolicy::WhenLong);
        assert_eq!(cfg.working_dir.as_deref(), Some(r"C:\work"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/lpfs.log")));
    }

    #[test]
    fn unknown_element_is_rejected() {
        assert!(parse_config_xml("<config><colour>red</colour></config>").is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse_config_xml("<config><capability>maybe</capability></config>").is_err());
        assert!(parse_config_xml("<config><prefix_policy>never</prefix_policy></config>").is_err());
        assert!(parse_config_xml("<config><log_level>loud</log_level></config>").is_err());
    }

    #[test]
    fn empty_log_file_means_none() {
        let cfg = parse_config_xml("<config><log_file>   </log_file></config>").unwrap();
        assert_eq!(cfg.log_file, None);
    }
}
