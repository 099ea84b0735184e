//! Config validation logic.
//! Checks that a fixed working directory can serve as a base and that the log
//! file location is safe to open.

use anyhow::{Result, bail};
use tracing::debug;

use super::paths::path_has_symlink_ancestor;
use super::types::Config;
use crate::normalize::is_windows_absolute;

impl Config {
    /// Validate settings that would otherwise fail silently at use time.
    pub fn validate(&self) -> Result<()> {
        // A relative base would leave every relative input unresolved.
        if let Some(dir) = &self.working_dir {
            if !is_windows_absolute(dir) {
                bail!(
                    "working_dir '{}' must be an absolute Windows path (C:\\... or \\\\server\\share\\...)",
                    dir
                );
            }
        }

        if let Some(log) = &self.log_file {
            if path_has_symlink_ancestor(log)? {
                bail!("log_file '{}' has a symlinked ancestor", log.display());
            }
        }

        debug!(capability = %self.capability, log_level = %self.log_level, "config validated");
        Ok(())
    }
}
