use anyhow::{Context, Result};
use std::path::PathBuf;

/// Base directory for smsrelay state: `$SMSRELAY_HOME`, else `~/.smsrelay`.
pub fn get_smsrelay_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("SMSRELAY_HOME") {
        return Ok(PathBuf::from(home));
    }
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".smsrelay"))
}
