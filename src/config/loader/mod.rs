use crate::config::Config;
use crate::utils::get_smsrelay_home;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use tracing::warn;

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_smsrelay_home()?.join("config.json"))
}

/// Load configuration: defaults, then the JSON file (if present), then
/// environment overrides, then validation.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    load_config_with(config_path, &|key| std::env::var(key).ok())
}

/// Same as [`load_config`] but with an injectable environment lookup.
pub fn load_config_with(
    config_path: Option<&Path>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = read_config_file(config_path)?;

    // Env always wins over the file (useful for containers and PaaS)
    crate::config::credentials::apply_overrides_with(&mut config, lookup);

    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

fn read_config_file(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    if !path.exists() {
        if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?;

    // Check file permissions (unix only, warn-only)
    check_file_permissions(path);

    Ok(config)
}

/// Warn if the config file has overly permissive permissions. It holds API keys.
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                "config file {} has permissions {:o}; recommend 0600",
                path.display(),
                mode & 0o777
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {
    // Permission checks only apply on unix systems
}
