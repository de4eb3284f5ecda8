use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

pub const CONFIG_ENV: &str = "DREA_CONFIG";
pub const TAIL_MS_ENV: &str = "DREA_TAIL_MS";

pub fn parse_env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{name} must be an unsigned integer")),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(anyhow!("{name} invalid: {err}")),
    }
}

/// Unset and blank both mean "no path".
pub fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

/// An explicit flag wins over the environment.
pub fn config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| env_path(CONFIG_ENV))
}

pub fn tail_ms_from_env() -> Result<u64> {
    parse_env_u64(TAIL_MS_ENV, 0)
}
