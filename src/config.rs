// Where the connection list lives. The core types take explicit paths;
// only the front-end resolves the per-user default.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable that overrides the connection file location.
pub const CONNECTIONS_ENV: &str = "QUICK_CONTENT_CONNECTIONS";

pub const APP_DIR: &str = "OptimizelyQuickContent";
pub const CONNECTIONS_FILE: &str = "connections.json";

/// Path of the connection list: `QUICK_CONTENT_CONNECTIONS` if set,
/// otherwise `<data dir>/OptimizelyQuickContent/connections.json`.
pub fn connections_path() -> Result<PathBuf> {
    resolve(std::env::var_os(CONNECTIONS_ENV).map(PathBuf::from), dirs::data_dir())
}

fn resolve(env_override: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let base = data_dir.context("Could not determine the user data directory")?;
    Ok(base.join(APP_DIR).join(CONNECTIONS_FILE))
}
