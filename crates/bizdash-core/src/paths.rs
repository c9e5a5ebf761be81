use crate::error::{DashError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "bizdash.yaml";
pub const HOME_DIR: &str = ".bizdash";
pub const HOME_CONFIG_FILE: &str = "config.yaml";
pub const DATA_DIR: &str = "data";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn home_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(HOME_DIR))
        .ok_or(DashError::HomeNotFound)
}

pub fn home_config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(HOME_CONFIG_FILE))
}

/// Default directory for the file backend.
pub fn default_data_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(DATA_DIR))
        .unwrap_or_else(|_| PathBuf::from(HOME_DIR).join(DATA_DIR))
}

pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Locate the config file.
///
/// Priority:
/// 1. `--config` flag / `BIZDASH_CONFIG` env var (passed in as `explicit`)
/// 2. `bizdash.yaml` in `cwd`
/// 3. `~/.bizdash/config.yaml`
///
/// Returns `None` when nothing exists and defaults should apply. An explicit
/// path is returned even if missing so the caller can report it.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let local = local_config_path(cwd);
    if local.is_file() {
        return Some(local);
    }
    home_config_path().ok().filter(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("elsewhere.yaml");
        let found = resolve_config_path(Some(&explicit), dir.path());
        assert_eq!(found, Some(explicit));
    }

    #[test]
    fn finds_local_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "backend:\n  type: memory\n").unwrap();
        let found = resolve_config_path(None, dir.path());
        assert_eq!(found, Some(dir.path().join(CONFIG_FILE)));
    }
}
