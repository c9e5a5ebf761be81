use crate::error::{DashError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Hosted relational backend exposing a PostgREST interface.
    Rest {
        url: String,
        #[serde(default)]
        api_key: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// JSON files on local disk.
    File {
        #[serde(default = "paths::default_data_dir")]
        dir: PathBuf,
    },
    Memory,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::File {
            dir: paths::default_data_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_port() -> u16 {
    3141
}

fn default_open_browser() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: default_open_browser(),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Associations renewing within this many days are flagged.
    #[serde(default = "default_renewal_window")]
    pub renewal_window_days: i64,
    /// How many events the upcoming list shows.
    #[serde(default = "default_upcoming_events")]
    pub upcoming_events: usize,
}

/// Ten years. Longer windows flag every membership.
pub const MAX_RENEWAL_WINDOW_DAYS: i64 = 3650;

fn default_renewal_window() -> i64 {
    60
}

fn default_upcoming_events() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            renewal_window_days: default_renewal_window(),
            upcoming_events: default_upcoming_events(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashError::ConfigMissing(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load from the resolved location, or fall back to defaults when no
    /// config file exists anywhere.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>)> {
        match paths::resolve_config_path(explicit, cwd) {
            Some(path) => {
                let cfg = Self::load(&path)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok((cfg, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Write a fresh default config; refuses to clobber an existing file.
    pub fn init(path: &Path) -> Result<Self> {
        let cfg = Self::default();
        let data = serde_yaml::to_string(&cfg)?;
        if !crate::io::write_if_missing(path, data.as_bytes())? {
            return Err(DashError::ConfigExists(path.display().to_string()));
        }
        Ok(cfg)
    }

    /// Environment overrides for the hosted backend. A URL switches the
    /// backend to REST even if the file named another one.
    pub fn apply_overrides(&mut self, url: Option<String>, api_key: Option<String>) {
        if let Some(url) = url {
            let (key, timeout) = match &self.backend {
                BackendConfig::Rest {
                    api_key,
                    timeout_secs,
                    ..
                } => (api_key.clone(), *timeout_secs),
                _ => (String::new(), default_timeout_secs()),
            };
            self.backend = BackendConfig::Rest {
                url,
                api_key: key,
                timeout_secs: timeout,
            };
        }
        if let (Some(new_key), BackendConfig::Rest { api_key, .. }) = (api_key, &mut self.backend)
        {
            *api_key = new_key;
        }
    }

    /// Copy with secrets masked, safe to print or serve.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if let BackendConfig::Rest { api_key, .. } = &mut cfg.backend {
            if !api_key.is_empty() {
                *api_key = "********".to_string();
            }
        }
        cfg
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let BackendConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } = &self.backend
        {
            if url.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "backend.url is empty".to_string(),
                });
            } else if !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("backend.url '{url}' is not https"),
                });
            }
            if api_key.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "backend.api_key is empty; set BIZDASH_API_KEY".to_string(),
                });
            }
            if *timeout_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "backend.timeout_secs is 0; every request will time out"
                        .to_string(),
                });
            }
        }

        let window = self.dashboard.renewal_window_days;
        if window <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "dashboard.renewal_window_days should be positive".to_string(),
            });
        } else if window > MAX_RENEWAL_WINDOW_DAYS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "dashboard.renewal_window_days is {window}; at most {MAX_RENEWAL_WINDOW_DAYS} is supported"
                ),
            });
        }

        if self.dashboard.upcoming_events == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "dashboard.upcoming_events is 0; the upcoming list will be empty"
                    .to_string(),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("backend:\n  type: memory\n").unwrap();
        assert_eq!(cfg.backend, BackendConfig::Memory);
        assert_eq!(cfg.server.port, 3141);
        assert_eq!(cfg.dashboard.renewal_window_days, 60);
    }

    #[test]
    fn rest_backend_parses() {
        let yaml = "backend:\n  type: rest\n  url: https://db.example.com\n  api_key: abc\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.backend,
            BackendConfig::Rest {
                url: "https://db.example.com".into(),
                api_key: "abc".into(),
                timeout_secs: 15,
            }
        );
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_flags_missing_key_and_plain_http() {
        let mut cfg = Config::default();
        cfg.apply_overrides(Some("http://localhost:54321".into()), None);
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("api_key")));
        assert!(warnings.iter().any(|w| w.message.contains("not https")));
    }

    #[test]
    fn validate_flags_absurd_renewal_window() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_empty());
        cfg.dashboard.renewal_window_days = 100_000_000;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("renewal_window_days")));
        cfg.dashboard.renewal_window_days = MAX_RENEWAL_WINDOW_DAYS;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn overrides_keep_existing_key() {
        let mut cfg = Config {
            backend: BackendConfig::Rest {
                url: "https://old".into(),
                api_key: "k1".into(),
                timeout_secs: 3,
            },
            ..Config::default()
        };
        cfg.apply_overrides(Some("https://new".into()), None);
        assert_eq!(
            cfg.backend,
            BackendConfig::Rest {
                url: "https://new".into(),
                api_key: "k1".into(),
                timeout_secs: 3,
            }
        );
        cfg.apply_overrides(None, Some("k2".into()));
        assert!(matches!(cfg.backend, BackendConfig::Rest { ref api_key, .. } if api_key == "k2"));
    }

    #[test]
    fn redacted_masks_key() {
        let mut cfg = Config::default();
        cfg.apply_overrides(Some("https://x".into()), Some("secret".into()));
        let shown = serde_json::to_string(&cfg.redacted()).unwrap();
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bizdash.yaml");
        Config::init(&path).unwrap();
        assert!(matches!(
            Config::init(&path),
            Err(DashError::ConfigExists(_))
        ));
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 3141);
    }

    #[test]
    fn load_missing_reports_path() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, DashError::ConfigMissing(_)));
    }
}
