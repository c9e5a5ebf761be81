use anyhow::Context as _;
use bizdash_core::config::Config;
use bizdash_core::repository::Repository;
use bizdash_core::store::open_store;
use std::path::{Path, PathBuf};

/// Resolved config plus where it came from.
pub struct Context {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn load(
        explicit: Option<&Path>,
        backend_url: Option<String>,
        api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        let (mut config, config_path) =
            Config::resolve(explicit, &cwd).context("failed to load config")?;
        config.apply_overrides(backend_url, api_key);
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Open the configured backend.
    pub fn repo(&self) -> anyhow::Result<Repository> {
        let store = open_store(&self.config.backend).context("failed to open backend")?;
        Ok(Repository::new(store))
    }
}
