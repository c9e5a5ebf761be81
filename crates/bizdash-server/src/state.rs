use bizdash_core::cache::TabCache;
use bizdash_core::config::Config;
use bizdash_core::repository::Repository;
use bizdash_core::store::Store;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub cache: Arc<TabCache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            repo: Repository::new(store),
            cache: Arc::new(TabCache::new()),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdash_core::store::MemoryStore;

    #[test]
    fn new_state_starts_with_empty_cache() {
        let state = AppState::new(Arc::new(MemoryStore::new()), Config::default());
        assert_eq!(state.cache.stats().entries, 0);
        assert_eq!(state.repo.store().name(), "memory");
        assert_eq!(state.config.server.port, 3141);
    }
}
