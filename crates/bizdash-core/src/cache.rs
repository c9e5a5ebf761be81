//! Per-tab, per-week cache in front of the store.
//!
//! Switching tabs or weeks back and forth re-reads nothing that is already
//! known. Writes go into the cache first and are rolled back if the backend
//! rejects them.

use crate::error::Result;
use crate::types::Tab;
use crate::week::{Quarter, Week};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Scope {
    Week(Week),
    Year(i32),
    Quarter(Quarter),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub tab: Tab,
    pub scope: Scope,
}

impl CacheKey {
    pub fn week(tab: Tab, week: Week) -> Self {
        Self {
            tab,
            scope: Scope::Week(week),
        }
    }

    pub fn year(tab: Tab, year: i32) -> Self {
        Self {
            tab,
            scope: Scope::Year(year),
        }
    }

    pub fn quarter(tab: Tab, quarter: Quarter) -> Self {
        Self {
            tab,
            scope: Scope::Quarter(quarter),
        }
    }

    pub fn all(tab: Tab) -> Self {
        Self {
            tab,
            scope: Scope::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
pub struct TabCache {
    entries: RwLock<HashMap<CacheKey, Value>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TabCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<CacheKey, Value>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<CacheKey, Value>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let cached = self.read().get(key).cloned();
        match cached {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<()> {
        let v = serde_json::to_value(value)?;
        self.write().insert(key, v);
        Ok(())
    }

    /// Return the cached value, or call `load` once and remember its result.
    /// A failed load caches nothing.
    pub fn get_or_load<T, F>(&self, key: CacheKey, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(hit) = self.get::<T>(&key)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(tab = %key.tab, "cache hit");
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(tab = %key.tab, "cache miss");
        let loaded = load()?;
        self.put(key, &loaded)?;
        Ok(loaded)
    }

    /// Show `value` immediately, then `persist` it. On success the persisted
    /// representation replaces the optimistic one; on failure the previous
    /// entry comes back (or the key is dropped if there was none).
    pub fn put_optimistic<T, F>(&self, key: CacheKey, value: &T, persist: F) -> Result<T>
    where
        T: Serialize,
        F: FnOnce() -> Result<T>,
    {
        let optimistic = serde_json::to_value(value)?;
        let previous = self.write().insert(key, optimistic);
        match persist() {
            Ok(saved) => {
                self.put(key, &saved)?;
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(tab = %key.tab, error = %e, "write failed, rolling back cache");
                let mut entries = self.write();
                match previous {
                    Some(prev) => {
                        entries.insert(key, prev);
                    }
                    None => {
                        entries.remove(&key);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.write().remove(key).is_some()
    }

    /// Drop every entry of `tab`, whatever its scope. Returns how many went.
    pub fn invalidate_tab(&self, tab: Tab) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|k, _| k.tab != tab);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;
    use std::cell::Cell;

    fn week() -> Week {
        Week::parse("2025-01-06").unwrap()
    }

    #[test]
    fn second_read_skips_loader() {
        let cache = TabCache::new();
        let calls = Cell::new(0);
        let key = CacheKey::week(Tab::Level10, week());
        for _ in 0..3 {
            let v: String = cache
                .get_or_load(key, || {
                    calls.set(calls.get() + 1);
                    Ok("loaded".to_string())
                })
                .unwrap();
            assert_eq!(v, "loaded");
        }
        assert_eq!(calls.get(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn weeks_are_separate_entries() {
        let cache = TabCache::new();
        cache
            .put(CacheKey::week(Tab::Level10, week()), &"this week")
            .unwrap();
        let other: Option<String> = cache
            .get(&CacheKey::week(Tab::Level10, week().next()))
            .unwrap();
        assert!(other.is_none());
    }

    #[test]
    fn failed_load_caches_nothing() {
        let cache = TabCache::new();
        let key = CacheKey::all(Tab::Issues);
        let err = cache
            .get_or_load::<Vec<String>, _>(key, || Err(DashError::not_found("issues", "x")))
            .unwrap_err();
        assert!(matches!(err, DashError::NotFound { .. }));
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn optimistic_write_keeps_persisted_value() {
        let cache = TabCache::new();
        let key = CacheKey::year(Tab::Vto, 2025);
        let saved = cache
            .put_optimistic(key, &"draft", || Ok("draft (saved)"))
            .unwrap();
        assert_eq!(saved, "draft (saved)");
        let v: Option<String> = cache.get(&key).unwrap();
        assert_eq!(v.as_deref(), Some("draft (saved)"));
    }

    #[test]
    fn optimistic_value_visible_during_persist() {
        let cache = TabCache::new();
        let key = CacheKey::week(Tab::Level10, week());
        cache
            .put_optimistic(key, &"new", || {
                let during: Option<String> = cache.get(&key).unwrap();
                assert_eq!(during.as_deref(), Some("new"));
                Ok("new")
            })
            .unwrap();
    }

    #[test]
    fn failed_write_restores_previous() {
        let cache = TabCache::new();
        let key = CacheKey::week(Tab::Level10, week());
        cache.put(key, &"old").unwrap();
        let res: Result<&str> = cache.put_optimistic(key, &"new", || {
            Err(DashError::Backend {
                status: 500,
                message: "down".into(),
            })
        });
        assert!(res.is_err());
        let v: Option<String> = cache.get(&key).unwrap();
        assert_eq!(v.as_deref(), Some("old"));
    }

    #[test]
    fn failed_write_without_previous_removes_key() {
        let cache = TabCache::new();
        let key = CacheKey::year(Tab::Vto, 2026);
        let res: Result<&str> =
            cache.put_optimistic(key, &"new", || Err(DashError::invalid("year", "bad")));
        assert!(res.is_err());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn invalidate_tab_only_touches_that_tab() {
        let cache = TabCache::new();
        let q = Quarter::parse("2025-Q1").unwrap();
        cache.put(CacheKey::quarter(Tab::Rocks, q), &1).unwrap();
        cache.put(CacheKey::quarter(Tab::Rocks, q.next()), &2).unwrap();
        cache.put(CacheKey::all(Tab::Issues), &3).unwrap();
        assert_eq!(cache.invalidate_tab(Tab::Rocks), 2);
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.invalidate(&CacheKey::all(Tab::Issues)));
        assert!(!cache.invalidate(&CacheKey::all(Tab::Issues)));
    }
}
