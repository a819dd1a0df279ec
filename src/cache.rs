use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 2;
const CACHE_DIR: &str = "h2h_dashboard";

pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    stored_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile<V> {
    version: u32,
    entries: HashMap<String, CacheEntry<V>>,
}

/// Keyed store whose entries expire `ttl` after they were inserted.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str, clock: &dyn Clock) -> Option<V> {
        let entry = self.entries.get(key)?;
        let age = clock.now_secs().saturating_sub(entry.stored_at);
        if age >= self.ttl.as_secs() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V, clock: &dyn Clock) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: clock.now_secs(),
            },
        );
    }

    /// Drop expired entries so they are not written back to disk.
    pub fn prune(&mut self, clock: &dyn Clock) {
        let now = clock.now_secs();
        let ttl = self.ttl.as_secs();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.stored_at) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Serialize + DeserializeOwned> TtlCache<V> {
    /// Load a persisted cache; a missing, unreadable or stale-version file
    /// yields an empty cache.
    pub fn load(path: &Path, ttl: Duration) -> Self {
        let mut cache = Self::new(ttl);
        let Ok(raw) = fs::read_to_string(path) else {
            return cache;
        };
        let Ok(file) = serde_json::from_str::<CacheFile<V>>(&raw) else {
            log::debug!("ignoring unreadable cache file {}", path.display());
            return cache;
        };
        if file.version != CACHE_VERSION {
            return cache;
        }
        cache.entries = file.entries;
        cache
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        let file = CacheFile {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(&file).context("serialize season cache")?;
        fs::write(&tmp, json).context("write season cache")?;
        fs::rename(&tmp, path).context("swap season cache")?;
        Ok(())
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    struct FixedClock(AtomicU64);

    impl Clock for FixedClock {
        fn now_secs(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = FixedClock(AtomicU64::new(1_000));
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("S1", 7u32, &clock);
        assert_eq!(cache.get("S1", &clock), Some(7));

        clock.0.store(1_059, Ordering::SeqCst);
        assert_eq!(cache.get("S1", &clock), Some(7));

        clock.0.store(1_060, Ordering::SeqCst);
        assert_eq!(cache.get("S1", &clock), None);

        cache.prune(&clock);
        assert!(cache.is_empty());
    }

    #[test]
    fn persisted_cache_round_trips_and_ignores_other_versions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seasons.json");
        let clock = FixedClock(AtomicU64::new(50));

        let mut cache = TtlCache::new(Duration::from_secs(100));
        cache.insert("S2", "table".to_string(), &clock);
        cache.save(&path).expect("save should succeed");

        let loaded: TtlCache<String> = TtlCache::load(&path, Duration::from_secs(100));
        assert_eq!(loaded.get("S2", &clock).as_deref(), Some("table"));

        fs::write(&path, r#"{"version":999,"entries":{}}"#).expect("overwrite");
        let stale: TtlCache<String> = TtlCache::load(&path, Duration::from_secs(100));
        assert!(stale.is_empty());
    }
}
