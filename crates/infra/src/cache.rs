use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const CACHE_MAX_ENTRIES: usize = 4_096;

/// Small TTL cache for leased tokens and identity lookups. Injected into
/// the clients that need one rather than living as process-wide state, so
/// tests construct their own and TTLs come from configuration.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    max_entries: usize,
    inner: Mutex<HashMap<String, CacheEntry<V>>>,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
    fresh_until: Instant,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: CACHE_MAX_ENTRIES,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut guard = self.inner.lock().expect("ttl cache lock");
        match guard.get(key) {
            Some(entry) if now <= entry.fresh_until => Some(entry.value.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: V) {
        // A zero TTL disables caching entirely.
        if self.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let mut guard = self.inner.lock().expect("ttl cache lock");
        guard.insert(
            key.into(),
            CacheEntry {
                value,
                cached_at: now,
                fresh_until: now + self.ttl,
            },
        );
        Self::prune_locked(&mut guard, now, self.max_entries);
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.lock().expect("ttl cache lock").remove(key);
    }

    fn prune_locked(entries: &mut HashMap<String, CacheEntry<V>>, now: Instant, max: usize) {
        entries.retain(|_, entry| now <= entry.fresh_until);
        if entries.len() <= max {
            return;
        }
        let mut keys_by_age = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.cached_at))
            .collect::<Vec<_>>();
        keys_by_age.sort_by_key(|(_, cached_at)| *cached_at);
        let evict_count = entries.len().saturating_sub(max);
        for (key, _) in keys_by_age.into_iter().take(evict_count) {
            entries.remove(&key);
        }
    }
}
