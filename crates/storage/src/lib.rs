use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-process key/value cache where every entry carries its own expiry.
///
/// Clones share the same underlying map. Concurrent writers to one key are
/// last-write-wins.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    default_ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Expired entries are treated as absent but left in place until the next
    /// write or purge.
    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entry_at(key, now).map(|entry| entry.value)
    }

    pub fn entry_at(&self, key: &K, now: DateTime<Utc>) -> Option<CacheEntry<V>> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, self.default_ttl, Utc::now());
    }

    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.insert_at(key, value, ttl, Utc::now());
    }

    pub fn insert_at(&self, key: K, value: V, ttl: Duration, now: DateTime<Utc>) {
        let entry = CacheEntry {
            value,
            stored_at: now,
            expires_at: now + ttl,
        };
        self.entries.write().insert(key, entry);
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key).map(|entry| entry.value)
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> u64 {
        let mut removed = 0_u64;
        self.entries.write().retain(|_, entry| {
            let keep = entry.is_fresh(now);
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn entry_is_served_until_ttl_elapses() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.insert_at("airline_info", 7, Duration::hours(1), t0());

        assert_eq!(cache.get_at(&"airline_info", t0() + Duration::minutes(59)), Some(7));
        assert_eq!(cache.get_at(&"airline_info", t0() + Duration::hours(1)), None);
    }

    #[test]
    fn per_entry_ttl_overrides_default() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.insert_at("token", "abc".to_string(), Duration::seconds(1740), t0());

        let entry = cache.entry_at(&"token", t0()).unwrap();
        assert_eq!(entry.stored_at, t0());
        assert!(cache.get_at(&"token", t0() + Duration::seconds(1741)).is_none());
    }

    #[test]
    fn last_write_wins() {
        let cache = TtlCache::new(Duration::minutes(5));
        cache.insert("page_baggage", "old");
        cache.insert("page_baggage", "new");
        assert_eq!(cache.get(&"page_baggage"), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.insert_at("a", 1, Duration::minutes(1), t0());
        cache.insert_at("b", 2, Duration::hours(2), t0());

        assert_eq!(cache.purge_expired(t0() + Duration::minutes(30)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&"b"), Some(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = TtlCache::new(Duration::hours(1));
        let other = cache.clone();
        other.insert("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));
    }
}
