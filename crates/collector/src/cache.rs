//! Time-bucketed result cache
//!
//! Keys are (query, count, bucket) where bucket = floor(unix seconds /
//! interval). Two lookups inside the same bucket for the same query+count
//! are identical by construction; once the wall clock crosses a bucket
//! boundary the old entry simply stops being reachable. The bucket
//! arithmetic lives entirely in here — callers hand over query and count,
//! nothing else.
//!
//! The map is capacity-bounded: inserting into a full cache evicts the
//! entry with the oldest bucket first, so stale entries are reclaimed
//! without a sweeper task.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::record::CanonicalRecord;

/// Bucket id for a wall-clock instant. Interval is clamped to one second
/// so the division is always defined.
pub fn bucket_id(now: SystemTime, interval: Duration) -> u64 {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    secs / interval.as_secs().max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    count: usize,
    bucket: u64,
}

struct CacheEntry {
    records: Vec<CanonicalRecord>,
}

/// Shared memo store for assembled result sets.
pub struct ResultCache {
    interval: Duration,
    capacity: usize,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResultCache {
    /// Cache with the given bucket interval and entry capacity.
    pub fn new(interval: Duration, capacity: usize) -> Self {
        Self {
            interval,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a result set for the current time bucket. Pure lookup, no
    /// side effects beyond the read lock.
    pub fn get(&self, query: &str, count: usize) -> Option<Vec<CanonicalRecord>> {
        self.get_at(query, count, SystemTime::now())
    }

    /// Store a result set under the current time bucket.
    pub fn put(&self, query: &str, count: usize, records: Vec<CanonicalRecord>) {
        self.put_at(query, count, records, SystemTime::now());
    }

    /// Lookup against an explicit instant. Tests drive bucket-boundary
    /// behavior through this.
    pub fn get_at(&self, query: &str, count: usize, now: SystemTime) -> Option<Vec<CanonicalRecord>> {
        let key = self.key(query, count, now);
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).map(|entry| entry.records.clone())
    }

    /// Store against an explicit instant.
    pub fn put_at(
        &self,
        query: &str,
        count: usize,
        records: Vec<CanonicalRecord>,
        now: SystemTime,
    ) {
        let key = self.key(query, count, now);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            // Oldest bucket goes first; within a bucket any victim is fine.
            if let Some(victim) = entries
                .keys()
                .min_by_key(|k| k.bucket)
                .cloned()
            {
                debug!(bucket = victim.bucket, query = %victim.query, "evicting cache entry");
                entries.remove(&victim);
            }
        }

        entries.insert(key, CacheEntry { records });
    }

    /// Number of live entries (stale buckets included until evicted).
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(&self, query: &str, count: usize, now: SystemTime) -> CacheKey {
        CacheKey {
            query: query.to_string(),
            count,
            bucket: bucket_id(now, self.interval),
        }
    }
}
