//! In-process response cache keyed by the normalized query.
//!
//! Consulted before the data source chain and filled after it. A miss or an
//! expired entry only costs a refetch; nothing here is authoritative.

use std::{collections::HashMap, time::Duration};

use float_sources::ChainOutcome;
use ocean_model::{Intent, Query, Variable};
use tokio::{sync::RwLock, time::Instant};
use tracing::debug;

/// Query reduced to the fields that determine the fetched data.
///
/// Coordinates are rounded to 0.01°, depths to whole meters, times to days.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    bbox: Option<[i64; 4]>,
    variable: Option<Variable>,
    depth: Option<(i64, i64)>,
    days: Option<(i64, i64)>,
    intent: Intent,
}

impl CacheKey {
    pub fn from_query(q: &Query) -> Self {
        let deg = |v: f64| (v * 100.0).round() as i64;
        Self {
            bbox: q.region.map(|r| {
                let b = r.bbox();
                [deg(b.min_lon()), deg(b.min_lat()), deg(b.max_lon()), deg(b.max_lat())]
            }),
            variable: q.variable,
            depth: q.depth_range.map(|d| (d.min().round() as i64, d.max().round() as i64)),
            days: q.time_range.map(|t| {
                (
                    t.start().timestamp().div_euclid(86_400),
                    t.end().timestamp().div_euclid(86_400),
                )
            }),
            intent: q.intent,
        }
    }
}

struct Entry {
    outcome: ChainOutcome,
    inserted: Instant,
}

pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<ChainOutcome> {
        let map = self.entries.read().await;
        let e = map.get(key)?;
        if e.inserted.elapsed() > self.ttl {
            return None;
        }
        Some(e.outcome.clone())
    }

    /// Inserts `outcome`, evicting expired entries first and then the oldest
    /// one when at capacity.
    pub async fn put(&self, key: CacheKey, outcome: ChainOutcome) {
        if self.capacity == 0 {
            return;
        }
        let mut map = self.entries.write().await;
        let ttl = self.ttl;
        map.retain(|_, e| e.inserted.elapsed() <= ttl);

        if map.len() >= self.capacity && !map.contains_key(&key) {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.inserted)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                map.remove(&k);
                debug!("cache full, evicted oldest entry");
            }
        }
        map.insert(
            key,
            Entry {
                outcome,
                inserted: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
