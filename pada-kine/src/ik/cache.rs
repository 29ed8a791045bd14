//! Memo table for planar solutions.
//!
//! A planar solution depends only on the rounded reach, the rounded drop, the
//! leg type and whether yaw/pitch coupling is active, so entries never go
//! stale. The table is shared between pose model clones through an `Arc`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::constraints::LegType;

/// Cache key: reach and drop in hundredths of a centimeter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlanarKey {
    pub reach: i64,
    pub drop: i64,
    pub leg_type: LegType,
    pub coupled: bool,
}

impl PlanarKey {
    pub fn new(reach: f64, drop: f64, leg_type: LegType, coupled: bool) -> Self {
        Self {
            reach: (reach * 100.0).round() as i64,
            drop: (drop * 100.0).round() as i64,
            leg_type,
            coupled,
        }
    }
}

/// Planar joint angles in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarAngles {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Result of a planar solve, failures included
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanarOutcome {
    Solved(PlanarAngles),
    /// No geometric candidate
    Unreachable,
    /// Geometric candidates exist; the best one broke this limit
    Violated { joint: &'static str, value: f64 },
}

#[derive(Default)]
struct CacheInner {
    entries: RwLock<HashMap<PlanarKey, PlanarOutcome>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Process-wide memo table
#[derive(Clone, Default)]
pub struct SolutionCache {
    inner: Arc<CacheInner>,
}

impl SolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key, computing and storing the outcome on a miss
    pub fn get_or_insert_with<F>(&self, key: PlanarKey, compute: F) -> PlanarOutcome
    where
        F: FnOnce() -> PlanarOutcome,
    {
        if let Some(outcome) = self.inner.entries.read().get(&key) {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            return *outcome;
        }
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = compute();
        self.inner.entries.write().insert(key, outcome);
        outcome
    }

    pub fn hits(&self) -> u64 {
        self.inner.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.inner.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        self.inner.entries.write().clear();
        self.inner.hits.store(0, Ordering::Relaxed);
        self.inner.misses.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for SolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionCache")
            .field("entries", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}
