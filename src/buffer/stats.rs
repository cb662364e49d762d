//! Buffer pool statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the buffer pool.
///
/// All counters are atomic with `Relaxed` ordering: statistics need
/// atomicity, not cross-counter synchronization.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Fetches served from a resident frame.
    pub hits: AtomicU64,
    /// Fetches that had to go to disk.
    pub misses: AtomicU64,
    /// Victim frames reclaimed under capacity pressure.
    pub evictions: AtomicU64,
    /// Pages read from disk.
    pub disk_reads: AtomicU64,
    /// Pages written to disk.
    pub disk_writes: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disk_read(&self) {
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disk_write(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Non-atomic copy for display and assertions.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            disk_reads: self.disk_reads.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl StatsSnapshot {
    /// Cache hit ratio in `[0.0, 1.0]`; 0.0 before any fetch.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} evictions={} reads={} writes={} hit_ratio={:.2}%",
            self.hits,
            self.misses,
            self.evictions,
            self.disk_reads,
            self.disk_writes,
            self.hit_ratio() * 100.0
        )
    }
}
