//! Eviction policies (replacers).
//!
//! A replacer tracks which frames are candidates for eviction and picks
//! the victim when the pool runs out of free frames. Two policies:
//! - [`LruReplacer`] - strict recency order
//! - [`LruKReplacer`] - backward k-distance (frequency-aware recency)
//!
//! The replacer runs entirely inside the buffer pool's lock and carries
//! no lock of its own.

mod lru;
mod lru_k;

pub use lru::LruReplacer;
pub use lru_k::LruKReplacer;

use crate::common::config::DEFAULT_LRU_K;
use crate::common::FrameId;

/// The four-operation eviction contract shared by all policies.
pub trait Replacer: Send {
    /// Record an access and remove the frame from eviction candidacy.
    ///
    /// Untracked frames are inserted; tracking a frame beyond the pool
    /// capacity evicts a victim first so memory stays bounded.
    fn pin(&mut self, frame_id: FrameId);

    /// Mark the frame evictable. Idempotent; untracked frames are a
    /// no-op.
    fn unpin(&mut self, frame_id: FrameId);

    /// Select one evictable frame by policy, drop its bookkeeping, and
    /// return it. `None` when no frame is evictable.
    fn victim(&mut self) -> Option<FrameId>;

    /// Forget a frame entirely (page deleted from the pool).
    fn remove(&mut self, frame_id: FrameId);

    /// Number of currently evictable frames.
    fn evictable_count(&self) -> usize;
}

/// Replacement policy selection, fixed at pool construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Least-recently-used.
    Lru,
    /// Backward k-distance LRU-K.
    LruK { k: usize },
}

impl EvictionPolicy {
    /// LRU-K with the default k.
    pub fn lru_k() -> Self {
        EvictionPolicy::LruK { k: DEFAULT_LRU_K }
    }

    pub(crate) fn build(self, capacity: usize) -> Box<dyn Replacer> {
        match self {
            EvictionPolicy::Lru => Box::new(LruReplacer::new(capacity)),
            EvictionPolicy::LruK { k } => Box::new(LruKReplacer::new(capacity, k)),
        }
    }
}
