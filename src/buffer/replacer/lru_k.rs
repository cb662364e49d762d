//! LRU-K replacement policy.
//!
//! LRU-K evicts by backward k-distance: the time since the k-th most
//! recent access, or infinity when a frame has fewer than k recorded
//! accesses. A page touched once long ago is evicted before one touched
//! k times recently, which plain LRU cannot express.

use std::collections::{HashMap, VecDeque};

use crate::common::FrameId;

use super::Replacer;

struct LruKNode {
    /// Last k access timestamps, oldest first.
    history: VecDeque<u64>,
    evictable: bool,
}

impl LruKNode {
    /// The ordering key: the k-th most recent access timestamp, or 0
    /// for frames with fewer than k accesses (infinite distance).
    ///
    /// The logical clock starts at 1, so 0 sorts strictly before every
    /// real timestamp. Smaller key = larger backward distance = more
    /// evictable; the invariant holds as the clock advances because all
    /// finite distances grow in lockstep.
    fn order_key(&self, k: usize) -> u64 {
        if self.history.len() < k {
            0
        } else {
            self.history[0]
        }
    }
}

/// Backward-k-distance eviction.
///
/// Tracked frames sit in a queue ordered most-evictable first: frames
/// with infinite distance ahead of finite ones, larger distance ahead
/// of smaller. Ties among infinite-distance frames keep insertion
/// order, which is classic LRU among them.
pub struct LruKReplacer {
    nodes: HashMap<FrameId, LruKNode>,

    /// Eviction order; front = most evictable.
    queue: Vec<FrameId>,

    /// Global logical clock, advanced on every pin.
    clock: u64,

    k: usize,

    /// Count of nodes whose evictable flag is set.
    evictable: usize,

    /// Maximum number of tracked frames (the pool size).
    capacity: usize,
}

impl LruKReplacer {
    pub fn new(capacity: usize, k: usize) -> Self {
        assert!(k > 0, "k must be > 0");
        Self {
            nodes: HashMap::with_capacity(capacity),
            queue: Vec::with_capacity(capacity),
            clock: 0,
            k,
            evictable: 0,
            capacity,
        }
    }

    /// Insert a frame into the queue at its distance-ordered position.
    ///
    /// Frames with an equal key keep insertion order (the new frame
    /// lands after existing equals), which yields LRU tie-breaking
    /// among infinite-distance frames.
    fn enqueue(&mut self, frame_id: FrameId) {
        let key = self.nodes[&frame_id].order_key(self.k);
        let pos = self
            .queue
            .partition_point(|f| self.nodes[f].order_key(self.k) <= key);
        self.queue.insert(pos, frame_id);
    }
}

impl Replacer for LruKReplacer {
    fn pin(&mut self, frame_id: FrameId) {
        self.clock += 1;
        let now = self.clock;

        if let Some(node) = self.nodes.get_mut(&frame_id) {
            if node.history.len() == self.k {
                node.history.pop_front();
            }
            node.history.push_back(now);
            if node.evictable {
                node.evictable = false;
                self.evictable -= 1;
            }
            self.queue.retain(|&f| f != frame_id);
            self.enqueue(frame_id);
        } else {
            if self.nodes.len() >= self.capacity {
                self.victim();
            }
            let mut history = VecDeque::with_capacity(self.k);
            history.push_back(now);
            self.nodes.insert(
                frame_id,
                LruKNode {
                    history,
                    evictable: false,
                },
            );
            self.enqueue(frame_id);
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if let Some(node) = self.nodes.get_mut(&frame_id) {
            if !node.evictable {
                node.evictable = true;
                self.evictable += 1;
            }
        }
    }

    fn victim(&mut self) -> Option<FrameId> {
        if self.evictable == 0 {
            return None;
        }
        let pos = self
            .queue
            .iter()
            .position(|f| self.nodes.get(f).map(|n| n.evictable).unwrap_or(false))?;
        let frame_id = self.queue.remove(pos);
        self.nodes.remove(&frame_id);
        self.evictable -= 1;
        Some(frame_id)
    }

    fn remove(&mut self, frame_id: FrameId) {
        if let Some(node) = self.nodes.remove(&frame_id) {
            if node.evictable {
                self.evictable -= 1;
            }
            self.queue.retain(|&f| f != frame_id);
        }
    }

    fn evictable_count(&self) -> usize {
        self.evictable
    }
}
