//! LRU (Least Recently Used) replacement policy.

use std::collections::{HashMap, VecDeque};

use crate::common::FrameId;

use super::Replacer;

/// Strict-recency eviction.
///
/// Frames live in a queue ordered by last pin (front = least recent).
/// Pinning moves a frame to the back and demotes it out of eviction
/// eligibility; unpinning flags it evictable without reordering, so the
/// victim is always the least-recently-pinned evictable frame.
pub struct LruReplacer {
    /// Recency order; front = least recently pinned.
    queue: VecDeque<FrameId>,

    /// Tracked frames and their evictable flag.
    entries: HashMap<FrameId, bool>,

    /// Count of entries whose flag is set.
    evictable: usize,

    /// Maximum number of tracked frames (the pool size).
    capacity: usize,
}

impl LruReplacer {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
            evictable: 0,
            capacity,
        }
    }
}

impl Replacer for LruReplacer {
    fn pin(&mut self, frame_id: FrameId) {
        if let Some(flag) = self.entries.get_mut(&frame_id) {
            if *flag {
                *flag = false;
                self.evictable -= 1;
            }
            // Move to the most-recently-used end.
            if let Some(pos) = self.queue.iter().position(|&f| f == frame_id) {
                self.queue.remove(pos);
            }
            self.queue.push_back(frame_id);
        } else {
            if self.entries.len() >= self.capacity {
                self.victim();
            }
            self.entries.insert(frame_id, false);
            self.queue.push_back(frame_id);
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if let Some(flag) = self.entries.get_mut(&frame_id) {
            if !*flag {
                *flag = true;
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
            .position(|f| self.entries.get(f).copied().unwrap_or(false))?;
        let frame_id = self.queue.remove(pos)?;
        self.entries.remove(&frame_id);
        self.evictable -= 1;
        Some(frame_id)
    }

    fn remove(&mut self, frame_id: FrameId) {
        if let Some(flag) = self.entries.remove(&frame_id) {
            if flag {
                self.evictable -= 1;
            }
            self.queue.retain(|&f| f != frame_id);
        }
    }

    fn evictable_count(&self) -> usize {
        self.evictable
    }
}
