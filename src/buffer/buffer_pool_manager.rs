//! Buffer Pool Manager - the page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between disk and memory, keyed by `(FileId, PageId)`
//! - Pin-based reference counting through RAII guards
//! - Dirty page write-back on eviction and flush
//! - Pluggable eviction policies (LRU, LRU-K)

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::buffer::replacer::{EvictionPolicy, Replacer};
use crate::buffer::{BufferPoolStats, Frame, PageReadGuard, PageWriteGuard};
use crate::common::{Error, FileId, FrameId, PageId, PageKey, Result};
use crate::storage::DiskManager;

/// Manages a fixed pool of frames caching disk pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │ page_table   │  │        frames: Vec<Frame>         │   │
/// │  │PageKey → Fid │─▶│  [Frame0] [Frame1] [Frame2] ...   │   │
/// │  └──────────────┘  └───────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
/// │  │  free_list   │  │   replacer   │  │ disk_manager │      │
/// │  └──────────────┘  └──────────────┘  └──────────────┘      │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `page_table`: `RwLock` - many readers, few writers; the miss path
///   holds the write lock across disk I/O so a page is loaded at most
///   once (throughput limitation, not a correctness one)
/// - `free_list`, `replacer`, `disk_manager`: `Mutex`
/// - `frames`: fixed size, each frame has internal locks
/// - `stats`: atomic counters
///
/// Lock order is page_table → replacer/free_list/disk_manager; no path
/// takes them the other way around.
///
/// # Pinning
/// A fetched page is returned pinned through a guard; the guard's drop
/// is the matching unpin. A frame with pin count > 0 is never selected
/// as an eviction victim. When every frame is pinned, fetch fails with
/// [`Error::NoFreeFrame`] - backpressure is caller-visible and never
/// retried internally.
pub struct BufferPoolManager {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Maps resident pages to their frames.
    page_table: RwLock<HashMap<PageKey, FrameId>>,

    /// Frames holding no page.
    free_list: Mutex<Vec<FrameId>>,

    /// Eviction policy.
    replacer: Mutex<Box<dyn Replacer>>,

    /// Backing I/O.
    disk_manager: Mutex<DiskManager>,

    /// Performance counters.
    stats: BufferPoolStats,

    /// Number of frames, immutable after construction.
    pool_size: usize,
}

impl BufferPoolManager {
    /// Create a buffer pool with `pool_size` frames and the given
    /// eviction policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, disk_manager: DiskManager, policy: EvictionPolicy) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list: Vec<FrameId> = (0..pool_size).rev().map(FrameId::new).collect();

        Self {
            frames,
            page_table: RwLock::new(HashMap::new()),
            free_list: Mutex::new(free_list),
            replacer: Mutex::new(policy.build(pool_size)),
            disk_manager: Mutex::new(disk_manager),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: fetch
    // ========================================================================

    /// Fetch a page for reading (shared access).
    ///
    /// Cache hit returns immediately; a miss loads from disk, evicting
    /// a victim when no frame is free.
    ///
    /// # Errors
    /// - [`Error::NoFreeFrame`] if every frame is pinned
    /// - [`Error::Io`] / [`Error::UnknownFile`] from the disk layer
    pub fn fetch_page_read(&self, file_id: FileId, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let key = PageKey::new(file_id, page_id);
        let frame_id = self.fetch_page_internal(key)?;
        let lock = self.frames[frame_id.0].page();

        Ok(PageReadGuard::new(self, frame_id, key, lock))
    }

    /// Fetch a page for writing (exclusive access).
    ///
    /// The page is marked dirty when the guard drops.
    pub fn fetch_page_write(&self, file_id: FileId, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let key = PageKey::new(file_id, page_id);
        let frame_id = self.fetch_page_internal(key)?;
        let lock = self.frames[frame_id.0].page_mut();

        Ok(PageWriteGuard::new(self, frame_id, key, lock))
    }

    // ========================================================================
    // Public API: delete
    // ========================================================================

    /// Drop a page from the pool, returning its frame to the free list.
    ///
    /// Succeeds trivially when the page is not resident. Dirty content
    /// is written back before the frame is reset.
    ///
    /// # Errors
    /// - [`Error::PagePinned`] if the page is in use
    pub fn delete_page(&self, file_id: FileId, page_id: PageId) -> Result<()> {
        let key = PageKey::new(file_id, page_id);
        let mut pt = self.page_table.write();

        let frame_id = match pt.get(&key) {
            Some(&fid) => fid,
            None => return Ok(()),
        };
        let frame = &self.frames[frame_id.0];

        if frame.is_pinned() {
            return Err(Error::PagePinned(key));
        }
        debug_assert_eq!(frame.key(), Some(key), "frame tag diverged from page table");

        if frame.is_dirty() {
            self.write_frame(frame_id, key)?;
        }

        pt.remove(&key);
        drop(pt);

        frame.reset();
        self.replacer.lock().remove(frame_id);
        self.free_list.lock().push(frame_id);

        Ok(())
    }

    /// Apply [`delete_page`](Self::delete_page) to every resident page
    /// of a file, continuing past individual failures.
    ///
    /// Returns the first error encountered, if any.
    pub fn delete_all_pages(&self, file_id: FileId) -> Result<()> {
        let keys: Vec<PageKey> = {
            let pt = self.page_table.read();
            pt.keys().filter(|k| k.file_id == file_id).copied().collect()
        };

        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.delete_page(key.file_id, key.page_id) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Public API: flush
    // ========================================================================

    /// Write a resident page to disk without evicting it and clear its
    /// dirty flag.
    ///
    /// The write takes the page's exclusive lock to stamp the checksum,
    /// so the caller must not hold any guard on the page - read or
    /// write - or the flush deadlocks on itself.
    ///
    /// # Errors
    /// - [`Error::PageNotResident`] if the page is not cached
    pub fn flush_page(&self, file_id: FileId, page_id: PageId) -> Result<()> {
        let key = PageKey::new(file_id, page_id);
        let frame_id = {
            let pt = self.page_table.read();
            match pt.get(&key) {
                Some(&fid) => fid,
                None => return Err(Error::PageNotResident(key)),
            }
        };

        self.write_frame(frame_id, key)
    }

    /// Flush every resident page of a file. Same locking constraint as
    /// [`flush_page`](Self::flush_page).
    pub fn flush_all_pages(&self, file_id: FileId) -> Result<()> {
        let pages: Vec<(PageKey, FrameId)> = {
            let pt = self.page_table.read();
            pt.iter()
                .filter(|(k, _)| k.file_id == file_id)
                .map(|(&k, &fid)| (k, fid))
                .collect()
        };

        for (key, frame_id) in pages {
            self.write_frame(frame_id, key)?;
        }

        Ok(())
    }

    // ========================================================================
    // Public API: introspection
    // ========================================================================

    /// Non-pinning lookup of the frame caching a page, for diagnostics.
    pub fn get_frame(&self, file_id: FileId, page_id: PageId) -> Option<&Frame> {
        let pt = self.page_table.read();
        pt.get(&PageKey::new(file_id, page_id))
            .map(|&fid| &self.frames[fid.0])
    }

    /// Pin count of a resident page; `None` if not resident.
    pub fn pin_count(&self, file_id: FileId, page_id: PageId) -> Option<u32> {
        self.get_frame(file_id, page_id).map(Frame::pin_count)
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn free_frame_count(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Number of resident pages.
    pub fn resident_page_count(&self) -> usize {
        self.page_table.read().len()
    }

    /// Path of a file's backing store, delegated to the disk manager.
    pub fn file_name(&self, file_id: FileId) -> Result<String> {
        self.disk_manager.lock().file_name(file_id)
    }

    /// Run a closure against the disk manager (file open/close).
    pub fn with_disk_manager<T>(&self, f: impl FnOnce(&mut DiskManager) -> T) -> T {
        f(&mut self.disk_manager.lock())
    }

    // ========================================================================
    // Internal: called by guards on drop
    // ========================================================================

    pub(crate) fn unpin_page_internal(&self, frame_id: FrameId, is_dirty: bool) {
        let frame = &self.frames[frame_id.0];

        if is_dirty {
            frame.mark_dirty();
        }

        if frame.unpin() == 0 {
            self.replacer.lock().unpin(frame_id);
        }
    }

    // ========================================================================
    // Internal: fetch machinery
    // ========================================================================

    fn fetch_page_internal(&self, key: PageKey) -> Result<FrameId> {
        // Fast path: resident page, read lock only. Pinning under the
        // read lock keeps eviction (which needs the write lock) out.
        {
            let pt = self.page_table.read();
            if let Some(&frame_id) = pt.get(&key) {
                self.pin_resident(frame_id);
                self.stats.record_hit();
                return Ok(frame_id);
            }
        }

        let mut pt = self.page_table.write();

        // Another thread may have loaded the page between the lock
        // upgrade; recheck before doing I/O.
        if let Some(&frame_id) = pt.get(&key) {
            self.pin_resident(frame_id);
            self.stats.record_hit();
            return Ok(frame_id);
        }

        self.stats.record_miss();

        let frame_id = self.acquire_frame(&mut pt)?;

        if let Err(e) = self.load_frame(frame_id, key) {
            // The frame was already detached from the page table;
            // return it to the free list instead of leaking it.
            self.free_list.lock().push(frame_id);
            return Err(e);
        }

        let frame = &self.frames[frame_id.0];
        frame.set_key(Some(key));
        frame.pin();
        pt.insert(key, frame_id);
        self.replacer.lock().pin(frame_id);

        Ok(frame_id)
    }

    fn pin_resident(&self, frame_id: FrameId) {
        self.frames[frame_id.0].pin();
        self.replacer.lock().pin(frame_id);
    }

    /// Read a page from disk into a frame.
    fn load_frame(&self, frame_id: FrameId, key: PageKey) -> Result<()> {
        let frame = &self.frames[frame_id.0];
        let mut page = frame.page_mut();
        self.disk_manager
            .lock()
            .read_page(key.file_id, key.page_id, &mut page)?;
        self.stats.record_disk_read();
        Ok(())
    }

    /// Get a frame to load into: free list first, else evict a victim.
    fn acquire_frame(&self, pt: &mut HashMap<PageKey, FrameId>) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.lock().pop() {
            return Ok(frame_id);
        }

        // The unpin path delivers its replacer notification outside the
        // page-table lock, so a frame re-pinned in between can carry a
        // stale evictable mark. The pin count is authoritative: we hold
        // the page-table write lock here, which keeps new pins out, so
        // a victim that is unpinned now stays unpinned. Pinned victims
        // are re-tracked as pinned and skipped.
        let frame_id = loop {
            let candidate = self
                .replacer
                .lock()
                .victim()
                .ok_or(Error::NoFreeFrame)?;
            if self.frames[candidate.0].is_pinned() {
                self.replacer.lock().pin(candidate);
                continue;
            }
            break candidate;
        };

        self.stats.record_eviction();

        let frame = &self.frames[frame_id.0];
        let old_key = frame.key();
        debug_assert_eq!(
            old_key.and_then(|k| pt.get(&k).copied()),
            Some(frame_id),
            "victim frame tag diverged from page table"
        );

        if let Some(key) = old_key {
            if frame.is_dirty() {
                self.write_frame(frame_id, key)?;
            }
            pt.remove(&key);
        }
        frame.clear_dirty();
        frame.set_key(None);

        Ok(frame_id)
    }

    /// Write a frame's page to disk and clear the dirty flag.
    ///
    /// The page checksum is recomputed before the write.
    fn write_frame(&self, frame_id: FrameId, key: PageKey) -> Result<()> {
        let frame = &self.frames[frame_id.0];
        {
            let mut page = frame.page_mut();
            page.update_checksum();
            self.disk_manager
                .lock()
                .write_page(key.file_id, key.page_id, &page)?;
        }
        frame.clear_dirty();
        self.stats.record_disk_write();
        Ok(())
    }
}
