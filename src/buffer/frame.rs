//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus the metadata buffer management
//! needs: which page is loaded, the pin count, and the dirty flag.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageKey;
use crate::storage::page::Page;

/// A frame in the buffer pool.
///
/// The pool allocates its frames once at startup; a frame is never
/// destroyed, only its content is replaced on eviction.
///
/// # Thread Safety
/// All fields use interior mutability:
/// - `page`: `RwLock` - shared readers, exclusive writer
/// - `key`: `Mutex` - the `(file, page)` tag of the loaded page
/// - `pin_count`: `AtomicU32` - lock-free reference counting
/// - `is_dirty`: `AtomicBool` - lock-free write-back tracking
pub struct Frame {
    page: RwLock<Page>,
    key: Mutex<Option<PageKey>>,
    pin_count: AtomicU32,
    is_dirty: AtomicBool,
}

impl Frame {
    /// Create a new empty frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            key: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    /// Acquire a read lock on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire a write lock on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    // ========================================================================
    // Identity tag
    // ========================================================================

    /// The `(file, page)` identity of the loaded page, if any.
    #[inline]
    pub fn key(&self) -> Option<PageKey> {
        *self.key.lock()
    }

    #[inline]
    pub fn set_key(&self, key: Option<PageKey>) {
        *self.key.lock() = key;
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Increment the pin count. Returns the new count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0. Guards make unmatched
    /// unpins unreachable from safe code, so underflow is a bug.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty flag
    // ========================================================================

    #[inline]
    pub fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Relaxed)
    }

    // ========================================================================
    // State queries
    // ========================================================================

    /// True if no page is loaded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key().is_none()
    }

    /// True if the frame holds a page and nobody pins it.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        self.key().is_some() && !self.is_pinned()
    }

    /// Reset the frame to the empty state for reuse.
    pub fn reset(&self) {
        self.page_mut().reset();
        self.set_key(None);
        self.pin_count.store(0, Ordering::Relaxed);
        self.is_dirty.store(false, Ordering::Relaxed);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
