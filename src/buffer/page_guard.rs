//! RAII guards for page access.
//!
//! A successful fetch pins a frame; the matching unpin is the guard's
//! `Drop` impl, so a fetch can never leak a pin, including on error
//! paths:
//! - [`PageReadGuard`] - shared access, unpins on drop
//! - [`PageWriteGuard`] - exclusive access, marks dirty and unpins on drop

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageKey};
use crate::storage::page::Page;

use super::buffer_pool_manager::BufferPoolManager;

/// Shared read access to a cached page.
///
/// Multiple read guards may coexist for the same page.
pub struct PageReadGuard<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    key: PageKey,
    lock: RwLockReadGuard<'a, Page>,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager,
        frame_id: FrameId,
        key: PageKey,
        lock: RwLockReadGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            frame_id,
            key,
            lock,
        }
    }

    #[inline]
    pub fn key(&self) -> PageKey {
        self.key
    }

    #[inline]
    pub fn page_id(&self) -> crate::common::PageId {
        self.key.page_id
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        self.bpm.unpin_page_internal(self.frame_id, false);
    }
}

/// Exclusive write access to a cached page.
///
/// The page is marked dirty when the guard drops; write-back happens on
/// eviction or an explicit flush.
pub struct PageWriteGuard<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    key: PageKey,
    lock: RwLockWriteGuard<'a, Page>,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager,
        frame_id: FrameId,
        key: PageKey,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            frame_id,
            key,
            lock,
        }
    }

    #[inline]
    pub fn key(&self) -> PageKey {
        self.key
    }

    #[inline]
    pub fn page_id(&self) -> crate::common::PageId {
        self.key.page_id
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        self.bpm.unpin_page_internal(self.frame_id, true);
    }
}
