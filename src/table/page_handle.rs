//! Page handles - slotted-page access over a pinned page.
//!
//! A handle pairs a buffer-pool guard with the table's header and slot
//! layout, exposing slot-level operations instead of raw bytes. The
//! pin is released when the handle drops, with the underlying guard.

use crate::buffer::{PageReadGuard, PageWriteGuard};
use crate::common::PageId;

use super::bitmap;
use super::slot_layout::SlotLayout;
use super::table_header::TableHeader;

/// Read-only slot access over a pinned page.
pub(crate) struct ReadPageHandle<'a> {
    guard: PageReadGuard<'a>,
    header: TableHeader,
    layout: &'a dyn SlotLayout,
}

impl<'a> ReadPageHandle<'a> {
    pub fn new(guard: PageReadGuard<'a>, header: TableHeader, layout: &'a dyn SlotLayout) -> Self {
        Self {
            guard,
            header,
            layout,
        }
    }

    pub fn is_occupied(&self, slot: u32) -> bool {
        bitmap::get_bit(self.bitmap(), slot as usize)
    }

    /// First occupied slot at or after `from`.
    pub fn first_live_slot(&self, from: u32) -> Option<u32> {
        bitmap::find_first(
            self.bitmap(),
            self.header.records_per_page as usize,
            from as usize,
            true,
        )
        .map(|s| s as u32)
    }

    pub fn read_slot(&self, slot: u32) -> (Vec<u8>, Vec<u8>) {
        let mut nullmap = vec![0u8; self.header.nullmap_size as usize];
        let mut data = vec![0u8; self.header.record_size as usize];
        self.layout
            .read_slot(&self.guard, &self.header, slot, &mut nullmap, &mut data);
        (nullmap, data)
    }

    fn bitmap(&self) -> &[u8] {
        &self.guard.slot_area()[..self.header.bitmap_size()]
    }
}

/// Mutable slot access over a pinned page.
///
/// Dropping the handle marks the page dirty, so error paths should
/// check occupancy through a [`ReadPageHandle`] when they can.
pub(crate) struct PageHandle<'a> {
    guard: PageWriteGuard<'a>,
    header: TableHeader,
    layout: &'a dyn SlotLayout,
}

impl<'a> PageHandle<'a> {
    pub fn new(guard: PageWriteGuard<'a>, header: TableHeader, layout: &'a dyn SlotLayout) -> Self {
        Self {
            guard,
            header,
            layout,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.guard.page_id()
    }

    pub fn is_occupied(&self, slot: u32) -> bool {
        bitmap::get_bit(self.bitmap(), slot as usize)
    }

    pub fn set_occupied(&mut self, slot: u32, occupied: bool) {
        let bm_size = self.header.bitmap_size();
        bitmap::set_bit(
            &mut self.guard.slot_area_mut()[..bm_size],
            slot as usize,
            occupied,
        );
    }

    /// First empty slot, or `None` when the page is full.
    pub fn first_free_slot(&self) -> Option<u32> {
        bitmap::find_first(
            self.bitmap(),
            self.header.records_per_page as usize,
            0,
            false,
        )
        .map(|s| s as u32)
    }

    pub fn write_slot(&mut self, slot: u32, nullmap: &[u8], data: &[u8]) {
        self.layout
            .write_slot(&mut self.guard, &self.header, slot, nullmap, data);
    }

    pub fn record_count(&self) -> u32 {
        self.guard.record_count()
    }

    pub fn set_record_count(&mut self, count: u32) {
        self.guard.set_record_count(count);
    }

    pub fn next_free_page(&self) -> PageId {
        self.guard.next_free_page()
    }

    pub fn set_next_free_page(&mut self, page_id: PageId) {
        self.guard.set_next_free_page(page_id);
    }

    /// Zero the page; used when a fresh page is appended to the file.
    pub fn reset(&mut self) {
        self.guard.reset();
    }

    fn bitmap(&self) -> &[u8] {
        &self.guard.slot_area()[..self.header.bitmap_size()]
    }
}
