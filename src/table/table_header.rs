//! Table header - per-heap-file metadata.

use crate::common::PageId;
use crate::storage::page::Page;

use super::bitmap;

/// Metadata describing one heap file.
///
/// Lives on the file header page (page 0) on disk and behind the table
/// handle's lock in memory. `page_count` includes the header page, so
/// data pages occupy ids `1..page_count`.
///
/// # On-disk layout (28 bytes, little-endian)
/// ```text
/// ┌──────────────┬────────────┬─────────────────┬──────────────────┬─────────────┬──────────────┐
/// │ record_count │ page_count │ first_free_page │ records_per_page │ record_size │ nullmap_size │
/// │     u64      │    u32     │      u32        │       u32        │     u32     │     u32      │
/// └──────────────┴────────────┴─────────────────┴──────────────────┴─────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Live records across the whole file.
    pub record_count: u64,
    /// Allocated pages, header page included.
    pub page_count: u32,
    /// Head of the not-full-page list, `PageId::INVALID` when empty.
    pub first_free_page: PageId,
    /// Slot capacity of each data page.
    pub records_per_page: u32,
    /// Record payload bytes per slot.
    pub record_size: u32,
    /// Per-record null-bitmap bytes (one bit per field).
    pub nullmap_size: u32,
}

impl TableHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 28;

    const OFFSET_RECORD_COUNT: usize = 0;
    const OFFSET_PAGE_COUNT: usize = 8;
    const OFFSET_FIRST_FREE: usize = 12;
    const OFFSET_RECORDS_PER_PAGE: usize = 16;
    const OFFSET_RECORD_SIZE: usize = 20;
    const OFFSET_NULLMAP_SIZE: usize = 24;

    /// Build the header for a fresh table.
    ///
    /// Slot capacity is the largest `n` such that the occupancy bitmap
    /// for `n` slots plus `n` slots fit in a page's slot area.
    ///
    /// # Panics
    /// Panics if a single record does not fit on one page.
    pub fn new(record_size: usize, field_count: usize) -> Self {
        let nullmap_size = bitmap::size_for(field_count);
        let slot_size = nullmap_size + record_size;
        assert!(slot_size > 0, "record must not be empty");

        let mut records_per_page = Page::SLOT_AREA_SIZE / slot_size;
        while bitmap::size_for(records_per_page) + records_per_page * slot_size
            > Page::SLOT_AREA_SIZE
        {
            records_per_page -= 1;
        }
        assert!(records_per_page > 0, "record too large for one page");

        Self {
            record_count: 0,
            page_count: 1, // the header page itself
            first_free_page: PageId::INVALID,
            records_per_page: records_per_page as u32,
            record_size: record_size as u32,
            nullmap_size: nullmap_size as u32,
        }
    }

    /// Bytes of the per-page occupancy bitmap.
    #[inline]
    pub fn bitmap_size(&self) -> usize {
        bitmap::size_for(self.records_per_page as usize)
    }

    /// Bytes of one slot: record null bitmap followed by payload.
    #[inline]
    pub fn slot_size(&self) -> usize {
        self.nullmap_size as usize + self.record_size as usize
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let u32_at = |off: usize| u32::from_le_bytes(data[off..off + 4].try_into().unwrap());

        Self {
            record_count: u64::from_le_bytes(
                data[Self::OFFSET_RECORD_COUNT..Self::OFFSET_RECORD_COUNT + 8]
                    .try_into()
                    .unwrap(),
            ),
            page_count: u32_at(Self::OFFSET_PAGE_COUNT),
            first_free_page: PageId(u32_at(Self::OFFSET_FIRST_FREE)),
            records_per_page: u32_at(Self::OFFSET_RECORDS_PER_PAGE),
            record_size: u32_at(Self::OFFSET_RECORD_SIZE),
            nullmap_size: u32_at(Self::OFFSET_NULLMAP_SIZE),
        }
    }

    pub fn write_to(&self, data: &mut [u8]) {
        data[Self::OFFSET_RECORD_COUNT..Self::OFFSET_RECORD_COUNT + 8]
            .copy_from_slice(&self.record_count.to_le_bytes());
        data[Self::OFFSET_PAGE_COUNT..Self::OFFSET_PAGE_COUNT + 4]
            .copy_from_slice(&self.page_count.to_le_bytes());
        data[Self::OFFSET_FIRST_FREE..Self::OFFSET_FIRST_FREE + 4]
            .copy_from_slice(&self.first_free_page.0.to_le_bytes());
        data[Self::OFFSET_RECORDS_PER_PAGE..Self::OFFSET_RECORDS_PER_PAGE + 4]
            .copy_from_slice(&self.records_per_page.to_le_bytes());
        data[Self::OFFSET_RECORD_SIZE..Self::OFFSET_RECORD_SIZE + 4]
            .copy_from_slice(&self.record_size.to_le_bytes());
        data[Self::OFFSET_NULLMAP_SIZE..Self::OFFSET_NULLMAP_SIZE + 4]
            .copy_from_slice(&self.nullmap_size.to_le_bytes());
    }
}
