//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is the unit of I/O between disk and memory. Pages are
//! stored in frames within the buffer pool; the slot area after the
//! on-page header is owned by the table layer.

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

use super::page_header::PageHeader;

/// A page of data (4KB, 4KB-aligned).
///
/// # Memory Layout
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────┐
/// │ PageHeader (20B) │ slot area (bitmap + record slots)        │
/// └──────────────────┴──────────────────────────────────────────┘
/// ```
///
/// The header fields that the table layer mutates on every insert and
/// delete (record count, free-list link) have direct in-place accessors
/// so a one-field update does not round-trip the whole header.
///
/// `Page` does not implement `Clone` outside of tests; copying 4KB
/// should be explicit.
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Size of the slot area available to the table layer.
    pub const SLOT_AREA_SIZE: usize = PAGE_SIZE - PageHeader::SIZE;

    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of the full page.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of the full page.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Immutable slot area (everything after the header).
    #[inline]
    pub fn slot_area(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    /// Mutable slot area.
    #[inline]
    pub fn slot_area_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    // ========================================================================
    // Header access
    // ========================================================================

    /// Decode the full page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    /// Encode a full page header.
    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }

    /// Number of live records on this page.
    #[inline]
    pub fn record_count(&self) -> u32 {
        u32::from_le_bytes(
            self.data[PageHeader::OFFSET_RECORD_COUNT..PageHeader::OFFSET_RECORD_COUNT + 4]
                .try_into()
                .unwrap(),
        )
    }

    #[inline]
    pub fn set_record_count(&mut self, count: u32) {
        self.data[PageHeader::OFFSET_RECORD_COUNT..PageHeader::OFFSET_RECORD_COUNT + 4]
            .copy_from_slice(&count.to_le_bytes());
    }

    /// Free-list link to the next not-full page.
    #[inline]
    pub fn next_free_page(&self) -> PageId {
        PageId(u32::from_le_bytes(
            self.data[PageHeader::OFFSET_NEXT_FREE..PageHeader::OFFSET_NEXT_FREE + 4]
                .try_into()
                .unwrap(),
        ))
    }

    #[inline]
    pub fn set_next_free_page(&mut self, page_id: PageId) {
        self.data[PageHeader::OFFSET_NEXT_FREE..PageHeader::OFFSET_NEXT_FREE + 4]
            .copy_from_slice(&page_id.0.to_le_bytes());
    }

    /// Recompute and store the page checksum.
    ///
    /// Called by the buffer pool right before a disk write.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the stored checksum against the page contents.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut page = Page::new();
        page.data.copy_from_slice(&self.data);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_page_new_is_zeroed() {
        let page = Page::new();
        assert_eq!(page.as_slice()[0], 0);
        assert_eq!(page.as_slice()[PAGE_SIZE - 1], 0);
        assert_eq!(page.record_count(), 0);
    }

    #[test]
    fn test_in_place_header_fields() {
        let mut page = Page::new();

        page.set_record_count(7);
        page.set_next_free_page(PageId::new(42));

        assert_eq!(page.record_count(), 7);
        assert_eq!(page.next_free_page(), PageId::new(42));

        // In-place accessors and full-header decode agree.
        let header = page.header();
        assert_eq!(header.record_count, 7);
        assert_eq!(header.next_free_page, PageId::new(42));
    }

    #[test]
    fn test_slot_area_does_not_overlap_header() {
        let mut page = Page::new();
        page.slot_area_mut()[0] = 0xFF;
        assert_eq!(page.record_count(), 0);
        assert_eq!(page.as_slice()[PageHeader::SIZE], 0xFF);
    }

    #[test]
    fn test_checksum_roundtrip() {
        let mut page = Page::new();
        page.slot_area_mut()[10] = 0xAB;
        page.update_checksum();
        assert!(page.verify_checksum());

        page.slot_area_mut()[10] = 0xAC;
        assert!(!page.verify_checksum());
    }

    #[test]
    fn test_page_reset() {
        let mut page = Page::new();
        page.set_record_count(3);
        page.slot_area_mut()[100] = 0xFF;

        page.reset();

        assert_eq!(page.record_count(), 0);
        assert_eq!(page.slot_area()[100], 0);
    }
}
