//! On-page header of every data page.
//!
//! The header carries the slotted-page bookkeeping (live-record count,
//! free-list link), an LSN field reserved for recovery, and a CRC32
//! checksum for integrity.

use crate::common::PageId;

/// Metadata stored at the beginning of every data page.
///
/// # Layout (20 bytes, little-endian)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     record_count   (live records on this page)
/// 4       4     next_free_page (free-list link; PageId::INVALID = end)
/// 8       8     lsn            (reserved for WAL integration)
/// 16      4     checksum       (CRC32 of the page)
/// ```
///
/// # Checksum
/// Computed over the entire page with the checksum field itself zeroed,
/// so the stored value never feeds into its own computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of live records on the page (equals the popcount of the
    /// page's occupancy bitmap).
    pub record_count: u32,
    /// Next page in the table's free-page list. Only meaningful while
    /// the page is linked into the list; `PageId::INVALID` otherwise.
    pub next_free_page: PageId,
    /// Log sequence number of the last modification. Written by the
    /// recovery layer; this crate only carries it.
    pub lsn: u64,
    /// CRC32 checksum of the page contents.
    pub checksum: u32,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 20;

    pub const OFFSET_RECORD_COUNT: usize = 0;
    pub const OFFSET_NEXT_FREE: usize = 4;
    pub const OFFSET_LSN: usize = 8;
    pub const OFFSET_CHECKSUM: usize = 16;

    /// Read a header from the beginning of a page buffer.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let record_count = u32::from_le_bytes(
            data[Self::OFFSET_RECORD_COUNT..Self::OFFSET_RECORD_COUNT + 4]
                .try_into()
                .unwrap(),
        );
        let next_free_page = PageId(u32::from_le_bytes(
            data[Self::OFFSET_NEXT_FREE..Self::OFFSET_NEXT_FREE + 4]
                .try_into()
                .unwrap(),
        ));
        let lsn = u64::from_le_bytes(
            data[Self::OFFSET_LSN..Self::OFFSET_LSN + 8]
                .try_into()
                .unwrap(),
        );
        let checksum = u32::from_le_bytes(
            data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
                .try_into()
                .unwrap(),
        );

        Self {
            record_count,
            next_free_page,
            lsn,
            checksum,
        }
    }

    /// Write this header to the beginning of a page buffer.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_RECORD_COUNT..Self::OFFSET_RECORD_COUNT + 4]
            .copy_from_slice(&self.record_count.to_le_bytes());
        data[Self::OFFSET_NEXT_FREE..Self::OFFSET_NEXT_FREE + 4]
            .copy_from_slice(&self.next_free_page.0.to_le_bytes());
        data[Self::OFFSET_LSN..Self::OFFSET_LSN + 8].copy_from_slice(&self.lsn.to_le_bytes());
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute the CRC32 checksum of a page, with the checksum field
    /// treated as zero.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Check the stored checksum against the page contents.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

impl Default for PageHeader {
    /// An empty header: no records, not on the free list. A zeroed
    /// `next_free_page` would mean page 0, so the sentinel is explicit.
    fn default() -> Self {
        Self {
            record_count: 0,
            next_free_page: PageId::INVALID,
            lsn: 0,
            checksum: 0,
        }
    }
}
