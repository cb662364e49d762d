//! Configuration constants.

use super::ids::PageId;

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems; pages are aligned to this
/// value so Direct I/O remains an option later.
pub const PAGE_SIZE: usize = 4096;

/// Default number of frames in a buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Default k for the LRU-K replacement policy.
pub const DEFAULT_LRU_K: usize = 2;

/// Page 0 of every table file holds the file header; data pages start
/// right after it.
pub const FILE_HEADER_PAGE_ID: PageId = PageId(0);
