//! Identifier types.

use std::fmt;

/// Identifies an open file (one heap table = one file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Invalid/sentinel file ID.
    pub const INVALID: FileId = FileId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        FileId(id)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}

/// Identifies a page within a file.
///
/// `u32` allows 4 billion pages per file: 2^32 × 4KB = 16TB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Used for "no page": an empty free-page list, an uninitialized
    /// frame, the end of the free-page chain.
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

/// A page's global identity: which file, which page.
///
/// The buffer pool's page table maps `PageKey → FrameId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub file_id: FileId,
    pub page_id: PageId,
}

impl PageKey {
    #[inline]
    pub fn new(file_id: FileId, page_id: PageId) -> Self {
        Self { file_id, page_id }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file_id, self.page_id)
    }
}

/// Identifies a frame in the buffer pool.
///
/// `usize` because frames live in a `Vec<Frame>` and this allows direct
/// indexing: `frames[frame_id.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
