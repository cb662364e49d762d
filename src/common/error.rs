//! Unified error type for the storage engine.
//!
//! Four failure classes, per the engine's contract:
//! - capacity exhaustion (`NoFreeFrame`) — the pool is saturated with
//!   pinned pages; surfaced immediately, never retried internally
//! - missing resource (`PageNotResident`, `PageMissing`,
//!   `RecordMissing`, `UnknownFile`) — callers may test-and-continue
//! - conflict (`RecordExists`) — insert into an occupied slot
//! - I/O (`Io`) — propagated from the disk layer unmodified

use thiserror::Error;

use crate::common::{FileId, PageId, PageKey, Rid};

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer pool has no free frame and no evictable frame.
    #[error("no free frame available in buffer pool")]
    NoFreeFrame,

    /// Operation requires the page to be unpinned, but it is in use.
    #[error("page {0} is pinned")]
    PagePinned(PageKey),

    /// Page is not cached in the buffer pool.
    #[error("page {0} is not resident in buffer pool")]
    PageNotResident(PageKey),

    /// The file id is not registered with the disk manager.
    #[error("unknown file: {0}")]
    UnknownFile(FileId),

    /// The target page does not exist in the table.
    #[error("page {0} does not exist")]
    PageMissing(PageId),

    /// The page was expected to have a free slot but has none.
    #[error("page {0} has no free slot")]
    PageFull(PageId),

    /// No live record at the given RID.
    #[error("record {0} does not exist")]
    RecordMissing(Rid),

    /// A live record already occupies the given RID.
    #[error("record {0} already exists")]
    RecordExists(Rid),
}
