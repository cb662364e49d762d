//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between the table layer and
//! disk: a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - the page cache
//! - [`Frame`] - a pool slot holding a page plus pin/dirty metadata
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII pin handles
//! - [`BufferPoolStats`] - atomic performance counters
//! - [`replacer`] - eviction policies (LRU, LRU-K)

mod buffer_pool_manager;
mod frame;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::Frame;
pub use page_guard::{PageReadGuard, PageWriteGuard};
pub use replacer::{EvictionPolicy, Replacer};
pub use stats::{BufferPoolStats, StatsSnapshot};
