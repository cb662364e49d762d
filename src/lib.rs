//! relstore - the storage engine of a relational database.
//!
//! A fixed-size buffer pool with pluggable eviction (LRU, LRU-K) caches
//! 4KB pages between disk and memory; a heap-file table layer maps
//! fixed-size records onto those pages with a slotted-page layout and a
//! free-page list.
//!
//! # Layers
//! ```text
//! TableHandle ──▶ BufferPoolManager ──▶ Replacer (policy)
//!                        │
//!                        └────────────▶ DiskManager (I/O)
//! ```
//!
//! # Quick start
//! ```no_run
//! use std::sync::Arc;
//! use relstore::buffer::{BufferPoolManager, EvictionPolicy};
//! use relstore::storage::DiskManager;
//! use relstore::table::{Record, StorageModel, TableHandle};
//!
//! # fn main() -> relstore::common::Result<()> {
//! let mut dm = DiskManager::new();
//! let fid = dm.create_file("orders.tbl")?;
//! let bpm = Arc::new(BufferPoolManager::new(64, dm, EvictionPolicy::lru_k()));
//!
//! let table = TableHandle::create(
//!     bpm,
//!     fid,
//!     StorageModel::Nary { record_size: 32, field_count: 4 },
//! )?;
//!
//! let rid = table.insert_record(&Record::non_null(1, vec![0u8; 32]))?;
//! let rec = table.get_record(rid)?;
//! # let _ = rec;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod common;
pub mod storage;
pub mod table;
