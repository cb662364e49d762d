//! Heap-file table storage.
//!
//! - [`TableHandle`] - record CRUD and forward scan over one heap file
//! - [`TableHeader`] - per-file metadata (counts, free-list head, slot
//!   geometry)
//! - [`Record`] - a fixed-size tuple with per-field null tracking
//! - [`StorageModel`] / [`SlotLayout`] - row-major (NARY) or
//!   column-major (PAX) slot arrangement
//! - [`bitmap`] - occupancy-bitmap helpers

pub mod bitmap;
mod page_handle;
mod record;
mod slot_layout;
mod table_handle;
mod table_header;

pub use record::Record;
pub use slot_layout::{NaryLayout, PaxLayout, SlotLayout, StorageModel};
pub use table_handle::{TableHandle, TableIter};
pub use table_header::TableHeader;
