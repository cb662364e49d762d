//! Storage layer - disk I/O and page formats.
//!
//! - [`DiskManager`] - page-granular file I/O, keyed by `(FileId, PageId)`
//! - [`page`] - the fixed-size page and its on-page header

mod disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
