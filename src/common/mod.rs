//! Shared primitives used across the storage engine:
//! - Configuration constants
//! - Error types
//! - Identifiers (FileId, PageId, FrameId, PageKey, Rid)

pub mod config;
pub mod error;
mod ids;
mod rid;

pub use error::{Error, Result};
pub use ids::{FileId, FrameId, PageId, PageKey};
pub use rid::Rid;
