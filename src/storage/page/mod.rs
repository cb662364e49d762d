//! Page types and layout.
//!
//! - [`Page`] - the raw 4KB data container
//! - [`PageHeader`] - metadata at the start of every data page

#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use page::Page;
pub use page_header::PageHeader;
