//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The shared, latched byte container with its dirty marker
//! - [`PageHeader`] - Metadata at the start of every heap page
//! - [`HeapPageLayout`] - Slotted fixed-width tuple layout

mod heap_page;
#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use heap_page::HeapPageLayout;
pub use page::{Page, PageRef};
pub use page_header::{PageHeader, PageType};
