//! Storage layer - table files and page formats.
//!
//! This module handles persistent storage:
//! - [`DbFile`] - What the buffer pool needs from a table file
//! - [`HeapFile`] - Flat file of slotted heap pages
//! - [`Catalog`] - Table id to file registry
//! - [`page`] - Page types and layouts

mod catalog;
mod db_file;
mod heap_file;
pub mod page;
mod tuple;

pub use catalog::Catalog;
pub use db_file::DbFile;
pub use heap_file::HeapFile;
pub use tuple::{RecordId, Tuple};
