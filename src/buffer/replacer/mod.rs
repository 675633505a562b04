//! Recency tracking for eviction.
//!
//! - [`LruList`] - arena-backed doubly linked list, MRU at the head

mod lru;

pub use lru::{Iter, LruList};
