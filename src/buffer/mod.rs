//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between transactions and
//! table files. It holds a fixed number of frames, each caching one page,
//! and hands pages out only after the lock manager grants the matching
//! page lock.
//!
//! # Components
//! - [`BufferPool`] - The transactional page cache
//! - [`Permissions`] - Read-only or read-write access to a fetched page
//! - [`Frame`] - A slot in the buffer pool holding a page
//! - [`BufferPoolStats`] - Hit, miss, eviction and lock timeout counters
//! - [`replacer`] - Recency ordering used to pick eviction victims

mod buffer_pool;
mod frame;
pub mod replacer;
mod stats;

pub use buffer_pool::{BufferPool, Permissions};
pub use frame::Frame;
pub use stats::{BufferPoolStats, StatsSnapshot};
