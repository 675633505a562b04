//! lockstepdb - A transactional page cache with strict two-phase page locking.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          lockstepdb                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Transaction Layer (concurrency/)               │   │
//! │  │      Transaction handle + LockManager (S/X page locks)   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Buffer Pool (buffer/)                      │   │
//! │  │   fetch_page → lock → hit | miss → LRU clean eviction    │   │
//! │  │   commit = force dirty pages, abort = reload from disk   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     Catalog → DbFile (HeapFile) + Page + PageHeader      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, TransactionId, Error, config)
//! - [`buffer`] - The buffer pool and its recency order
//! - [`concurrency`] - Page locks and transactions
//! - [`storage`] - Table files, tuples and page formats
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use lockstepdb::{BufferPool, BufferPoolConfig, Catalog, HeapFile, TableId, Transaction, Tuple};
//!
//! let catalog = Arc::new(Catalog::new());
//! let table = TableId(1);
//! catalog.add_table(Arc::new(HeapFile::open_or_create("users.tbl", table, 4096, 32).unwrap()));
//!
//! let pool = Arc::new(BufferPool::new(BufferPoolConfig::default(), catalog).unwrap());
//!
//! let mut txn = Transaction::begin(Arc::clone(&pool));
//! let mut tuple = Tuple::new(vec![0u8; 32]);
//! txn.insert_tuple(table, &mut tuple).unwrap();
//! txn.commit();
//! ```

pub mod buffer;
pub mod common;
pub mod concurrency;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::DEFAULT_PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, Result, TableId, TransactionId};

pub use buffer::{BufferPool, BufferPoolStats, Frame, Permissions, StatsSnapshot};
pub use concurrency::{LockManager, LockMode, Transaction};
pub use storage::page::{HeapPageLayout, Page, PageHeader, PageRef, PageType};
pub use storage::{Catalog, DbFile, HeapFile, RecordId, Tuple};
