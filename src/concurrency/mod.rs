//! Concurrency control - page locks and transaction handles.
//!
//! # Components
//! - [`LockManager`] - Shared/exclusive page locks
//! - [`Transaction`] - Scoped transaction over a buffer pool

mod lock_manager;
mod transaction;

pub use lock_manager::{LockManager, LockMode};
pub use transaction::Transaction;
