//! Common types and utilities shared across lockstepdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration
//! - Error types
//! - Identifiers (TableId, PageId, FrameId, TransactionId)

pub mod config;
pub mod error;
mod frame_id;
mod page_id;
mod transaction_id;

pub use config::BufferPoolConfig;
pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::{PageId, TableId};
pub use transaction_id::TransactionId;
