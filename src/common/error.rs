//! Error types for lockstepdb.

use thiserror::Error;

use crate::common::{PageId, TableId, TransactionId};
use crate::storage::RecordId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in lockstepdb.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a table file. Propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transaction waited too long for a page lock and was rolled back.
    ///
    /// By the time the caller sees this, every lock the transaction held has
    /// been released and every page it dirtied has been restored from disk.
    #[error("{tid} aborted: lock wait timed out")]
    TransactionAborted { tid: TransactionId },

    /// The cache is full and every cached page is dirty.
    ///
    /// Nothing was changed; the fetch can be retried once other
    /// transactions commit or abort.
    #[error("buffer pool exhausted: all {capacity} cached pages are dirty")]
    EvictionExhausted { capacity: usize },

    /// Requested page does not exist in its table file.
    #[error("{0} not found")]
    PageNotFound(PageId),

    /// No file is registered for the table.
    #[error("table {0} not found in catalog")]
    TableNotFound(TableId),

    /// The tuple's slot is empty.
    #[error("no tuple at {0}")]
    TupleNotFound(RecordId),

    /// Deleting a tuple that was never stored.
    #[error("tuple has no record id")]
    MissingRecordId,

    /// Tuple payload does not match the table's fixed tuple width.
    #[error("tuple is {actual} bytes, table expects {expected}")]
    TupleSizeMismatch { expected: usize, actual: usize },

    /// Page bytes read from disk failed checksum verification.
    #[error("{0} failed checksum verification")]
    CorruptPage(PageId),

    /// A table file's page size differs from the buffer pool's.
    #[error("table {table_id} uses {actual}-byte pages, buffer pool expects {expected}")]
    PageSizeMismatch {
        table_id: TableId,
        expected: usize,
        actual: usize,
    },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(PageId::new(TableId(3), 42));
        assert_eq!(format!("{}", err), "Page(t3:42) not found");

        let err = Error::EvictionExhausted { capacity: 2 };
        assert_eq!(
            format!("{}", err),
            "buffer pool exhausted: all 2 cached pages are dirty"
        );

        let err = Error::TransactionAborted {
            tid: TransactionId::from_raw(7),
        };
        assert_eq!(format!("{}", err), "Txn(7) aborted: lock wait timed out");

        let err = Error::PageSizeMismatch {
            table_id: TableId(2),
            expected: 4096,
            actual: 64,
        };
        assert_eq!(
            format!("{}", err),
            "table 2 uses 64-byte pages, buffer pool expects 4096"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::from(io_err);
        assert!(err.source().is_some());
        assert!(Error::MissingRecordId.source().is_none());
    }
}
