//! Transaction identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one transaction for its whole lifetime.
///
/// Used as the ownership token for page locks and for the dirty marker of
/// pages the transaction modified. Ids are handed out from a process-wide
/// counter and never reused.
///
/// # Example
/// ```
/// use lockstepdb::TransactionId;
///
/// let a = TransactionId::new();
/// let b = TransactionId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Allocate a fresh, never-before-seen id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an id from its raw value (logging, tests).
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        TransactionId(raw)
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_across_threads() {
        use std::collections::HashSet;
        use std::thread;

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| (0..100).map(|_| TransactionId::new()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for tid in h.join().unwrap() {
                assert!(seen.insert(tid), "duplicate {}", tid);
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_ids_increase() {
        let a = TransactionId::new();
        let b = TransactionId::new();
        assert!(b > a);
    }
}
