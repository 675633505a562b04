//! Lock Manager - page-level shared/exclusive locks for two-phase locking.
//!
//! The [`LockManager`] decides, per page, which transactions may read or
//! write it. It never blocks inside [`LockManager::acquire`]; callers that
//! want to wait use [`LockManager::acquire_until`], which parks on a
//! condition variable between attempts and gives up at a deadline.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::common::{PageId, TransactionId};

/// Lock modes for read/write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Shared lock for reads (multiple readers allowed).
    Shared,
    /// Exclusive lock for writes (single writer, no readers).
    Exclusive,
}

/// Grants on one page, in grant order.
///
/// Either a single `Exclusive` entry, or any number of `Shared` entries from
/// distinct transactions. Never stored empty.
#[derive(Debug, Default)]
struct LockRecord {
    holders: Vec<(TransactionId, LockMode)>,
}

impl LockRecord {
    fn position(&self, tid: TransactionId) -> Option<usize> {
        self.holders.iter().position(|&(holder, _)| holder == tid)
    }

    fn has_exclusive(&self) -> bool {
        self.holders
            .iter()
            .any(|&(_, mode)| mode == LockMode::Exclusive)
    }
}

/// Per-page lock table shared by every running transaction.
///
/// # Thread Safety
/// - `table`: one `Mutex` serializes every acquire, release and query
/// - `released`: `Condvar` notified whenever a grant is removed
///
/// # Example
/// ```
/// use lockstepdb::concurrency::{LockManager, LockMode};
/// use lockstepdb::{PageId, TableId, TransactionId};
///
/// let lm = LockManager::new();
/// let pid = PageId::new(TableId(1), 0);
/// let (t1, t2) = (TransactionId::new(), TransactionId::new());
///
/// assert!(lm.acquire(t1, pid, LockMode::Shared));
/// assert!(lm.acquire(t2, pid, LockMode::Shared));
/// assert!(!lm.acquire(t1, pid, LockMode::Exclusive)); // t2 still reading
///
/// lm.release(t2, pid);
/// assert!(lm.acquire(t1, pid, LockMode::Exclusive)); // sole holder upgrades
/// ```
#[derive(Debug, Default)]
pub struct LockManager {
    table: Mutex<HashMap<PageId, LockRecord>>,
    released: Condvar,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to grant `mode` on `pid` to `tid` without waiting.
    ///
    /// Re-acquiring a held mode succeeds, as does asking for `Shared` while
    /// holding `Exclusive`. Asking for `Exclusive` while holding `Shared`
    /// upgrades in place, but only if `tid` is the page's sole holder.
    pub fn acquire(&self, tid: TransactionId, pid: PageId, mode: LockMode) -> bool {
        let mut table = self.table.lock();
        Self::try_grant(&mut table, tid, pid, mode)
    }

    /// Like [`acquire`](Self::acquire), but wait for other transactions to
    /// release until `deadline`. Returns whether the lock was granted.
    ///
    /// Waiters are not queued: whichever retry succeeds first after a
    /// release wins.
    pub fn acquire_until(
        &self,
        tid: TransactionId,
        pid: PageId,
        mode: LockMode,
        deadline: Instant,
    ) -> bool {
        let mut table = self.table.lock();
        loop {
            if Self::try_grant(&mut table, tid, pid, mode) {
                return true;
            }
            if self.released.wait_until(&mut table, deadline).timed_out() {
                return Self::try_grant(&mut table, tid, pid, mode);
            }
        }
    }

    /// Drop `tid`'s grant on `pid`. Returns whether there was one.
    pub fn release(&self, tid: TransactionId, pid: PageId) -> bool {
        let mut table = self.table.lock();
        let Some(record) = table.get_mut(&pid) else {
            return false;
        };
        let Some(pos) = record.position(tid) else {
            return false;
        };

        record.holders.remove(pos);
        if record.holders.is_empty() {
            table.remove(&pid);
        }
        drop(table);

        trace!(%tid, %pid, "lock released");
        self.released.notify_all();
        true
    }

    /// Drop every grant `tid` holds. Returns how many were released.
    pub fn release_all(&self, tid: TransactionId) -> usize {
        let mut table = self.table.lock();
        let mut released = 0;
        table.retain(|_, record| {
            if let Some(pos) = record.position(tid) {
                record.holders.remove(pos);
                released += 1;
            }
            !record.holders.is_empty()
        });
        drop(table);

        if released > 0 {
            trace!(%tid, released, "all locks released");
            self.released.notify_all();
        }
        released
    }

    /// Whether `tid` holds any grant on `pid`.
    pub fn has_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_mode(tid, pid).is_some()
    }

    /// The mode `tid` holds on `pid`, if any.
    pub fn lock_mode(&self, tid: TransactionId, pid: PageId) -> Option<LockMode> {
        let table = self.table.lock();
        let record = table.get(&pid)?;
        record.position(tid).map(|pos| record.holders[pos].1)
    }

    /// Every page `tid` holds a grant on, in ascending page order.
    pub fn pages_locked_by(&self, tid: TransactionId) -> Vec<PageId> {
        let table = self.table.lock();
        let mut pages: Vec<PageId> = table
            .iter()
            .filter(|(_, record)| record.position(tid).is_some())
            .map(|(&pid, _)| pid)
            .collect();
        pages.sort();
        pages
    }

    /// Current grants on `pid`, in grant order.
    pub fn holders(&self, pid: PageId) -> Vec<(TransactionId, LockMode)> {
        self.table
            .lock()
            .get(&pid)
            .map(|record| record.holders.clone())
            .unwrap_or_default()
    }

    /// Number of pages with at least one grant.
    pub fn locked_page_count(&self) -> usize {
        self.table.lock().len()
    }

    fn try_grant(
        table: &mut HashMap<PageId, LockRecord>,
        tid: TransactionId,
        pid: PageId,
        mode: LockMode,
    ) -> bool {
        let record = table.entry(pid).or_default();

        let granted = match record.position(tid) {
            Some(pos) => match (record.holders[pos].1, mode) {
                (LockMode::Exclusive, _) | (LockMode::Shared, LockMode::Shared) => true,
                (LockMode::Shared, LockMode::Exclusive) => {
                    if record.holders.len() == 1 {
                        record.holders[pos].1 = LockMode::Exclusive;
                        true
                    } else {
                        false
                    }
                }
            },
            None if record.holders.is_empty() => {
                record.holders.push((tid, mode));
                true
            }
            None if record.has_exclusive() => false,
            None => match mode {
                LockMode::Shared => {
                    record.holders.push((tid, mode));
                    true
                }
                LockMode::Exclusive => false,
            },
        };

        trace!(%tid, %pid, ?mode, granted, "lock request");
        granted
    }
}
