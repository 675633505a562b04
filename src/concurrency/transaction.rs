//! Transaction - a scoped handle over one [`TransactionId`].

use std::sync::Arc;

use tracing::debug;

use crate::buffer::{BufferPool, Permissions};
use crate::common::{Error, PageId, Result, TableId, TransactionId};
use crate::storage::page::PageRef;
use crate::storage::Tuple;

/// A running transaction against a [`BufferPool`].
///
/// Wraps a fresh [`TransactionId`] and forwards page and tuple operations to
/// the pool. `commit` and `abort` consume the handle; dropping a handle that
/// was never finished aborts it, so its locks are never leaked.
///
/// If a lock wait times out, the pool has already aborted the transaction
/// by the time the error comes back; the handle is then finished and its
/// drop does nothing.
///
/// # Example
/// ```ignore
/// let txn = Transaction::begin(Arc::clone(&pool));
/// let mut tuple = Tuple::new(vec![1u8; 8]);
/// txn.insert_tuple(table_id, &mut tuple)?;
/// txn.commit();
/// ```
pub struct Transaction {
    tid: TransactionId,
    pool: Arc<BufferPool>,
    finished: bool,
}

impl Transaction {
    pub fn begin(pool: Arc<BufferPool>) -> Self {
        let tid = TransactionId::new();
        debug!(%tid, "transaction started");
        Self {
            tid,
            pool,
            finished: false,
        }
    }

    #[inline]
    pub fn id(&self) -> TransactionId {
        self.tid
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Whether the transaction already committed or was aborted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// # Errors
    /// Once the pool has aborted this transaction, every call fails with
    /// `Error::TransactionAborted` without touching the pool.
    pub fn fetch_page(&mut self, pid: PageId, perm: Permissions) -> Result<PageRef> {
        self.ensure_live()?;
        let result = self.pool.fetch_page(self.tid, pid, perm);
        self.note(result)
    }

    pub fn insert_tuple(&mut self, table_id: TableId, tuple: &mut Tuple) -> Result<()> {
        self.ensure_live()?;
        let result = self.pool.insert_tuple(self.tid, table_id, tuple);
        self.note(result)
    }

    pub fn delete_tuple(&mut self, tuple: &Tuple) -> Result<()> {
        self.ensure_live()?;
        let result = self.pool.delete_tuple(self.tid, tuple);
        self.note(result)
    }

    pub fn commit(mut self) {
        self.finish(true);
    }

    pub fn abort(mut self) {
        self.finish(false);
    }

    /// A finished id must not take new locks: nothing would release them.
    fn ensure_live(&self) -> Result<()> {
        if self.finished {
            return Err(Error::TransactionAborted { tid: self.tid });
        }
        Ok(())
    }

    /// Mark the handle finished if the pool aborted the transaction.
    fn note<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(Error::TransactionAborted { .. }) = result {
            self.finished = true;
        }
        result
    }

    fn finish(&mut self, commit: bool) {
        if !self.finished {
            self.finished = true;
            self.pool.complete_transaction(self.tid, commit);
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.finish(false);
    }
}
