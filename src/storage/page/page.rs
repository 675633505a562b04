//! Page - the fixed-size unit of caching and I/O.
//!
//! A [`Page`] is shared between the buffer pool and every caller that
//! fetched it through a [`PageRef`]. Mutating the bytes through one handle
//! is visible through all of them, which is how a cache hit sees the live
//! version a transaction last wrote.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{PageId, TransactionId};

/// Shared handle to a cached page.
pub type PageRef = Arc<Page>;

/// A page of table data plus its dirty marker.
///
/// # Thread Safety
/// - `data`: `RwLock` so many readers or one writer touch the bytes. This is
///   a short-lived latch; the page *lock* that makes the access legal is
///   granted by the [`LockManager`](crate::concurrency::LockManager).
/// - `dirty`: separate `Mutex` so the buffer pool can check ownership
///   without waiting on a caller that holds the byte latch.
///
/// # Example
/// ```
/// use lockstepdb::{Page, PageId, TableId, TransactionId};
///
/// let page = Page::new(PageId::new(TableId(1), 0), 128);
/// page.data_mut()[0] = 0xFF;
/// assert_eq!(page.data()[0], 0xFF);
///
/// let tid = TransactionId::new();
/// page.mark_dirty(Some(tid));
/// assert_eq!(page.is_dirty(), Some(tid));
/// ```
#[derive(Debug)]
pub struct Page {
    id: PageId,
    data: RwLock<Box<[u8]>>,
    dirty: Mutex<Option<TransactionId>>,
}

impl Page {
    /// Create a zeroed, clean page.
    pub fn new(id: PageId, page_size: usize) -> Self {
        Self::from_bytes(id, vec![0u8; page_size])
    }

    /// Wrap bytes read from disk. The page starts clean.
    pub fn from_bytes(id: PageId, bytes: Vec<u8>) -> Self {
        Self {
            id,
            data: RwLock::new(bytes.into_boxed_slice()),
            dirty: Mutex::new(None),
        }
    }

    #[inline]
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Size of the page in bytes.
    pub fn size(&self) -> usize {
        self.data.read().len()
    }

    /// Latch the bytes for reading.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.data.read()
    }

    /// Latch the bytes for writing.
    #[inline]
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.data.write()
    }

    /// Latch the bytes for reading unless someone is writing them.
    #[inline]
    pub fn try_data(&self) -> Option<RwLockReadGuard<'_, Box<[u8]>>> {
        self.data.try_read()
    }

    /// Copy the current bytes out.
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.read().to_vec()
    }

    /// Replace the bytes in place, keeping every outstanding handle valid.
    ///
    /// # Panics
    /// Panics if `bytes` is not exactly one page long.
    pub fn overwrite(&self, bytes: &[u8]) {
        self.data.write().copy_from_slice(bytes);
    }

    /// Set (`Some`) or clear (`None`) the transaction that dirtied this page.
    #[inline]
    pub fn mark_dirty(&self, tid: Option<TransactionId>) {
        *self.dirty.lock() = tid;
    }

    /// The transaction that last dirtied this page, or `None` if clean.
    #[inline]
    pub fn is_dirty(&self) -> Option<TransactionId> {
        *self.dirty.lock()
    }
}
