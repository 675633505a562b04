//! The table file abstraction the buffer pool reads and writes through.

use crate::buffer::BufferPool;
use crate::common::{PageId, Result, TableId, TransactionId};
use crate::storage::page::{Page, PageRef};
use crate::storage::Tuple;

/// One table's on-disk storage: an array of fixed-size pages addressed by
/// page number.
///
/// Tuple mutations receive the buffer pool so they can fetch the pages they
/// touch under the caller's transaction (which is where the page locks come
/// from). They return every page they modified; the pool then marks those
/// pages dirty and keeps them cached.
pub trait DbFile: Send + Sync {
    fn table_id(&self) -> TableId;

    /// Bytes per page in this file.
    fn page_size(&self) -> usize;

    /// Read a page straight from disk, bypassing the cache.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page is past the end of the file
    /// - `Error::CorruptPage` if the page fails verification
    fn read_page(&self, page_id: PageId) -> Result<Page>;

    /// Write a page's current bytes to its slot in the file.
    fn write_page(&self, page: &Page) -> Result<()>;

    /// Number of pages currently in the file.
    fn num_pages(&self) -> Result<u32>;

    /// Store `tuple` on behalf of `tid`, recording where it went in its
    /// record id. Returns the pages that changed.
    fn insert_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &mut Tuple,
    ) -> Result<Vec<PageRef>>;

    /// Remove the tuple at `tuple.record_id()`. Returns the pages that changed.
    fn delete_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &Tuple,
    ) -> Result<Vec<PageRef>>;
}
