//! Heap File - one table stored as a flat file of slotted pages.
//!
//! The [`HeapFile`] handles all direct file operations for a table:
//! - Reading and writing whole pages
//! - Appending new pages
//! - Placing and removing tuples (through the buffer pool)

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::trace;

use crate::buffer::{BufferPool, Permissions};
use crate::common::{Error, PageId, Result, TableId, TransactionId};
use crate::storage::page::{HeapPageLayout, Page, PageHeader, PageRef};
use crate::storage::{DbFile, RecordId, Tuple};

/// Stores a table's tuples in a single file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0   page_size  2×page_size  ...  N×page_size
/// ```
///
/// # Thread Safety
/// The file handle sits behind a `Mutex`; each page read, write or append
/// holds it for the duration of one seek plus transfer.
///
/// # Durability
/// Writes and appends are followed by `fsync()`.
pub struct HeapFile {
    table_id: TableId,
    file: Mutex<File>,
    page_size: usize,
    layout: HeapPageLayout,
}

impl HeapFile {
    /// Create a new, empty table file.
    ///
    /// # Errors
    /// Returns an error if the file already exists, cannot be created, or
    /// if not even one tuple fits on a page.
    pub fn create<P: AsRef<Path>>(
        path: P,
        table_id: TableId,
        page_size: usize,
        tuple_size: usize,
    ) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Self::from_file(file, table_id, page_size, tuple_size)
    }

    /// Open an existing table file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        table_id: TableId,
        page_size: usize,
        tuple_size: usize,
    ) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(file, table_id, page_size, tuple_size)
    }

    /// Open an existing table file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(
        path: P,
        table_id: TableId,
        page_size: usize,
        tuple_size: usize,
    ) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, table_id, page_size, tuple_size)
        } else {
            Self::create(path, table_id, page_size, tuple_size)
        }
    }

    fn from_file(file: File, table_id: TableId, page_size: usize, tuple_size: usize) -> Result<Self> {
        if tuple_size == 0 {
            return Err(Error::InvalidConfig("tuple_size must be > 0".into()));
        }
        let layout = HeapPageLayout::new(page_size, tuple_size);
        if layout.slots_per_page() == 0 {
            return Err(Error::InvalidConfig(format!(
                "{}-byte tuples do not fit on a {}-byte page",
                tuple_size, page_size
            )));
        }
        Ok(Self {
            table_id,
            file: Mutex::new(file),
            page_size,
            layout,
        })
    }

    #[inline]
    pub fn layout(&self) -> &HeapPageLayout {
        &self.layout
    }

    /// Append a zeroed page and return its id.
    pub fn allocate_page(&self) -> Result<PageId> {
        let mut file = self.file.lock();
        let page_no = (file.metadata()?.len() / self.page_size as u64) as u32;

        let offset = page_no as u64 * self.page_size as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&vec![0u8; self.page_size])?;
        file.sync_all()?;

        Ok(PageId::new(self.table_id, page_no))
    }

    /// Read every tuple in the table under `tid`'s shared locks.
    pub fn scan(&self, pool: &BufferPool, tid: TransactionId) -> Result<Vec<Tuple>> {
        let mut tuples = Vec::new();
        for page_no in 0..self.num_pages()? {
            let pid = PageId::new(self.table_id, page_no);
            let page = pool.fetch_page(tid, pid, Permissions::ReadOnly)?;
            let data = page.data();
            tuples.extend(
                self.layout
                    .tuples(&data)
                    .map(|(slot, bytes)| Tuple::new(bytes).with_record_id(RecordId::new(pid, slot))),
            );
        }
        Ok(tuples)
    }

    fn check_width(&self, tuple: &Tuple) -> Result<()> {
        if tuple.data().len() != self.layout.tuple_size() {
            return Err(Error::TupleSizeMismatch {
                expected: self.layout.tuple_size(),
                actual: tuple.data().len(),
            });
        }
        Ok(())
    }

    /// Put `tuple` on `page`, which `tid` holds exclusively.
    ///
    /// The page is marked dirty only once the insert is certain, and before
    /// its bytes change, so eviction never sees a modified page as clean.
    fn place(&self, page: &PageRef, tid: TransactionId, tuple: &mut Tuple) -> Option<usize> {
        self.layout.free_slot(&page.data())?;
        page.mark_dirty(Some(tid));
        let slot = self.layout.insert(&mut page.data_mut(), tuple.data())?;
        tuple.set_record_id(Some(RecordId::new(page.id(), slot)));
        Some(slot)
    }
}

impl DbFile for HeapFile {
    fn table_id(&self) -> TableId {
        self.table_id
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn read_page(&self, page_id: PageId) -> Result<Page> {
        let mut file = self.file.lock();
        let page_count = file.metadata()?.len() / self.page_size as u64;
        if page_id.table_id() != self.table_id || page_id.page_no() as u64 >= page_count {
            return Err(Error::PageNotFound(page_id));
        }

        let offset = page_id.page_no() as u64 * self.page_size as u64;
        file.seek(SeekFrom::Start(offset))?;

        let mut bytes = vec![0u8; self.page_size];
        file.read_exact(&mut bytes)?;
        drop(file);

        if !PageHeader::verify(&bytes) {
            return Err(Error::CorruptPage(page_id));
        }
        Ok(Page::from_bytes(page_id, bytes))
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        let page_id = page.id();
        if page_id.table_id() != self.table_id {
            return Err(Error::PageNotFound(page_id));
        }

        let data = page.data();
        let mut file = self.file.lock();
        let offset = page_id.page_no() as u64 * self.page_size as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&data)?;
        file.sync_all()?;

        Ok(())
    }

    fn num_pages(&self) -> Result<u32> {
        let len = self.file.lock().metadata()?.len();
        Ok((len / self.page_size as u64) as u32)
    }

    fn insert_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &mut Tuple,
    ) -> Result<Vec<PageRef>> {
        self.check_width(tuple)?;

        for page_no in 0..self.num_pages()? {
            let pid = PageId::new(self.table_id, page_no);
            let held_before = pool.holds_lock(tid, pid);

            let page = pool.fetch_page(tid, pid, Permissions::ReadOnly)?;
            let has_room = self.layout.free_slot(&page.data()).is_some();
            if !has_room {
                // Nothing was read that matters to the caller; let others in.
                if !held_before {
                    pool.release_lock(tid, pid);
                }
                continue;
            }

            let page = pool.fetch_page(tid, pid, Permissions::ReadWrite)?;
            if let Some(slot) = self.place(&page, tid, tuple) {
                trace!(%tid, %pid, slot, "tuple inserted");
                return Ok(vec![page]);
            }
        }

        let pid = self.allocate_page()?;
        let page = pool.fetch_page(tid, pid, Permissions::ReadWrite)?;
        let slot = self
            .place(&page, tid, tuple)
            .ok_or(Error::TupleSizeMismatch {
                expected: self.layout.tuple_size(),
                actual: tuple.data().len(),
            })?;
        trace!(%tid, %pid, slot, "tuple inserted on new page");
        Ok(vec![page])
    }

    fn delete_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &Tuple,
    ) -> Result<Vec<PageRef>> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        if rid.page_id.table_id() != self.table_id {
            return Err(Error::TupleNotFound(rid));
        }

        let page = pool.fetch_page(tid, rid.page_id, Permissions::ReadWrite)?;
        if !self.layout.is_slot_used(&page.data(), rid.slot) {
            return Err(Error::TupleNotFound(rid));
        }
        page.mark_dirty(Some(tid));
        self.layout.delete(&mut page.data_mut(), rid.slot);
        trace!(%tid, %rid, "tuple deleted");
        Ok(vec![page])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PAGE: usize = 64;

    fn create_file(dir: &tempfile::TempDir) -> HeapFile {
        HeapFile::create(dir.path().join("t.tbl"), TableId(1), PAGE, 8).unwrap()
    }

    #[test]
    fn test_create_new_table() {
        let dir = tempdir().unwrap();
        let file = create_file(&dir);
        assert_eq!(file.num_pages().unwrap(), 0);
        assert_eq!(file.table_id(), TableId(1));
        assert_eq!(file.layout().slots_per_page(), 7);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");
        HeapFile::create(&path, TableId(1), PAGE, 8).unwrap();
        assert!(HeapFile::create(&path, TableId(1), PAGE, 8).is_err());
    }

    #[test]
    fn test_oversized_tuple_rejected() {
        let dir = tempdir().unwrap();
        let result = HeapFile::create(dir.path().join("t.tbl"), TableId(1), PAGE, 100);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_allocate_and_read_page() {
        let dir = tempdir().unwrap();
        let file = create_file(&dir);

        let pid = file.allocate_page().unwrap();
        assert_eq!(pid, PageId::new(TableId(1), 0));
        assert_eq!(file.num_pages().unwrap(), 1);

        let page = file.read_page(pid).unwrap();
        assert_eq!(page.id(), pid);
        assert_eq!(page.size(), PAGE);
        assert!(page.data().iter().all(|&b| b == 0));
        assert_eq!(page.is_dirty(), None);
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let file = create_file(&dir);
        let pid = file.allocate_page().unwrap();

        let page = Page::new(pid, PAGE);
        file.layout().insert(&mut page.data_mut(), &[0xAB; 8]).unwrap();
        file.write_page(&page).unwrap();

        let read = file.read_page(pid).unwrap();
        assert_eq!(read.snapshot(), page.snapshot());
        assert_eq!(file.layout().read_tuple(&read.data(), 0), Some(&[0xAB; 8][..]));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");

        {
            let file = HeapFile::create(&path, TableId(1), PAGE, 8).unwrap();
            let pid = file.allocate_page().unwrap();
            let page = Page::new(pid, PAGE);
            file.layout().insert(&mut page.data_mut(), &[0x42; 8]).unwrap();
            file.write_page(&page).unwrap();
        }

        {
            let file = HeapFile::open(&path, TableId(1), PAGE, 8).unwrap();
            assert_eq!(file.num_pages().unwrap(), 1);
            let page = file.read_page(PageId::new(TableId(1), 0)).unwrap();
            assert_eq!(file.layout().read_tuple(&page.data(), 0), Some(&[0x42; 8][..]));
        }
    }

    #[test]
    fn test_read_past_end() {
        let dir = tempdir().unwrap();
        let file = create_file(&dir);
        file.allocate_page().unwrap();

        let result = file.read_page(PageId::new(TableId(1), 1));
        assert!(matches!(result, Err(Error::PageNotFound(_))));
    }

    #[test]
    fn test_read_other_table_page() {
        let dir = tempdir().unwrap();
        let file = create_file(&dir);
        file.allocate_page().unwrap();

        let result = file.read_page(PageId::new(TableId(9), 0));
        assert!(matches!(result, Err(Error::PageNotFound(_))));
    }

    #[test]
    fn test_corrupt_page_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");
        let file = HeapFile::create(&path, TableId(1), PAGE, 8).unwrap();
        let pid = file.allocate_page().unwrap();

        let page = Page::new(pid, PAGE);
        file.layout().insert(&mut page.data_mut(), &[1; 8]).unwrap();
        // Flip a tuple byte without re-stamping the checksum.
        page.data_mut()[PAGE - 1] ^= 0xFF;
        file.write_page(&page).unwrap();

        assert!(matches!(file.read_page(pid), Err(Error::CorruptPage(p)) if p == pid));
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.tbl");

        {
            let file = HeapFile::open_or_create(&path, TableId(1), PAGE, 8).unwrap();
            assert_eq!(file.num_pages().unwrap(), 0);
            file.allocate_page().unwrap();
        }

        {
            let file = HeapFile::open_or_create(&path, TableId(1), PAGE, 8).unwrap();
            assert_eq!(file.num_pages().unwrap(), 1);
        }
    }
}
