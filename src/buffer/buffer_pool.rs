//! Buffer Pool - the transactional page cache.
//!
//! The [`BufferPool`] provides:
//! - Page caching between table files and memory, with LRU eviction
//! - Page locking through the [`LockManager`] before any page is handed out
//! - Dirty tracking per transaction, with force-at-commit and
//!   restore-at-abort
//!
//! Dirty pages are never evicted (no-steal). A fetch that needs room when
//! every cached page is dirty fails with `Error::EvictionExhausted`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::buffer::replacer::LruList;
use crate::buffer::{BufferPoolStats, Frame};
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result, TableId, TransactionId};
use crate::concurrency::{LockManager, LockMode};
use crate::storage::page::{Page, PageRef};
use crate::storage::{Catalog, DbFile, Tuple};

/// Access a caller asks for when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissions {
    ReadOnly,
    ReadWrite,
}

impl Permissions {
    /// Lock mode needed for this access.
    pub fn lock_mode(self) -> LockMode {
        match self {
            Permissions::ReadOnly => LockMode::Shared,
            Permissions::ReadWrite => LockMode::Exclusive,
        }
    }
}

/// Everything that changes when pages enter or leave the cache.
struct CacheState {
    /// Maps page IDs to frame IDs.
    page_table: HashMap<PageId, FrameId>,

    /// Frame arena; `None` slots are on the free list.
    frames: Vec<Option<Frame>>,

    /// Stack of unused frame IDs.
    free_list: Vec<FrameId>,

    /// Recency order over occupied frames.
    lru: LruList,
}

impl CacheState {
    fn new(capacity: usize) -> Self {
        Self {
            page_table: HashMap::with_capacity(capacity),
            frames: (0..capacity).map(|_| None).collect(),
            // Reversed so frame 0 is handed out first.
            free_list: (0..capacity).rev().map(FrameId::new).collect(),
            lru: LruList::new(capacity),
        }
    }

    fn frame(&self, frame_id: FrameId) -> Option<&Frame> {
        self.frames[frame_id.0].as_ref()
    }

    /// Look up a cached page and mark it most recently used.
    fn touch(&mut self, page_id: PageId) -> Option<PageRef> {
        let frame_id = *self.page_table.get(&page_id)?;
        let page = Arc::clone(self.frame(frame_id)?.page());
        self.lru.move_to_front(frame_id);
        Some(page)
    }

    fn lookup(&self, page_id: PageId) -> Option<PageRef> {
        let frame_id = *self.page_table.get(&page_id)?;
        self.frame(frame_id).map(|frame| Arc::clone(frame.page()))
    }

    /// Unmap a page and empty its frame, leaving the frame off the free list.
    fn detach(&mut self, page_id: PageId) -> Option<FrameId> {
        let frame_id = self.page_table.remove(&page_id)?;
        self.lru.unlink(frame_id);
        self.frames[frame_id.0] = None;
        Some(frame_id)
    }

    fn remove(&mut self, page_id: PageId) -> bool {
        match self.detach(page_id) {
            Some(frame_id) => {
                self.free_list.push(frame_id);
                true
            }
            None => false,
        }
    }

    /// Cached pages dirtied by `tid`.
    fn dirtied_by(&self, tid: TransactionId) -> Vec<PageRef> {
        self.frames
            .iter()
            .flatten()
            .filter(|frame| frame.dirtied_by() == Some(tid))
            .map(|frame| Arc::clone(frame.page()))
            .collect()
    }
}

/// Caches pages of every table in the catalog and hands them out under
/// page locks.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         BufferPool                           │
/// │  state: Mutex<CacheState>                                    │
/// │  ┌──────────────┐  ┌──────────────────────────────────────┐  │
/// │  │ page_table   │  │   frames: Vec<Option<Frame>>         │  │
/// │  │PageId → Fid  │─▶│  [Frame0] [Frame1] [ None ] ...      │  │
/// │  └──────────────┘  └──────────────────────────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────────────────────────────┐  │
/// │  │  free_list   │  │  lru: head ⇄ f1 ⇄ f0 ⇄ ... ⇄ tail    │  │
/// │  └──────────────┘  └──────────────────────────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐        │
/// │  │ LockManager  │  │   Catalog    │  │    stats     │        │
/// │  └──────────────┘  └──────────────┘  └──────────────┘        │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex` for the page table, arena, free list and LRU
///   order, so structural changes never interleave
/// - `lock_manager`: its own mutex; never taken while `state` is held
/// - pages: each [`Page`] latches its own bytes; the pool only `try`-latches
///   page bytes while holding `state`
/// - commit/abort I/O and tuple mutation run without `state` held
///
/// # Usage
/// ```ignore
/// let pool = BufferPool::new(BufferPoolConfig::default(), catalog)?;
/// let tid = TransactionId::new();
///
/// let page = pool.fetch_page(tid, pid, Permissions::ReadOnly)?;
/// let first = page.data()[0];
///
/// pool.insert_tuple(tid, table_id, &mut tuple)?;
/// pool.complete_transaction(tid, true);
/// ```
pub struct BufferPool {
    state: Mutex<CacheState>,
    lock_manager: LockManager,
    catalog: Arc<Catalog>,
    config: BufferPoolConfig,
    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create an empty pool over the tables in `catalog`.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the configuration is rejected
    /// - `Error::PageSizeMismatch` if a registered table file uses a different
    ///   page size than `config.page_size`
    pub fn new(config: BufferPoolConfig, catalog: Arc<Catalog>) -> Result<Self> {
        config.validate()?;
        for table_id in catalog.table_ids() {
            let file = catalog.get_database_file(table_id)?;
            check_page_size(&config, file.as_ref())?;
        }
        Ok(Self {
            state: Mutex::new(CacheState::new(config.capacity)),
            lock_manager: LockManager::new(),
            catalog,
            config,
            stats: BufferPoolStats::new(),
        })
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page on behalf of `tid`, locking it first.
    ///
    /// Waits for conflicting transactions for a random time between the
    /// configured lock timeout bounds. If the lock is still not granted, `tid`
    /// is aborted (locks released, dirtied pages restored) before the error
    /// is returned.
    ///
    /// # Errors
    /// - `Error::TransactionAborted` if the lock wait timed out
    /// - `Error::EvictionExhausted` if the page is not cached, the cache is
    ///   full, and every cached page is dirty
    /// - `Error::TableNotFound`, `Error::PageNotFound`, I/O errors from the
    ///   table file on a miss
    pub fn fetch_page(&self, tid: TransactionId, pid: PageId, perm: Permissions) -> Result<PageRef> {
        self.lock_page(tid, pid, perm.lock_mode())?;

        let mut state = self.state.lock();
        if let Some(page) = state.touch(pid) {
            BufferPoolStats::bump(&self.stats.cache_hits);
            return Ok(page);
        }

        BufferPoolStats::bump(&self.stats.cache_misses);
        let file = self.table_file(pid.table_id())?;
        let page: PageRef = Arc::new(file.read_page(pid)?);
        BufferPoolStats::bump(&self.stats.pages_read);
        debug!(%tid, %pid, "loaded page");

        self.install(&mut state, Arc::clone(&page))?;
        Ok(page)
    }

    /// Block until `tid` holds `mode` on `pid`, or abort `tid`.
    fn lock_page(&self, tid: TransactionId, pid: PageId, mode: LockMode) -> Result<()> {
        if self.lock_manager.acquire(tid, pid, mode) {
            return Ok(());
        }

        let timeout = self.lock_timeout();
        let deadline = Instant::now() + timeout;
        if self.lock_manager.acquire_until(tid, pid, mode, deadline) {
            return Ok(());
        }

        BufferPoolStats::bump(&self.stats.lock_timeouts);
        info!(%tid, %pid, ?mode, ?timeout, "lock wait timed out, aborting transaction");
        self.complete_transaction(tid, false);
        Err(Error::TransactionAborted { tid })
    }

    /// Wait bound for one lock request, drawn uniformly per call.
    fn lock_timeout(&self) -> Duration {
        let (min, max) = (self.config.lock_timeout_min, self.config.lock_timeout_max);
        if min == max {
            return min;
        }
        rand::rng().random_range(min..=max)
    }

    // ========================================================================
    // Public API: Tuple mutation
    // ========================================================================

    /// Add `tuple` to table `table_id` on behalf of `tid`.
    ///
    /// The table file fetches (and so locks) the pages it touches. Every page
    /// it reports as modified is marked dirty by `tid` and kept cached as the
    /// most recently used. On success `tuple` carries its new record id.
    pub fn insert_tuple(&self, tid: TransactionId, table_id: TableId, tuple: &mut Tuple) -> Result<()> {
        let file = self.table_file(table_id)?;
        let modified = file.insert_tuple(self, tid, tuple)?;
        self.absorb_modified(tid, modified)
    }

    /// Remove `tuple` (located by its record id) on behalf of `tid`.
    pub fn delete_tuple(&self, tid: TransactionId, tuple: &Tuple) -> Result<()> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let file = self.table_file(rid.page_id.table_id())?;
        let modified = file.delete_tuple(self, tid, tuple)?;
        self.absorb_modified(tid, modified)
    }

    fn absorb_modified(&self, tid: TransactionId, pages: Vec<PageRef>) -> Result<()> {
        let mut state = self.state.lock();
        for page in pages {
            page.mark_dirty(Some(tid));

            let cached = state.page_table.get(&page.id()).copied();
            match cached {
                Some(frame_id) => {
                    if let Some(frame) = state.frames[frame_id.0].as_mut() {
                        frame.replace_page(page);
                    }
                    state.lru.move_to_front(frame_id);
                }
                None => self.install(&mut state, page)?,
            }
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Transaction completion
    // ========================================================================

    /// Commit (`true`) or abort (`false`) `tid`, then release all its locks.
    ///
    /// Commit writes every cached page `tid` dirtied to its file and marks it
    /// clean. Abort reloads each such page from its file, in place, so every
    /// outstanding handle sees the restored bytes.
    ///
    /// I/O is best effort: a failing page is logged and the sweep goes on.
    /// A page whose commit write failed stays dirty; a page that cannot be
    /// restored is dropped from the cache instead.
    pub fn complete_transaction(&self, tid: TransactionId, commit: bool) {
        let pages = self.state.lock().dirtied_by(tid);
        let page_count = pages.len();

        for page in pages {
            if commit {
                if let Err(e) = self.write_back(&page) {
                    warn!(%tid, pid = %page.id(), error = %e, "commit flush failed");
                }
            } else if let Err(e) = self.restore(&page) {
                warn!(%tid, pid = %page.id(), error = %e, "abort restore failed, discarding page");
                self.discard_page(page.id());
            }
        }

        let released = self.lock_manager.release_all(tid);
        debug!(%tid, commit, pages = page_count, locks = released, "transaction complete");
    }

    /// Commit `tid`.
    pub fn transaction_complete(&self, tid: TransactionId) {
        self.complete_transaction(tid, true);
    }

    /// Release one lock before the transaction ends.
    ///
    /// This breaks two-phase locking; only call it for a page whose contents
    /// the transaction did not use.
    pub fn release_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_manager.release(tid, pid)
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_manager.has_lock(tid, pid)
    }

    // ========================================================================
    // Public API: Flush and discard
    // ========================================================================

    /// Drop a page from the cache without writing it.
    ///
    /// Used when another layer has invalidated the page. Returns whether it
    /// was cached.
    pub fn discard_page(&self, pid: PageId) -> bool {
        self.state.lock().remove(pid)
    }

    /// Write a cached page to disk if it is dirty, and mark it clean.
    pub fn flush_page(&self, pid: PageId) -> Result<()> {
        let page = self.state.lock().lookup(pid);
        match page {
            Some(page) if page.is_dirty().is_some() => self.write_back(&page),
            _ => Ok(()),
        }
    }

    /// Write every cached page `tid` dirtied.
    ///
    /// # Errors
    /// Stops at the first failing write.
    pub fn flush_pages(&self, tid: TransactionId) -> Result<()> {
        let pages = self.state.lock().dirtied_by(tid);
        for page in pages {
            self.write_back(&page)?;
        }
        Ok(())
    }

    /// Write every dirty cached page.
    ///
    /// Maintenance and shutdown only: writing another transaction's
    /// uncommitted page mid-flight defeats no-steal, and abort can no longer
    /// undo it from disk.
    ///
    /// # Errors
    /// Every page is attempted; the first failure is returned.
    pub fn flush_all_pages(&self) -> Result<()> {
        let pages: Vec<PageRef> = {
            let state = self.state.lock();
            state
                .frames
                .iter()
                .flatten()
                .filter(|frame| frame.dirtied_by().is_some())
                .map(|frame| Arc::clone(frame.page()))
                .collect()
        };

        let mut first_error = None;
        for page in pages {
            if let Err(e) = self.write_back(&page) {
                warn!(pid = %page.id(), error = %e, "flush failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.state.lock().page_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pid: PageId) -> bool {
        self.state.lock().page_table.contains_key(&pid)
    }

    /// Cached page ids from most to least recently used.
    pub fn cached_page_ids(&self) -> Vec<PageId> {
        let state = self.state.lock();
        state
            .lru
            .iter_mru()
            .filter_map(|frame_id| state.frame(frame_id).map(Frame::page_id))
            .collect()
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    /// Cache `page` as the most recently used entry, evicting if full.
    fn install(&self, state: &mut CacheState, page: PageRef) -> Result<()> {
        let frame_id = match state.free_list.pop() {
            Some(frame_id) => frame_id,
            None => self.evict(state)?,
        };

        state.page_table.insert(page.id(), frame_id);
        state.frames[frame_id.0] = Some(Frame::new(page));
        state.lru.push_front(frame_id);
        Ok(())
    }

    /// Free the least recently used clean frame.
    ///
    /// Dirty frames, and frames whose bytes a caller is writing right now,
    /// are skipped where they stand. The victim is written to its file before
    /// it is dropped.
    fn evict(&self, state: &mut CacheState) -> Result<FrameId> {
        let mut victim = None;
        for frame_id in state.lru.iter_lru() {
            let Some(frame) = state.frame(frame_id) else {
                continue;
            };
            if frame.dirtied_by().is_some() {
                continue;
            }
            if let Some(bytes) = frame.page().try_data() {
                victim = Some((frame_id, frame.page_id(), bytes.to_vec()));
                break;
            }
        }

        let Some((frame_id, pid, bytes)) = victim else {
            return Err(Error::EvictionExhausted {
                capacity: self.config.capacity,
            });
        };

        let file = self.table_file(pid.table_id())?;
        file.write_page(&Page::from_bytes(pid, bytes))?;
        BufferPoolStats::bump(&self.stats.pages_written);

        state.detach(pid);
        BufferPoolStats::bump(&self.stats.evictions);
        debug!(%pid, %frame_id, "evicted page");
        Ok(frame_id)
    }

    /// Look up a table's file, refusing files laid out for another page size.
    ///
    /// Tables may be registered after the pool is built, so this runs on
    /// every lookup rather than once in `new`.
    fn table_file(&self, table_id: TableId) -> Result<Arc<dyn DbFile>> {
        let file = self.catalog.get_database_file(table_id)?;
        check_page_size(&self.config, file.as_ref())?;
        Ok(file)
    }

    /// Write a page's current bytes to its file and mark it clean.
    fn write_back(&self, page: &Page) -> Result<()> {
        let file = self.table_file(page.id().table_id())?;
        file.write_page(page)?;
        page.mark_dirty(None);
        BufferPoolStats::bump(&self.stats.pages_written);
        Ok(())
    }

    /// Replace a page's bytes with its on-disk version and mark it clean.
    fn restore(&self, page: &Page) -> Result<()> {
        let file = self.table_file(page.id().table_id())?;
        let on_disk = file.read_page(page.id())?;
        BufferPoolStats::bump(&self.stats.pages_read);
        page.overwrite(&on_disk.data());
        page.mark_dirty(None);
        Ok(())
    }
}

fn check_page_size(config: &BufferPoolConfig, file: &dyn DbFile) -> Result<()> {
    if file.page_size() != config.page_size {
        return Err(Error::PageSizeMismatch {
            table_id: file.table_id(),
            expected: config.page_size,
            actual: file.page_size(),
        });
    }
    Ok(())
}
