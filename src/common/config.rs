//! Configuration for lockstepdb.

use std::time::Duration;

use crate::common::{Error, Result};
use crate::storage::page::PageHeader;

/// Default size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems. Tests shrink it through
/// [`BufferPoolConfig::with_page_size`] to force multi-page tables with
/// only a handful of tuples.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default number of pages the buffer pool caches.
pub const DEFAULT_CAPACITY: usize = 50;

/// Lower bound of the randomized lock wait.
pub const DEFAULT_LOCK_TIMEOUT_MIN: Duration = Duration::from_millis(1000);

/// Upper bound of the randomized lock wait.
pub const DEFAULT_LOCK_TIMEOUT_MAX: Duration = Duration::from_millis(3000);

/// Settings for a [`BufferPool`](crate::buffer::BufferPool).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lockstepdb::BufferPoolConfig;
///
/// let config = BufferPoolConfig::default()
///     .with_capacity(8)
///     .with_page_size(512)
///     .with_lock_timeout(Duration::from_millis(10), Duration::from_millis(30));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Maximum number of cached pages.
    pub capacity: usize,

    /// Bytes per page, header included.
    pub page_size: usize,

    /// Shortest time `fetch_page` waits for a lock before aborting.
    pub lock_timeout_min: Duration,

    /// Longest time `fetch_page` waits for a lock before aborting.
    pub lock_timeout_max: Duration,
}

impl BufferPoolConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the range the per-call lock timeout is drawn from.
    pub fn with_lock_timeout(mut self, min: Duration, max: Duration) -> Self {
        self.lock_timeout_min = min;
        self.lock_timeout_max = max;
        self
    }

    /// Reject settings the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be > 0".into()));
        }
        // Need room for the header, one bitmap byte and a one-byte slot.
        if self.page_size < PageHeader::SIZE + 2 {
            return Err(Error::InvalidConfig(format!(
                "page_size {} is smaller than the {}-byte page header",
                self.page_size,
                PageHeader::SIZE + 2
            )));
        }
        if self.lock_timeout_min > self.lock_timeout_max {
            return Err(Error::InvalidConfig(format!(
                "lock_timeout_min {:?} exceeds lock_timeout_max {:?}",
                self.lock_timeout_min, self.lock_timeout_max
            )));
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
            lock_timeout_min: DEFAULT_LOCK_TIMEOUT_MIN,
            lock_timeout_max: DEFAULT_LOCK_TIMEOUT_MAX,
        }
    }
}
