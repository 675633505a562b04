//! Buffer pool counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters kept by the buffer pool.
///
/// Counters are independent, so `Relaxed` increments are enough; a
/// [`snapshot`](Self::snapshot) may mix values from slightly different
/// instants.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Fetches served from the cache.
    pub cache_hits: AtomicU64,

    /// Fetches that had to load the page from its table file.
    pub cache_misses: AtomicU64,

    /// Clean pages dropped to make room.
    pub evictions: AtomicU64,

    pub pages_read: AtomicU64,

    pub pages_written: AtomicU64,

    /// Lock waits that ran out of time and aborted their transaction.
    pub lock_timeouts: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of fetches served from the cache (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.cache_hits,
            &self.cache_misses,
            &self.evictions,
            &self.pages_read,
            &self.pages_written,
            &self.lock_timeouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Plain copy of [`BufferPoolStats`] for comparing and printing.
///
/// # Example
/// ```
/// use lockstepdb::BufferPoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferPoolStats::new();
/// stats.cache_hits.fetch_add(3, Ordering::Relaxed);
/// stats.cache_misses.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = stats.snapshot();
/// assert_eq!(snapshot.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub lock_timeouts: u64,
}

impl StatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, lock_timeouts: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.lock_timeouts,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = BufferPoolStats::new();
        assert_eq!(stats.hit_rate(), 0.0);

        for _ in 0..7 {
            BufferPoolStats::bump(&stats.cache_hits);
        }
        for _ in 0..3 {
            BufferPoolStats::bump(&stats.cache_misses);
        }

        assert_eq!(stats.hit_rate(), 0.7);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 7);
        assert_eq!(snapshot.cache_misses, 3);
    }

    #[test]
    fn test_stats_reset() {
        let stats = BufferPoolStats::new();
        stats.cache_hits.fetch_add(100, Ordering::Relaxed);
        stats.lock_timeouts.fetch_add(2, Ordering::Relaxed);

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = BufferPoolStats::new();
        stats.cache_hits.fetch_add(80, Ordering::Relaxed);
        stats.cache_misses.fetch_add(20, Ordering::Relaxed);
        stats.lock_timeouts.fetch_add(1, Ordering::Relaxed);

        let display = format!("{}", stats.snapshot());

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("lock_timeouts: 1"));
        assert!(display.contains("80.00%"));
    }
}
