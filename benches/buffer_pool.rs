//! Criterion micro-benchmarks for the buffer pool.
//!
//! Benchmarks:
//! - Lock acquire/release latency
//! - Cache hit path of `fetch_page`
//! - Miss path with eviction (working set larger than the cache)
//! - Insert plus commit through a transaction

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::{tempdir, TempDir};

use lockstepdb::{
    BufferPool, BufferPoolConfig, Catalog, DbFile, HeapFile, LockManager, LockMode, PageId,
    Permissions, TableId, Transaction, TransactionId, Tuple,
};

const TABLE: TableId = TableId(1);

fn setup(capacity: usize, pages: u32) -> (TempDir, Arc<BufferPool>) {
    let dir = tempdir().unwrap();
    let file = Arc::new(HeapFile::create(dir.path().join("bench.tbl"), TABLE, 4096, 64).unwrap());
    for _ in 0..pages {
        file.allocate_page().unwrap();
    }
    let catalog = Arc::new(Catalog::new());
    catalog.add_table(file as Arc<dyn DbFile>);
    let config = BufferPoolConfig::default().with_capacity(capacity);
    (dir, Arc::new(BufferPool::new(config, catalog).unwrap()))
}

fn bench_lock_manager(c: &mut Criterion) {
    let lm = LockManager::new();
    let pid = PageId::new(TABLE, 0);

    c.bench_function("lock_acquire_release", |b| {
        let tid = TransactionId::new();
        b.iter(|| {
            lm.acquire(tid, pid, LockMode::Exclusive);
            black_box(lm.release(tid, pid));
        });
    });
}

fn bench_fetch_hit(c: &mut Criterion) {
    let (_dir, pool) = setup(16, 1);
    let tid = TransactionId::new();
    let pid = PageId::new(TABLE, 0);
    pool.fetch_page(tid, pid, Permissions::ReadOnly).unwrap();

    c.bench_function("fetch_page_hit", |b| {
        b.iter(|| black_box(pool.fetch_page(tid, pid, Permissions::ReadOnly).unwrap()));
    });
}

fn bench_fetch_evicting(c: &mut Criterion) {
    let (_dir, pool) = setup(4, 32);
    let tid = TransactionId::new();
    let mut page_no = 0u32;

    c.bench_function("fetch_page_miss_evict", |b| {
        b.iter(|| {
            page_no = (page_no + 1) % 32;
            let pid = PageId::new(TABLE, page_no);
            black_box(pool.fetch_page(tid, pid, Permissions::ReadOnly).unwrap())
        });
    });
}

fn bench_insert_commit(c: &mut Criterion) {
    let (_dir, pool) = setup(64, 0);

    c.bench_function("insert_commit", |b| {
        b.iter(|| {
            let mut txn = Transaction::begin(Arc::clone(&pool));
            txn.insert_tuple(TABLE, &mut Tuple::new(vec![7u8; 64])).unwrap();
            txn.commit();
        });
    });
}

criterion_group!(
    benches,
    bench_lock_manager,
    bench_fetch_hit,
    bench_fetch_evicting,
    bench_insert_commit
);
criterion_main!(benches);
