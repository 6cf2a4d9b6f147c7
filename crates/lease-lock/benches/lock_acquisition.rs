//! Benchmarks for lock acquisition latency

use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use lease_lock_core::coordinator::LockCoordinator;
use lease_lock_memory::MemoryLeaseStore;

fn bench_memory_lock_acquisition(c: &mut Criterion) {
    let coordinator = LockCoordinator::new(MemoryLeaseStore::new());

    let mut group = c.benchmark_group("memory_lock");
    group.bench_function("try_acquire", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                if let Ok(Some(handle)) = coordinator
                    .try_acquire("bench-lock", Duration::from_secs(30))
                    .await
                {
                    let _ = handle.release().await;
                }
            });
    });

    group.bench_function("acquire_uncontended", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                if let Ok(handle) = coordinator
                    .acquire("bench-lock", Duration::from_secs(30), Some(Duration::from_millis(1)))
                    .await
                {
                    let _ = handle.release().await;
                }
            });
    });

    group.finish();
}

criterion_group!(benches, bench_memory_lock_acquisition);
criterion_main!(benches);
