use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rimeid::{SnowflakeGenerator, WallClock};
use std::{thread::scope, time::Instant};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks the uncontended hot path against the real wall clock. A fixed
/// mock clock is unusable here: once a millisecond's sequence space drains,
/// the generator waits for the clock to advance.
fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator/wallclock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = SnowflakeGenerator::new(0, WallClock::default()).unwrap();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads, measuring lock contention
/// on the critical section.
fn bench_generator_contended(c: &mut Criterion) {
    const THREADS: usize = 4;

    let mut group = c.benchmark_group("generator/wallclock/contended");
    group.throughput(Throughput::Elements((TOTAL_IDS * THREADS) as u64));

    group.bench_function(format!("threads/{THREADS}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = SnowflakeGenerator::new(0, WallClock::default()).unwrap();
                scope(|s| {
                    for _ in 0..THREADS {
                        let generator = generator.clone();
                        s.spawn(move || {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.next_id().unwrap());
                            }
                        });
                    }
                });
            }

            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generator, bench_generator_contended);
criterion_main!(benches);
