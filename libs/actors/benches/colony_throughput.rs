//! Colony throughput benchmarks
//!
//! Short drained runs at a few population sizes, plus the pure reducer.

use colony_actors::{reduce, run, AntId, AntSnapshot};
use colony_config::ColonyConfig;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use tokio::runtime::Builder;

fn bench_colony_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony_run");
    group.sample_size(10);

    let runtime = Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();

    for population in [100usize, 1_000, 10_000] {
        let config = ColonyConfig {
            population,
            seed_batch: population,
            duration_secs: 0.1,
            seed: Some(1),
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::new("drained_window", population),
            &config,
            |b, config| {
                b.iter(|| {
                    let outcome = runtime.block_on(run(config)).unwrap();
                    black_box(outcome.report.total_messages);
                });
            },
        );
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let snapshots: Vec<_> = (0..10_000)
        .map(|i| AntSnapshot {
            start_latency: Some(Duration::from_micros(i as u64)),
            greetings_sent: i as u64,
            greetings_received: i as u64,
            acks_received: i as u64,
            round_trips: vec![Duration::from_micros(5); 8],
            ..AntSnapshot::empty(AntId::new(i))
        })
        .collect();

    c.bench_function("reduce_10k_ants", |b| {
        b.iter(|| black_box(reduce(&snapshots, Duration::from_secs(10))));
    });
}

criterion_group!(benches, bench_colony_run, bench_reduce);
criterion_main!(benches);
