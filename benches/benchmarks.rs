use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use gyre::{
    ChunkSet, ChunkSetConfig, GtsEncoder, ManualTimeSource, Timestamp, Value, NO_ELEVATION,
    NO_LOCATION,
};

const CHUNK_COUNT: u32 = 4;
const CHUNK_LENGTH: i64 = 100_000;
const NOW: Timestamp = 399_999;
const DEFAULT_SEED: u64 = 0xC0FFEE;

fn make_ring() -> ChunkSet {
    ChunkSet::with_config(ChunkSetConfig {
        chunk_count: CHUNK_COUNT,
        chunk_length: CHUNK_LENGTH,
        time_source: ManualTimeSource::new(NOW),
        ..ChunkSetConfig::default()
    })
    .expect("ring init")
}

/// Packs `n` long datapoints into one encoder, timestamps spread over the
/// whole live window, shuffled when `in_order` is false.
fn generate_batch(seed: u64, n: usize, in_order: bool) -> GtsEncoder {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ticks: Vec<Timestamp> = (0..n).map(|i| (i as i64 * NOW) / n as i64).collect();
    if !in_order {
        ticks.shuffle(&mut rng);
    }
    let mut enc = GtsEncoder::new(0);
    for ts in ticks {
        enc.add_value(ts, NO_LOCATION, NO_ELEVATION, Value::Long(ts))
            .expect("encode");
    }
    enc
}

fn bench_store_fixed_dataset(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for (name, in_order) in [("in_order", true), ("shuffled", false)] {
        let batch = generate_batch(DEFAULT_SEED, 20_000, in_order);
        group.bench_function(format!("store_20k_{}", name), |b| {
            b.iter_batched(
                make_ring,
                |ring| {
                    ring.store(black_box(&batch)).unwrap();
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_fetch_fixed_dataset(c: &mut Criterion) {
    let in_order = make_ring();
    in_order
        .store(&generate_batch(DEFAULT_SEED, 120_000, true))
        .expect("fill");
    let shuffled = make_ring();
    shuffled
        .store(&generate_batch(DEFAULT_SEED, 120_000, false))
        .expect("fill");

    let mut group = c.benchmark_group("fetch");

    group.bench_function("span_half_window", |b| {
        b.iter(|| {
            let out = in_order
                .fetch_span(black_box(NOW), black_box(200_000))
                .unwrap();
            black_box(out.count())
        })
    });

    group.bench_function("count_1k_in_order", |b| {
        b.iter(|| {
            let out = in_order.fetch_count(black_box(NOW), black_box(1_000)).unwrap();
            black_box(out.count())
        })
    });

    group.bench_function("count_1k_shuffled", |b| {
        b.iter(|| {
            let out = shuffled.fetch_count(black_box(NOW), black_box(1_000)).unwrap();
            black_box(out.count())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_store_fixed_dataset, bench_fetch_fixed_dataset);
criterion_main!(benches);
