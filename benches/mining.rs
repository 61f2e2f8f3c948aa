//! A-Priori vs PCY at shrinking dataset sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use freqpairs::study::basket_limit;
use freqpairs::{run_round, run_round_par, Algorithm, MemoryBaskets, RoundParams};

const NUM_BASKETS: u32 = 20_000;
const NUM_ITEMS: u32 = 2_000;

/// Deterministic retail-like baskets: a few popular items plus a long tail.
fn synthetic_baskets() -> Vec<Vec<u32>> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..NUM_BASKETS)
        .map(|_| {
            let len = 2 + (next() % 12) as usize;
            (0..len)
                .map(|_| {
                    let r = next();
                    if r % 4 == 0 {
                        (r >> 8) as u32 % 20
                    } else {
                        (r >> 8) as u32 % NUM_ITEMS
                    }
                })
                .collect()
        })
        .collect()
}

fn bench_rounds(c: &mut Criterion) {
    let baskets = synthetic_baskets();
    let total = baskets.len();
    let mut group = c.benchmark_group("round");
    group.sample_size(10);

    for &percent in &[100u32, 50, 10, 1] {
        let limit = basket_limit(percent, total);
        let params = RoundParams::sample(limit, 0.01);

        for &algorithm in &[Algorithm::Apriori, Algorithm::Pcy] {
            let id = BenchmarkId::new(algorithm.to_string(), percent);
            group.bench_with_input(id, &params, |b, &params| {
                let mut source = MemoryBaskets::new(baskets.clone());
                b.iter(|| black_box(run_round(&mut source, algorithm, params).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_sharded(c: &mut Criterion) {
    let baskets = synthetic_baskets();
    let mut group = c.benchmark_group("sharded_round");
    group.sample_size(10);

    for &algorithm in &[Algorithm::Apriori, Algorithm::Pcy] {
        group.bench_function(algorithm.to_string(), |b| {
            b.iter(|| black_box(run_round_par(&baskets, algorithm, RoundParams::first(0.01)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rounds, bench_sharded);
criterion_main!(benches);
