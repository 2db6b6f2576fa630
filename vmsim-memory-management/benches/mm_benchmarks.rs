//! Memory management benchmarks

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use vmsim_memory_management::{PageNumber, PagingConfig, PagingEngine, ReplacementPolicy, SegmentDescriptor, SegmentEngine};

/// Deterministic reference string with some locality
fn reference_string(len: usize, pages: u64) -> Vec<PageNumber> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if i % 4 == 0 { state % pages } else { (i as u64 / 8) % pages }
        })
        .collect()
}

fn bench_run_to_completion(c: &mut Criterion) {
    let refs = reference_string(4096, 64);
    let mut group = c.benchmark_group("run_to_completion");
    for policy in ReplacementPolicy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, &policy| {
            b.iter(|| {
                let mut engine = PagingEngine::new(refs.clone(), PagingConfig::new(16, policy)).unwrap();
                black_box(engine.run_to_completion())
            })
        });
    }
    group.finish();
}

fn bench_step_with_snapshot(c: &mut Criterion) {
    let refs = reference_string(512, 32);
    c.bench_function("step_with_snapshot", |b| {
        b.iter(|| {
            let mut engine = PagingEngine::new(refs.clone(), PagingConfig::new(8, ReplacementPolicy::Lru)).unwrap();
            while !black_box(engine.step()).done {}
        })
    });
}

fn bench_translate(c: &mut Criterion) {
    let mut engine = SegmentEngine::new((0..256).map(|id| SegmentDescriptor::new(id, id * 0x1_0000, 0xffff))).unwrap();
    c.bench_function("translate", |b| {
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(7919);
            black_box(engine.translate(n % 300, n % 0x1_2000))
        })
    });
}

criterion_group!(
    benches,
    bench_run_to_completion,
    bench_step_with_snapshot,
    bench_translate
);

criterion_main!(benches);
