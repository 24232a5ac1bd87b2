//! Benchmarks for diskint.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use diskint::{DiskInt, DiskIntConfig, Engine, LIMB_BYTES, Limb, MemoryBudget};

fn operand(len: usize, seed: u64) -> Vec<Limb> {
    // Deterministic pseudo-random limbs
    (0..len as u64)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ seed)
        .collect()
}

fn bench_add(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = c.benchmark_group("add");

    for limbs in [1024usize, 64 * 1024, 1024 * 1024] {
        let config = DiskIntConfig::default()
            .with_work_dir(dir.path())
            .with_memory_budget(MemoryBudget::Fixed(3 * 64 * 1024));
        let engine = Engine::new(config.clone()).expect("config");
        let a = DiskInt::from_limbs(&operand(limbs, 1), &config).expect("load a");
        let b = DiskInt::from_limbs(&operand(limbs, 2), &config).expect("load b");

        group.throughput(Throughput::Bytes((2 * limbs * LIMB_BYTES) as u64));
        group.bench_function(format!("{}k_limbs", limbs / 1024), |bench| {
            bench.iter(|| {
                let sum = engine.add(black_box(&a), black_box(&b)).expect("add");
                black_box(sum.limb_count().expect("size"))
            });
        });
    }

    group.finish();
}

fn bench_budgets(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = c.benchmark_group("budgets");
    let limbs = 256 * 1024;

    for block_kib in [4u64, 64, 1024] {
        let config = DiskIntConfig::default()
            .with_work_dir(dir.path())
            .with_memory_budget(MemoryBudget::Fixed(3 * block_kib * 1024));
        let engine = Engine::new(config.clone()).expect("config");
        let a = DiskInt::from_limbs(&operand(limbs, 3), &config).expect("load a");
        let b = DiskInt::from_limbs(&operand(limbs / 2, 4), &config).expect("load b");

        group.bench_function(format!("sub_{block_kib}kib_blocks"), |bench| {
            bench.iter(|| {
                let diff = engine.sub(black_box(&a), black_box(&b)).expect("sub");
                black_box(diff.limb_count().expect("size"))
            });
        });
    }

    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = DiskIntConfig::default()
        .with_work_dir(dir.path())
        .with_memory_budget(MemoryBudget::Fixed(3 * 64 * 1024));
    let engine = Engine::new(config.clone()).expect("config");

    // a - b leaves a single limb under a long run of zeros
    let mut high = vec![0; 512 * 1024];
    high[512 * 1024 - 1] = 1;
    let mut low = high.clone();
    low[0] = 1;
    let a = DiskInt::from_limbs(&low, &config).expect("load a");
    let b = DiskInt::from_limbs(&high, &config).expect("load b");

    c.bench_function("sub_with_long_zero_tail", |bench| {
        bench.iter(|| {
            let diff = engine.sub(black_box(&a), black_box(&b)).expect("sub");
            black_box(diff.limb_count().expect("size"))
        });
    });
}

criterion_group!(benches, bench_add, bench_budgets, bench_canonicalize);
criterion_main!(benches);
