use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use otf2r_core::prelude::*;

fn populated(n: u32) -> Registry {
    let mut registry = Registry::new();
    for i in 0..n {
        registry.create(StringDef::new(format!("region_{i}"))).ok();
    }
    registry
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_strings");
    for &n in &[1_000u32, 100_000u32] {
        group.throughput(Throughput::Elements(u64::from(n)));

        group.bench_function(BenchmarkId::new("create", n), |b| {
            b.iter_batched(
                Registry::new,
                |mut registry| {
                    for i in 0..n {
                        black_box(registry.create(StringDef::new(format!("region_{i}"))).ok());
                    }
                    registry
                },
                BatchSize::LargeInput,
            )
        });

        let registry = populated(n);
        group.bench_function(BenchmarkId::new("get", n), |b| {
            b.iter(|| {
                for i in 0..n {
                    black_box(registry.get::<StringDef>(StringRef::new(i)));
                }
            })
        });

        group.bench_function(BenchmarkId::new("iterate", n), |b| {
            b.iter(|| black_box(registry.definitions::<StringDef>().filter(|d| d.is_valid()).count()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
