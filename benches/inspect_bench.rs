use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fpsr::search::{inspect, SearchConfig};
use fpsr::signal::HeldSignal;
use fpsr::{Generator, Lod, QuantisedSwitching, SinePrecision, StackedModulo, ToggledModulo};

fn generators() -> Vec<Generator> {
    vec![
        StackedModulo::default().into(),
        ToggledModulo::default().into(),
        QuantisedSwitching::default().into(),
        QuantisedSwitching::builder()
            .precision(SinePrecision::Table4096)
            .build()
            .into(),
    ]
}

fn bench_value_at(c: &mut Criterion) {
    for g in generators() {
        let name = format!("value_at_1024/{}", g.name());
        c.bench_function(&name, |b| {
            b.iter(|| {
                let mut acc = 0.0;
                for frame in 0..1024 {
                    acc += g.value_at(black_box(frame));
                }
                black_box(acc)
            })
        });
    }
}

fn bench_inspect(c: &mut Criterion) {
    let sm = Generator::from(StackedModulo::default());
    for lod in [Lod::Value, Lod::Changed, Lod::Full] {
        let cfg = SearchConfig::new(lod);
        c.bench_function(&format!("inspect_lod{}", lod.level()), |b| {
            b.iter(|| black_box(inspect(&sm, black_box(1234.5), &cfg)))
        });
    }

    // Worst case: a hold longer than the search cap in both directions.
    let flat = ToggledModulo::new(1_000_000, 1_000_000, 2, 0, 0);
    let cfg = SearchConfig::default();
    c.bench_function("inspect_capped", |b| {
        b.iter(|| black_box(inspect(&flat, black_box(500_000.0), &cfg)))
    });
}

criterion_group!(benches, bench_value_at, bench_inspect);
criterion_main!(benches);
