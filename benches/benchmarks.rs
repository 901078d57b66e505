use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use plastream::{
    timestamps, AngleStrategy, ConvexHullStrategy, Encoder, FitStrategy, LinearRegressionStrategy,
    Point, ProtocolConfig, ProtocolKind, StreamCompressor,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const EPSILON: f64 = 0.5;

/// Noisy random walk sampled once per time unit
fn walk(count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut y = 20.0;
    (0..count)
        .map(|i| {
            y += rng.random_range(-0.3..0.3);
            Point::new(i as f64, y)
        })
        .collect()
}

fn bench_strategy<S: FitStrategy + Clone>(c: &mut Criterion, name: &str, strategy: S) {
    let mut group = c.benchmark_group(format!("compress_{name}"));
    for count in [1000, 10000] {
        let points = walk(count);
        group.throughput(Throughput::Elements(count as u64));
        for kind in [ProtocolKind::TwoStream, ProtocolKind::SingleStream] {
            let compressor =
                StreamCompressor::new(strategy.clone(), ProtocolConfig::default().with_kind(kind))
                    .unwrap();
            group.bench_function(format!("{kind:?}_{count}_points"), |b| {
                b.iter(|| {
                    let records = compressor.compress(black_box(points.clone()), EPSILON).unwrap();
                    black_box(records.count())
                })
            });
        }
    }
    group.finish();
}

fn bench_compress(c: &mut Criterion) {
    let _ = env_logger::try_init();
    bench_strategy(c, "angle", AngleStrategy);
    bench_strategy(c, "hull", ConvexHullStrategy);
    bench_strategy(c, "regression", LinearRegressionStrategy);
}

fn bench_genplastream(c: &mut Criterion) {
    let points = walk(10000);
    let compressor = StreamCompressor::new(ConvexHullStrategy, ProtocolConfig::default()).unwrap();

    let mut group = c.benchmark_group("genplastream");
    group.throughput(Throughput::Elements(10000));
    group.bench_function("10000_points", |b| {
        b.iter(|| {
            let aligned = compressor
                .genplastream(points.clone(), EPSILON, timestamps(points.clone()))
                .unwrap();
            black_box(aligned.filter_map(Result::ok).count())
        })
    });
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let config = ProtocolConfig::default().with_kind(ProtocolKind::SingleStreamVariant);
    let compressor = StreamCompressor::new(AngleStrategy, config).unwrap();
    let records: Vec<_> = compressor.compress(walk(10000), EPSILON).unwrap().collect();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("variant_records", |b| {
        b.iter(|| {
            let mut enc = Encoder::new(config).unwrap();
            for record in &records {
                enc.append(black_box(record)).unwrap();
            }
            black_box(enc.to_bytes())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_genplastream, bench_encode);
criterion_main!(benches);
