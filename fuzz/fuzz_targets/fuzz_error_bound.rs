#![no_main]

use libfuzzer_sys::fuzz_target;
use plastream::{
    reconstruct, timestamps, AngleStrategy, ConvexHullStrategy, FitStrategy,
    LinearRegressionStrategy, Point, ProtocolConfig, ProtocolKind, Record, StreamCompressor,
};

const KINDS: [ProtocolKind; 4] = [
    ProtocolKind::TwoStream,
    ProtocolKind::SingleStream,
    ProtocolKind::SingleStreamLidar,
    ProtocolKind::SingleStreamVariant,
];

fn check<S: FitStrategy + Clone>(strategy: S, config: ProtocolConfig, points: &[Point], epsilon: f64) {
    let compressor = StreamCompressor::new(strategy, config).unwrap();
    let records: Vec<Record> = compressor.compress(points.to_vec(), epsilon).unwrap().collect();

    let mut times = timestamps(points.to_vec());
    let mut rebuilt = Vec::with_capacity(points.len());
    for record in &records {
        if let Some(n) = match record {
            Record::Segment { n, .. } | Record::Flat { n, .. } => Some(*n),
            Record::Run { segment, .. } => segment.map(|s| s.n),
            _ => None,
        } {
            assert!(n <= config.max_segment_length, "segment cap exceeded");
        }
        rebuilt.extend(reconstruct(record, &config, &mut times).unwrap().points);
    }

    assert_eq!(rebuilt.len(), points.len(), "point count mismatch");
    for (orig, out) in points.iter().zip(&rebuilt) {
        assert!(
            (orig.y - out.y).abs() <= epsilon + 1e-6,
            "bound exceeded at x={}: {} vs {}",
            orig.x,
            orig.y,
            out.y
        );
    }
}

fuzz_target!(|data: &[u8]| {
    // Header: epsilon, max segment length, flags. Then (dx, dy) byte pairs
    if data.len() < 3 {
        return;
    }
    let epsilon = f64::from(data[0]) / 32.0;
    let max_n = usize::from(data[1]).max(3);
    let singletons = data[2] & 1 == 1;

    let (mut x, mut y) = (0.0, 0.0);
    let points: Vec<Point> = data[3..]
        .chunks_exact(2)
        .map(|pair| {
            x += f64::from(pair[0]) / 16.0 + 0.1;
            y += f64::from(pair[1] as i8) / 8.0;
            Point::new(x, y)
        })
        .collect();

    for kind in KINDS {
        let config = ProtocolConfig::default()
            .with_kind(kind)
            .with_max_segment_length(max_n)
            .with_singletons(singletons);
        check(AngleStrategy, config, &points, epsilon);
        check(ConvexHullStrategy, config, &points, epsilon);
        check(LinearRegressionStrategy, config, &points, epsilon);
    }
});
