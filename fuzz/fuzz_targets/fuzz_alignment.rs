#![no_main]

use libfuzzer_sys::fuzz_target;
use plastream::{logical_times, timestamps, ConvexHullStrategy, ProtocolConfig, ProtocolKind, StreamCompressor};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, values)) = data.split_first() else {
        return;
    };
    let kind = match selector & 0b11 {
        0 => ProtocolKind::TwoStream,
        1 => ProtocolKind::SingleStream,
        2 => ProtocolKind::SingleStreamLidar,
        _ => ProtocolKind::SingleStreamVariant,
    };
    let epsilon = f64::from(selector >> 2) / 8.0;
    let points: Vec<_> = logical_times(values.iter().map(|&v| f64::from(v))).collect();

    let compressor = StreamCompressor::new(ConvexHullStrategy, ProtocolConfig::default().with_kind(kind)).unwrap();
    let aligned: Vec<_> = compressor
        .genplastream(points.clone(), epsilon, timestamps(points.clone()))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    // One entry per input point, in order, and every point resolved exactly once
    assert_eq!(aligned.len(), points.len(), "entry count mismatch");
    let mut resolved = 0;
    for (entry, p) in aligned.iter().zip(&points) {
        assert_eq!(entry.point, *p, "entry out of order");
        if let Some(rec) = &entry.reconstruction {
            resolved += rec.points.len();
        }
    }
    assert_eq!(resolved, points.len(), "resolved point count mismatch");
});
