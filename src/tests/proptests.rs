use crate::{
    decode_records, timestamps, AngleStrategy, CandidateSegment, ConvexHullStrategy, Encoder,
    FitStrategy, LinearRegressionStrategy, Point, ProtocolConfig, ProtocolKind, Record,
    StreamCompressor,
};
use proptest::prelude::*;

const ALL_KINDS: [ProtocolKind; 4] = [
    ProtocolKind::TwoStream,
    ProtocolKind::SingleStream,
    ProtocolKind::SingleStreamLidar,
    ProtocolKind::SingleStreamVariant,
];

/// Absorbs floating-point noise in line evaluation
const TOLERANCE: f64 = 1e-6;

prop_compose! {
    /// Random walk with strictly increasing timestamps
    fn arb_walk(max_len: usize)(count in 0usize..max_len)(
        steps in prop::collection::vec(0.1f64..5.0, count),
        deltas in prop::collection::vec(-3.0f64..3.0, count),
        start in -50.0f64..50.0,
    ) -> Vec<Point> {
        let (mut x, mut y) = (0.0, start);
        steps.iter().zip(&deltas).map(|(&dx, &dy)| {
            x += dx;
            y += dy;
            Point::new(x, y)
        }).collect()
    }
}

prop_compose! {
    /// Values from a small set, so flat runs are common
    fn arb_plateaus()(levels in prop::collection::vec(0u8..3, 0..80)) -> Vec<Point> {
        levels.iter().enumerate()
            .map(|(i, &level)| Point::new(i as f64, f64::from(level)))
            .collect()
    }
}

fn arb_epsilon() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.01f64..5.0]
}

fn arb_config() -> impl Strategy<Value = ProtocolConfig> {
    (3usize..40, any::<bool>()).prop_map(|(max_n, singletons)| {
        ProtocolConfig::default()
            .with_max_segment_length(max_n)
            .with_singletons(singletons)
    })
}

fn run<S: FitStrategy + Clone>(
    strategy: S,
    config: ProtocolConfig,
    points: &[Point],
    epsilon: f64,
) -> Vec<Record> {
    StreamCompressor::new(strategy, config)
        .unwrap()
        .compress(points.to_vec(), epsilon)
        .unwrap()
        .collect()
}

/// Segment lengths of every record
fn segment_lengths(record: &Record) -> Option<usize> {
    match record {
        Record::Run { segment, .. } => segment.map(|s| s.n),
        Record::Segment { n, .. } | Record::Flat { n, .. } => Some(*n),
        Record::Singleton(_) | Record::Batch(_) => None,
    }
}

/// Whether one line stays within `epsilon` of every point.
///
/// A feasible set of at least two distinct timestamps always has a feasible
/// line through two of the shifted points `(x_i, y_i +- epsilon)`.
fn single_line_fits(points: &[Point], epsilon: f64) -> bool {
    if points.len() <= 2 {
        return true;
    }
    let within = |p: Point, q: Point| {
        let line = crate::geometry::coefficients(p, q);
        points
            .iter()
            .all(|r| (line.at(r.x) - r.y).abs() <= epsilon + 1e-9)
    };
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            for (si, sj) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
                if within(points[i].shifted(si * epsilon), points[j].shifted(sj * epsilon)) {
                    return true;
                }
            }
        }
    }
    false
}

/// Points accepted by one candidate started on the first two points
fn candidate_length<S: FitStrategy>(strategy: &S, points: &[Point], epsilon: f64) -> usize {
    let mut candidate = strategy.initialize(points[0], points[1], epsilon);
    let mut n = 2;
    for &p in &points[2..] {
        if !candidate.check(p) {
            break;
        }
        candidate.update(p);
        n += 1;
    }
    n
}

/// Generate the stream properties for one fit strategy
macro_rules! proptest_strategy {
    ($strategy:expr, $mod_name:ident) => {
        mod $mod_name {
            use super::*;

            proptest! {
                /// Property: every reconstructed value is within epsilon of its input
                #[test]
                fn prop_error_bound(
                    points in arb_walk(200),
                    epsilon in arb_epsilon(),
                    config in arb_config(),
                ) {
                    for kind in ALL_KINDS {
                        let config = config.with_kind(kind);
                        let records = run($strategy, config, &points, epsilon);
                        let mut times = timestamps(points.clone());
                        let mut rebuilt = Vec::new();
                        for record in &records {
                            let rec = crate::reconstruct(record, &config, &mut times).unwrap();
                            rebuilt.extend(rec.points);
                        }
                        prop_assert_eq!(rebuilt.len(), points.len(), "{:?}", kind);
                        for (orig, out) in points.iter().zip(&rebuilt) {
                            prop_assert_eq!(orig.x, out.x);
                            prop_assert!(
                                (orig.y - out.y).abs() <= epsilon + TOLERANCE,
                                "{:?}: x={} original {} rebuilt {} epsilon {}",
                                kind, orig.x, orig.y, out.y, epsilon
                            );
                        }
                    }
                }

                /// Property: records account for every input point exactly once
                #[test]
                fn prop_point_count(points in arb_walk(200), epsilon in arb_epsilon()) {
                    for kind in ALL_KINDS {
                        let config = ProtocolConfig::default().with_kind(kind);
                        let records = run($strategy, config, &points, epsilon);
                        let total: usize = records.iter().map(Record::point_count).sum();
                        prop_assert_eq!(total, points.len(), "{:?}", kind);
                    }
                }

                /// Property: no segment is longer than the configured maximum,
                /// and TwoStream never anchors one shorter than 4 with singletons on
                #[test]
                fn prop_segment_cap(
                    points in arb_walk(200),
                    epsilon in arb_epsilon(),
                    config in arb_config(),
                ) {
                    for kind in ALL_KINDS {
                        let config = config.with_kind(kind);
                        for record in run($strategy, config, &points, epsilon) {
                            if let Some(n) = segment_lengths(&record) {
                                prop_assert!(n <= config.max_segment_length);
                                prop_assert!(n >= 2);
                                if kind == ProtocolKind::TwoStream && config.singletons {
                                    prop_assert!(n >= 4, "two-stream segment of {}", n);
                                }
                            }
                            match &record {
                                Record::Batch(values) => {
                                    prop_assert!(!values.is_empty());
                                    prop_assert!(values.len() <= config.max_segment_length);
                                }
                                Record::Run { values, .. } => {
                                    prop_assert!(values.len() <= config.max_segment_length);
                                }
                                _ => {}
                            }
                        }
                    }
                }

                /// Property: the aligned stream has one entry per input point, and
                /// each group only holds points consumed at or before its anchor
                #[test]
                fn prop_alignment(points in arb_walk(150), epsilon in arb_epsilon()) {
                    for kind in ALL_KINDS {
                        let config = ProtocolConfig::default().with_kind(kind);
                        let compressor = StreamCompressor::new($strategy, config).unwrap();
                        let aligned: Vec<_> = compressor
                            .genplastream(points.clone(), epsilon, timestamps(points.clone()))
                            .unwrap()
                            .collect::<Result<_, _>>()
                            .unwrap();

                        prop_assert_eq!(aligned.len(), points.len());
                        let mut resolved = 0;
                        for (i, (entry, p)) in aligned.iter().zip(&points).enumerate() {
                            prop_assert_eq!(entry.point, *p);
                            if let Some(rec) = &entry.reconstruction {
                                prop_assert!(!rec.points.is_empty());
                                prop_assert!(rec.points.iter().all(|q| q.x <= p.x));
                                resolved += rec.points.len();
                            }
                            prop_assert!(resolved <= i + 1);
                        }
                        prop_assert_eq!(resolved, points.len());
                    }
                }

                /// Property: lidar output is the plain output with zero-slope
                /// segments rewritten, and flat records rebuild constant values
                #[test]
                fn prop_lidar_rewrite(points in arb_plateaus(), epsilon in prop_oneof![Just(0.0), 0.01f64..0.6]) {
                    let single = run($strategy, ProtocolConfig::default(), &points, epsilon);
                    let lidar_config = ProtocolConfig::default().with_kind(ProtocolKind::SingleStreamLidar);
                    let lidar = run($strategy, lidar_config, &points, epsilon);

                    prop_assert_eq!(single.len(), lidar.len());
                    for (plain, rewritten) in single.iter().zip(&lidar) {
                        match *plain {
                            Record::Segment { n, line } if line.a == 0.0 => {
                                prop_assert_eq!(rewritten, &Record::Flat { n, b: line.b });
                                let mut times = (0..n).map(|i| i as f64);
                                let rec = crate::reconstruct(rewritten, &lidar_config, &mut times).unwrap();
                                prop_assert!(rec.points.iter().all(|p| p.y == line.b));
                            }
                            _ => {
                                prop_assert_eq!(plain, rewritten);
                            }
                        }
                    }
                }

                /// Property: records from the default config of every protocol
                /// survive the binary wire format unchanged
                #[test]
                fn prop_wire_roundtrip(points in arb_walk(600), epsilon in arb_epsilon()) {
                    for kind in ALL_KINDS {
                        let config = ProtocolConfig::default().with_kind(kind);
                        let records = run($strategy, config, &points, epsilon);
                        let mut enc = Encoder::new(config).unwrap();
                        for record in &records {
                            enc.append(record).unwrap();
                        }
                        prop_assert_eq!(enc.count(), records.len());
                        prop_assert_eq!(&decode_records(enc.as_bytes(), &config).unwrap(), &records);
                    }
                }
            }
        }
    };
}

proptest_strategy!(AngleStrategy, angle);
proptest_strategy!(ConvexHullStrategy, hull);
proptest_strategy!(LinearRegressionStrategy, regression);

proptest! {
    /// Property: the hull strategy never stops before the longest prefix a
    /// single line can cover
    #[test]
    fn prop_hull_is_maximal(points in arb_walk(13), epsilon in 0.01f64..5.0) {
        prop_assume!(points.len() >= 2);
        // a slightly tighter bound keeps boundary cases out of the comparison
        let tight = epsilon - 1e-6;
        let longest = (2..=points.len())
            .rev()
            .find(|&k| single_line_fits(&points[..k], tight))
            .unwrap_or(2);
        let n = candidate_length(&ConvexHullStrategy, &points, epsilon);
        prop_assert!(n >= longest, "hull stopped at {} of {}", n, longest);
    }
}
