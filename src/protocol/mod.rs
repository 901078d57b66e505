//! Wire protocols: turning fitted segments into records.
//!
//! Each protocol is a push-driven step machine. [`Protocol::feed`] consumes
//! one point and may complete zero or more records; [`Protocol::finish`]
//! drains whatever the lookahead still holds at end of stream. Records are
//! appended to a caller-owned queue, so suspension points and buffer
//! ownership stay explicit.
//!
//! | Protocol | Lookahead | Singleton fallback | End of stream |
//! |----------|-----------|--------------------|---------------|
//! | TwoStream | 3 | loose value while n < 4 | leftovers become loose values |
//! | SingleStream | 2 | `(1, y)` while n == 2 | lone point or last two points as singletons, else flush |
//! | SingleStreamLidar | 2 | as SingleStream | as SingleStream, flat segments rewritten |
//! | SingleStreamVariant | 2 | appended to a batch | pending batch, then pending fit |

mod single_stream;
mod two_stream;
mod variant;

pub use single_stream::{Lidar, SingleStream};
pub use two_stream::TwoStream;
pub use variant::Variant;

use std::collections::VecDeque;

use crate::config::{ProtocolConfig, ProtocolKind};
use crate::point::Point;
use crate::record::Record;
use crate::strategy::FitStrategy;

/// The protocol selected for a run, with its in-flight state
pub enum Protocol<S: FitStrategy> {
    TwoStream(TwoStream<S>),
    SingleStream(SingleStream<S>),
    SingleStreamLidar(Lidar<S>),
    SingleStreamVariant(Variant<S>),
}

impl<S: FitStrategy> Protocol<S> {
    /// Build the step machine for `config.kind`.
    ///
    /// `config` and `epsilon` are expected to be validated already.
    #[must_use]
    pub fn new(strategy: S, config: &ProtocolConfig, epsilon: f64) -> Self {
        let max_n = config.max_segment_length;
        let singletons = config.singletons;
        match config.kind {
            ProtocolKind::TwoStream => {
                Self::TwoStream(TwoStream::new(strategy, epsilon, max_n, singletons))
            }
            ProtocolKind::SingleStream => {
                Self::SingleStream(SingleStream::new(strategy, epsilon, max_n, singletons))
            }
            ProtocolKind::SingleStreamLidar => {
                Self::SingleStreamLidar(Lidar::new(strategy, epsilon, max_n, singletons))
            }
            ProtocolKind::SingleStreamVariant => {
                Self::SingleStreamVariant(Variant::new(strategy, epsilon, max_n, singletons))
            }
        }
    }

    /// Consume one point, appending every record it completes to `out`.
    pub fn feed(&mut self, p: Point, out: &mut VecDeque<Record>) {
        match self {
            Self::TwoStream(proto) => proto.feed(p, out),
            Self::SingleStream(proto) => proto.feed(p, out),
            Self::SingleStreamLidar(proto) => proto.feed(p, out),
            Self::SingleStreamVariant(proto) => proto.feed(p, out),
        }
    }

    /// Flush the lookahead at end of stream. Idempotent.
    pub fn finish(&mut self, out: &mut VecDeque<Record>) {
        match self {
            Self::TwoStream(proto) => proto.finish(out),
            Self::SingleStream(proto) => proto.finish(out),
            Self::SingleStreamLidar(proto) => proto.finish(out),
            Self::SingleStreamVariant(proto) => proto.finish(out),
        }
    }
}
