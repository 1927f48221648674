use crate::{pose::KeypointKind, stats::StatKey};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(KeypointKind),

    #[error("unknown keypoint label: {0:?}")]
    UnknownKeypointLabel(String),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("keypoint coordinate must be finite, got {0}")]
    InfiniteCoordinate(f32),

    #[error("unknown exercise {0:?}, expected one of: toe_tap, jumping_jacks, push_up, random")]
    UnknownExercise(String),

    #[error("an exercise needs at least one keystate, got {0}")]
    InvalidKeystateCount(u8),

    /// For sinks backed by an external store. `AtomicStats` never fails.
    #[allow(dead_code)]
    #[error("stats sink unavailable while publishing {0}")]
    SinkUnavailable(StatKey),

    #[error("failed to read frame")]
    ReadFrame(#[source] std::io::Error),

    #[error("failed to decode frame on line {line}")]
    DecodeFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("frame timestamp must be a finite, non-negative number of seconds, got {0}")]
    InvalidTimestamp(f64),
}
