use crate::error::Error;
use num_traits::{FromPrimitive, ToPrimitive};
use ordered_float::NotNan;
use std::{fmt, str::FromStr};

pub(crate) use point::Point;

mod point;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;

const LABELS: [&str; NUM_KEYPOINTS] = [
    "nose",
    "left eye",
    "right eye",
    "left ear",
    "right ear",
    "left shoulder",
    "right shoulder",
    "left elbow",
    "right elbow",
    "left wrist",
    "right wrist",
    "left hip",
    "right hip",
    "left knee",
    "right knee",
    "left ankle",
    "right ankle",
];

impl KeypointKind {
    pub(crate) fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    pub(crate) fn from_idx(idx: usize) -> Result<Self, Error> {
        Self::from_usize(idx).ok_or(Error::ConvertUSizeToKeypointKind(idx))
    }

    /// The anatomical label used on the wire, e.g. `"left hip"`.
    pub(crate) fn label(self) -> &'static str {
        // every variant has a slot in LABELS
        LABELS[self as usize]
    }
}

impl fmt::Display for KeypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for KeypointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LABELS
            .iter()
            .position(|&label| label == s)
            .ok_or_else(|| Error::UnknownKeypointLabel(s.to_owned()))
            .and_then(Self::from_idx)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct Keypoint {
    pub(crate) kind: Option<KeypointKind>,
    pub(crate) point: Point,
    pub(crate) score: f32,
}

impl Keypoint {
    /// Build a keypoint from the (y, x) coordinate order used by the detector.
    pub(crate) fn from_yx(kind: KeypointKind, y: f32, x: f32, score: f32) -> Result<Self, Error> {
        Ok(Self {
            kind: Some(kind),
            point: Point::new(x, y)?,
            score,
        })
    }
}

pub(crate) type Keypoints = [Keypoint; NUM_KEYPOINTS];

/// All keypoints of one detected person. A slot whose `kind` is `None` was not
/// detected.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct Pose {
    pub(crate) keypoints: Keypoints,
    pub(crate) score: f32,
}

impl Pose {
    pub(crate) fn new(score: f32) -> Self {
        Self {
            keypoints: Default::default(),
            score,
        }
    }

    pub(crate) fn insert(&mut self, keypoint: Keypoint) -> Result<(), Error> {
        if let Some(kind) = keypoint.kind {
            self.keypoints[kind.idx()?] = keypoint;
        }
        Ok(())
    }

    pub(crate) fn keypoint(&self, kind: KeypointKind) -> Option<&Keypoint> {
        let keypoint = self.keypoints.get(kind.idx().ok()?)?;
        if keypoint.kind == Some(kind) {
            Some(keypoint)
        } else {
            None
        }
    }
}

/// Pick the highest scoring pose of a frame.
///
/// Ties go to the earliest pose and NaN scores are never selected.
pub(crate) fn best_pose(poses: &[Pose]) -> Option<&Pose> {
    let mut best = None;
    for pose in poses {
        let score = match NotNan::new(pose.score) {
            Ok(score) => score,
            Err(_) => continue,
        };
        match best {
            Some((best_score, _)) if best_score >= score => {}
            _ => best = Some((score, pose)),
        }
    }
    best.map(|(_, pose)| pose)
}
