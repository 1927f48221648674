use crate::{
    error::Error,
    pose::{Keypoint, KeypointKind, Pose},
};
use rand::Rng;
use std::{fmt, str::FromStr};

pub(crate) use jumping_jacks::JumpingJacks;
pub(crate) use push_up::PushUp;
pub(crate) use toe_tap::ToeTap;

mod jumping_jacks;
mod push_up;
mod toe_tap;

/// Discrete body configuration for one frame: `0` or a keystate in `1..=N`.
pub(crate) type PostureCode = u8;

pub(crate) const NO_POSTURE: PostureCode = 0;

/// Keypoints scoring at or below this are treated as not detected.
pub(crate) const DETECTION_THRESHOLD: f32 = 0.2;

pub(crate) trait Classifier {
    type Measurements;

    /// The landmarks that must be confidently detected for `measure` to succeed.
    fn required_keypoints(&self) -> &'static [KeypointKind];

    /// Compute the variant's edge and joint measurements, or `None` if any
    /// required keypoint is missing or not confident enough.
    fn measure(&self, pose: &Pose) -> Option<Self::Measurements>;

    /// Map measurements to a keystate, [`NO_POSTURE`] if none matches.
    fn classify(&self, measurements: Option<&Self::Measurements>) -> PostureCode;

    /// Number of keystates in one repetition.
    fn keystates(&self) -> u8 {
        2
    }
}

/// Fetch `kinds` from `pose` in order, provided every one of them is present
/// and scores strictly above [`DETECTION_THRESHOLD`].
pub(crate) fn detect<const N: usize>(
    pose: &Pose,
    kinds: &[KeypointKind; N],
) -> Option<[Keypoint; N]> {
    let mut keypoints = [Keypoint::default(); N];
    for (slot, &kind) in keypoints.iter_mut().zip(kinds.iter()) {
        let keypoint = pose.keypoint(kind)?;
        if keypoint.score > DETECTION_THRESHOLD {
            *slot = *keypoint;
        } else {
            return None;
        }
    }
    Some(keypoints)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Measurements {
    ToeTap(toe_tap::Measurements),
    JumpingJacks(jumping_jacks::Measurements),
    PushUp(push_up::Measurements),
}

impl Measurements {
    /// Named values for diagnostics and overlays.
    pub(crate) fn named(&self) -> [(&'static str, f32); 4] {
        match self {
            Self::ToeTap(m) => m.named(),
            Self::JumpingJacks(m) => m.named(),
            Self::PushUp(m) => m.named(),
        }
    }
}

impl fmt::Display for Measurements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.named().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:.1}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Exercise {
    ToeTap(ToeTap),
    JumpingJacks(JumpingJacks),
    PushUp(PushUp),
}

const REGISTRY: [(&str, fn() -> Exercise); 3] = [
    ("toe_tap", || Exercise::ToeTap(ToeTap)),
    ("jumping_jacks", || Exercise::JumpingJacks(JumpingJacks)),
    ("push_up", || Exercise::PushUp(PushUp)),
];

impl Exercise {
    pub(crate) fn from_name(name: &str) -> Result<Self, Error> {
        REGISTRY
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, make)| make())
            .ok_or_else(|| Error::UnknownExercise(name.to_owned()))
    }

    pub(crate) fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let (_, make) = REGISTRY[rng.gen_range(0..REGISTRY.len())];
        make()
    }

    /// Registry key, e.g. `push_up`.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::ToeTap(_) => "toe_tap",
            Self::JumpingJacks(_) => "jumping_jacks",
            Self::PushUp(_) => "push_up",
        }
    }

    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            Self::ToeTap(_) => "Toe Tap",
            Self::JumpingJacks(_) => "Jumping Jacks",
            Self::PushUp(_) => "Push Up",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Classifier for Exercise {
    type Measurements = Measurements;

    fn required_keypoints(&self) -> &'static [KeypointKind] {
        match self {
            Self::ToeTap(c) => c.required_keypoints(),
            Self::JumpingJacks(c) => c.required_keypoints(),
            Self::PushUp(c) => c.required_keypoints(),
        }
    }

    fn measure(&self, pose: &Pose) -> Option<Measurements> {
        match self {
            Self::ToeTap(c) => c.measure(pose).map(Measurements::ToeTap),
            Self::JumpingJacks(c) => c.measure(pose).map(Measurements::JumpingJacks),
            Self::PushUp(c) => c.measure(pose).map(Measurements::PushUp),
        }
    }

    fn classify(&self, measurements: Option<&Measurements>) -> PostureCode {
        match (self, measurements) {
            (Self::ToeTap(c), Some(Measurements::ToeTap(m))) => c.classify(Some(m)),
            (Self::JumpingJacks(c), Some(Measurements::JumpingJacks(m))) => c.classify(Some(m)),
            (Self::PushUp(c), Some(Measurements::PushUp(m))) => c.classify(Some(m)),
            _ => NO_POSTURE,
        }
    }

    fn keystates(&self) -> u8 {
        match self {
            Self::ToeTap(c) => c.keystates(),
            Self::JumpingJacks(c) => c.keystates(),
            Self::PushUp(c) => c.keystates(),
        }
    }
}

/// An exercise name as given on the command line, `random` included.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    Named(Exercise),
    Random,
}

impl Selection {
    pub(crate) fn resolve<R>(self, rng: &mut R) -> Exercise
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Named(exercise) => exercise,
            Self::Random => Exercise::random(rng),
        }
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "random" {
            Ok(Self::Random)
        } else {
            Exercise::from_name(s).map(Self::Named)
        }
    }
}
