//! Vector relations between keypoints.
//!
//! An [`Edge`] relates two keypoints, a [`Joint`] relates two edges. Both are
//! plain values computed once at construction.

use crate::pose::{Keypoint, Point};

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Edge {
    a: Keypoint,
    b: Keypoint,
    pub(crate) vector: Point,
    pub(crate) norm: f32,
    pub(crate) center: Point,
    pub(crate) score: f32,
}

impl Edge {
    pub(crate) fn new(a: Keypoint, b: Keypoint) -> Self {
        let vector = a.point - b.point;
        Self {
            a,
            b,
            vector,
            norm: vector.norm(),
            center: a.point.midpoint(b.point),
            score: a.score.min(b.score),
        }
    }

    /// The same edge pointing from `b` to `a`.
    pub(crate) fn reversed(&self) -> Self {
        Self::new(self.b, self.a)
    }

    /// Unsigned angle to `other` in degrees, in `[0, 180]`.
    ///
    /// If either vector has zero length the angle is 0.
    pub(crate) fn angle_to(&self, other: &Self) -> f32 {
        let sin = self.vector.cross(other.vector).abs();
        let cos = self.vector.dot(other.vector);
        sin.atan2(cos).to_degrees()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Joint {
    pub(crate) angle: f32,
}

impl Joint {
    pub(crate) fn new(e_a: &Edge, e_b: &Edge) -> Self {
        Self {
            angle: e_a.angle_to(e_b),
        }
    }
}
