use super::{detect, Classifier, PostureCode, NO_POSTURE};
use crate::{
    geometry::{Edge, Joint},
    pose::{
        KeypointKind::{self, *},
        Pose,
    },
};

const REQUIRED: [KeypointKind; 10] = [
    LeftHip,
    RightHip,
    LeftAnkle,
    RightAnkle,
    LeftElbow,
    LeftShoulder,
    LeftWrist,
    RightElbow,
    RightShoulder,
    RightWrist,
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Measurements {
    pub(crate) hips_norm: f32,
    pub(crate) ankles_norm: f32,
    pub(crate) left_elbow_angle: f32,
    pub(crate) right_elbow_angle: f32,
}

impl Measurements {
    pub(super) fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("hips_norm", self.hips_norm),
            ("ankles_norm", self.ankles_norm),
            ("left_elbow_angle", self.left_elbow_angle),
            ("right_elbow_angle", self.right_elbow_angle),
        ]
    }
}

/// Feet together, one arm reaching down across the body while the other
/// stays bent, alternating sides.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct ToeTap;

impl Classifier for ToeTap {
    type Measurements = Measurements;

    fn required_keypoints(&self) -> &'static [KeypointKind] {
        &REQUIRED
    }

    fn measure(&self, pose: &Pose) -> Option<Measurements> {
        let [l_hip, r_hip, l_ankle, r_ankle, l_elbow, l_shoulder, l_wrist, r_elbow, r_shoulder, r_wrist] =
            detect(pose, &REQUIRED)?;

        let e_hips = Edge::new(l_hip, r_hip);
        let e_ankles = Edge::new(l_ankle, r_ankle);
        let j_l_elbow = Joint::new(
            &Edge::new(l_elbow, l_shoulder),
            &Edge::new(l_elbow, l_wrist),
        );
        let j_r_elbow = Joint::new(
            &Edge::new(r_elbow, r_shoulder),
            &Edge::new(r_elbow, r_wrist),
        );

        Some(Measurements {
            hips_norm: e_hips.norm,
            ankles_norm: e_ankles.norm,
            left_elbow_angle: j_l_elbow.angle,
            right_elbow_angle: j_r_elbow.angle,
        })
    }

    fn classify(&self, measurements: Option<&Measurements>) -> PostureCode {
        let m = match measurements {
            Some(m) => m,
            None => return NO_POSTURE,
        };

        if m.ankles_norm <= m.hips_norm
            && m.left_elbow_angle >= 90.0
            && m.right_elbow_angle <= 90.0
        {
            1
        } else if m.ankles_norm <= m.hips_norm
            && m.right_elbow_angle >= 90.0
            && m.left_elbow_angle <= 90.0
        {
            2
        } else {
            NO_POSTURE
        }
    }
}
