use super::{detect, Classifier, PostureCode, NO_POSTURE};
use crate::{
    geometry::{Edge, Joint},
    pose::{
        KeypointKind::{self, *},
        Pose,
    },
};

const REQUIRED: [KeypointKind; 8] = [
    LeftHip,
    RightHip,
    LeftAnkle,
    RightAnkle,
    LeftElbow,
    LeftShoulder,
    RightElbow,
    RightShoulder,
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Measurements {
    pub(crate) hips_norm: f32,
    pub(crate) ankles_norm: f32,
    pub(crate) left_shoulder_angle: f32,
    pub(crate) right_shoulder_angle: f32,
}

impl Measurements {
    pub(super) fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("hips_norm", self.hips_norm),
            ("ankles_norm", self.ankles_norm),
            ("left_shoulder_angle", self.left_shoulder_angle),
            ("right_shoulder_angle", self.right_shoulder_angle),
        ]
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct JumpingJacks;

impl Classifier for JumpingJacks {
    type Measurements = Measurements;

    fn required_keypoints(&self) -> &'static [KeypointKind] {
        &REQUIRED
    }

    fn measure(&self, pose: &Pose) -> Option<Measurements> {
        let [l_hip, r_hip, l_ankle, r_ankle, l_elbow, l_shoulder, r_elbow, r_shoulder] =
            detect(pose, &REQUIRED)?;

        // arm against torso, measured at the shoulder
        let j_l_shoulder = Joint::new(
            &Edge::new(l_shoulder, l_elbow),
            &Edge::new(l_shoulder, l_hip),
        );
        let j_r_shoulder = Joint::new(
            &Edge::new(r_shoulder, r_elbow),
            &Edge::new(r_shoulder, r_hip),
        );

        Some(Measurements {
            hips_norm: Edge::new(l_hip, r_hip).norm,
            ankles_norm: Edge::new(l_ankle, r_ankle).norm,
            left_shoulder_angle: j_l_shoulder.angle,
            right_shoulder_angle: j_r_shoulder.angle,
        })
    }

    fn classify(&self, measurements: Option<&Measurements>) -> PostureCode {
        let m = match measurements {
            Some(m) => m,
            None => return NO_POSTURE,
        };

        if m.ankles_norm <= m.hips_norm
            && m.left_shoulder_angle <= 30.0
            && m.right_shoulder_angle <= 30.0
        {
            1
        } else if m.ankles_norm >= m.hips_norm * 1.5
            && m.left_shoulder_angle >= 110.0
            && m.right_shoulder_angle >= 110.0
        {
            2
        } else {
            NO_POSTURE
        }
    }
}
