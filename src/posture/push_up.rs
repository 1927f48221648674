use super::{detect, Classifier, PostureCode, NO_POSTURE};
use crate::{
    geometry::{Edge, Joint},
    pose::{
        KeypointKind::{self, *},
        Pose,
    },
};

const REQUIRED: [KeypointKind; 6] = [
    LeftElbow,
    LeftShoulder,
    LeftWrist,
    RightElbow,
    RightShoulder,
    RightWrist,
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Measurements {
    pub(crate) left_elbow_angle: f32,
    pub(crate) right_elbow_angle: f32,
    pub(crate) left_shoulder_angle: f32,
    pub(crate) right_shoulder_angle: f32,
}

impl Measurements {
    pub(super) fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("left_elbow_angle", self.left_elbow_angle),
            ("right_elbow_angle", self.right_elbow_angle),
            ("left_shoulder_angle", self.left_shoulder_angle),
            ("right_shoulder_angle", self.right_shoulder_angle),
        ]
    }
}

/// Viewed head-on: arms locked under the shoulders at the top, elbows flared
/// out level with the shoulders at the bottom.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct PushUp;

impl Classifier for PushUp {
    type Measurements = Measurements;

    fn required_keypoints(&self) -> &'static [KeypointKind] {
        &REQUIRED
    }

    fn measure(&self, pose: &Pose) -> Option<Measurements> {
        let [l_elbow, l_shoulder, l_wrist, r_elbow, r_shoulder, r_wrist] =
            detect(pose, &REQUIRED)?;

        let e_l_elbow_l_shoulder = Edge::new(l_elbow, l_shoulder);
        let e_r_elbow_r_shoulder = Edge::new(r_elbow, r_shoulder);
        let e_shoulders = Edge::new(l_shoulder, r_shoulder);

        let j_l_elbow = Joint::new(&e_l_elbow_l_shoulder, &Edge::new(l_elbow, l_wrist));
        let j_r_elbow = Joint::new(&e_r_elbow_r_shoulder, &Edge::new(r_elbow, r_wrist));

        // upper arm against the shoulder line, both edges leaving the shoulder
        let j_l_shoulder = Joint::new(&e_shoulders, &e_l_elbow_l_shoulder.reversed());
        let j_r_shoulder = Joint::new(&e_shoulders.reversed(), &e_r_elbow_r_shoulder.reversed());

        Some(Measurements {
            left_elbow_angle: j_l_elbow.angle,
            right_elbow_angle: j_r_elbow.angle,
            left_shoulder_angle: j_l_shoulder.angle,
            right_shoulder_angle: j_r_shoulder.angle,
        })
    }

    fn classify(&self, measurements: Option<&Measurements>) -> PostureCode {
        let m = match measurements {
            Some(m) => m,
            None => return NO_POSTURE,
        };

        if m.left_elbow_angle >= 150.0
            && m.right_elbow_angle >= 150.0
            && m.left_shoulder_angle <= 120.0
            && m.right_shoulder_angle <= 120.0
        {
            1
        } else if m.left_elbow_angle <= 100.0
            && m.right_elbow_angle <= 100.0
            && m.left_shoulder_angle >= 150.0
            && m.right_shoulder_angle >= 150.0
        {
            2
        } else {
            NO_POSTURE
        }
    }
}
