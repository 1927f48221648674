//! Per-frame detector output, one JSON object per line:
//!
//! ```text
//! {"timestamp": 1.25, "poses": [{"score": 0.8, "keypoints": {"left hip": {"y": 210.0, "x": 320.5, "score": 0.9}}}]}
//! ```
//!
//! `timestamp` is in seconds from the start of the stream and may be omitted.
//! A frame with no `poses` had no body in view.

use crate::{
    error::Error,
    pose::{Keypoint, KeypointKind, Pose},
};
use serde::Deserialize;
use std::{collections::HashMap, io::BufRead, time::Duration};

#[derive(Debug, Deserialize)]
struct RawKeypoint {
    y: f32,
    x: f32,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct RawPose {
    score: f32,
    #[serde(default)]
    keypoints: HashMap<String, RawKeypoint>,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    poses: Vec<RawPose>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub(crate) timestamp: Option<Duration>,
    pub(crate) poses: Vec<Pose>,
}

fn pose_from_raw(raw: RawPose) -> Result<Pose, Error> {
    let mut pose = Pose::new(raw.score);
    for (label, RawKeypoint { y, x, score }) in raw.keypoints {
        let kind = label.parse::<KeypointKind>()?;
        pose.insert(Keypoint::from_yx(kind, y, x, score)?)?;
    }
    Ok(pose)
}

fn frame_from_raw(raw: RawFrame) -> Result<Frame, Error> {
    let timestamp = raw
        .timestamp
        .map(|t| Duration::try_from_secs_f64(t).map_err(|_| Error::InvalidTimestamp(t)))
        .transpose()?;
    let poses = raw
        .poses
        .into_iter()
        .map(pose_from_raw)
        .collect::<Result<_, _>>()?;
    Ok(Frame { timestamp, poses })
}

/// Decode the frame on 1-based line `line`.
pub(crate) fn decode(text: &str, line: usize) -> Result<Frame, Error> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|source| Error::DecodeFrame { line, source })?;
    frame_from_raw(raw)
}

/// Frames read line by line, blank lines skipped.
pub(crate) struct Frames<R> {
    reader: R,
    buf: String,
    line: usize,
}

impl<R> Frames<R>
where
    R: BufRead,
{
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
        }
    }
}

impl<R> Iterator for Frames<R>
where
    R: BufRead,
{
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(Error::ReadFrame(e))),
            }
            let text = self.buf.trim();
            if !text.is_empty() {
                return Some(decode(text, self.line));
            }
        }
    }
}
