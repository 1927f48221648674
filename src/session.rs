use crate::{
    counter::{RepCounter, Transition},
    error::Error,
    pose::{self, Pose},
    posture::{Classifier, Exercise, Measurements, NO_POSTURE},
    stats::{StatKey, StatsSink},
};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Consecutive frames without a recognized posture before tracking counts as
/// lost. One second at 24 fps.
pub(crate) const DEFAULT_LOST_AFTER: u32 = 24;

/// Final numbers of a workout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Summary {
    pub(crate) exercise: Exercise,
    pub(crate) reps: u32,
    pub(crate) pace: f64,
    pub(crate) frames: u64,
    pub(crate) duration: Duration,
}

/// One running workout: classifies each frame and counts repetitions,
/// publishing the live numbers to a [`StatsSink`].
pub(crate) struct Session<S> {
    exercise: Exercise,
    counter: RepCounter,
    sink: S,
    measurements: Option<Measurements>,
    lost_after: u32,
    missed_frames: u32,
    frames: u64,
    last_timestamp: Duration,
}

impl<S> Session<S>
where
    S: StatsSink,
{
    /// Start a session and reset the published reps and pace to zero.
    pub(crate) fn new(exercise: Exercise, sink: S) -> Result<Self, Error> {
        let session = Self {
            exercise,
            counter: RepCounter::new(exercise.keystates())?,
            sink,
            measurements: None,
            lost_after: DEFAULT_LOST_AFTER,
            missed_frames: 0,
            frames: 0,
            last_timestamp: Duration::ZERO,
        };
        session.publish()?;
        info!(
            message = "workout started",
            exercise = exercise.name(),
            required_keypoints = exercise.required_keypoints().len()
        );
        Ok(session)
    }

    /// Frames without a posture before [`Session::tracking_lost`] reports true,
    /// `0` to never report it.
    pub(crate) fn lost_after(mut self, frames: u32) -> Self {
        self.lost_after = frames;
        self
    }

    /// Process the poses detected in one frame.
    ///
    /// The counter is always updated. An error means only that publishing
    /// the new numbers failed; they remain available from the session.
    pub(crate) fn update(
        &mut self,
        poses: &[Pose],
        timestamp: Duration,
    ) -> Result<Transition, Error> {
        self.frames += 1;
        self.last_timestamp = timestamp;

        let pose = pose::best_pose(poses);
        self.measurements = pose.and_then(|pose| self.exercise.measure(pose));
        let code = self.exercise.classify(self.measurements.as_ref());

        let was_lost = self.tracking_lost();
        if code == NO_POSTURE {
            self.missed_frames = self.missed_frames.saturating_add(1);
        } else {
            self.missed_frames = 0;
        }
        match (was_lost, self.tracking_lost()) {
            (false, true) => {
                info!(message = "tracking lost", missed_frames = self.missed_frames)
            }
            (true, false) => info!(message = "tracking regained"),
            _ => {}
        }

        let transition = self.counter.update(code, timestamp);
        match transition {
            Transition::Completed => debug!(
                message = "rep completed",
                reps = self.counter.reps(),
                pace = self.counter.pace()
            ),
            Transition::OutOfSequence { expected } => {
                trace!(message = "out of sequence posture", code, expected)
            }
            _ => {}
        }

        if transition.is_accepted() {
            self.publish()?;
        }
        if let Some(pose) = pose {
            self.sink.set(StatKey::PoseScore, f64::from(pose.score))?;
        }
        Ok(transition)
    }

    fn publish(&self) -> Result<(), Error> {
        self.sink.set(StatKey::Reps, f64::from(self.counter.reps()))?;
        self.sink.set(StatKey::Pace, self.counter.pace())
    }

    pub(crate) fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub(crate) fn reps(&self) -> u32 {
        self.counter.reps()
    }

    pub(crate) fn pace(&self) -> f64 {
        self.counter.pace()
    }

    /// Measurements of the latest frame, `None` if its pose was unusable.
    pub(crate) fn measurements(&self) -> Option<&Measurements> {
        self.measurements.as_ref()
    }

    pub(crate) fn tracking_lost(&self) -> bool {
        self.lost_after > 0 && self.missed_frames >= self.lost_after
    }

    /// End the workout.
    pub(crate) fn finish(self) -> Summary {
        let summary = Summary {
            exercise: self.exercise,
            reps: self.counter.reps(),
            pace: self.counter.pace(),
            frames: self.frames,
            duration: self.last_timestamp,
        };
        info!(
            message = "workout finished",
            exercise = summary.exercise.name(),
            reps = summary.reps,
            pace = summary.pace,
            frames = summary.frames
        );
        summary
    }
}
