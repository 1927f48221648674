//! Repetition counting over a cycle of keystates.
//!
//! A repetition is one pass through keystates `1, 2, ..., N` in order. Codes
//! that don't advance the cycle are dropped without touching any state, so
//! missed frames, held postures and out-of-order detections never reset
//! progress.

use crate::{
    error::Error,
    posture::{PostureCode, NO_POSTURE},
};
use rep_times::RepTimes;
use std::time::Duration;

mod rep_times;

/// What a single [`RepCounter::update`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Transition {
    /// No posture recognized this frame.
    NoPosture,
    /// Same keystate as the last accepted one.
    Held,
    /// Not the keystate the cycle expects next.
    OutOfSequence { expected: PostureCode },
    /// Moved to the next keystate without finishing a cycle.
    Advanced,
    /// Reached the last keystate, one more rep.
    Completed,
}

impl Transition {
    pub(crate) fn is_accepted(self) -> bool {
        matches!(self, Self::Advanced | Self::Completed)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RepCounter {
    keystates: u8,
    previous_state: Option<PostureCode>,
    expected_next: PostureCode,
    reps: u32,
    pace: f64,
    rep_times: RepTimes,
}

impl RepCounter {
    pub(crate) fn new(keystates: u8) -> Result<Self, Error> {
        if keystates == 0 {
            return Err(Error::InvalidKeystateCount(keystates));
        }
        Ok(Self {
            keystates,
            previous_state: None,
            expected_next: 1,
            reps: 0,
            pace: 0.0,
            rep_times: RepTimes::new(),
        })
    }

    /// Feed the posture code of one frame observed at `timestamp`.
    pub(crate) fn update(&mut self, code: PostureCode, timestamp: Duration) -> Transition {
        if code == NO_POSTURE {
            return Transition::NoPosture;
        }
        if self.previous_state == Some(code) {
            return Transition::Held;
        }
        if code != self.expected_next {
            return Transition::OutOfSequence {
                expected: self.expected_next,
            };
        }

        self.previous_state = Some(code);
        self.expected_next = self.expected_next % self.keystates + 1;

        if code != self.keystates {
            return Transition::Advanced;
        }

        self.rep_times.push(timestamp);
        self.reps += 1;
        if self.reps > 1 {
            if let Some(rate) = self.rep_times.rate() {
                self.pace = rate;
            }
        }
        Transition::Completed
    }

    pub(crate) fn reps(&self) -> u32 {
        self.reps
    }

    /// Repetitions per second over the last 32 completions.
    pub(crate) fn pace(&self) -> f64 {
        self.pace
    }

    #[cfg(test)]
    pub(crate) fn previous_state(&self) -> Option<PostureCode> {
        self.previous_state
    }

    #[cfg(test)]
    pub(crate) fn expected_next(&self) -> PostureCode {
        self.expected_next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn feed(counter: &mut RepCounter, codes: &[PostureCode]) -> Vec<Transition> {
        codes
            .iter()
            .enumerate()
            .map(|(i, &code)| counter.update(code, secs(i as f64)))
            .collect()
    }

    #[test]
    fn initial_state() {
        let counter = RepCounter::new(2).unwrap();
        assert_eq!(counter.previous_state(), None);
        assert_eq!(counter.expected_next(), 1);
        assert_eq!(counter.reps(), 0);
        assert_eq!(counter.pace(), 0.0);
    }

    #[test]
    fn zero_keystates() {
        assert!(matches!(
            RepCounter::new(0),
            Err(Error::InvalidKeystateCount(0))
        ));
    }

    #[test]
    fn worked_example() {
        let mut counter = RepCounter::new(2).unwrap();
        let (t0, t1, t2, t3) = (secs(10.0), secs(12.0), secs(13.5), secs(15.5));

        assert_eq!(counter.update(1, t0), Transition::Advanced);
        assert_eq!(counter.reps(), 0);

        assert_eq!(counter.update(2, t1), Transition::Completed);
        assert_eq!(counter.reps(), 1);
        assert_eq!(counter.pace(), 0.0);
        assert_eq!(counter.previous_state(), Some(2));
        assert_eq!(counter.expected_next(), 1);

        assert_eq!(counter.update(1, t2), Transition::Advanced);
        assert_eq!(counter.reps(), 1);
        assert_eq!(counter.expected_next(), 2);

        assert_eq!(counter.update(2, t3), Transition::Completed);
        assert_eq!(counter.reps(), 2);
        assert_eq!(
            counter.rep_times.iter().collect::<Vec<_>>(),
            vec![t1, t3]
        );
        assert_approx_eq!(counter.pace(), 1.0 / (t3 - t1).as_secs_f64());
    }

    #[test]
    fn held_posture_counts_once() {
        let mut counter = RepCounter::new(2).unwrap();
        let transitions = feed(&mut counter, &[1, 1, 1, 1, 2, 2, 2]);
        assert_eq!(
            transitions,
            vec![
                Transition::Advanced,
                Transition::Held,
                Transition::Held,
                Transition::Held,
                Transition::Completed,
                Transition::Held,
                Transition::Held,
            ]
        );
        assert_eq!(counter.reps(), 1);
    }

    #[test]
    fn missing_frames_do_not_reset_progress() {
        let mut gapless = RepCounter::new(2).unwrap();
        feed(&mut gapless, &[1, 2, 1, 2, 1, 2]);

        let mut gappy = RepCounter::new(2).unwrap();
        let transitions = feed(&mut gappy, &[0, 1, 0, 0, 2, 0, 1, 0, 2, 1, 0, 0, 0, 2]);
        assert_eq!(transitions[2], Transition::NoPosture);

        assert_eq!(gappy.reps(), gapless.reps());
        assert_eq!(gappy.reps(), 3);
        assert_eq!(gappy.previous_state(), gapless.previous_state());
        assert_eq!(gappy.expected_next(), gapless.expected_next());
    }

    #[test]
    fn no_posture_keeps_state() {
        let mut counter = RepCounter::new(2).unwrap();
        counter.update(1, secs(0.0));
        assert_eq!(counter.update(0, secs(1.0)), Transition::NoPosture);
        assert_eq!(counter.previous_state(), Some(1));
        assert_eq!(counter.expected_next(), 2);
    }

    #[test]
    fn out_of_order_is_rejected() {
        let mut counter = RepCounter::new(2).unwrap();
        assert_eq!(
            counter.update(2, secs(0.0)),
            Transition::OutOfSequence { expected: 1 }
        );
        assert_eq!(counter.update(1, secs(1.0)), Transition::Advanced);
        assert_eq!(counter.reps(), 0);
        assert_eq!(counter.previous_state(), Some(1));
    }

    #[test]
    fn unknown_code_is_out_of_sequence() {
        let mut counter = RepCounter::new(2).unwrap();
        counter.update(1, secs(0.0));
        assert_eq!(
            counter.update(7, secs(1.0)),
            Transition::OutOfSequence { expected: 2 }
        );
        assert_eq!(counter.reps(), 0);
    }

    #[test]
    fn three_keystates() {
        let mut counter = RepCounter::new(3).unwrap();
        let transitions = feed(&mut counter, &[1, 3, 2, 1, 3, 1, 2, 3]);
        assert_eq!(transitions[1], Transition::OutOfSequence { expected: 2 });
        assert_eq!(transitions[3], Transition::OutOfSequence { expected: 3 });
        assert_eq!(transitions[4], Transition::Completed);
        assert_eq!(transitions[7], Transition::Completed);
        assert_eq!(counter.reps(), 2);
        assert_approx_eq!(counter.pace(), 1.0 / 3.0);
    }

    #[test]
    fn single_keystate_counts_every_change() {
        let mut counter = RepCounter::new(1).unwrap();
        // a one-state cycle never leaves its previous state
        assert_eq!(counter.update(1, secs(0.0)), Transition::Completed);
        assert_eq!(counter.update(1, secs(1.0)), Transition::Held);
        assert_eq!(counter.reps(), 1);
    }

    #[test]
    fn pace_uses_last_32_reps() {
        let mut counter = RepCounter::new(2).unwrap();
        // first ten reps slow, the rest at one per second
        let mut t = 0.0;
        for rep in 0..50 {
            t += if rep < 10 { 10.0 } else { 1.0 };
            counter.update(1, secs(t - 0.5));
            counter.update(2, secs(t));
        }
        assert_eq!(counter.reps(), 50);
        assert_approx_eq!(counter.pace(), 1.0);
    }

    #[test]
    fn transition_acceptance() {
        assert!(Transition::Advanced.is_accepted());
        assert!(Transition::Completed.is_accepted());
        assert!(!Transition::Held.is_accepted());
        assert!(!Transition::NoPosture.is_accepted());
        assert!(!Transition::OutOfSequence { expected: 1 }.is_accepted());
    }
}
