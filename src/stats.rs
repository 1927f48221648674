use crate::error::Error;
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StatKey {
    Reps,
    Pace,
    /// Score of the pose selected in the latest frame.
    PoseScore,
}

impl StatKey {
    #[cfg(test)]
    pub(crate) const ALL: [StatKey; 3] = [StatKey::Reps, StatKey::Pace, StatKey::PoseScore];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Reps => "reps",
            Self::Pace => "pace",
            Self::PoseScore => "pose_score",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Reps => 0,
            Self::Pace => 1,
            Self::PoseScore => 2,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a session publishes its live numbers.
///
/// Implementations are shared between the thread driving the session and any
/// number of readers, so neither side may block the other.
pub(crate) trait StatsSink: Send + Sync {
    fn set(&self, key: StatKey, value: f64) -> Result<(), Error>;

    /// The last value set for `key`, `None` if it was never set.
    fn get(&self, key: StatKey) -> Result<Option<f64>, Error>;
}

impl<S> StatsSink for &S
where
    S: StatsSink + ?Sized,
{
    fn set(&self, key: StatKey, value: f64) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn get(&self, key: StatKey) -> Result<Option<f64>, Error> {
        (**self).get(key)
    }
}

const UNSET: u64 = u64::MAX;

/// In-process sink keeping every value in its own atomic word.
///
/// A reader sees either the previous or the new value of a key, never a mix.
/// Setting NaN reads back as unset.
#[derive(Debug)]
pub(crate) struct AtomicStats {
    slots: [AtomicU64; 3],
}

impl AtomicStats {
    pub(crate) fn new() -> Self {
        Self {
            slots: [
                AtomicU64::new(UNSET),
                AtomicU64::new(UNSET),
                AtomicU64::new(UNSET),
            ],
        }
    }
}

impl Default for AtomicStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSink for AtomicStats {
    fn set(&self, key: StatKey, value: f64) -> Result<(), Error> {
        let bits = if value.is_nan() { UNSET } else { value.to_bits() };
        self.slots[key.slot()].store(bits, Ordering::Release);
        Ok(())
    }

    fn get(&self, key: StatKey) -> Result<Option<f64>, Error> {
        let bits = self.slots[key.slot()].load(Ordering::Acquire);
        Ok(if bits == UNSET {
            None
        } else {
            Some(f64::from_bits(bits))
        })
    }
}
