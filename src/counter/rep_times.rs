use std::time::Duration;

pub(crate) const CAPACITY: usize = 32;

/// The most recent repetition completion times, oldest dropped first.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RepTimes {
    times: [Duration; CAPACITY],
    head: usize,
    len: usize,
}

impl RepTimes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, time: Duration) {
        let tail = (self.head + self.len) % CAPACITY;
        self.times[tail] = time;
        if self.len == CAPACITY {
            self.head = (self.head + 1) % CAPACITY;
        } else {
            self.len += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn first(&self) -> Option<Duration> {
        if self.len == 0 {
            None
        } else {
            Some(self.times[self.head])
        }
    }

    pub(crate) fn last(&self) -> Option<Duration> {
        if self.len == 0 {
            None
        } else {
            Some(self.times[(self.head + self.len - 1) % CAPACITY])
        }
    }

    /// Completions per second across the buffered window.
    ///
    /// `None` with fewer than two entries or when they span no time.
    pub(crate) fn rate(&self) -> Option<f64> {
        let span = self.last()?.checked_sub(self.first()?)?;
        if self.len < 2 || span == Duration::ZERO {
            return None;
        }
        Some((self.len - 1) as f64 / span.as_secs_f64())
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.len).map(move |i| self.times[(self.head + i) % CAPACITY])
    }
}
