//! Free-running clocks for the three domains.
//!
//! Time is kept in integer picoseconds so that edges of unrelated clocks
//! coincide exactly when they should, instead of drifting apart through
//! floating-point error.

use fifo_ctrl::Edges;
use serde::Deserialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock period must be non-zero")]
    ZeroPeriod,
}

/// One periodic clock: rising edges at `phase_ps + k * period_ps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClockSpec {
    pub period_ps: u64,
    #[serde(default)]
    pub phase_ps: u64,
}

impl ClockSpec {
    pub fn new(period_ps: u64) -> Self {
        Self {
            period_ps,
            phase_ps: 0,
        }
    }

    pub fn with_phase(mut self, phase_ps: u64) -> Self {
        self.phase_ps = phase_ps;
        self
    }
}

/// Where the count domain takes its clock from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountClock {
    Write,
    Read,
    Own(ClockSpec),
}

#[derive(Debug, Clone, Copy)]
struct Running {
    period: u64,
    /// `None` once the next edge would lie past the end of time.
    next: Option<u64>,
}

impl Running {
    fn new(spec: ClockSpec) -> Result<Self, ClockError> {
        if spec.period_ps == 0 {
            return Err(ClockError::ZeroPeriod);
        }
        Ok(Self {
            period: spec.period_ps,
            next: Some(spec.phase_ps),
        })
    }

    #[inline]
    fn fire_at(&mut self, now: u64) -> bool {
        if self.next == Some(now) {
            self.next = now.checked_add(self.period);
            true
        } else {
            false
        }
    }
}

/// The write, read and count clocks, stepped edge instant by edge instant.
#[derive(Debug, Clone)]
pub struct ClockSet {
    write: Running,
    read: Running,
    count: Option<Running>,
    count_src: CountClock,
    now: u64,
}

impl ClockSet {
    pub fn new(write: ClockSpec, read: ClockSpec, count: CountClock) -> Result<Self, ClockError> {
        let own = match count {
            CountClock::Own(spec) => Some(Running::new(spec)?),
            CountClock::Write | CountClock::Read => None,
        };
        Ok(Self {
            write: Running::new(write)?,
            read: Running::new(read)?,
            count: own,
            count_src: count,
            now: 0,
        })
    }

    /// All three domains on one clock.
    pub fn shared(period_ps: u64) -> Result<Self, ClockError> {
        let spec = ClockSpec::new(period_ps);
        Self::new(spec, spec, CountClock::Write)
    }

    /// Time of the most recent edge instant.
    #[inline]
    pub fn now_ps(&self) -> u64 {
        self.now
    }

    /// Advances to the next instant at which any clock has a rising edge.
    ///
    /// A clock whose next edge would overflow the picosecond counter stops.
    /// Once every clock has stopped, time stays put and no domain fires.
    pub fn next_edges(&mut self) -> (u64, Edges) {
        let own = self.count.and_then(|c| c.next);
        let Some(at) = [self.write.next, self.read.next, own]
            .into_iter()
            .flatten()
            .min()
        else {
            return (self.now, Edges::default());
        };
        self.now = at;

        let write = self.write.fire_at(at);
        let read = self.read.fire_at(at);
        let count = match self.count_src {
            CountClock::Write => write,
            CountClock::Read => read,
            CountClock::Own(_) => self.count.as_mut().is_some_and(|c| c.fire_at(at)),
        };
        (at, Edges { write, read, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_clock_fires_everything_together() {
        let mut clocks = ClockSet::shared(1000).unwrap();
        for k in 0..4 {
            assert_eq!(clocks.next_edges(), (k * 1000, Edges::ALL));
        }
    }

    #[test]
    fn unrelated_clocks_interleave() {
        let mut clocks = ClockSet::new(
            ClockSpec::new(2),
            ClockSpec::new(3),
            CountClock::Read,
        )
        .unwrap();

        let seen: Vec<_> = (0..5).map(|_| clocks.next_edges()).collect();
        let times: Vec<_> = seen.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, [0, 2, 3, 4, 6]);

        assert_eq!(seen[0].1, Edges::ALL);
        assert_eq!(
            seen[1].1,
            Edges {
                write: true,
                read: false,
                count: false
            }
        );
        assert_eq!(
            seen[2].1,
            Edges {
                write: false,
                read: true,
                count: true
            }
        );
        assert_eq!(seen[4].1, Edges::ALL);
    }

    #[test]
    fn phase_offsets_the_first_edge() {
        let mut clocks = ClockSet::new(
            ClockSpec::new(10),
            ClockSpec::new(10).with_phase(5),
            CountClock::Own(ClockSpec::new(20).with_phase(1)),
        )
        .unwrap();

        let (t, e) = clocks.next_edges();
        assert_eq!(t, 0);
        assert!(e.write && !e.read && !e.count);
        let (t, e) = clocks.next_edges();
        assert_eq!(t, 1);
        assert!(e.count && !e.write);
        let (t, e) = clocks.next_edges();
        assert_eq!(t, 5);
        assert!(e.read);
    }

    #[test]
    fn clocks_stop_instead_of_overflowing() {
        let mut clocks = ClockSet::new(
            ClockSpec::new(u64::MAX).with_phase(u64::MAX),
            ClockSpec::new(u64::MAX),
            CountClock::Write,
        )
        .unwrap();

        let (t, e) = clocks.next_edges();
        assert_eq!(t, 0);
        assert!(e.read && !e.write);
        assert_eq!(clocks.next_edges(), (u64::MAX, Edges::ALL));
        for _ in 0..3 {
            assert_eq!(clocks.next_edges(), (u64::MAX, Edges::default()));
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = ClockSet::new(ClockSpec::new(0), ClockSpec::new(1), CountClock::Write);
        assert_eq!(err.unwrap_err(), ClockError::ZeroPeriod);
    }
}
