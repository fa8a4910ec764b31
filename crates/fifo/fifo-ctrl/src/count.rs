//! Occupancy counter, optionally clocked by a third domain.
//!
//! The count is `(head - tail) mod 2^W`, plus one while an FWFT word is
//! staged. Because the pointers are masked, a tail that is numerically ahead
//! of the head already gets 2^W added back before the bias is applied:
//!
//! ```text
//! W = 2: head = 1, tail = 3  →  (1 - 3) & 0b11 = 2
//! ```
//!
//! The output field may be narrower than the value needs. It never wraps: a
//! nonzero difference saturates to all ones, and a zero difference reports
//! only the bias bit.

use crate::params::{CountParams, CountTiming, Crossing, Geometry};
use crate::pointer::{Exported, distance};
use tracing::debug;

/// What the counter reads from the other two domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountSample {
    pub head: Exported,
    pub tail: Exported,
    /// FWFT word staged in the read domain.
    pub staged: bool,
}

#[derive(Debug, Clone)]
pub struct OccupancyCounter {
    mask: u32,
    crossing: Crossing,
    width: u32,
    timing: CountTiming,
    registered: CountSample,
    in_reset: bool,
}

impl OccupancyCounter {
    pub fn new(geo: &Geometry, params: CountParams) -> Self {
        Self {
            mask: geo.mask(),
            crossing: geo.crossing,
            width: params.width,
            timing: params.timing,
            registered: CountSample::default(),
            in_reset: false,
        }
    }

    /// Clocks the count domain. Only the delayed variant holds state.
    pub fn tick(&mut self, live: CountSample) {
        if self.in_reset {
            self.registered = CountSample::default();
            return;
        }
        if self.timing == CountTiming::Delayed {
            self.registered = live;
        }
    }

    /// Current count output. `live` is what the domains export right now;
    /// the delayed variant ignores it in favour of its registered copy.
    pub fn count(&self, live: CountSample) -> u32 {
        if self.in_reset {
            return 0;
        }
        let sample = match self.timing {
            CountTiming::Delayed => self.registered,
            CountTiming::Immediate => live,
        };
        let head = sample.head.decode(self.crossing);
        let tail = sample.tail.decode(self.crossing);
        fit_count(distance(head, tail, self.mask), sample.staged, self.width)
    }

    pub fn assert_reset(&mut self) {
        debug!("count domain reset asserted");
        self.in_reset = true;
        self.registered = CountSample::default();
    }

    pub fn release_reset(&mut self) {
        if self.in_reset {
            debug!("count domain reset released");
        }
        self.in_reset = false;
    }
}

/// Fits `diff + staged` into a `width`-bit field without wrapping.
///
/// # Example
/// ```
/// use fifo_ctrl::fit_count;
/// assert_eq!(fit_count(5, true, 8), 6);
/// assert_eq!(fit_count(7, true, 3), 7); // saturated
/// assert_eq!(fit_count(0, true, 1), 1); // bias only
/// ```
#[inline]
pub fn fit_count(diff: u32, staged: bool, width: u32) -> u32 {
    if diff == 0 {
        return staged as u32;
    }
    let max = (1u64 << width) - 1;
    let total = diff as u64 + staged as u64;
    total.min(max) as u32
}
