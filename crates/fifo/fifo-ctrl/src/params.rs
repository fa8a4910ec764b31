//! Construction parameters for the controller and their validation.
//!
//! Every parameter is fixed once the [`Controller`](crate::Controller) is
//! built. Validation happens exactly once, in [`ControllerParams::build`],
//! which also derives the pointer geometry from the requested depth.

use serde::{Deserialize, Serialize};

/// Widest pointer the controller supports (2^31 slots).
pub const MAX_ADDR_WIDTH: u32 = 31;

/// Widest occupancy count field, in bits.
pub const MAX_COUNT_WIDTH: u32 = 32;

/// Read discipline of the read domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Data appears on the tick after a read request.
    #[default]
    Normal,
    /// First word fall-through: the head word is presented without a request.
    Fwft,
}

/// Encoding of the pointers exported to the foreign domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossing {
    /// Binary pointers cross directly.
    #[default]
    Binary,
    /// Gray-coded pointers cross and are decoded after the import register.
    Gray,
}

/// When the occupancy counter samples the pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountTiming {
    /// Pointers are registered at each count tick; the count follows the
    /// registered copies. Required when the count clock is unrelated to both
    /// the read and the write clock.
    #[default]
    Delayed,
    /// Count follows the live pointers. Only meaningful when all three
    /// domains share one clock.
    Immediate,
}

/// Occupancy counter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountParams {
    /// Width of the count output field, in bits.
    pub width: u32,
    pub timing: CountTiming,
}

/// Requested controller parameters, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerParams {
    /// Requested depth; rounded up to a power of two.
    pub depth: usize,
    pub read_mode: ReadMode,
    pub crossing: Crossing,
    /// Enables the write acknowledge generator.
    pub ack: bool,
    /// Occupancy counter, `None` when disabled.
    pub count: Option<CountParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("depth must be at least 1")]
    ZeroDepth,

    #[error("depth {requested} needs more than {max} address bits", max = MAX_ADDR_WIDTH)]
    DepthTooLarge { requested: usize },

    #[error("count width {0} is outside 1..={max}", max = MAX_COUNT_WIDTH)]
    CountWidth(u32),
}

/// Validated parameters plus the geometry derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Pointer width W; always at least 1.
    pub addr_width: u32,
    pub read_mode: ReadMode,
    pub crossing: Crossing,
    pub ack: bool,
    pub count: Option<CountParams>,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            depth: 256,
            read_mode: ReadMode::Normal,
            crossing: Crossing::Binary,
            ack: false,
            count: Some(CountParams {
                width: 9,
                timing: CountTiming::Delayed,
            }),
        }
    }
}

impl ControllerParams {
    /// Parameters for `depth` with every optional block disabled.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            read_mode: ReadMode::Normal,
            crossing: Crossing::Binary,
            ack: false,
            count: None,
        }
    }

    /// Validates the parameters and derives the pointer geometry.
    ///
    /// The depth is rounded up to the next power of two and never below 2,
    /// since a zero-width pointer cannot tell full from empty.
    ///
    /// # Example
    /// ```
    /// use fifo_ctrl::ControllerParams;
    /// let geo = ControllerParams::with_depth(5).build().unwrap();
    /// assert_eq!(geo.slots(), 8);
    /// assert_eq!(geo.capacity(), 7);
    /// ```
    pub fn build(&self) -> Result<Geometry, ParamError> {
        if self.depth == 0 {
            return Err(ParamError::ZeroDepth);
        }
        let addr_width = ceil_log2(self.depth).unwrap_or(u32::MAX).max(1);
        if addr_width > MAX_ADDR_WIDTH {
            return Err(ParamError::DepthTooLarge {
                requested: self.depth,
            });
        }
        if let Some(count) = self.count {
            if count.width == 0 || count.width > MAX_COUNT_WIDTH {
                return Err(ParamError::CountWidth(count.width));
            }
        }

        Ok(Geometry {
            addr_width,
            read_mode: self.read_mode,
            crossing: self.crossing,
            ack: self.ack,
            count: self.count,
        })
    }
}

impl Geometry {
    /// Number of addressable slots, 2^W.
    #[inline]
    pub fn slots(&self) -> usize {
        1usize << self.addr_width
    }

    /// Words the write side accepts before reporting full, 2^W - 1.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots() - 1
    }

    /// Bitmask applied to every pointer operation.
    #[inline(always)]
    pub fn mask(&self) -> u32 {
        ((1u64 << self.addr_width) - 1) as u32
    }
}

/// Smallest `w` such that `2^w >= n`, for `n >= 1`.
fn ceil_log2(n: usize) -> Option<u32> {
    n.checked_next_power_of_two().map(|p| p.trailing_zeros())
}
