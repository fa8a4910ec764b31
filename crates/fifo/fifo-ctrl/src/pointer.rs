//! Pointer arithmetic and the single-stage cross-domain import.
//!
//! Pointers live in the index space `[0, 2^W)`. Since that space is always a
//! power of two, wrapping is a bitmask instead of a modulo:
//!
//! ```text
//! W = 2, mask = 0b11
//!
//! bin 0 → 1 → 2 → 3 → 0 → ...
//! gray 00 → 01 → 11 → 10 → 00 → ...   (one bit flips per step)
//! ```
//!
//! A domain never reads the foreign pointer register directly. It captures
//! the foreign *export* into a [`SyncRegister`] on its own tick, and every
//! comparison it makes uses that captured copy. This is the one-cycle import
//! latency that full/empty timing depends on.

use crate::params::Crossing;
use serde::{Deserialize, Serialize};

/// Binary to reflected gray code.
#[inline(always)]
pub fn bin_to_gray(bin: u32) -> u32 {
    bin ^ (bin >> 1)
}

/// Reflected gray code back to binary.
#[inline(always)]
pub fn gray_to_bin(gray: u32) -> u32 {
    let mut bin = gray;
    let mut shift = gray >> 1;
    while shift != 0 {
        bin ^= shift;
        shift >>= 1;
    }
    bin
}

/// A domain-owned pointer register, held in both encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    bin: u32,
    gray: u32,
}

impl Pointer {
    #[inline]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Binary form; doubles as the storage address.
    #[inline(always)]
    pub fn bin(&self) -> u32 {
        self.bin
    }

    #[inline(always)]
    pub fn gray(&self) -> u32 {
        self.gray
    }

    /// The value one step ahead, wrapped to `mask`.
    #[inline(always)]
    pub fn next(&self, mask: u32) -> Self {
        let bin = self.bin.wrapping_add(1) & mask;
        Self {
            bin,
            gray: bin_to_gray(bin),
        }
    }

    /// Advances by one slot when `granted`, otherwise holds.
    #[inline(always)]
    pub fn advance(&mut self, granted: bool, mask: u32) {
        if granted {
            *self = self.next(mask);
        }
    }

    /// The value this pointer drives onto the crossing.
    #[inline(always)]
    pub fn export(&self, crossing: Crossing) -> Exported {
        match crossing {
            Crossing::Binary => Exported(self.bin()),
            Crossing::Gray => Exported(self.gray()),
        }
    }
}

/// A pointer as seen on the wire between domains, in the crossing encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exported(pub u32);

impl Exported {
    /// Decodes the wire value back to a binary index.
    #[inline(always)]
    pub fn decode(self, crossing: Crossing) -> u32 {
        match crossing {
            Crossing::Binary => self.0,
            Crossing::Gray => gray_to_bin(self.0),
        }
    }
}

/// Single flop stage holding the most recently imported foreign pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRegister {
    captured: Exported,
}

impl SyncRegister {
    /// Clocks the foreign export into the register.
    #[inline(always)]
    pub fn capture(&mut self, value: Exported) {
        self.captured = value;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.captured = Exported::default();
    }

    /// Binary value of the captured pointer.
    #[inline(always)]
    pub fn value(&self, crossing: Crossing) -> u32 {
        self.captured.decode(crossing)
    }
}

/// `(head - tail) mod 2^W`, the number of slots between two pointers.
#[inline(always)]
pub fn distance(head: u32, tail: u32, mask: u32) -> u32 {
    head.wrapping_sub(tail) & mask
}
