//! Write-clock domain: head pointer, imported tail, full flag, acknowledge.

use crate::ack::AckGenerator;
use crate::params::{Crossing, Geometry};
use crate::pointer::{Exported, Pointer, SyncRegister};
use tracing::{debug, trace};

/// Command the write domain drives into storage for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageWrite {
    pub enable: bool,
    pub addr: usize,
}

/// State owned by the write clock.
#[derive(Debug, Clone)]
pub struct WriteDomain {
    mask: u32,
    crossing: Crossing,
    head: Pointer,
    /// Read pointer as captured on the last write tick.
    tail_sync: SyncRegister,
    ack: AckGenerator,
    in_reset: bool,
}

impl WriteDomain {
    pub fn new(geo: &Geometry) -> Self {
        Self {
            mask: geo.mask(),
            crossing: geo.crossing,
            head: Pointer::zero(),
            tail_sync: SyncRegister::default(),
            ack: AckGenerator::new(geo.ack),
            in_reset: false,
        }
    }

    /// `(tail_sync - 1) mod 2^W == head`: one slot is always left empty so
    /// full and empty differ without an extra wrap bit.
    ///
    /// Reports not-full while the domain is held in reset.
    #[inline(always)]
    pub fn full(&self) -> bool {
        if self.in_reset {
            return false;
        }
        let tail = self.tail_sync.value(self.crossing);
        (tail.wrapping_sub(1) & self.mask) == self.head.bin()
    }

    #[inline(always)]
    pub fn ack(&self) -> bool {
        self.ack.ack()
    }

    #[inline(always)]
    pub fn head(&self) -> Pointer {
        self.head
    }

    /// Read pointer as this domain currently believes it to be.
    #[inline]
    pub fn imported_tail(&self) -> u32 {
        self.tail_sync.value(self.crossing)
    }

    /// The head pointer as driven onto the crossing.
    #[inline(always)]
    pub fn export(&self) -> Exported {
        self.head.export(self.crossing)
    }

    /// Clocks the write domain once.
    ///
    /// The full flag used for the grant is the one computed from the
    /// registers as they stood before this edge. `read_export` is the read
    /// domain's export sampled at this edge; it only influences `full` from
    /// the next tick on.
    pub fn tick(&mut self, enable: bool, read_export: Exported) -> StorageWrite {
        if self.in_reset {
            self.zero();
            return StorageWrite::default();
        }

        let full = self.full();
        let granted = enable && !full;
        if enable && full {
            trace!(head = self.head.bin(), "write dropped while full");
        }

        let cmd = StorageWrite {
            enable: granted,
            addr: self.head.bin() as usize,
        };

        self.ack.clock(enable, full);
        self.head.advance(granted, self.mask);
        self.tail_sync.capture(read_export);
        cmd
    }

    /// Asserts reset: registers clear immediately and stay clear until the
    /// first tick after [`release_reset`](Self::release_reset).
    pub fn assert_reset(&mut self) {
        debug!("write domain reset asserted");
        self.in_reset = true;
        self.zero();
    }

    pub fn release_reset(&mut self) {
        if self.in_reset {
            debug!("write domain reset released");
        }
        self.in_reset = false;
    }

    fn zero(&mut self) {
        self.head = Pointer::zero();
        self.tail_sync.clear();
        self.ack.clear();
    }
}
