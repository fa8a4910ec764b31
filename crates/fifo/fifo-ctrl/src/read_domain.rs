//! Read-clock domain: tail pointer, imported head, empty/valid flags.

use crate::params::{Crossing, Geometry, ReadMode};
use crate::pointer::{Exported, Pointer, SyncRegister};
use crate::read_fsm::{ReadFsm, ReadState};
use tracing::{debug, trace};

/// Command the read domain drives into storage for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageRead {
    pub enable: bool,
    pub addr: usize,
}

/// State owned by the read clock.
#[derive(Debug, Clone)]
pub struct ReadDomain {
    mask: u32,
    crossing: Crossing,
    tail: Pointer,
    /// Write pointer as captured on the last read tick.
    head_sync: SyncRegister,
    fsm: ReadFsm,
    in_reset: bool,
}

impl ReadDomain {
    pub fn new(geo: &Geometry) -> Self {
        Self {
            mask: geo.mask(),
            crossing: geo.crossing,
            tail: Pointer::zero(),
            head_sync: SyncRegister::default(),
            fsm: ReadFsm::new(geo.read_mode),
            in_reset: false,
        }
    }

    /// Imported head equals the local tail: storage holds nothing the read
    /// side has not already fetched.
    #[inline(always)]
    fn storage_empty(&self) -> bool {
        self.head_sync.value(self.crossing) == self.tail.bin()
    }

    /// Consumer-facing empty flag.
    ///
    /// Normal mode reports the pointer comparison. FWFT reports whether a
    /// word is presented, since the presented word has already left storage.
    #[inline(always)]
    pub fn empty(&self) -> bool {
        if self.in_reset {
            return true;
        }
        match self.fsm.mode() {
            ReadMode::Normal => self.storage_empty(),
            ReadMode::Fwft => !self.fsm.valid(),
        }
    }

    #[inline(always)]
    pub fn valid(&self) -> bool {
        !self.in_reset && self.fsm.valid()
    }

    #[inline(always)]
    pub fn state(&self) -> ReadState {
        self.fsm.state()
    }

    /// FWFT word fetched from storage but not yet consumed.
    #[inline(always)]
    pub fn staged(&self) -> bool {
        !self.in_reset && self.fsm.staged()
    }

    #[inline(always)]
    pub fn tail(&self) -> Pointer {
        self.tail
    }

    /// Write pointer as this domain currently believes it to be.
    #[inline]
    pub fn imported_head(&self) -> u32 {
        self.head_sync.value(self.crossing)
    }

    #[inline(always)]
    pub fn export(&self) -> Exported {
        self.tail.export(self.crossing)
    }

    /// Clocks the read domain once.
    ///
    /// Every decision is taken from the pre-edge registers; `write_export`
    /// is captured at this edge and is first compared on the next tick.
    pub fn tick(&mut self, enable: bool, write_export: Exported) -> StorageRead {
        if self.in_reset {
            self.zero();
            return StorageRead::default();
        }

        let empty = self.storage_empty();
        let step = self.fsm.step(empty, enable);
        if enable && !step.fetch && !self.fsm.valid() {
            trace!(tail = self.tail.bin(), "read ignored while empty");
        }
        if step.next != self.fsm.state() {
            trace!(from = ?self.fsm.state(), to = ?step.next, "read state");
        }

        let cmd = StorageRead {
            enable: step.fetch,
            addr: self.tail.bin() as usize,
        };

        self.tail.advance(step.fetch, self.mask);
        self.fsm.commit(step);
        self.head_sync.capture(write_export);
        cmd
    }

    /// Asserts reset: registers clear immediately and stay clear until the
    /// first tick after [`release_reset`](Self::release_reset).
    pub fn assert_reset(&mut self) {
        debug!("read domain reset asserted");
        self.in_reset = true;
        self.zero();
    }

    pub fn release_reset(&mut self) {
        if self.in_reset {
            debug!("read domain reset released");
        }
        self.in_reset = false;
    }

    fn zero(&mut self) {
        self.tail = Pointer::zero();
        self.head_sync.clear();
        self.fsm.clear();
    }
}
