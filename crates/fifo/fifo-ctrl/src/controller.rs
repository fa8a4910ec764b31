//! The controller: three clock domains and the pointers they exchange.
//!
//! # Scheduling
//!
//! There is no global clock. The caller decides when each domain sees an
//! edge by calling [`Controller::tick_write`], [`Controller::tick_read`] and
//! [`Controller::tick_count`] in any order. A domain imports the foreign
//! pointer *as exported at the moment of its own edge*, so an update made by
//! one domain is first acted upon by the other domain on the tick after the
//! one that captured it.
//!
//! Calling `tick_write` then `tick_read` lets the read edge see the head the
//! write edge just produced, as if the read clock edge came slightly later.
//! For edges on the same instant use [`Controller::tick`], which samples all
//! exports before any domain updates.
//!
//! ```text
//!   write domain                         read domain
//! ┌──────────────┐  head export   ┌──────────────────┐
//! │ head ────────┼───────────────▶│ head_sync ──┐    │
//! │              │                │             ▼    │
//! │ full ◀── tail_sync ◀──────────┼── tail    empty  │
//! └──────────────┘  tail export   └──────────────────┘
//!                 ╲             ╱
//!                  count domain (optional)
//! ```

use crate::count::{CountSample, OccupancyCounter};
use crate::params::{ControllerParams, Geometry, ParamError};
use crate::pointer::distance;
use crate::read_domain::{ReadDomain, StorageRead};
use crate::read_fsm::ReadState;
use crate::write_domain::{StorageWrite, WriteDomain};
use serde::Serialize;

/// Which domains see a clock edge at the same instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub write: bool,
    pub read: bool,
    pub count: bool,
}

impl Edges {
    pub const ALL: Edges = Edges {
        write: true,
        read: true,
        count: true,
    };

    #[inline]
    pub fn any(&self) -> bool {
        self.write || self.read || self.count
    }
}

/// External enables presented to the controller for one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    pub write_enable: bool,
    pub read_enable: bool,
}

/// Storage commands issued by the domains that ticked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutput {
    pub write: Option<StorageWrite>,
    pub read: Option<StorageRead>,
}

/// Register-level view of the controller, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub head: u32,
    pub imported_tail: u32,
    pub tail: u32,
    pub imported_head: u32,
    pub full: bool,
    pub empty: bool,
    pub valid: bool,
    pub ack: bool,
    pub read_state: ReadState,
    pub data_count: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Controller {
    geo: Geometry,
    write: WriteDomain,
    read: ReadDomain,
    count: Option<OccupancyCounter>,
}

impl Controller {
    /// Builds a controller; all pointers start at zero, out of reset.
    ///
    /// # Errors
    /// Returns [`ParamError`] if the parameters cannot describe a controller.
    pub fn new(params: &ControllerParams) -> Result<Self, ParamError> {
        let geo = params.build()?;
        Ok(Self {
            geo,
            write: WriteDomain::new(&geo),
            read: ReadDomain::new(&geo),
            count: geo.count.map(|c| OccupancyCounter::new(&geo, c)),
        })
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geo
    }

    // ─── Scheduling primitives ──────────────────────────────────────────────

    /// One write-clock edge.
    #[inline]
    pub fn tick_write(&mut self, enable: bool) -> StorageWrite {
        let tail = self.read.export();
        self.write.tick(enable, tail)
    }

    /// One read-clock edge.
    #[inline]
    pub fn tick_read(&mut self, enable: bool) -> StorageRead {
        let head = self.write.export();
        self.read.tick(enable, head)
    }

    /// One count-clock edge. No-op when the counter is disabled.
    #[inline]
    pub fn tick_count(&mut self) {
        let live = self.live_sample();
        if let Some(count) = self.count.as_mut() {
            count.tick(live);
        }
    }

    /// Edges on several domains at the same instant.
    ///
    /// Every export is sampled before any domain updates, so no domain sees
    /// a value another domain produced on this same instant.
    pub fn tick(&mut self, edges: Edges, inputs: Inputs) -> TickOutput {
        let head = self.write.export();
        let tail = self.read.export();
        let live = self.live_sample();

        let mut out = TickOutput::default();
        if edges.write {
            out.write = Some(self.write.tick(inputs.write_enable, tail));
        }
        if edges.read {
            out.read = Some(self.read.tick(inputs.read_enable, head));
        }
        if edges.count {
            if let Some(count) = self.count.as_mut() {
                count.tick(live);
            }
        }
        out
    }

    fn live_sample(&self) -> CountSample {
        CountSample {
            head: self.write.export(),
            tail: self.read.export(),
            staged: self.read.staged(),
        }
    }

    // ─── Write-domain outputs ───────────────────────────────────────────────

    #[inline]
    pub fn full(&self) -> bool {
        self.write.full()
    }

    #[inline]
    pub fn ack(&self) -> bool {
        self.write.ack()
    }

    // ─── Read-domain outputs ────────────────────────────────────────────────

    #[inline]
    pub fn empty(&self) -> bool {
        self.read.empty()
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.read.valid()
    }

    #[inline]
    pub fn read_state(&self) -> ReadState {
        self.read.state()
    }

    // ─── Count-domain output ────────────────────────────────────────────────

    /// Occupancy count as the count domain reports it; `None` when disabled.
    pub fn data_count(&self) -> Option<u32> {
        let live = self.live_sample();
        self.count.as_ref().map(|c| c.count(live))
    }

    /// Exact words held right now, from the live pointers.
    ///
    /// Not a hardware output: this is the reference value the occupancy
    /// counter approximates.
    pub fn occupancy(&self) -> usize {
        let head = self.write.head().bin();
        let tail = self.read.tail().bin();
        distance(head, tail, self.geo.mask()) as usize + self.read.staged() as usize
    }

    #[inline]
    pub fn head(&self) -> u32 {
        self.write.head().bin()
    }

    #[inline]
    pub fn tail(&self) -> u32 {
        self.read.tail().bin()
    }

    // ─── Reset ──────────────────────────────────────────────────────────────

    pub fn assert_write_reset(&mut self) {
        self.write.assert_reset();
    }

    pub fn release_write_reset(&mut self) {
        self.write.release_reset();
    }

    pub fn assert_read_reset(&mut self) {
        self.read.assert_reset();
    }

    pub fn release_read_reset(&mut self) {
        self.read.release_reset();
    }

    pub fn assert_count_reset(&mut self) {
        if let Some(count) = self.count.as_mut() {
            count.assert_reset();
        }
    }

    pub fn release_count_reset(&mut self) {
        if let Some(count) = self.count.as_mut() {
            count.release_reset();
        }
    }

    /// Asserts then releases reset in every domain.
    pub fn reset(&mut self) {
        self.assert_write_reset();
        self.assert_read_reset();
        self.assert_count_reset();
        self.release_write_reset();
        self.release_read_reset();
        self.release_count_reset();
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            head: self.write.head().bin(),
            imported_tail: self.write.imported_tail(),
            tail: self.read.tail().bin(),
            imported_head: self.read.imported_head(),
            full: self.full(),
            empty: self.empty(),
            valid: self.valid(),
            ack: self.ack(),
            read_state: self.read_state(),
            data_count: self.data_count(),
        }
    }
}
