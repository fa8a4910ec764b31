//! Controller and storage wired together.

use fifo_ctrl::{Controller, ControllerParams, Edges, Inputs, ParamError, TickOutput};
use fifo_mem::{DualPortRam, Storage};
use std::marker::PhantomData;

#[derive(Debug, thiserror::Error)]
pub enum FifoError {
    #[error("invalid controller parameters")]
    Params(#[from] ParamError),

    #[error("storage has {have} slots, controller addresses {need}")]
    StorageTooSmall { need: usize, have: usize },
}

/// A complete dual-clock FIFO: controller plus storage.
///
/// Each tick forwards to the controller and then carries out the storage
/// command it returned, so storage sees exactly the enables and addresses a
/// hardware array would.
pub struct AsyncFifo<T, S = DualPortRam<T>> {
    ctl: Controller,
    mem: S,
    _pd: PhantomData<T>,
}

impl<T: Copy + Default> AsyncFifo<T> {
    /// Builds a FIFO backed by a [`DualPortRam`] sized to the rounded depth.
    pub fn new(params: &ControllerParams) -> Result<Self, FifoError> {
        let ctl = Controller::new(params)?;
        let mem = DualPortRam::new(ctl.geometry().slots());
        Ok(Self {
            ctl,
            mem,
            _pd: PhantomData,
        })
    }
}

impl<T: Copy, S: Storage<T>> AsyncFifo<T, S> {
    /// Builds a FIFO on caller-provided storage.
    ///
    /// # Errors
    /// Fails if `storage` cannot hold every address the controller emits.
    pub fn with_storage(params: &ControllerParams, storage: S) -> Result<Self, FifoError> {
        let ctl = Controller::new(params)?;
        let need = ctl.geometry().slots();
        if storage.slots() < need {
            return Err(FifoError::StorageTooSmall {
                need,
                have: storage.slots(),
            });
        }
        Ok(Self {
            ctl,
            mem: storage,
            _pd: PhantomData,
        })
    }

    /// One write-clock edge. Returns whether `data` was stored.
    pub fn tick_write(&mut self, enable: bool, data: T) -> bool {
        let cmd = self.ctl.tick_write(enable);
        if cmd.enable {
            self.mem.write(cmd.addr, data);
        }
        cmd.enable
    }

    /// One read-clock edge. Returns whether storage was read.
    pub fn tick_read(&mut self, enable: bool) -> bool {
        let cmd = self.ctl.tick_read(enable);
        if cmd.enable {
            self.mem.read(cmd.addr);
        }
        cmd.enable
    }

    pub fn tick_count(&mut self) {
        self.ctl.tick_count();
    }

    /// Edges on several domains at one instant; `data` is the write-data bus.
    pub fn tick(&mut self, edges: Edges, inputs: Inputs, data: T) -> TickOutput {
        let out = self.ctl.tick(edges, inputs);
        if let Some(cmd) = out.write.filter(|w| w.enable) {
            self.mem.write(cmd.addr, data);
        }
        if let Some(cmd) = out.read.filter(|r| r.enable) {
            self.mem.read(cmd.addr);
        }
        out
    }

    #[inline]
    pub fn full(&self) -> bool {
        self.ctl.full()
    }

    #[inline]
    pub fn ack(&self) -> bool {
        self.ctl.ack()
    }

    #[inline]
    pub fn empty(&self) -> bool {
        self.ctl.empty()
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.ctl.valid()
    }

    /// Read-data bus: the storage output register.
    #[inline]
    pub fn data(&self) -> T {
        self.mem.output()
    }

    #[inline]
    pub fn data_count(&self) -> Option<u32> {
        self.ctl.data_count()
    }

    #[inline]
    pub fn controller(&self) -> &Controller {
        &self.ctl
    }

    /// Mutable controller access, for reset control.
    #[inline]
    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.ctl
    }
}
