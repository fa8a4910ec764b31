//! Storage collaborator for the FIFO controller.
//!
//! The controller never holds data. It hands out write and read commands and
//! relies on storage that:
//! - accepts every write it is given, with no backpressure of its own, and
//! - on a read, latches the addressed word into an output register that the
//!   consumer sees from that edge on (synchronous read-after-write).

use tracing::trace;

/// Synchronous dual-port storage.
pub trait Storage<T> {
    /// Number of addressable slots.
    fn slots(&self) -> usize;

    /// Write-port edge: stores `value` at `addr`.
    fn write(&mut self, addr: usize, value: T);

    /// Read-port edge: latches the word at `addr` into the output register.
    fn read(&mut self, addr: usize);

    /// Output register of the read port.
    fn output(&self) -> T;
}

/// Reference dual-port RAM with independent write and read ports.
pub struct DualPortRam<T> {
    cells: Box<[T]>,
    out: T,
}

impl<T: Copy + Default> DualPortRam<T> {
    /// Creates a RAM of `slots` words, all zero.
    pub fn new(slots: usize) -> Self {
        Self {
            cells: vec![T::default(); slots].into_boxed_slice(),
            out: T::default(),
        }
    }

    #[inline]
    fn index(&self, addr: usize) -> usize {
        // addresses come from masked pointers; wrap anyway
        addr % self.cells.len()
    }
}

impl<T: Copy + Default> Storage<T> for DualPortRam<T> {
    #[inline]
    fn slots(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn write(&mut self, addr: usize, value: T) {
        let idx = self.index(addr);
        self.cells[idx] = value;
    }

    #[inline]
    fn read(&mut self, addr: usize) {
        let idx = self.index(addr);
        trace!(addr = idx, "storage read");
        self.out = self.cells[idx];
    }

    #[inline]
    fn output(&self) -> T {
        self.out
    }
}
