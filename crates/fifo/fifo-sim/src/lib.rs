//! Clocked simulation of a complete dual-clock FIFO.
//!
//! [`AsyncFifo`] wires a [`fifo_ctrl::Controller`] to a [`fifo_mem::Storage`];
//! [`ClockSet`] produces edge instants for three free-running clocks; and
//! [`run_stream`] pushes a word stream through the FIFO, checking order and
//! occupancy on the way.

pub mod clock;
pub mod fifo;
pub mod stream;

pub use clock::{ClockError, ClockSet, ClockSpec, CountClock};
pub use fifo::{AsyncFifo, FifoError};
pub use stream::{EnablePattern, StreamError, StreamReport, StreamSink, StreamSource, run_stream};
