//! Pointer management and synchronization for a dual-clock FIFO.
//!
//! The controller models the write, read and data-count clock domains as
//! separate register sets. Each domain is advanced by its own tick call and
//! sees the other domains only through single-stage import registers. It
//! never stores data: every write or read tick returns the command the
//! storage array must carry out.
//!
//! ```
//! use fifo_ctrl::{Controller, ControllerParams};
//!
//! let mut ctl = Controller::new(&ControllerParams::with_depth(4)).unwrap();
//! for _ in 0..3 {
//!     assert!(ctl.tick_write(true).enable);
//! }
//! assert!(ctl.full());
//! ```

mod ack;
mod controller;
mod count;
mod params;
mod pointer;
mod read_domain;
mod read_fsm;
mod write_domain;

pub use controller::{Controller, ControllerSnapshot, Edges, Inputs, TickOutput};
pub use count::fit_count;
pub use params::{
    ControllerParams, CountParams, CountTiming, Crossing, Geometry, ParamError, ReadMode,
};
pub use pointer::{bin_to_gray, gray_to_bin};
pub use read_domain::StorageRead;
pub use read_fsm::ReadState;
pub use write_domain::StorageWrite;
