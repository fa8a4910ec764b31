//! Read discipline state machine.
//!
//! Decides, from registered state only, whether storage is read this tick and
//! what the consumer-facing `valid` flag becomes after the edge.
//!
//! ```text
//! Normal:   valid' = !empty && (enable || valid)
//!
//! FWFT:            !empty
//!           Idle ─────────▶ ActivePush          (storage pulse, tail += 1)
//!            ▲                 │ enable && !empty
//!            │ enable && empty ▼
//!            └──────────── ActiveReady ◀─┐      (storage read, tail += 1)
//!                              └─────────┘ enable && !empty
//! ```
//!
//! The FWFT `Idle → ActivePush` step is the only tail advance without an
//! external enable. The word it stages is still owed to the consumer, which
//! is why the occupancy counter adds one while `valid` is high in FWFT mode.

use crate::params::ReadMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadState {
    /// Nothing presented to the consumer.
    #[default]
    Idle,
    /// FWFT only: first word after idle has been staged.
    ActivePush,
    /// A word is presented and further reads stream from storage.
    ActiveReady,
}

/// Outcome of one read-domain edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStep {
    /// Drive storage read-enable and advance the tail.
    pub fetch: bool,
    pub next: ReadState,
    pub valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadFsm {
    mode: ReadMode,
    state: ReadState,
    valid: bool,
}

impl ReadFsm {
    pub fn new(mode: ReadMode) -> Self {
        Self {
            mode,
            state: ReadState::Idle,
            valid: false,
        }
    }

    #[inline(always)]
    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    #[inline(always)]
    pub fn state(&self) -> ReadState {
        self.state
    }

    #[inline(always)]
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// One word is staged but not yet consumed.
    #[inline(always)]
    pub fn staged(&self) -> bool {
        self.mode == ReadMode::Fwft && self.valid
    }

    /// Computes the edge outcome from the pre-edge `empty` flag and the
    /// external read-enable. Pure: nothing is committed until
    /// [`commit`](Self::commit).
    pub fn step(&self, empty: bool, enable: bool) -> ReadStep {
        match self.mode {
            ReadMode::Normal => {
                let fetch = enable && !empty;
                let valid = !empty && (enable || self.valid);
                ReadStep {
                    fetch,
                    next: if valid {
                        ReadState::ActiveReady
                    } else {
                        ReadState::Idle
                    },
                    valid,
                }
            }
            ReadMode::Fwft => match self.state {
                ReadState::Idle => ReadStep {
                    fetch: !empty,
                    next: if empty {
                        ReadState::Idle
                    } else {
                        ReadState::ActivePush
                    },
                    valid: !empty,
                },
                ReadState::ActivePush | ReadState::ActiveReady => {
                    if !enable {
                        ReadStep {
                            fetch: false,
                            next: self.state,
                            valid: true,
                        }
                    } else if empty {
                        ReadStep {
                            fetch: false,
                            next: ReadState::Idle,
                            valid: false,
                        }
                    } else {
                        ReadStep {
                            fetch: true,
                            next: ReadState::ActiveReady,
                            valid: true,
                        }
                    }
                }
            },
        }
    }

    #[inline]
    pub fn commit(&mut self, step: ReadStep) {
        self.state = step.next;
        self.valid = step.valid;
    }

    pub fn clear(&mut self) {
        self.state = ReadState::Idle;
        self.valid = false;
    }
}
