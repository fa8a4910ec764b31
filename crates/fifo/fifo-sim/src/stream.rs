//! Producer and consumer models and the loop that drives them.
//!
//! The source writes a fixed list of words, honouring `full`; the sink reads
//! them back, honouring `empty` (normal mode) or `valid` (FWFT). Both gate
//! their requests with a cyclic enable pattern so that one run exercises
//! bursts, gaps and back-pressure. [`run_stream`] checks ordering and the
//! occupancy bound as it goes.

use crate::clock::ClockSet;
use crate::fifo::AsyncFifo;
use fifo_ctrl::{Inputs, ReadMode};
use fifo_mem::Storage;
use std::collections::VecDeque;
use std::fmt::Debug;
use tracing::{debug, info, trace};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("enable pattern must be a non-empty string of '0' and '1', got {0:?}")]
    Pattern(String),

    #[error("word {index} arrived as {got}, expected {expected}")]
    OutOfOrder {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("occupancy {occupancy} exceeds {limit} at {time_ps} ps")]
    Overfilled {
        occupancy: usize,
        limit: usize,
        time_ps: u64,
    },

    #[error("occupancy {occupancy} disagrees with {outstanding} outstanding words at {time_ps} ps")]
    Miscounted {
        occupancy: usize,
        outstanding: usize,
        time_ps: u64,
    },

    #[error("stalled after {instants} edge instants with {delivered} of {total} words delivered")]
    Stalled {
        instants: u64,
        delivered: usize,
        total: usize,
    },
}

/// A repeating on/off request pattern.
#[derive(Debug, Clone)]
pub struct EnablePattern {
    bits: Vec<bool>,
    pos: usize,
}

impl EnablePattern {
    /// Requests on every edge.
    pub fn always() -> Self {
        Self {
            bits: vec![true],
            pos: 0,
        }
    }

    /// Parses a string such as `"1101"`.
    pub fn parse(s: &str) -> Result<Self, StreamError> {
        let bits = s
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                _ => Err(StreamError::Pattern(s.to_owned())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !bits.contains(&true) {
            // an all-zero pattern can never make progress
            return Err(StreamError::Pattern(s.to_owned()));
        }
        Ok(Self { bits, pos: 0 })
    }

    #[inline]
    pub fn next_bit(&mut self) -> bool {
        let bit = self.bits[self.pos];
        self.pos = (self.pos + 1) % self.bits.len();
        bit
    }
}

impl Default for EnablePattern {
    fn default() -> Self {
        Self::always()
    }
}

/// Producer: offers its words in order while the FIFO is not full.
#[derive(Debug, Clone)]
pub struct StreamSource<T> {
    words: VecDeque<T>,
    pattern: EnablePattern,
    accepted: usize,
    acks: usize,
    blocked: usize,
}

impl<T: Copy + Default> StreamSource<T> {
    pub fn new(words: impl IntoIterator<Item = T>, pattern: EnablePattern) -> Self {
        Self {
            words: words.into_iter().collect(),
            pattern,
            accepted: 0,
            acks: 0,
            blocked: 0,
        }
    }

    /// Write enable and data bus for the coming write edge.
    fn offer(&mut self, full: bool) -> (bool, T) {
        let Some(&word) = self.words.front() else {
            return (false, T::default());
        };
        if !self.pattern.next_bit() {
            return (false, T::default());
        }
        if full {
            self.blocked += 1;
            return (false, T::default());
        }
        (true, word)
    }

    fn settle(&mut self, accepted: bool, ack: bool) {
        if accepted {
            self.words.pop_front();
            self.accepted += 1;
        }
        self.acks += ack as usize;
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.words.len()
    }
}

/// Consumer: collects words as the FIFO delivers them.
#[derive(Debug, Clone)]
pub struct StreamSink<T> {
    mode: ReadMode,
    pattern: EnablePattern,
    received: Vec<T>,
}

impl<T: Copy> StreamSink<T> {
    pub fn new(mode: ReadMode, pattern: EnablePattern) -> Self {
        Self {
            mode,
            pattern,
            received: Vec::new(),
        }
    }

    /// Read enable for the coming read edge.
    ///
    /// In FWFT mode the presented word is consumed by the request itself, so
    /// it is taken here, before the edge replaces it.
    fn request<S: Storage<T>>(&mut self, fifo: &AsyncFifo<T, S>) -> bool {
        match self.mode {
            ReadMode::Normal => !fifo.empty() && self.pattern.next_bit(),
            ReadMode::Fwft => {
                let take = fifo.valid() && self.pattern.next_bit();
                if take {
                    self.received.push(fifo.data());
                }
                take
            }
        }
    }

    /// After the read edge: in normal mode a fetch lands on the data bus.
    fn settle<S: Storage<T>>(&mut self, fetched: bool, fifo: &AsyncFifo<T, S>) {
        if self.mode == ReadMode::Normal && fetched {
            self.received.push(fifo.data());
        }
    }

    #[inline]
    pub fn received(&self) -> &[T] {
        &self.received
    }

    pub fn into_received(self) -> Vec<T> {
        self.received
    }
}

/// Outcome of a successful [`run_stream`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub words: usize,
    pub instants: u64,
    pub end_time_ps: u64,
    pub write_edges: u64,
    pub read_edges: u64,
    pub count_edges: u64,
    pub acks: usize,
    /// Write requests held back because the FIFO was full.
    pub blocked_writes: usize,
    pub max_occupancy: usize,
    pub max_data_count: Option<u32>,
}

/// Streams every word of `source` through `fifo` into `sink`.
///
/// Stops once all words are delivered, or fails after `max_instants` edge
/// instants. Checks on every instant that occupancy stays within the slot
/// count and matches the words in flight, and at the end that the words
/// arrived in the order they were written.
pub fn run_stream<T, S>(
    fifo: &mut AsyncFifo<T, S>,
    clocks: &mut ClockSet,
    source: &mut StreamSource<T>,
    sink: &mut StreamSink<T>,
    max_instants: u64,
) -> Result<StreamReport, StreamError>
where
    T: Copy + Default + PartialEq + Debug,
    S: Storage<T>,
{
    let sent: Vec<T> = source.words.iter().copied().collect();
    let total = sent.len();
    let limit = fifo.controller().geometry().slots();
    let start = sink.received.len();

    info!(words = total, slots = limit, "stream start");

    let mut report = StreamReport {
        words: total,
        ..StreamReport::default()
    };

    while sink.received.len() - start < total {
        if report.instants >= max_instants {
            return Err(StreamError::Stalled {
                instants: report.instants,
                delivered: sink.received.len() - start,
                total,
            });
        }
        report.instants += 1;

        let (now, edges) = clocks.next_edges();
        let mut inputs = Inputs::default();
        let mut data = T::default();
        if edges.write {
            (inputs.write_enable, data) = source.offer(fifo.full());
            report.write_edges += 1;
        }
        if edges.read {
            inputs.read_enable = sink.request(fifo);
            report.read_edges += 1;
        }
        report.count_edges += edges.count as u64;

        let out = fifo.tick(edges, inputs, data);
        if let Some(w) = out.write {
            source.settle(w.enable, fifo.ack());
        }
        if let Some(r) = out.read {
            sink.settle(r.enable, fifo);
        }
        trace!(now, ?edges, ?inputs, ?out, "instant");

        let occupancy = fifo.controller().occupancy();
        if occupancy > limit {
            return Err(StreamError::Overfilled {
                occupancy,
                limit,
                time_ps: now,
            });
        }
        let outstanding = source.accepted - (sink.received.len() - start);
        if occupancy != outstanding {
            return Err(StreamError::Miscounted {
                occupancy,
                outstanding,
                time_ps: now,
            });
        }
        report.max_occupancy = report.max_occupancy.max(occupancy);
        if let Some(count) = fifo.data_count() {
            report.max_data_count = Some(report.max_data_count.map_or(count, |m| m.max(count)));
        }
    }

    for (index, (want, got)) in sent.iter().zip(&sink.received[start..]).enumerate() {
        if want != got {
            debug!(index, ?want, ?got, "ordering mismatch");
            return Err(StreamError::OutOfOrder {
                index,
                expected: format!("{want:?}"),
                got: format!("{got:?}"),
            });
        }
    }

    report.end_time_ps = clocks.now_ps();
    report.acks = source.acks;
    report.blocked_writes = source.blocked;
    info!(
        instants = report.instants,
        end_ps = report.end_time_ps,
        max_occupancy = report.max_occupancy,
        "stream done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_cycles() {
        let mut p = EnablePattern::parse("110").unwrap();
        let bits: Vec<_> = (0..6).map(|_| p.next_bit()).collect();
        assert_eq!(bits, [true, true, false, true, true, false]);
    }

    #[test]
    fn pattern_rejects_junk() {
        assert!(matches!(
            EnablePattern::parse("10x"),
            Err(StreamError::Pattern(_))
        ));
        assert!(EnablePattern::parse("").is_err());
        assert!(EnablePattern::parse("000").is_err());
    }

    #[test]
    fn source_holds_word_while_full() {
        let mut src = StreamSource::new([5u8, 6], EnablePattern::always());
        assert_eq!(src.offer(true), (false, 0));
        assert_eq!(src.blocked, 1);
        assert_eq!(src.offer(false), (true, 5));
        src.settle(true, true);
        assert_eq!(src.offer(false), (true, 6));
        src.settle(true, true);
        assert_eq!(src.offer(false), (false, 0));
        assert_eq!(src.remaining(), 0);
        assert_eq!(src.acks, 2);
    }
}
