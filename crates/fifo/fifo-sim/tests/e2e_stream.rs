//! End-to-end streaming through a complete FIFO.
//!
//! Every case pushes a known word sequence from a producer clocked by the
//! write clock to a consumer clocked by the read clock, and checks that the
//! words arrive complete and in order. The clock ratios cover a fast writer,
//! a fast reader, equal clocks, and clocks whose edges never line up.
//!
//! # Running the Test
//!
//! ```bash
//! cargo test -p fifo-sim --test e2e_stream -- --nocapture
//! ```

use fifo_ctrl::{ControllerParams, CountParams, CountTiming, Crossing, ReadMode};
use fifo_sim::{
    AsyncFifo, ClockSet, ClockSpec, CountClock, EnablePattern, StreamError, StreamReport,
    StreamSink, StreamSource, run_stream,
};
use proptest::prelude::*;
use std::io::Write;

/// Writes to stderr with immediate flush to bypass test output capture.
macro_rules! log {
    ($($arg:tt)*) => {{
        let _ = writeln!(std::io::stderr(), $($arg)*);
        let _ = std::io::stderr().flush();
    }};
}

struct Case {
    depth: usize,
    mode: ReadMode,
    crossing: Crossing,
    write_ps: u64,
    read_ps: u64,
    count: CountClock,
    write_pattern: &'static str,
    read_pattern: &'static str,
    words: u32,
}

impl Default for Case {
    fn default() -> Self {
        Self {
            depth: 16,
            mode: ReadMode::Normal,
            crossing: Crossing::Gray,
            write_ps: 1000,
            read_ps: 1000,
            count: CountClock::Read,
            write_pattern: "1",
            read_pattern: "1",
            words: 500,
        }
    }
}

impl Case {
    fn params(&self) -> ControllerParams {
        ControllerParams {
            depth: self.depth,
            read_mode: self.mode,
            crossing: self.crossing,
            ack: true,
            count: Some(CountParams {
                width: 5,
                timing: CountTiming::Delayed,
            }),
        }
    }

    fn run(&self) -> Result<(StreamReport, Vec<u32>), StreamError> {
        let mut fifo = AsyncFifo::<u32>::new(&self.params()).expect("valid params");
        let mut clocks = ClockSet::new(
            ClockSpec::new(self.write_ps),
            ClockSpec::new(self.read_ps).with_phase(self.read_ps / 3),
            self.count,
        )
        .expect("valid clocks");
        let words: Vec<u32> = (0..self.words).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        let mut source = StreamSource::new(
            words.iter().copied(),
            EnablePattern::parse(self.write_pattern)?,
        );
        let mut sink = StreamSink::new(self.mode, EnablePattern::parse(self.read_pattern)?);

        let report = run_stream(&mut fifo, &mut clocks, &mut source, &mut sink, 200_000)?;
        assert_eq!(sink.received(), words.as_slice());
        Ok((report, sink.into_received()))
    }
}

#[test]
fn equal_clocks_normal_mode() {
    let (report, got) = Case::default().run().unwrap();
    assert_eq!(got.len(), 500);
    assert_eq!(report.acks, 500);
    log!("equal clocks: {report:?}");
}

#[test]
fn equal_clocks_fwft_mode() {
    let case = Case {
        mode: ReadMode::Fwft,
        ..Case::default()
    };
    let (report, _) = case.run().unwrap();
    assert_eq!(report.acks, 500);
}

#[test]
fn fast_writer_fills_and_blocks() {
    for mode in [ReadMode::Normal, ReadMode::Fwft] {
        let case = Case {
            mode,
            write_ps: 1000,
            read_ps: 3700,
            ..Case::default()
        };
        let (report, _) = case.run().unwrap();
        assert!(report.blocked_writes > 0, "{mode:?}: writer never saw full");
        assert!(report.max_occupancy >= 15, "{mode:?}: {report:?}");
        log!("fast writer {mode:?}: {report:?}");
    }
}

#[test]
fn fast_reader_drains() {
    for mode in [ReadMode::Normal, ReadMode::Fwft] {
        let case = Case {
            mode,
            write_ps: 4100,
            read_ps: 1000,
            ..Case::default()
        };
        let (report, _) = case.run().unwrap();
        assert_eq!(report.blocked_writes, 0);
        assert!(report.max_occupancy <= 2, "{mode:?}: {report:?}");
    }
}

#[test]
fn binary_crossing_streams_too() {
    let case = Case {
        crossing: Crossing::Binary,
        write_ps: 1300,
        read_ps: 1700,
        ..Case::default()
    };
    case.run().unwrap();
}

#[test]
fn bursty_producer_and_consumer() {
    for mode in [ReadMode::Normal, ReadMode::Fwft] {
        let case = Case {
            mode,
            write_pattern: "1110010",
            read_pattern: "1011",
            write_ps: 900,
            read_ps: 1100,
            ..Case::default()
        };
        case.run().unwrap();
    }
}

#[test]
fn single_slot_fifo() {
    for mode in [ReadMode::Normal, ReadMode::Fwft] {
        let case = Case {
            depth: 1,
            mode,
            words: 64,
            ..Case::default()
        };
        let (report, _) = case.run().unwrap();
        assert!(report.max_occupancy <= 2);
    }
}

#[test]
fn independent_count_clock_stays_in_field() {
    let case = Case {
        depth: 64,
        write_ps: 1000,
        read_ps: 2900,
        count: CountClock::Own(ClockSpec::new(700).with_phase(123)),
        ..Case::default()
    };
    let (report, _) = case.run().unwrap();
    assert!(report.count_edges > 0);
    // width 5 cannot show 63 words
    assert_eq!(report.max_data_count, Some(31));
}

#[test]
fn stall_is_reported() {
    let mut fifo = AsyncFifo::<u8>::new(&ControllerParams::with_depth(4)).unwrap();
    let mut clocks = ClockSet::shared(10).unwrap();
    let mut source = StreamSource::new(0..50u8, EnablePattern::always());
    let mut sink = StreamSink::new(ReadMode::Normal, EnablePattern::always());

    let err = run_stream(&mut fifo, &mut clocks, &mut source, &mut sink, 20).unwrap_err();
    assert!(matches!(err, StreamError::Stalled { instants: 20, total: 50, .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_clock_ratio_preserves_order(
        depth in 1usize..=32,
        fwft in any::<bool>(),
        gray in any::<bool>(),
        write_ps in 1u64..=50,
        read_ps in 1u64..=50,
        words in 1u32..=200,
    ) {
        let case = Case {
            depth,
            mode: if fwft { ReadMode::Fwft } else { ReadMode::Normal },
            crossing: if gray { Crossing::Gray } else { Crossing::Binary },
            write_ps,
            read_ps,
            words,
            ..Case::default()
        };
        let (report, got) = case.run().unwrap();
        prop_assert_eq!(got.len(), words as usize);
        prop_assert_eq!(report.acks, words as usize);
    }
}
