//! Randomized invariants of the controller.
//!
//! The lock-step runs below tick write, then read, then count on every cycle
//! and only ever request what the flags allow, the way a well-behaved
//! producer and consumer would.

use fifo_ctrl::{
    Controller, ControllerParams, CountParams, CountTiming, Crossing, Edges, Inputs, ReadMode,
};
use proptest::prelude::*;

fn read_mode() -> impl Strategy<Value = ReadMode> {
    prop_oneof![Just(ReadMode::Normal), Just(ReadMode::Fwft)]
}

fn controller(depth: usize, mode: ReadMode, crossing: Crossing, timing: CountTiming) -> Controller {
    let addr_width = depth.next_power_of_two().trailing_zeros().max(1);
    let params = ControllerParams {
        depth,
        read_mode: mode,
        crossing,
        ack: true,
        count: Some(CountParams {
            width: addr_width + 1,
            timing,
        }),
    };
    Controller::new(&params).expect("valid params")
}

proptest! {
    #[test]
    fn gray_and_binary_crossings_agree(
        depth in 2usize..=64,
        mode in read_mode(),
        ops in prop::collection::vec((0u8..8, any::<bool>(), any::<bool>()), 1..300),
    ) {
        let mut bin = controller(depth, mode, Crossing::Binary, CountTiming::Delayed);
        let mut gray = controller(depth, mode, Crossing::Gray, CountTiming::Delayed);

        for (edge_bits, write_enable, read_enable) in ops {
            let edges = Edges {
                write: edge_bits & 1 != 0,
                read: edge_bits & 2 != 0,
                count: edge_bits & 4 != 0,
            };
            let inputs = Inputs { write_enable, read_enable };
            prop_assert_eq!(bin.tick(edges, inputs), gray.tick(edges, inputs));
            prop_assert_eq!(bin.snapshot(), gray.snapshot());
        }
    }

    #[test]
    fn count_equals_outstanding_words(
        depth in 2usize..=64,
        mode in read_mode(),
        ops in prop::collection::vec((any::<bool>(), any::<bool>()), 1..400),
    ) {
        let mut ctl = controller(depth, mode, Crossing::Gray, CountTiming::Immediate);
        let mut accepted = 0u32;
        let mut consumed = 0u32;

        for (want_write, want_read) in ops {
            let write_enable = want_write && !ctl.full();
            if ctl.tick_write(write_enable).enable {
                accepted += 1;
            }

            let read_enable = want_read && !ctl.empty();
            let fetched = ctl.tick_read(read_enable).enable;
            consumed += match mode {
                ReadMode::Normal => fetched as u32,
                ReadMode::Fwft => read_enable as u32,
            };
            ctl.tick_count();

            prop_assert_eq!(ctl.data_count(), Some(accepted - consumed));
            prop_assert_eq!(ctl.occupancy(), (accepted - consumed) as usize);
            prop_assert!(ctl.occupancy() <= ctl.geometry().slots());
        }
    }

    #[test]
    fn full_and_empty_are_exclusive(
        depth in 4usize..=64,
        mode in read_mode(),
        ops in prop::collection::vec((any::<bool>(), any::<bool>()), 1..400),
    ) {
        let mut ctl = controller(depth, mode, Crossing::Binary, CountTiming::Delayed);
        for (want_write, want_read) in ops {
            let write_enable = want_write && !ctl.full();
            ctl.tick_write(write_enable);
            let read_enable = want_read && !ctl.empty();
            ctl.tick_read(read_enable);
            ctl.tick_count();

            prop_assert!(!(ctl.full() && ctl.empty()), "{:?}", ctl.snapshot());
        }
    }

    #[test]
    fn acks_match_accepted_writes(
        depth in 2usize..=32,
        ops in prop::collection::vec(any::<bool>(), 1..200),
    ) {
        let mut ctl = controller(depth, ReadMode::Normal, Crossing::Binary, CountTiming::Delayed);
        let mut accepted = 0u32;
        let mut acks = 0u32;
        for write_enable in ops {
            // no reads: the FIFO fills and later writes are attempted while full
            accepted += ctl.tick_write(write_enable).enable as u32;
            acks += ctl.ack() as u32;
        }
        prop_assert_eq!(acks, accepted);
        prop_assert!(accepted as usize <= ctl.geometry().capacity());
    }
}
