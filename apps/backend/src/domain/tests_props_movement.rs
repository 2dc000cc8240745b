//! Property tests for pair movement.
//!
//! Properties tested:
//! - Every pair finishes after exactly one advance per board
//! - The round counter changes exactly `total_rounds` times
//! - Boards stay within 1..=total_boards until the terminal state
//! - Opponents always sit in the other direction at a real table

use proptest::prelude::*;

use crate::domain::movement::{advance, initial_state};
use crate::domain::test_gens::tournament;
use crate::domain::test_prelude;
use crate::domain::tournament::PairId;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_every_pair_finishes_in_range(t in tournament(), table_pick in any::<prop::sample::Index>()) {
        let table = table_pick.index(t.pairs_per_direction() as usize) as u32 + 1;
        for pair in [PairId::ns(table), PairId::ew(table)] {
            let mut state = initial_state(&t, pair);
            let mut advances = 0;
            let mut round_changes = 0;
            while !state.is_over(&t) {
                prop_assert!((1..=t.total_boards()).contains(&state.current_board));
                prop_assert_eq!(state.current_opponent.direction, pair.direction.opposite());
                prop_assert!(t.validate_pair(state.current_opponent).is_ok());

                let next = advance(&state, &t, pair.direction).unwrap().state();
                if next.current_round != state.current_round {
                    round_changes += 1;
                }
                state = next;
                advances += 1;
                prop_assert!(advances <= t.total_boards());
            }
            prop_assert_eq!(advances, t.total_boards());
            prop_assert_eq!(round_changes, t.total_rounds);
            prop_assert_eq!(state.current_round, t.terminal_round());
            prop_assert!(advance(&state, &t, pair.direction).is_err());
        }
    }
}
