// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::contract::{Contract, Doubling, Strain, TrickResult};
use crate::domain::tournament::{GameFormat, Tournament, TournamentId};

pub fn strain() -> impl Strategy<Value = Strain> {
    prop_oneof![
        Just(Strain::Clubs),
        Just(Strain::Diamonds),
        Just(Strain::Hearts),
        Just(Strain::Spades),
        Just(Strain::NoTrump),
    ]
}

pub fn doubling() -> impl Strategy<Value = Doubling> {
    prop_oneof![
        Just(Doubling::Undoubled),
        Just(Doubling::Doubled),
        Just(Doubling::Redoubled),
    ]
}

pub fn contract() -> impl Strategy<Value = Contract> {
    (1u8..=7, strain(), doubling()).prop_map(|(level, strain, doubling)| Contract {
        level,
        strain,
        doubling,
    })
}

/// A contract together with a result that is possible for it.
pub fn contract_and_result() -> impl Strategy<Value = (Contract, TrickResult)> {
    contract().prop_flat_map(|c| {
        let max_over = i16::from(7 - c.level);
        let max_down = i16::from(c.level + 6);
        let relative = (-max_down..=max_over).prop_map(|diff| match diff {
            0 => TrickResult::Made,
            d if d > 0 => TrickResult::Over(d as u8),
            d => TrickResult::Down((-d) as u8),
        });
        let result = prop_oneof![relative, (0u8..=7).prop_map(TrickResult::OddTricks)];
        (Just(c), result)
    })
}

/// Tournaments where every table has its own starting board set.
pub fn tournament() -> impl Strategy<Value = Tournament> {
    (1u32..=8, 1u32..=4, 0u32..=3).prop_map(|(tables, bpr, extra_rounds)| {
        let pairs = tables * 2;
        let rounds = tables + extra_rounds;
        Tournament {
            id: TournamentId::from("prop01"),
            boards_per_round: bpr,
            total_rounds: rounds,
            format: GameFormat::Pair,
            total_pairs: pairs,
        }
    })
}

/// One board's NS scores across 1..=12 tables.
pub fn board_scores() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(
        prop_oneof![Just(420), Just(-50), Just(0), -2000i32..=2000],
        1..=12,
    )
}
