//! Property tests for contract scoring.
//!
//! Properties tested:
//! - EW declaring is the exact negation of NS declaring
//! - Making scores positive, going down scores negative
//! - Doubling never helps a failing declarer
//! - Vulnerability never softens a penalty

use proptest::prelude::*;

use crate::domain::contract::{Doubling, TrickResult};
use crate::domain::scoring::{declarer_score, score};
use crate::domain::test_gens::contract_and_result;
use crate::domain::test_prelude;
use crate::domain::tournament::Direction;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_directions_are_zero_sum(
        (contract, result) in contract_and_result(),
        vulnerable in any::<bool>(),
    ) {
        let ns = score(&contract, Direction::NorthSouth, result, vulnerable);
        let ew = score(&contract, Direction::EastWest, result, vulnerable);
        match (ns, ew) {
            (Ok(ns), Ok(ew)) => prop_assert_eq!(ns, -ew),
            (Err(_), Err(_)) => {}
            other => prop_assert!(false, "directions disagree: {:?}", other),
        }
    }

    #[test]
    fn prop_sign_follows_outcome(
        (contract, result) in contract_and_result(),
        vulnerable in any::<bool>(),
    ) {
        let Ok(diff) = result.relative_to(&contract) else {
            return Ok(());
        };
        let points = declarer_score(&contract, result, vulnerable).unwrap();
        if diff >= 0 {
            prop_assert!(points > 0, "{contract} {result} scored {points}");
        } else {
            prop_assert!(points < 0, "{contract} {result} scored {points}");
        }
    }

    #[test]
    fn prop_doubling_never_helps_when_down(
        (contract, down) in crate::domain::test_gens::contract()
            .prop_flat_map(|c| (Just(c), 1u8..=c.level + 6)),
        vulnerable in any::<bool>(),
    ) {
        let result = TrickResult::Down(down);
        let mut undoubled = contract;
        undoubled.doubling = Doubling::Undoubled;
        let mut doubled = contract;
        doubled.doubling = Doubling::Doubled;
        let mut redoubled = contract;
        redoubled.doubling = Doubling::Redoubled;

        let u = declarer_score(&undoubled, result, vulnerable).unwrap();
        let x = declarer_score(&doubled, result, vulnerable).unwrap();
        let xx = declarer_score(&redoubled, result, vulnerable).unwrap();
        prop_assert!(x <= u);
        prop_assert!(xx <= x);
    }

    #[test]
    fn prop_vulnerable_penalty_is_at_least_non_vulnerable(
        (contract, result) in contract_and_result(),
    ) {
        let Ok(diff) = result.relative_to(&contract) else {
            return Ok(());
        };
        prop_assume!(diff < 0);
        let vul = declarer_score(&contract, result, true).unwrap();
        let non_vul = declarer_score(&contract, result, false).unwrap();
        prop_assert!(vul <= non_vul);
    }
}
