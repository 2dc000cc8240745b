use crate::domain::movement::{advance, initial_state, BoardState, Transition};
use crate::domain::tournament::{Direction, GameFormat, PairId, Tournament, TournamentId};
use crate::errors::domain::{ConflictKind, DomainError};

fn tournament(bpr: u32, rounds: u32, pairs: u32) -> Tournament {
    Tournament::new(TournamentId::from("mv0001"), bpr, rounds, GameFormat::Pair, pairs)
        .expect("valid tournament shape")
}

/// Play boards until the pair finishes, returning every state visited
/// (including the terminal one) and the number of round changes.
fn play_out(t: &Tournament, pair: PairId) -> (Vec<BoardState>, u32) {
    let mut state = initial_state(t, pair);
    let mut visited = vec![state];
    let mut round_changes = 0;
    loop {
        let transition = advance(&state, t, pair.direction).expect("advance should succeed");
        let next = transition.state();
        if next.current_round != state.current_round {
            round_changes += 1;
        }
        visited.push(next);
        state = next;
        if transition.is_finished() {
            return (visited, round_changes);
        }
    }
}

#[test]
fn initial_state_uses_table_board_set() {
    let t = tournament(4, 6, 8);
    let s = initial_state(&t, PairId::ns(3));
    assert_eq!(s.current_board, 9);
    assert_eq!(s.current_opponent, PairId::ew(3));
    assert_eq!(s.current_round, 1);

    let s = initial_state(&t, PairId::ew(1));
    assert_eq!(s.current_board, 1);
    assert_eq!(s.current_opponent, PairId::ns(1));
}

#[test]
fn within_a_round_only_the_board_moves() {
    let t = tournament(4, 6, 8);
    let s = initial_state(&t, PairId::ns(2));
    let next = advance(&s, &t, Direction::NorthSouth).unwrap();
    assert_eq!(
        next,
        Transition::Advanced(BoardState {
            current_board: 6,
            current_opponent: PairId::ew(2),
            current_round: 1,
        })
    );
}

#[test]
fn ns_rotation_steps_down_one_table() {
    let t = tournament(4, 6, 8);
    let s = BoardState {
        current_board: 4,
        current_opponent: PairId::ew(1),
        current_round: 1,
    };
    let next = advance(&s, &t, Direction::NorthSouth).unwrap().state();
    assert_eq!(next.current_board, 5);
    assert_eq!(next.current_opponent, PairId::ew(4));
    assert_eq!(next.current_round, 2);
}

#[test]
fn ew_rotation_jumps_a_board_set_and_steps_up() {
    let t = tournament(4, 6, 8);
    let s = BoardState {
        current_board: 4,
        current_opponent: PairId::ns(1),
        current_round: 1,
    };
    let next = advance(&s, &t, Direction::EastWest).unwrap().state();
    assert_eq!(next.current_board, 9);
    assert_eq!(next.current_opponent, PairId::ns(2));
}

#[test]
fn middle_round_skips_an_extra_step() {
    let t = tournament(4, 6, 8);
    // leaving round 3 == (6 + 1) / 2
    let ns = BoardState {
        current_board: 12,
        current_opponent: PairId::ew(3),
        current_round: 3,
    };
    let next = advance(&ns, &t, Direction::NorthSouth).unwrap().state();
    assert_eq!(next.current_board, 13);
    assert_eq!(next.current_opponent, PairId::ew(1));
    assert_eq!(next.current_round, 4);

    let ew = BoardState {
        current_board: 20,
        current_opponent: PairId::ns(3),
        current_round: 3,
    };
    let next = advance(&ew, &t, Direction::EastWest).unwrap().state();
    // 20 + 4 * 2 = 28, wrapped into 1..=24
    assert_eq!(next.current_board, 5);
    assert_eq!(next.current_opponent, PairId::ns(1));
}

#[test]
fn last_board_wraps_to_first() {
    let t = tournament(4, 6, 8);
    let s = BoardState {
        current_board: 24,
        current_opponent: PairId::ew(2),
        current_round: 2,
    };
    let next = advance(&s, &t, Direction::NorthSouth).unwrap().state();
    assert_eq!(next.current_board, 1);
}

#[test]
fn eight_pair_schedule_finishes_after_six_rounds() {
    let t = tournament(4, 6, 8);
    for table in 1..=4 {
        for pair in [PairId::ns(table), PairId::ew(table)] {
            let (visited, round_changes) = play_out(&t, pair);
            assert_eq!(round_changes, 6, "{pair} round changes");
            // 24 boards played, plus the starting state
            assert_eq!(visited.len(), 25);

            let (terminal, playing) = visited.split_last().unwrap();
            assert!(terminal.is_over(&t));
            assert_eq!(terminal.current_round, t.terminal_round());
            for state in playing {
                assert!((1..=24).contains(&state.current_board), "{pair}: {state:?}");
                assert!(!state.is_over(&t));
            }
        }
    }
}

#[test]
fn pairs_at_a_table_agree_each_round_when_rounds_match_tables() {
    let t = tournament(2, 3, 6);
    let tables = t.pairs_per_direction();
    let mut ns: Vec<BoardState> = (1..=tables).map(|n| initial_state(&t, PairId::ns(n))).collect();
    let mut ew: Vec<BoardState> = (1..=tables).map(|n| initial_state(&t, PairId::ew(n))).collect();

    for _round in 1..=t.total_rounds {
        for (i, state) in ns.iter().enumerate() {
            let opponent = ew[(state.current_opponent.table - 1) as usize];
            assert_eq!(opponent.current_opponent, PairId::ns(i as u32 + 1));
            assert_eq!(opponent.current_board, state.current_board);
        }
        for _board in 0..t.boards_per_round {
            for state in ns.iter_mut() {
                *state = advance(state, &t, Direction::NorthSouth).unwrap().state();
            }
            for state in ew.iter_mut() {
                *state = advance(state, &t, Direction::EastWest).unwrap().state();
            }
        }
    }
    assert!(ns.iter().chain(&ew).all(|s| s.is_over(&t)));
}

#[test]
fn tables_drift_apart_when_rounds_outnumber_tables() {
    let t = tournament(1, 3, 4);
    let ns = advance(&initial_state(&t, PairId::ns(1)), &t, Direction::NorthSouth)
        .unwrap()
        .state();
    let ew = advance(&initial_state(&t, PairId::ew(2)), &t, Direction::EastWest)
        .unwrap()
        .state();

    assert_eq!(ns.current_opponent, PairId::ew(2));
    assert_eq!(ew.current_opponent, PairId::ns(1));
    assert_ne!(ns.current_board, ew.current_board);
    assert!(t.validate_movement().is_err());
}

#[test]
fn terminal_state_is_absorbing() {
    let t = tournament(2, 3, 6);
    let terminal = BoardState {
        current_board: 6,
        current_opponent: PairId::ew(1),
        current_round: 4,
    };
    let err = advance(&terminal, &t, Direction::NorthSouth).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::PairFinished, _)
    ));
}

#[test]
fn finishing_freezes_board_and_opponent() {
    let t = tournament(2, 3, 6);
    let last = BoardState {
        current_board: 6,
        current_opponent: PairId::ew(1),
        current_round: 3,
    };
    let transition = advance(&last, &t, Direction::NorthSouth).unwrap();
    assert_eq!(
        transition,
        Transition::Finished(BoardState {
            current_board: 6,
            current_opponent: PairId::ew(1),
            current_round: 4,
        })
    );
}

#[test]
fn single_table_keeps_the_same_opponent() {
    let t = tournament(3, 2, 2);
    let (visited, round_changes) = play_out(&t, PairId::ns(1));
    assert_eq!(round_changes, 2);
    assert!(visited
        .iter()
        .all(|s| s.current_opponent == PairId::ew(1)));
}
