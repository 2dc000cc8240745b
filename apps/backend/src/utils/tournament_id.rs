//! Short tournament ids.
//!
//! Ids are 6-character lowercase base36 strings. They are short enough to read
//! out across a room; collisions are caught by the store and retried.

use rand::Rng;

use crate::domain::TournamentId;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const TOURNAMENT_ID_LEN: usize = 6;

pub fn generate_tournament_id() -> TournamentId {
    let mut rng = rand::rng();
    let id: String = (0..TOURNAMENT_ID_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    TournamentId::new(id)
}
