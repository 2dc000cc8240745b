use serde::{Deserialize, Serialize};

use crate::domain::{Leaderboard, PairId, Standing};

/// Leaderboard row as sent to clients. `score` is the percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    pub pair_id: PairId,
    pub name1: String,
    pub name2: String,
    pub score: f64,
    pub matchpoints: f64,
}

impl From<&Standing> for StandingEntry {
    fn from(s: &Standing) -> Self {
        Self {
            pair_id: s.pair_id,
            name1: s.name1.clone(),
            name2: s.name2.clone(),
            score: s.percentage,
            matchpoints: s.matchpoints,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    Results {
        #[serde(rename = "NS")]
        ns: Vec<StandingEntry>,
        #[serde(rename = "EW")]
        ew: Vec<StandingEntry>,
    },

    TournamentReady {
        ready: bool,
    },

    Error {
        code: String,
        message: String,
    },
}

impl ServerMsg {
    pub fn results(board: &Leaderboard) -> Self {
        ServerMsg::Results {
            ns: board.ns.iter().map(StandingEntry::from).collect(),
            ew: board.ew.iter().map(StandingEntry::from).collect(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMsg::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}
