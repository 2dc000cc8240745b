//! Redis-backed tournament store.
//!
//! Layout, all under `tournament:{id}`:
//! - `tournament:{id}` hash of the tournament parameters
//! - `…:pairs` set of pair ids, `…:pair:{pid}` hash per pair
//! - `…:pair:{pid}:state` hash holding the pair's board state
//! - `…:board:{n}:pair:{ns}` hash per recorded result, indexed by `…:boards`
//! - `…:pair_counter`, with `…:released_slots` (sorted set) for ordinals given
//!   back below the top of the counter
//! - `…:pairs_finished_counter`, `…:finished_pairs`, `…:completed`
//! - `…:pair:{pid}:board_results` hash of `board:{n}` to JSON rows
//!
//! Operations that must be atomic run as Lua scripts.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::{debug, info};

use crate::domain::{
    BoardResult, BoardState, Direction, GameFormat, Pair, PairBoardResult, PairId, Tournament,
    TournamentId, Vulnerability,
};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, TransportKind};
use crate::errors::ErrorCode;
use crate::repos::{AppendOutcome, FinishMark, TournamentStore};

const CREATE_IF_ABSENT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
"#;

const CLAIM_SLOT: &str = r#"
local reused = redis.call('ZPOPMIN', KEYS[2])
if reused[1] then
  return tonumber(reused[1])
end
local claimed = tonumber(redis.call('GET', KEYS[1]) or '0')
if claimed >= tonumber(ARGV[1]) then
  return -1
end
return redis.call('INCR', KEYS[1])
"#;

const RELEASE_SLOT: &str = r#"
local claimed = tonumber(redis.call('GET', KEYS[1]) or '0')
local ordinal = tonumber(ARGV[1])
if ordinal < 1 or ordinal > claimed then
  return claimed
end
if ordinal < claimed then
  redis.call('ZADD', KEYS[2], ordinal, ordinal)
  return claimed
end
claimed = claimed - 1
while claimed > 0 and redis.call('ZREM', KEYS[2], claimed) == 1 do
  claimed = claimed - 1
end
redis.call('SET', KEYS[1], claimed)
return claimed
"#;

const MARK_FINISHED: &str = r#"
local added = redis.call('SADD', KEYS[1], ARGV[1])
local count
if added == 1 then
  count = redis.call('INCR', KEYS[2])
else
  count = tonumber(redis.call('GET', KEYS[2]) or '0')
end
return {added, count}
"#;

const COMPARE_AND_SET_STATE: &str = r#"
local cur = redis.call('HMGET', KEYS[1], 'currentBoard', 'currentOpponent', 'currentRound')
if not cur[1] then
  return -1
end
if cur[1] == ARGV[1] and cur[2] == ARGV[2] and cur[3] == ARGV[3] then
  redis.call('HSET', KEYS[1], 'currentBoard', ARGV[4], 'currentOpponent', ARGV[5], 'currentRound', ARGV[6])
  return 1
end
return 0
"#;

const INSERT_RESULT_IF_ABSENT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return redis.call('HGETALL', KEYS[1])
end
redis.call('HSET', KEYS[1], unpack(ARGV))
redis.call('SADD', KEYS[2], KEYS[1])
return {}
"#;

fn tournament_key(id: &TournamentId) -> String {
    format!("tournament:{id}")
}

fn pairs_key(id: &TournamentId) -> String {
    format!("tournament:{id}:pairs")
}

fn pair_key(id: &TournamentId, pair_id: PairId) -> String {
    format!("tournament:{id}:pair:{pair_id}")
}

fn state_key(id: &TournamentId, pair_id: PairId) -> String {
    format!("tournament:{id}:pair:{pair_id}:state")
}

fn result_key(id: &TournamentId, board_number: u32, ns_pair: PairId) -> String {
    format!("tournament:{id}:board:{board_number}:pair:{ns_pair}")
}

fn boards_key(id: &TournamentId) -> String {
    format!("tournament:{id}:boards")
}

fn pair_counter_key(id: &TournamentId) -> String {
    format!("tournament:{id}:pair_counter")
}

fn released_slots_key(id: &TournamentId) -> String {
    format!("tournament:{id}:released_slots")
}

fn completed_key(id: &TournamentId) -> String {
    format!("tournament:{id}:completed")
}

fn finished_counter_key(id: &TournamentId) -> String {
    format!("tournament:{id}:pairs_finished_counter")
}

fn finished_pairs_key(id: &TournamentId) -> String {
    format!("tournament:{id}:finished_pairs")
}

fn pair_board_results_key(id: &TournamentId, pair_id: PairId) -> String {
    format!("tournament:{id}:pair:{pair_id}:board_results")
}

fn corrupt(detail: String) -> DomainError {
    DomainError::transport(TransportKind::DataCorruption, detail)
}

fn field<'a>(map: &'a HashMap<String, String>, name: &str) -> Result<&'a str, DomainError> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| corrupt(format!("missing field '{name}'")))
}

fn parse_field<T: FromStr>(map: &HashMap<String, String>, name: &str) -> Result<T, DomainError> {
    let raw = field(map, name)?;
    raw.parse()
        .map_err(|_| corrupt(format!("field '{name}' has unreadable value '{raw}'")))
}

/// Flatten field/value pairs into a Lua `unpack`-able argument list.
fn flatten(fields: Vec<(&'static str, String)>) -> Vec<String> {
    fields
        .into_iter()
        .flat_map(|(name, value)| [name.to_string(), value])
        .collect()
}

fn pairs_to_map(flat: Vec<String>) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(flat.len() / 2);
    let mut items = flat.into_iter();
    while let (Some(name), Some(value)) = (items.next(), items.next()) {
        map.insert(name, value);
    }
    map
}

fn tournament_fields(t: &Tournament) -> Vec<(&'static str, String)> {
    vec![
        ("id", t.id.to_string()),
        ("boardsPerRound", t.boards_per_round.to_string()),
        ("totalRounds", t.total_rounds.to_string()),
        ("format", t.format.as_str().to_string()),
        ("totalPairs", t.total_pairs.to_string()),
    ]
}

fn parse_tournament(map: &HashMap<String, String>) -> Result<Tournament, DomainError> {
    Ok(Tournament {
        id: TournamentId::new(field(map, "id")?),
        boards_per_round: parse_field(map, "boardsPerRound")?,
        total_rounds: parse_field(map, "totalRounds")?,
        format: parse_field::<GameFormat>(map, "format")?,
        total_pairs: parse_field(map, "totalPairs")?,
    })
}

fn pair_fields(p: &Pair) -> Vec<(&'static str, String)> {
    vec![
        ("id", p.id.to_string()),
        ("name1", p.name1.clone()),
        ("name2", p.name2.clone()),
        ("tournamentId", p.tournament_id.to_string()),
    ]
}

fn parse_pair(map: &HashMap<String, String>) -> Result<Pair, DomainError> {
    Ok(Pair {
        id: parse_field(map, "id")?,
        name1: field(map, "name1")?.to_string(),
        name2: field(map, "name2")?.to_string(),
        tournament_id: TournamentId::new(field(map, "tournamentId")?),
    })
}

fn state_fields(s: &BoardState) -> Vec<(&'static str, String)> {
    vec![
        ("currentBoard", s.current_board.to_string()),
        ("currentOpponent", s.current_opponent.to_string()),
        ("currentRound", s.current_round.to_string()),
    ]
}

fn parse_state(map: &HashMap<String, String>) -> Result<BoardState, DomainError> {
    Ok(BoardState {
        current_board: parse_field(map, "currentBoard")?,
        current_opponent: parse_field(map, "currentOpponent")?,
        current_round: parse_field(map, "currentRound")?,
    })
}

fn result_fields(r: &BoardResult) -> Vec<(&'static str, String)> {
    vec![
        ("boardNumber", r.board_number.to_string()),
        ("vul", r.vulnerability.as_str().to_string()),
        ("contract", r.contract.clone()),
        ("direction", r.declarer.to_string()),
        ("result", r.result.clone()),
        ("nsPairId", r.ns_pair.to_string()),
        ("ewPairId", r.ew_pair.to_string()),
        ("score", r.ns_score.to_string()),
    ]
}

fn parse_result(map: &HashMap<String, String>) -> Result<BoardResult, DomainError> {
    let board_number: u32 = parse_field(map, "boardNumber")?;
    Ok(BoardResult {
        board_number,
        contract: field(map, "contract")?.to_string(),
        declarer: parse_field::<Direction>(map, "direction")?,
        result: field(map, "result")?.to_string(),
        ns_pair: parse_field(map, "nsPairId")?,
        ew_pair: parse_field(map, "ewPairId")?,
        // derived from the board number, never trusted from storage
        vulnerability: Vulnerability::for_board(board_number),
        ns_score: parse_field(map, "score")?,
    })
}

pub struct RedisStore {
    manager: ConnectionManager,
    create_if_absent: Script,
    claim_slot: Script,
    release_slot: Script,
    mark_finished: Script,
    compare_and_set: Script,
    insert_result: Script,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client).await.map_err(|err| {
            AppError::internal(
                ErrorCode::StoreUnavailable,
                format!("Unable to initialize Redis connection manager: {err}"),
            )
        })?;

        info!("Connected tournament store to Redis");
        Ok(Self::from_manager(manager))
    }

    pub fn from_manager(manager: ConnectionManager) -> Self {
        Self {
            manager,
            create_if_absent: Script::new(CREATE_IF_ABSENT),
            claim_slot: Script::new(CLAIM_SLOT),
            release_slot: Script::new(RELEASE_SLOT),
            mark_finished: Script::new(MARK_FINISHED),
            compare_and_set: Script::new(COMPARE_AND_SET_STATE),
            insert_result: Script::new(INSERT_RESULT_IF_ABSENT),
        }
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, DomainError> {
        let mut conn = self.conn();
        let map: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(map)
    }

    async fn hgetall_many(&self, keys: &[String]) -> Result<Vec<HashMap<String, String>>, DomainError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.hgetall(key);
        }
        let mut conn = self.conn();
        let rows: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;
        Ok(rows)
    }
}

#[async_trait]
impl TournamentStore for RedisStore {
    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn create_tournament(&self, tournament: &Tournament) -> Result<(), DomainError> {
        let mut conn = self.conn();
        let created: i64 = self
            .create_if_absent
            .key(tournament_key(&tournament.id))
            .arg(flatten(tournament_fields(tournament)))
            .invoke_async(&mut conn)
            .await?;
        if created == 0 {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyExists,
                format!("Tournament {} already exists", tournament.id),
            ));
        }
        Ok(())
    }

    async fn get_tournament(&self, id: &TournamentId) -> Result<Tournament, DomainError> {
        let map = self.hgetall(&tournament_key(id)).await?;
        if map.is_empty() {
            return Err(DomainError::not_found(
                NotFoundKind::Tournament,
                format!("Tournament {id} not found"),
            ));
        }
        parse_tournament(&map)
    }

    async fn claim_pair_slot(&self, id: &TournamentId, capacity: u32) -> Result<u32, DomainError> {
        let mut conn = self.conn();
        let ordinal: i64 = self
            .claim_slot
            .key(pair_counter_key(id))
            .key(released_slots_key(id))
            .arg(capacity)
            .invoke_async(&mut conn)
            .await?;
        if ordinal < 0 {
            return Err(DomainError::capacity(format!(
                "Tournament {id} already has {capacity} pairs"
            )));
        }
        u32::try_from(ordinal).map_err(|_| corrupt(format!("pair counter out of range: {ordinal}")))
    }

    async fn release_pair_slot(&self, id: &TournamentId, ordinal: u32) -> Result<(), DomainError> {
        let mut conn = self.conn();
        let claimed: i64 = self
            .release_slot
            .key(pair_counter_key(id))
            .key(released_slots_key(id))
            .arg(ordinal)
            .invoke_async(&mut conn)
            .await?;
        debug!(tournament_id = %id, ordinal, claimed, "Released pair slot");
        Ok(())
    }

    async fn put_pair(&self, pair: &Pair) -> Result<(), DomainError> {
        let mut conn = self.conn();
        let key = pair_key(&pair.tournament_id, pair.id);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset_multiple(&key, &pair_fields(pair))
            .ignore()
            .sadd(pairs_key(&pair.tournament_id), pair.id.to_string())
            .ignore();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn get_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<Pair, DomainError> {
        let map = self.hgetall(&pair_key(id, pair_id)).await?;
        if map.is_empty() {
            return Err(DomainError::not_found(
                NotFoundKind::Pair,
                format!("Pair {pair_id} not found in tournament {id}"),
            ));
        }
        parse_pair(&map)
    }

    async fn list_pairs(&self, id: &TournamentId) -> Result<Vec<Pair>, DomainError> {
        let mut conn = self.conn();
        let members: Vec<String> = conn.smembers(pairs_key(id)).await?;
        let mut pair_ids = members
            .iter()
            .map(|raw| raw.parse::<PairId>().map_err(|_| corrupt(format!("bad pair id '{raw}'"))))
            .collect::<Result<Vec<_>, _>>()?;
        pair_ids.sort();

        let keys: Vec<String> = pair_ids.iter().map(|p| pair_key(id, *p)).collect();
        self.hgetall_many(&keys)
            .await?
            .iter()
            .filter(|map| !map.is_empty())
            .map(parse_pair)
            .collect()
    }

    async fn set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        state: &BoardState,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn();
        let _: () = conn
            .hset_multiple(state_key(id, pair_id), &state_fields(state))
            .await?;
        Ok(())
    }

    async fn get_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<BoardState, DomainError> {
        let map = self.hgetall(&state_key(id, pair_id)).await?;
        if map.is_empty() {
            return Err(DomainError::not_found(
                NotFoundKind::PairState,
                format!("No board state for pair {pair_id} in tournament {id}"),
            ));
        }
        parse_state(&map)
    }

    async fn compare_and_set_pair_state(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        expected: &BoardState,
        next: &BoardState,
    ) -> Result<bool, DomainError> {
        let mut conn = self.conn();
        let swapped: i64 = self
            .compare_and_set
            .key(state_key(id, pair_id))
            .arg(expected.current_board)
            .arg(expected.current_opponent.to_string())
            .arg(expected.current_round)
            .arg(next.current_board)
            .arg(next.current_opponent.to_string())
            .arg(next.current_round)
            .invoke_async(&mut conn)
            .await?;
        match swapped {
            1 => Ok(true),
            0 => Ok(false),
            _ => Err(DomainError::not_found(
                NotFoundKind::PairState,
                format!("No board state for pair {pair_id} in tournament {id}"),
            )),
        }
    }

    async fn append_board_result(
        &self,
        id: &TournamentId,
        board_number: u32,
        ns_pair: PairId,
        result: &BoardResult,
    ) -> Result<AppendOutcome, DomainError> {
        let mut conn = self.conn();
        let existing: Vec<String> = self
            .insert_result
            .key(result_key(id, board_number, ns_pair))
            .key(boards_key(id))
            .arg(flatten(result_fields(result)))
            .invoke_async(&mut conn)
            .await?;
        if existing.is_empty() {
            return Ok(AppendOutcome::Inserted);
        }
        Ok(AppendOutcome::Duplicate(parse_result(&pairs_to_map(existing))?))
    }

    async fn list_board_results(&self, id: &TournamentId) -> Result<Vec<BoardResult>, DomainError> {
        let mut conn = self.conn();
        let keys: Vec<String> = conn.smembers(boards_key(id)).await?;
        let mut results = self
            .hgetall_many(&keys)
            .await?
            .iter()
            .filter(|map| !map.is_empty())
            .map(parse_result)
            .collect::<Result<Vec<_>, _>>()?;
        results.sort_by_key(|r| (r.board_number, r.ns_pair));
        Ok(results)
    }

    async fn add_finished_pair(&self, id: &TournamentId, pair_id: PairId) -> Result<bool, DomainError> {
        let mut conn = self.conn();
        let added: i64 = conn
            .sadd(finished_pairs_key(id), pair_id.to_string())
            .await?;
        Ok(added > 0)
    }

    async fn increment_finished_counter(&self, id: &TournamentId) -> Result<u32, DomainError> {
        let mut conn = self.conn();
        let count: i64 = conn.incr(finished_counter_key(id), 1).await?;
        u32::try_from(count).map_err(|_| corrupt(format!("finished counter out of range: {count}")))
    }

    async fn mark_pair_finished(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<FinishMark, DomainError> {
        let mut conn = self.conn();
        let (added, count): (i64, i64) = self
            .mark_finished
            .key(finished_pairs_key(id))
            .key(finished_counter_key(id))
            .arg(pair_id.to_string())
            .invoke_async(&mut conn)
            .await?;
        let finished_count = u32::try_from(count)
            .map_err(|_| corrupt(format!("finished counter out of range: {count}")))?;
        Ok(FinishMark {
            newly_finished: added == 1,
            finished_count,
        })
    }

    async fn mark_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        let mut conn = self.conn();
        let first: bool = conn.set_nx(completed_key(id), 1).await?;
        Ok(first)
    }

    async fn is_completed(&self, id: &TournamentId) -> Result<bool, DomainError> {
        let mut conn = self.conn();
        let completed: bool = conn.exists(completed_key(id)).await?;
        Ok(completed)
    }

    async fn put_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
        rows: &[PairBoardResult],
    ) -> Result<(), DomainError> {
        if rows.is_empty() {
            return Ok(());
        }
        let items = rows
            .iter()
            .map(|row| {
                serde_json::to_string(row)
                    .map(|json| (format!("board:{}", row.board_number), json))
                    .map_err(|err| corrupt(format!("serialize board row: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.conn();
        let _: () = conn
            .hset_multiple(pair_board_results_key(id, pair_id), &items)
            .await?;
        Ok(())
    }

    async fn get_pair_board_results(
        &self,
        id: &TournamentId,
        pair_id: PairId,
    ) -> Result<Vec<PairBoardResult>, DomainError> {
        let map = self.hgetall(&pair_board_results_key(id, pair_id)).await?;
        let mut rows = map
            .values()
            .map(|json| {
                serde_json::from_str::<PairBoardResult>(json)
                    .map_err(|err| corrupt(format!("unreadable board row: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by_key(|row| row.board_number);
        Ok(rows)
    }
}
