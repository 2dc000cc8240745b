pub mod tournament_id;
