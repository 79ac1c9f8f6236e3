//! Melee Logic for JanKenPon Arena
//!
//! Core engine for round-robin rock-paper-scissors tournaments:
//! - Strategy loading from a directory of strategy packs
//! - Round-robin scheduling with randomized order
//! - Turn-by-turn match simulation driven by an external tick

mod arena;
mod config;
mod error;
mod game;
mod loader;
mod moves;
mod pairing;
mod process;
mod random;
mod resolver;
mod roster;
mod scoreboard;
mod strategy;
mod vm;

pub use arena::{Arena, Standing, Tournament, TurnReport};
pub use config::ArenaConfig;
pub use error::{ArenaError, StrategyError};
pub use game::{MatchConfig, MatchSimulator, TurnRecord, TurnResult, TurnState};
pub use loader::{LoadReport, PlayerEntry, SkippedCandidate, StrategyLoader};
pub use moves::{Move, Outcome, ParseMoveError};
pub use pairing::{calculate_match_count, generate_all_pairings, schedule, shuffle_matches, Match, Schedule, ShufflePolicy};
pub use process::{ProcessPlayer, ProcessSpec, MAX_CONSECUTIVE_TIMEOUTS};
pub use random::{SeededRng, ShuffleDraws, ShuffleSource};
pub use resolver::MoveResolver;
pub use roster::{PlayerId, Roster};
pub use scoreboard::ScoreBoard;
pub use strategy::{describe_strategy, execute_strategy, BuiltinPlayer, BytecodePlayer, InstantiateOptions, Player, PlayerStrategy, StrategyBase};
pub use vm::{op, validate_bytecode, BytecodeError, MAX_BYTECODE_LEN};

/// Resolve one turn between player A and player B
///
/// Total over every pair of moves. A side that played `Move::None`
/// (a forfeit) loses to any real move; two forfeits resolve to
/// `Outcome::None` and award nothing.
pub fn resolve(a: Move, b: Move) -> Outcome {
    match (a, b) {
        (Move::None, Move::None) => Outcome::None,
        (Move::None, _) => Outcome::BWins,
        (_, Move::None) => Outcome::AWins,
        (a, b) if a == b => Outcome::Tie(a),
        (a, b) if a.beats() == b => Outcome::AWins,
        _ => Outcome::BWins,
    }
}
