//! Match execution engine
//!
//! A match is played one turn per call so an external tick can pace it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::moves::{Move, Outcome};
use crate::pairing::Match;
use crate::resolver::MoveResolver;
use crate::roster::Roster;
use crate::scoreboard::ScoreBoard;
use crate::strategy::Player;

/// Turn limit and scoring for every match of a tournament
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub turns_per_match: u32,
    pub points_per_win: u32,
}

impl MatchConfig {
    /// Reference settings: 200 turns, one point per win
    pub fn standard() -> Self {
        Self { turns_per_match: 200, points_per_win: 1 }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Memory of the match in progress
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    /// 0-based index of the next turn to play.
    pub turn: u32,
    pub previous_a: Move,
    pub previous_b: Move,
    resolver: MoveResolver,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive wins by the same side in this match
    pub fn streak(&self) -> u32 {
        self.resolver.streak()
    }

    /// Back to turn 0 with no memory and no streak
    pub fn reset(&mut self) {
        self.turn = 0;
        self.previous_a = Move::None;
        self.previous_b = Move::None;
        self.resolver.reset_streak();
    }

    pub fn is_fresh(&self) -> bool {
        self.turn == 0
    }
}

/// One line of the turn log: `scoreA,moveA,moveB,scoreB`
///
/// Scores are cumulative tournament scores after the turn was scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub score_a: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub score_b: u32,
}

impl fmt::Display for TurnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.score_a, self.move_a, self.move_b, self.score_b)
    }
}

/// Result of a single turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub outcome: Outcome,
    /// Streak as of this turn, before any end-of-match reset.
    pub streak: u32,
    pub record: TurnRecord,
    /// This turn was the last of its match; the state has been reset.
    pub match_complete: bool,
}

/// Plays matches turn by turn
#[derive(Clone, Debug, Default)]
pub struct MatchSimulator {
    config: MatchConfig,
}

impl MatchSimulator {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Play one turn of `melee`
    ///
    /// Each player sees only the opponent's previous move. A player that
    /// errors or plays `Move::None` forfeits the turn.
    ///
    /// # Arguments
    /// * `melee` - The match in progress, fixing who is A and who is B
    /// * `roster` - Owner of both players
    /// * `state` - Memory of this match, reset when the turn limit is hit
    /// * `scores` - Tournament scores, only ever increased
    pub fn advance_turn(
        &self,
        melee: Match,
        roster: &mut Roster,
        state: &mut TurnState,
        scores: &mut ScoreBoard,
    ) -> TurnResult {
        let (move_a, move_b) = match roster.pair_mut(melee.a, melee.b) {
            Some((player_a, player_b)) => {
                if state.is_fresh() {
                    player_a.begin_match();
                    player_b.begin_match();
                }
                // Both moves are chosen before either is revealed
                let move_a = play(player_a, state.previous_b);
                let move_b = play(player_b, state.previous_a);
                (move_a, move_b)
            }
            None => {
                log::warn!("match {}-{} refers to players outside the roster", melee.a, melee.b);
                (Move::None, Move::None)
            }
        };

        let outcome = state.resolver.resolve(move_a, move_b);
        match outcome {
            Outcome::AWins => scores.add_score(melee.a, self.config.points_per_win),
            Outcome::BWins => scores.add_score(melee.b, self.config.points_per_win),
            Outcome::Tie(_) | Outcome::None => {}
        }

        let record = TurnRecord {
            score_a: scores.score_of(melee.a),
            move_a,
            move_b,
            score_b: scores.score_of(melee.b),
        };
        log::debug!("{}", record);

        let turn = state.turn;
        let streak = state.streak();
        state.previous_a = move_a;
        state.previous_b = move_b;
        state.turn += 1;

        let match_complete = state.turn >= self.config.turns_per_match;
        if match_complete {
            state.reset();
        }

        TurnResult { turn, move_a, move_b, outcome, streak, record, match_complete }
    }
}

/// Ask for a move; `Move::None` marks a forfeited turn
fn play(player: &mut dyn Player, opponent_previous: Move) -> Move {
    match choose(player, opponent_previous) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("{} forfeits the turn: {}", player.developer_name(), e);
            Move::None
        }
    }
}

fn choose(player: &mut dyn Player, opponent_previous: Move) -> Result<Move, StrategyError> {
    match player.make_move(opponent_previous)? {
        Move::None => Err(StrategyError::NoMove),
        m => Ok(m),
    }
}
