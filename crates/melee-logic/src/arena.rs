//! Tick-driven tournament
//!
//! [`Arena`] owns every piece of tournament state and exposes the calls an
//! external driver makes: start, one turn per tick, pause and resume.

use serde::Serialize;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::game::{MatchSimulator, TurnResult, TurnState};
use crate::loader::{LoadReport, StrategyLoader};
use crate::pairing::{schedule, Match, Schedule};
use crate::roster::{PlayerId, Roster};
use crate::scoreboard::ScoreBoard;

/// The scheduled matches and how far play has got
///
/// The cursor only moves forward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tournament {
    matches: Vec<Match>,
    cursor: usize,
    degraded: bool,
}

impl Tournament {
    pub fn new(schedule: Schedule) -> Self {
        Self { matches: schedule.matches, cursor: 0, degraded: schedule.degraded }
    }

    /// The match being played, `None` once every match is done
    pub fn current(&self) -> Option<Match> {
        self.matches.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.matches.len() {
            self.cursor += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.matches.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// The order was shuffled with a fallback random source
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// What one tick produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub match_index: usize,
    pub players: Match,
    pub result: TurnResult,
}

/// A leaderboard line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub name: String,
    pub score: u32,
}

pub struct Arena {
    config: ArenaConfig,
    simulator: MatchSimulator,
    roster: Option<Roster>,
    /// Roster supplied by the caller; survives `reset`.
    pinned: bool,
    load_report: Option<LoadReport>,
    tournament: Option<Tournament>,
    state: TurnState,
    scores: ScoreBoard,
    paused: bool,
}

impl Arena {
    /// An arena that loads its players from `config.players_dir`
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            simulator: MatchSimulator::new(config.match_config()),
            config,
            roster: None,
            pinned: false,
            load_report: None,
            tournament: None,
            state: TurnState::new(),
            scores: ScoreBoard::default(),
            paused: false,
        }
    }

    /// An arena playing a ready-made roster
    pub fn with_roster(config: ArenaConfig, roster: Roster) -> Self {
        let mut arena = Self::new(config);
        arena.roster = Some(roster);
        arena.pinned = true;
        arena
    }

    /// Load players if needed and schedule every match
    ///
    /// Does nothing if a tournament is already running or finished.
    pub fn start_tournament(&mut self) -> Result<(), ArenaError> {
        if self.tournament.is_some() {
            return Ok(());
        }

        let player_count = match &self.roster {
            Some(roster) => roster.len(),
            None => {
                let loader = StrategyLoader::new(&self.config.players_dir, self.config.instantiate_options());
                let (roster, report) = loader.load()?;
                let count = roster.len();
                self.roster = Some(roster);
                self.load_report = Some(report);
                count
            }
        };

        let schedule = schedule(player_count, self.config.shuffle, self.config.seed);
        if schedule.degraded {
            log::warn!("match order was shuffled without OS entropy");
        }

        self.scores = ScoreBoard::new(player_count);
        self.state = TurnState::new();
        self.paused = false;
        let tournament = Tournament::new(schedule);
        log::info!(
            "tournament started: {} players, {} matches, {} turns each ({} shuffle)",
            player_count,
            tournament.len(),
            self.config.turns_per_match,
            self.config.shuffle
        );
        if tournament.is_complete() {
            log::info!("tournament finished: not enough players for a match");
        }
        self.tournament = Some(tournament);
        Ok(())
    }

    /// Play one turn of the current match
    ///
    /// Returns `Ok(None)` while paused and once the tournament is complete.
    pub fn advance_turn(&mut self) -> Result<Option<TurnReport>, ArenaError> {
        let (tournament, roster) = match (self.tournament.as_mut(), self.roster.as_mut()) {
            (Some(tournament), Some(roster)) => (tournament, roster),
            _ => return Err(ArenaError::NotStarted),
        };
        if self.paused {
            return Ok(None);
        }
        let melee = match tournament.current() {
            Some(melee) => melee,
            None => return Ok(None),
        };
        let match_index = tournament.cursor();

        if self.state.is_fresh() {
            log::info!(
                "match {}/{}: {} vs {}",
                match_index + 1,
                tournament.len(),
                roster.name(melee.a).unwrap_or("?"),
                roster.name(melee.b).unwrap_or("?")
            );
        }

        let result = self.simulator.advance_turn(melee, roster, &mut self.state, &mut self.scores);

        if result.match_complete {
            tournament.advance();
            if tournament.is_complete() {
                log::info!("tournament finished after {} matches", tournament.len());
            }
        }

        Ok(Some(TurnReport { match_index, players: melee, result }))
    }

    pub fn is_complete(&self) -> bool {
        self.tournament.as_ref().map_or(false, Tournament::is_complete)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Forget the tournament and its scores
    ///
    /// A loaded roster is dropped and reloaded by the next start; a roster
    /// given to [`Arena::with_roster`] is kept.
    pub fn reset(&mut self) {
        if !self.pinned {
            self.roster = None;
            self.load_report = None;
        }
        self.tournament = None;
        self.state = TurnState::new();
        self.scores = ScoreBoard::default();
        self.paused = false;
    }

    /// Players by score, highest first; equal scores keep roster order
    pub fn leaderboard(&self) -> Vec<Standing> {
        self.scores
            .leaderboard()
            .into_iter()
            .map(|(id, score)| Standing {
                name: self.player_name(id).unwrap_or("?").to_string(),
                score,
            })
            .collect()
    }

    pub fn player_name(&self, id: PlayerId) -> Option<&str> {
        self.roster.as_ref().and_then(|roster| roster.name(id))
    }

    pub fn player_names(&self) -> Vec<&str> {
        self.roster.as_ref().map(Roster::names).unwrap_or_default()
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn turn_state(&self) -> &TurnState {
        &self.state
    }

    pub fn tournament(&self) -> Option<&Tournament> {
        self.tournament.as_ref()
    }

    pub fn load_report(&self) -> Option<&LoadReport> {
        self.load_report.as_ref()
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}
