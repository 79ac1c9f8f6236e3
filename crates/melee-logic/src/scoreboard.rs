//! Cumulative tournament scores

use serde::Serialize;

use crate::roster::PlayerId;

/// Score per roster entry, kept for the whole tournament
///
/// Deltas are unsigned, so a score can only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    scores: Vec<u32>,
}

impl ScoreBoard {
    pub fn new(player_count: usize) -> Self {
        Self { scores: vec![0; player_count] }
    }

    pub fn add_score(&mut self, player: PlayerId, delta: u32) {
        if player >= self.scores.len() {
            self.scores.resize(player + 1, 0);
        }
        self.scores[player] = self.scores[player].saturating_add(delta);
    }

    pub fn score_of(&self, player: PlayerId) -> u32 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    /// Players sorted by score, highest first. Equal scores keep roster order.
    pub fn leaderboard(&self) -> Vec<(PlayerId, u32)> {
        let mut board: Vec<(PlayerId, u32)> = self.scores.iter().copied().enumerate().collect();
        board.sort_by(|a, b| b.1.cmp(&a.1));
        board
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
