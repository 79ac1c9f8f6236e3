//! Stateful move resolution with the consecutive-win streak

use crate::moves::{Move, Outcome};
use crate::resolve;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// Resolves turns and counts how many in a row the same side has won
///
/// The streak is for presentation only; it never affects scoring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveResolver {
    streak: u32,
    last_winner: Option<Side>,
}

impl MoveResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, a: Move, b: Move) -> Outcome {
        let outcome = resolve(a, b);
        self.record(outcome);
        outcome
    }

    fn record(&mut self, outcome: Outcome) {
        let winner = match outcome {
            Outcome::AWins => Some(Side::A),
            Outcome::BWins => Some(Side::B),
            Outcome::Tie(_) | Outcome::None => None,
        };

        match winner {
            Some(side) if self.last_winner == Some(side) => {
                self.streak = self.streak.saturating_add(1);
            }
            // A new winner starts its own streak
            Some(side) => {
                self.streak = 1;
                self.last_winner = Some(side);
            }
            None => self.reset_streak(),
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn reset_streak(&mut self) {
        self.streak = 0;
        self.last_winner = None;
    }
}
