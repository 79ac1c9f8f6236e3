//! Moves and turn outcomes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A move in rock-paper-scissors
///
/// `None` is what a player sees as the opponent's previous move on the
/// first turn of every match. It is never a winning move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Move {
    #[default]
    None,
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// The three moves a well-behaved strategy may play.
    pub const PLAYABLE: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn is_playable(self) -> bool {
        self != Move::None
    }

    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
            Move::None => Move::None,
        }
    }

    /// The move that defeats this one.
    pub fn beaten_by(self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
            Move::None => Move::None,
        }
    }

    /// Numeric code used by the bytecode VM (0 = none, 1-3 = rock, paper, scissors)
    pub fn code(self) -> u8 {
        match self {
            Move::None => 0,
            Move::Rock => 1,
            Move::Paper => 2,
            Move::Scissors => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Move> {
        match code {
            0 => Some(Move::None),
            1 => Some(Move::Rock),
            2 => Some(Move::Paper),
            3 => Some(Move::Scissors),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::None => "NONE",
            Move::Rock => "ROCK",
            Move::Paper => "PAPER",
            Move::Scissors => "SCISSORS",
        };
        f.write_str(s)
    }
}

/// Error returned when a strategy reply is not a move
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized move {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Move::None),
            "ROCK" | "R" => Ok(Move::Rock),
            "PAPER" | "P" => Ok(Move::Paper),
            "SCISSORS" | "S" => Ok(Move::Scissors),
            _ => Err(ParseMoveError(s.trim().to_string())),
        }
    }
}

/// Result of resolving one turn, from player A's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    AWins,
    BWins,
    /// Both sides played the same move.
    Tie(Move),
    /// Neither side played a real move.
    None,
}

impl Outcome {
    /// The same outcome seen with A and B exchanged.
    pub fn swapped(self) -> Outcome {
        match self {
            Outcome::AWins => Outcome::BWins,
            Outcome::BWins => Outcome::AWins,
            other => other,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AWins => f.write_str("A_WINS"),
            Outcome::BWins => f.write_str("B_WINS"),
            Outcome::Tie(m) => write!(f, "{m}_{m}_TIE"),
            Outcome::None => f.write_str("NONE"),
        }
    }
}
