//! The player capability and the strategies that provide it

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::moves::Move;
use crate::process::{ProcessPlayer, ProcessSpec};
use crate::random::SeededRng;
use crate::vm::{execute_bytecode, validate_bytecode};

/// A tournament participant
///
/// A player only ever sees the opponent's previous move, never its own
/// and never the opponent's choice for the current turn.
pub trait Player: Send {
    /// Display name of the strategy's developer, unique within a roster.
    fn developer_name(&self) -> &str;

    /// Choose this turn's move. `opponent_previous` is `Move::None` on the
    /// first turn of a match.
    fn make_move(&mut self, opponent_previous: Move) -> Result<Move, StrategyError>;

    /// Called once before the first turn of every match.
    fn begin_match(&mut self) {}
}

/// Built-in strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyBase {
    /// Always plays rock.
    AlwaysRock,
    /// Always plays paper.
    AlwaysPaper,
    /// Always plays scissors.
    AlwaysScissors,
    /// Rock, paper, scissors, rock, ... restarting every match.
    Cycle,
    /// Copies the opponent's last move. Starts with rock.
    Mirror,
    /// Plays what would have beaten the opponent's last move. Starts with paper.
    BeatLast,
    /// Uniformly random each turn.
    Random,
}

/// How a roster entry is backed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStrategy {
    Builtin(StrategyBase),
    /// Program for the bytecode VM.
    Bytecode(Vec<u8>),
    /// External program speaking the line protocol.
    Process(ProcessSpec),
}

/// Settings shared by every strategy built for one roster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiateOptions {
    /// Seed for random-playing strategies; each roster slot gets its own stream.
    pub seed: [u8; 32],
    /// How long an external strategy may take to answer.
    pub move_timeout: Duration,
}

impl Default for InstantiateOptions {
    fn default() -> Self {
        Self {
            seed: [0x5a; 32],
            move_timeout: Duration::from_millis(1000),
        }
    }
}

impl PlayerStrategy {
    /// Build a player for roster slot `slot`
    pub fn instantiate(
        &self,
        developer_name: &str,
        slot: u32,
        options: &InstantiateOptions,
    ) -> Result<Box<dyn Player>, StrategyError> {
        let rng = SeededRng::new(&options.seed, slot);
        match self {
            PlayerStrategy::Builtin(base) => {
                Ok(Box::new(BuiltinPlayer::with_rng(developer_name, *base, rng)))
            }
            PlayerStrategy::Bytecode(program) => {
                Ok(Box::new(BytecodePlayer::new(developer_name, program.clone(), rng)?))
            }
            PlayerStrategy::Process(spec) => {
                Ok(Box::new(ProcessPlayer::spawn(developer_name, spec, options.move_timeout)?))
            }
        }
    }
}

/// Execute a built-in strategy for one turn
///
/// # Arguments
/// * `base` - The strategy to execute
/// * `opponent_previous` - Opponent's last move in this match
/// * `turn` - Player's 0-based turn index within the match
/// * `rng` - Random number generator for this player
pub fn execute_strategy(
    base: StrategyBase,
    opponent_previous: Move,
    turn: u32,
    rng: &mut SeededRng,
) -> Move {
    match base {
        StrategyBase::AlwaysRock => Move::Rock,
        StrategyBase::AlwaysPaper => Move::Paper,
        StrategyBase::AlwaysScissors => Move::Scissors,
        StrategyBase::Cycle => Move::PLAYABLE[(turn % 3) as usize],
        StrategyBase::Mirror => match opponent_previous {
            Move::None => Move::Rock,
            m => m,
        },
        StrategyBase::BeatLast => match opponent_previous {
            Move::None => Move::Paper,
            m => m.beaten_by(),
        },
        StrategyBase::Random => rng.next_move(),
    }
}

/// Get a human-readable description of a strategy
pub fn describe_strategy(base: StrategyBase) -> &'static str {
    match base {
        StrategyBase::AlwaysRock => "Always plays rock.",
        StrategyBase::AlwaysPaper => "Always plays paper.",
        StrategyBase::AlwaysScissors => "Always plays scissors.",
        StrategyBase::Cycle => "Cycles rock, paper, scissors from the start of each match.",
        StrategyBase::Mirror => "Copies the opponent's last move. Starts with rock.",
        StrategyBase::BeatLast => "Plays what beats the opponent's last move. Starts with paper.",
        StrategyBase::Random => "Picks a random move each turn.",
    }
}

/// A player backed by a built-in strategy
#[derive(Clone, Debug)]
pub struct BuiltinPlayer {
    name: String,
    base: StrategyBase,
    turn: u32,
    rng: SeededRng,
}

impl BuiltinPlayer {
    pub fn new(name: impl Into<String>, base: StrategyBase) -> Self {
        Self::with_rng(name, base, SeededRng::new(&InstantiateOptions::default().seed, 0))
    }

    pub fn with_rng(name: impl Into<String>, base: StrategyBase, rng: SeededRng) -> Self {
        Self { name: name.into(), base, turn: 0, rng }
    }

    pub fn base(&self) -> StrategyBase {
        self.base
    }
}

impl Player for BuiltinPlayer {
    fn developer_name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, opponent_previous: Move) -> Result<Move, StrategyError> {
        let m = execute_strategy(self.base, opponent_previous, self.turn, &mut self.rng);
        self.turn += 1;
        Ok(m)
    }

    fn begin_match(&mut self) {
        self.turn = 0;
    }
}

/// A player whose moves come from a validated bytecode program
#[derive(Clone, Debug)]
pub struct BytecodePlayer {
    name: String,
    program: Vec<u8>,
    turn: u32,
    rng: SeededRng,
}

impl BytecodePlayer {
    pub fn new(name: impl Into<String>, program: Vec<u8>, rng: SeededRng) -> Result<Self, StrategyError> {
        validate_bytecode(&program)?;
        Ok(Self { name: name.into(), program, turn: 0, rng })
    }
}

impl Player for BytecodePlayer {
    fn developer_name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, opponent_previous: Move) -> Result<Move, StrategyError> {
        let turn = self.turn;
        self.turn += 1;
        execute_bytecode(&self.program, opponent_previous, turn, &mut self.rng)
            .ok_or(StrategyError::Fault { turn })
    }

    fn begin_match(&mut self) {
        self.turn = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::op;

    fn make_rng() -> SeededRng {
        SeededRng::new(&[42u8; 32], 0)
    }

    #[test]
    fn test_constant_strategies() {
        let mut rng = make_rng();
        for turn in 0..10 {
            assert_eq!(execute_strategy(StrategyBase::AlwaysRock, Move::Paper, turn, &mut rng), Move::Rock);
            assert_eq!(execute_strategy(StrategyBase::AlwaysPaper, Move::None, turn, &mut rng), Move::Paper);
            assert_eq!(execute_strategy(StrategyBase::AlwaysScissors, Move::Rock, turn, &mut rng), Move::Scissors);
        }
    }

    #[test]
    fn test_mirror() {
        let mut rng = make_rng();
        assert_eq!(execute_strategy(StrategyBase::Mirror, Move::None, 0, &mut rng), Move::Rock);
        assert_eq!(execute_strategy(StrategyBase::Mirror, Move::Scissors, 1, &mut rng), Move::Scissors);
    }

    #[test]
    fn test_beat_last() {
        let mut rng = make_rng();
        assert_eq!(execute_strategy(StrategyBase::BeatLast, Move::None, 0, &mut rng), Move::Paper);
        assert_eq!(execute_strategy(StrategyBase::BeatLast, Move::Rock, 1, &mut rng), Move::Paper);
        assert_eq!(execute_strategy(StrategyBase::BeatLast, Move::Scissors, 1, &mut rng), Move::Rock);
    }

    #[test]
    fn test_cycle_restarts_each_match() {
        let mut player = BuiltinPlayer::new("Cy", StrategyBase::Cycle);
        player.begin_match();
        let first: Vec<_> = (0..4).map(|_| player.make_move(Move::Rock).unwrap()).collect();
        assert_eq!(first, vec![Move::Rock, Move::Paper, Move::Scissors, Move::Rock]);

        player.begin_match();
        assert_eq!(player.make_move(Move::None).unwrap(), Move::Rock);
    }

    #[test]
    fn test_random_is_playable_and_seeded() {
        let mut p1 = BuiltinPlayer::with_rng("R1", StrategyBase::Random, make_rng());
        let mut p2 = BuiltinPlayer::with_rng("R2", StrategyBase::Random, make_rng());
        for _ in 0..50 {
            let m = p1.make_move(Move::None).unwrap();
            assert!(m.is_playable());
            assert_eq!(m, p2.make_move(Move::None).unwrap());
        }
    }

    #[test]
    fn test_bytecode_player_matches_builtin_mirror() {
        let program = vec![op::OPP_LAST, op::DUP, op::JMP_FWD_IF, 1, op::ROCK, op::RETURN];
        let mut custom = BytecodePlayer::new("VM", program, make_rng()).unwrap();
        let mut native = BuiltinPlayer::new("Native", StrategyBase::Mirror);

        for opp in [Move::None, Move::Paper, Move::Scissors, Move::Rock] {
            assert_eq!(custom.make_move(opp).unwrap(), native.make_move(opp).unwrap());
        }
    }

    #[test]
    fn test_bytecode_player_rejects_invalid_program() {
        let err = BytecodePlayer::new("Bad", vec![op::PUSH], make_rng()).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidBytecode(_)));
    }

    #[test]
    fn test_bytecode_fault_reports_turn() {
        // Valid shape, but RETURN of 0 is not a move
        let mut player = BytecodePlayer::new("Zero", vec![op::PUSH, 0, op::RETURN], make_rng()).unwrap();
        player.make_move(Move::None).unwrap_err();
        let err = player.make_move(Move::None).unwrap_err();
        assert!(matches!(err, StrategyError::Fault { turn: 1 }));
    }

    #[test]
    fn test_instantiate_builtin_and_bytecode() {
        let options = InstantiateOptions::default();
        let mut rock = PlayerStrategy::Builtin(StrategyBase::AlwaysRock)
            .instantiate("Rocky", 0, &options)
            .unwrap();
        assert_eq!(rock.developer_name(), "Rocky");
        assert_eq!(rock.make_move(Move::None).unwrap(), Move::Rock);

        let mut vm = PlayerStrategy::Bytecode(vec![op::SCISSORS])
            .instantiate("Edward", 1, &options)
            .unwrap();
        assert_eq!(vm.make_move(Move::None).unwrap(), Move::Scissors);

        assert!(PlayerStrategy::Bytecode(vec![])
            .instantiate("Empty", 2, &options)
            .is_err());
    }

    #[test]
    fn test_strategy_json_format() {
        let s: PlayerStrategy = serde_json::from_str(r#"{"Builtin": "BeatLast"}"#).unwrap();
        assert_eq!(s, PlayerStrategy::Builtin(StrategyBase::BeatLast));

        let s: PlayerStrategy = serde_json::from_str(r#"{"Bytecode": [0]}"#).unwrap();
        assert_eq!(s, PlayerStrategy::Bytecode(vec![op::ROCK]));
    }

    #[test]
    fn test_describe_strategy() {
        assert!(describe_strategy(StrategyBase::Mirror).starts_with("Copies"));
    }
}
