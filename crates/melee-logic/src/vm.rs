//! Stack-based bytecode VM for third-party player strategies.
//!
//! Programs are at most 64 bytes and run on a fixed 8-slot u8 stack.
//! Move values on the stack use `Move::code` (0 = none, 1 = rock,
//! 2 = paper, 3 = scissors). Any runtime error yields no move, which
//! the match simulator treats as a forfeited turn.

use crate::moves::Move;
use crate::random::SeededRng;

// ── Constants ────────────────────────────────────────────────────────

/// Maximum bytecode program length in bytes.
pub const MAX_BYTECODE_LEN: usize = 64;

/// Maximum instructions the VM will execute before halting (fuel limit).
const MAX_FUEL: u32 = 128;

/// Stack depth (fixed array, no heap).
const STACK_SIZE: usize = 8;

// ── Opcodes ──────────────────────────────────────────────────────────

pub mod op {
    pub const ROCK: u8 = 0x00;
    pub const PUSH: u8 = 0x01;
    pub const OPP_LAST: u8 = 0x02;
    pub const TURN: u8 = 0x03;
    pub const RAND: u8 = 0x04;
    pub const ADD: u8 = 0x05;
    pub const SUB: u8 = 0x06;
    pub const MUL: u8 = 0x07;
    pub const MOD: u8 = 0x08;
    pub const GT: u8 = 0x09;
    pub const LT: u8 = 0x0A;
    pub const EQ: u8 = 0x0B;
    pub const NOT: u8 = 0x0C;
    pub const AND: u8 = 0x0D;
    pub const OR: u8 = 0x0E;
    pub const DUP: u8 = 0x0F;
    pub const BEATS: u8 = 0x10;
    pub const JMP_FWD: u8 = 0x11;
    pub const JMP_FWD_IF: u8 = 0x12;
    pub const PAPER: u8 = 0x13;
    pub const SCISSORS: u8 = 0x14;
    pub const RETURN: u8 = 0x15;
    pub const RAND_MOVE: u8 = 0x16;
}

// ── Validation ───────────────────────────────────────────────────────

/// Errors that can occur during bytecode validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BytecodeError {
    /// Program is empty.
    Empty,
    /// Program exceeds MAX_BYTECODE_LEN bytes.
    TooLong,
    /// Unknown opcode encountered at the given offset.
    UnknownOpcode { offset: usize, opcode: u8 },
    /// An instruction with an immediate operand is truncated.
    TruncatedImmediate { offset: usize },
    /// A forward jump lands out of bounds.
    JumpOutOfBounds { offset: usize },
    /// Program has no terminal instruction (ROCK/PAPER/SCISSORS/RETURN).
    NoTerminal,
}

impl core::fmt::Display for BytecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BytecodeError::Empty => write!(f, "bytecode is empty"),
            BytecodeError::TooLong => write!(f, "bytecode exceeds {} bytes", MAX_BYTECODE_LEN),
            BytecodeError::UnknownOpcode { offset, opcode } =>
                write!(f, "unknown opcode 0x{:02X} at offset {}", opcode, offset),
            BytecodeError::TruncatedImmediate { offset } =>
                write!(f, "truncated immediate at offset {}", offset),
            BytecodeError::JumpOutOfBounds { offset } =>
                write!(f, "forward jump out of bounds at offset {}", offset),
            BytecodeError::NoTerminal =>
                write!(f, "no terminal instruction (ROCK/PAPER/SCISSORS/RETURN)"),
        }
    }
}

impl std::error::Error for BytecodeError {}

/// Validate bytecode before a strategy is admitted to the roster.
///
/// Checks:
/// - Non-empty, at most `MAX_BYTECODE_LEN` bytes
/// - All opcodes are known
/// - All immediates are present (not truncated)
/// - All forward jumps land within bounds
/// - At least one terminal instruction exists
pub fn validate_bytecode(bytecode: &[u8]) -> Result<(), BytecodeError> {
    if bytecode.is_empty() {
        return Err(BytecodeError::Empty);
    }
    if bytecode.len() > MAX_BYTECODE_LEN {
        return Err(BytecodeError::TooLong);
    }

    let mut pc = 0usize;
    let mut has_terminal = false;

    while pc < bytecode.len() {
        let opcode = bytecode[pc];
        match opcode {
            op::ROCK | op::PAPER | op::SCISSORS | op::RETURN => {
                has_terminal = true;
                pc += 1;
            }
            op::PUSH => {
                if pc + 1 >= bytecode.len() {
                    return Err(BytecodeError::TruncatedImmediate { offset: pc });
                }
                pc += 2;
            }
            op::JMP_FWD | op::JMP_FWD_IF => {
                if pc + 1 >= bytecode.len() {
                    return Err(BytecodeError::TruncatedImmediate { offset: pc });
                }
                let offset = bytecode[pc + 1] as usize;
                let target = pc + 2 + offset;
                if target > bytecode.len() {
                    return Err(BytecodeError::JumpOutOfBounds { offset: pc });
                }
                pc += 2;
            }
            op::OPP_LAST | op::TURN | op::RAND | op::RAND_MOVE |
            op::ADD | op::SUB | op::MUL | op::MOD | op::GT | op::LT | op::EQ |
            op::NOT | op::AND | op::OR | op::DUP | op::BEATS => {
                pc += 1;
            }
            _ => {
                return Err(BytecodeError::UnknownOpcode { offset: pc, opcode });
            }
        }
    }

    if !has_terminal {
        return Err(BytecodeError::NoTerminal);
    }

    Ok(())
}

// ── Execution ────────────────────────────────────────────────────────

/// Execute a bytecode program and return the chosen move.
///
/// `turn` is the player's own 0-based turn index within the current match.
/// Returns `None` on stack underflow/overflow, fuel exhaustion, division
/// by zero, a RETURN of a non-move value, or falling off the end.
pub fn execute_bytecode(
    bytecode: &[u8],
    opponent_previous: Move,
    turn: u32,
    rng: &mut SeededRng,
) -> Option<Move> {
    let mut stack = [0u8; STACK_SIZE];
    let mut sp: usize = 0; // stack pointer (next empty slot)
    let mut pc: usize = 0;
    let mut fuel: u32 = 0;

    while pc < bytecode.len() {
        fuel += 1;
        if fuel > MAX_FUEL {
            return None;
        }

        let opcode = bytecode[pc];
        match opcode {
            op::ROCK => return Some(Move::Rock),
            op::PAPER => return Some(Move::Paper),
            op::SCISSORS => return Some(Move::Scissors),

            op::RETURN => {
                let v = pop(&mut stack, &mut sp)?;
                return Move::from_code(v).filter(|m| m.is_playable());
            }

            op::PUSH => {
                let imm = *bytecode.get(pc + 1)?;
                push(&mut stack, &mut sp, imm)?;
                pc += 2;
            }

            op::OPP_LAST => {
                push(&mut stack, &mut sp, opponent_previous.code())?;
                pc += 1;
            }

            op::TURN => {
                push(&mut stack, &mut sp, turn.min(u8::MAX as u32) as u8)?;
                pc += 1;
            }

            op::RAND => {
                let v = rng.next_percent();
                push(&mut stack, &mut sp, v)?;
                pc += 1;
            }

            op::RAND_MOVE => {
                let v = rng.next_move().code();
                push(&mut stack, &mut sp, v)?;
                pc += 1;
            }

            op::ADD => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, a.saturating_add(b))?;
                pc += 1;
            }

            op::SUB => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, a.saturating_sub(b))?;
                pc += 1;
            }

            op::MUL => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, a.saturating_mul(b))?;
                pc += 1;
            }

            op::MOD => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, a.checked_rem(b)?)?;
                pc += 1;
            }

            op::GT => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a > b))?;
                pc += 1;
            }

            op::LT => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a < b))?;
                pc += 1;
            }

            op::EQ => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a == b))?;
                pc += 1;
            }

            op::NOT => {
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a == 0))?;
                pc += 1;
            }

            op::AND => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a != 0 && b != 0))?;
                pc += 1;
            }

            op::OR => {
                let b = pop(&mut stack, &mut sp)?;
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, u8::from(a != 0 || b != 0))?;
                pc += 1;
            }

            op::DUP => {
                let a = pop(&mut stack, &mut sp)?;
                push(&mut stack, &mut sp, a)?;
                push(&mut stack, &mut sp, a)?;
                pc += 1;
            }

            op::BEATS => {
                let a = pop(&mut stack, &mut sp)?;
                let winner = Move::from_code(a)?.beaten_by();
                push(&mut stack, &mut sp, winner.code())?;
                pc += 1;
            }

            op::JMP_FWD => {
                let offset = *bytecode.get(pc + 1)? as usize;
                pc = pc + 2 + offset;
            }

            op::JMP_FWD_IF => {
                let cond = pop(&mut stack, &mut sp)?;
                let offset = *bytecode.get(pc + 1)? as usize;
                if cond != 0 {
                    pc = pc + 2 + offset;
                } else {
                    pc += 2;
                }
            }

            _ => return None,
        }
    }

    None
}

// ── Stack helpers ────────────────────────────────────────────────────

#[inline]
fn push(stack: &mut [u8; STACK_SIZE], sp: &mut usize, val: u8) -> Option<()> {
    if *sp >= STACK_SIZE {
        return None; // overflow
    }
    stack[*sp] = val;
    *sp += 1;
    Some(())
}

#[inline]
fn pop(stack: &mut [u8; STACK_SIZE], sp: &mut usize) -> Option<u8> {
    if *sp == 0 {
        return None; // underflow
    }
    *sp -= 1;
    Some(stack[*sp])
}

// ── Tests ────────────────────────────────────────────────────────────
