//! Out-of-process strategies
//!
//! The host writes the opponent's previous move as one line
//! (`NONE`, `ROCK`, `PAPER` or `SCISSORS`) and reads this turn's move back
//! as one line. Both directions go through helper threads so a stalled
//! program costs one timeout per turn instead of hanging the tournament.
//! A program that keeps timing out is stopped and forfeits every later turn.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::moves::Move;
use crate::strategy::Player;

/// Replies buffered ahead of the host; a flooding program blocks on its stdout.
const REPLY_BACKLOG: usize = 4;

/// Consecutive timeouts after which the program is stopped.
pub const MAX_CONSECUTIVE_TIMEOUTS: u32 = 3;

/// Command line of an external strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A player that lives in a child process
pub struct ProcessPlayer {
    name: String,
    child: Child,
    requests: SyncSender<Move>,
    replies: Receiver<std::io::Result<String>>,
    timeout: Duration,
    timeouts: u32,
    retired: bool,
}

impl ProcessPlayer {
    pub fn spawn(name: impl Into<String>, spec: &ProcessSpec, timeout: Duration) -> Result<Self, StrategyError> {
        let mut child = Command::new(&spec.command)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (mut stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(StrategyError::Disconnected);
            }
        };

        // One pending request at most: a second one while the pipe is full fails fast
        let (request_tx, request_rx) = mpsc::sync_channel::<Move>(1);
        thread::spawn(move || {
            for opponent_previous in request_rx {
                if writeln!(stdin, "{}", opponent_previous).and_then(|_| stdin.flush()).is_err() {
                    break;
                }
            }
        });

        let (reply_tx, reply_rx) = mpsc::sync_channel(REPLY_BACKLOG);
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                if reply_tx.send(line).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            name: name.into(),
            child,
            requests: request_tx,
            replies: reply_rx,
            timeout,
            timeouts: 0,
            retired: false,
        })
    }

    /// The program was stopped for not answering
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    fn timed_out(&mut self) -> StrategyError {
        self.timeouts += 1;
        if self.timeouts >= MAX_CONSECUTIVE_TIMEOUTS {
            log::warn!("{}: no answer for {} turns in a row, stopping it", self.name, self.timeouts);
            self.retired = true;
            self.stop();
        }
        StrategyError::Timeout(self.timeout)
    }

    fn stop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Player for ProcessPlayer {
    fn developer_name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, opponent_previous: Move) -> Result<Move, StrategyError> {
        if self.retired {
            return Err(StrategyError::Retired(self.timeouts));
        }

        // Late answers to an earlier, timed-out turn
        for _ in 0..REPLY_BACKLOG {
            match self.replies.try_recv() {
                Ok(stale) => log::debug!("{}: discarding late reply {:?}", self.name, stale),
                Err(_) => break,
            }
        }

        match self.requests.try_send(opponent_previous) {
            Ok(()) => {}
            // The program is not reading its input
            Err(TrySendError::Full(_)) => return Err(self.timed_out()),
            Err(TrySendError::Disconnected(_)) => return Err(StrategyError::Disconnected),
        }

        match self.replies.recv_timeout(self.timeout) {
            Ok(Ok(line)) => {
                self.timeouts = 0;
                Ok(line.parse()?)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => Err(StrategyError::Disconnected),
        }
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProcessSpec {
        ProcessSpec {
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
        }
    }

    #[test]
    fn test_answers_each_turn() {
        let spec = shell("while read line; do echo scissors; done");
        let mut player = ProcessPlayer::spawn("Shell", &spec, Duration::from_secs(5)).unwrap();
        assert_eq!(player.developer_name(), "Shell");
        for opp in [Move::None, Move::Rock, Move::Paper] {
            assert_eq!(player.make_move(opp).unwrap(), Move::Scissors);
        }
    }

    #[test]
    fn test_sees_opponent_move() {
        // cat echoes the opponent's move back: a mirror
        let spec = ProcessSpec { command: "cat".into(), args: vec![] };
        let mut player = ProcessPlayer::spawn("Cat", &spec, Duration::from_secs(5)).unwrap();
        assert_eq!(player.make_move(Move::Paper).unwrap(), Move::Paper);
        assert_eq!(player.make_move(Move::Rock).unwrap(), Move::Rock);
    }

    #[test]
    fn test_silent_process_times_out() {
        let spec = shell("while read line; do :; done");
        let mut player = ProcessPlayer::spawn("Mute", &spec, Duration::from_millis(50)).unwrap();
        let err = player.make_move(Move::None).unwrap_err();
        assert!(matches!(err, StrategyError::Timeout(_)));
    }

    #[test]
    fn test_program_that_never_reads_is_retired() {
        let spec = ProcessSpec { command: "sleep".into(), args: vec!["120".into()] };
        let mut player = ProcessPlayer::spawn("Sleeper", &spec, Duration::from_millis(1)).unwrap();

        // Far more turns than the stdin pipe could buffer
        for turn in 0..10_000u32 {
            let err = player.make_move(Move::Scissors).unwrap_err();
            if turn < MAX_CONSECUTIVE_TIMEOUTS {
                assert!(matches!(err, StrategyError::Timeout(_)), "turn {turn}: {err}");
            } else {
                assert!(matches!(err, StrategyError::Retired(MAX_CONSECUTIVE_TIMEOUTS)), "turn {turn}: {err}");
            }
        }
        assert!(player.is_retired());
    }

    #[test]
    fn test_answer_resets_timeout_count() {
        // Answers only every other line it reads
        let spec = shell("while read a; do read b; echo rock; done");
        let mut player = ProcessPlayer::spawn("Slow", &spec, Duration::from_millis(200)).unwrap();
        for _ in 0..5 {
            assert!(matches!(player.make_move(Move::None), Err(StrategyError::Timeout(_))));
            assert_eq!(player.make_move(Move::None).unwrap(), Move::Rock);
        }
        assert!(!player.is_retired());
    }

    #[test]
    fn test_flooding_program_still_answers() {
        let spec = ProcessSpec { command: "yes".into(), args: vec!["paper".into()] };
        let mut player = ProcessPlayer::spawn("Flood", &spec, Duration::from_secs(5)).unwrap();
        for _ in 0..1_000 {
            assert_eq!(player.make_move(Move::Rock).unwrap(), Move::Paper);
        }
    }

    #[test]
    fn test_bad_reply() {
        let spec = shell("while read line; do echo lizard; done");
        let mut player = ProcessPlayer::spawn("Lizard", &spec, Duration::from_secs(5)).unwrap();
        let err = player.make_move(Move::None).unwrap_err();
        assert!(matches!(err, StrategyError::BadReply(_)));
    }

    #[test]
    fn test_exited_process_disconnects() {
        let spec = shell("exit 0");
        let mut player = ProcessPlayer::spawn("Gone", &spec, Duration::from_secs(5)).unwrap();
        let err = player.make_move(Move::None).unwrap_err();
        assert!(matches!(err, StrategyError::Disconnected));
    }

    #[test]
    fn test_missing_command_fails_to_spawn() {
        let spec = ProcessSpec { command: "/nonexistent/strategy-binary".into(), args: vec![] };
        assert!(matches!(
            ProcessPlayer::spawn("Ghost", &spec, Duration::from_millis(10)),
            Err(StrategyError::Io(_))
        ));
    }
}
