//! Round-robin pairing and match order randomization
//!
//! Every unordered pair of roster entries meets exactly once. The order of
//! matches and the A/B order inside each match are then randomized.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::random::{clock_seed, ShuffleDraws, ShuffleSource};
use crate::roster::PlayerId;

/// One melee: `a` plays as player A, `b` as player B
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub a: PlayerId,
    pub b: PlayerId,
}

impl Match {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        Self { a, b }
    }

    /// Same players, A and B exchanged
    pub fn swapped(self) -> Self {
        Self { a: self.b, b: self.a }
    }

    /// The unordered pair, smaller index first
    pub fn pair(self) -> (PlayerId, PlayerId) {
        if self.a < self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

/// How the base pairing order is shuffled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShufflePolicy {
    /// Swap every position with one drawn from the whole range, flipping
    /// the match that lands at the drawn position. Not a uniform
    /// permutation; kept for parity with the historical behaviour.
    Legacy,
    /// Fisher-Yates permutation, then an independent coin per match.
    #[default]
    Uniform,
}

impl FromStr for ShufflePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ShufflePolicy::Legacy),
            "uniform" => Ok(ShufflePolicy::Uniform),
            other => Err(format!("unknown shuffle policy {other:?} (expected legacy or uniform)")),
        }
    }
}

impl fmt::Display for ShufflePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShufflePolicy::Legacy => f.write_str("legacy"),
            ShufflePolicy::Uniform => f.write_str("uniform"),
        }
    }
}

/// Ordered match sequence for a tournament
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub matches: Vec<Match>,
    /// True when OS entropy was unavailable and a fallback source was used.
    pub degraded: bool,
}

/// Number of matches in a full round-robin: C(n, 2)
pub fn calculate_match_count(participant_count: usize) -> usize {
    if participant_count < 2 {
        return 0;
    }
    participant_count * (participant_count - 1) / 2
}

/// All pairs (i, j) with i < j, in index order
pub fn generate_all_pairings(participant_count: usize) -> Vec<Match> {
    let mut matches = Vec::with_capacity(calculate_match_count(participant_count));
    for i in 0..participant_count {
        for j in (i + 1)..participant_count {
            matches.push(Match::new(i, j));
        }
    }
    matches
}

/// Shuffle match order and per-match player order in place
pub fn shuffle_matches<S: ShuffleDraws>(matches: &mut [Match], policy: ShufflePolicy, source: &mut S) {
    let len = matches.len();
    match policy {
        ShufflePolicy::Legacy => {
            for p in 0..len {
                let r = source.below(len);
                matches.swap(p, r);
                if source.coin() {
                    matches[r] = matches[r].swapped();
                }
            }
        }
        ShufflePolicy::Uniform => {
            for p in (1..len).rev() {
                let r = source.below(p + 1);
                matches.swap(p, r);
            }
            for m in matches.iter_mut() {
                if source.coin() {
                    *m = m.swapped();
                }
            }
        }
    }
}

/// Pick the shuffle source: seeded when a seed is given, otherwise OS
/// entropy, falling back to a clock-seeded generator if entropy fails.
///
/// Returns the source and whether it is a degraded fallback.
pub fn acquire_source<F>(seed: Option<u64>, entropy: F) -> (ShuffleSource, bool)
where
    F: FnOnce() -> Result<ShuffleSource, rand::Error>,
{
    if let Some(seed) = seed {
        return (ShuffleSource::seeded(seed), false);
    }
    match entropy() {
        Ok(source) => (source, false),
        Err(e) => {
            log::warn!("entropy unavailable ({e}); shuffling with a clock-seeded generator");
            (ShuffleSource::seeded(clock_seed()), true)
        }
    }
}

/// Build the randomized round-robin schedule for `participant_count` players
pub fn schedule(participant_count: usize, policy: ShufflePolicy, seed: Option<u64>) -> Schedule {
    let (mut source, degraded) = acquire_source(seed, ShuffleSource::from_entropy);
    schedule_with(participant_count, policy, &mut source, degraded)
}

pub(crate) fn schedule_with(
    participant_count: usize,
    policy: ShufflePolicy,
    source: &mut ShuffleSource,
    degraded: bool,
) -> Schedule {
    let mut matches = generate_all_pairings(participant_count);
    shuffle_matches(&mut matches, policy, source);
    Schedule { matches, degraded }
}
