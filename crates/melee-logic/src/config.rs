//! Tournament configuration, read from TOML

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::game::MatchConfig;
use crate::pairing::ShufflePolicy;
use crate::random::{clock_seed, seed_bytes};
use crate::strategy::InstantiateOptions;

/// Every knob of a tournament run
///
/// Missing keys take their default; unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    pub turns_per_match: u32,
    pub points_per_win: u32,
    /// Directory scanned for strategy packs.
    pub players_dir: PathBuf,
    /// Pause between ticks in the host loop.
    pub tick_interval_ms: u64,
    /// Reply deadline for out-of-process strategies.
    pub move_timeout_ms: u64,
    pub shuffle: ShufflePolicy,
    /// Makes the schedule and random strategies reproducible.
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            turns_per_match: 200,
            points_per_win: 1,
            players_dir: PathBuf::from("players"),
            tick_interval_ms: 250,
            move_timeout_ms: 1000,
            shuffle: ShufflePolicy::Uniform,
            seed: None,
        }
    }
}

impl ArenaConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ArenaError> {
        let config: ArenaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ArenaError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.turns_per_match == 0 {
            return Err(ArenaError::InvalidConfig("turns_per_match must be at least 1".into()));
        }
        if self.move_timeout_ms == 0 {
            return Err(ArenaError::InvalidConfig("move_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            turns_per_match: self.turns_per_match,
            points_per_win: self.points_per_win,
        }
    }

    pub fn move_timeout(&self) -> Duration {
        Duration::from_millis(self.move_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Options for building the roster's players
    ///
    /// Without a configured seed, random strategies are seeded from the clock.
    pub fn instantiate_options(&self) -> InstantiateOptions {
        let seed = self.seed.unwrap_or_else(clock_seed);
        InstantiateOptions {
            seed: seed_bytes(seed),
            move_timeout: self.move_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.match_config(), MatchConfig::standard());
        assert_eq!(config.players_dir, PathBuf::from("players"));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.shuffle, ShufflePolicy::Uniform);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ArenaConfig::from_toml_str("").unwrap(), ArenaConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = ArenaConfig::from_toml_str(
            r#"
            turns_per_match = 50
            shuffle = "legacy"
            seed = 7
            players_dir = "bots"
            "#,
        )
        .unwrap();
        assert_eq!(config.turns_per_match, 50);
        assert_eq!(config.points_per_win, 1);
        assert_eq!(config.shuffle, ShufflePolicy::Legacy);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.players_dir, PathBuf::from("bots"));
    }

    #[test]
    fn test_zero_turns_rejected() {
        let err = ArenaConfig::from_toml_str("turns_per_match = 0").unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ArenaConfig::from_toml_str("turns = 10").unwrap_err();
        assert!(matches!(err, ArenaError::ConfigParse(_)));
    }

    #[test]
    fn test_bad_shuffle_rejected() {
        assert!(ArenaConfig::from_toml_str(r#"shuffle = "bogo""#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ArenaConfig::load("/nonexistent/arena.toml").unwrap_err();
        assert!(matches!(err, ArenaError::ConfigIo { .. }));
    }

    #[test]
    fn test_seeded_options_are_stable() {
        let config = ArenaConfig { seed: Some(11), move_timeout_ms: 40, ..ArenaConfig::default() };
        let o1 = config.instantiate_options();
        let o2 = config.instantiate_options();
        assert_eq!(o1, o2);
        assert_eq!(o1.move_timeout, Duration::from_millis(40));
    }
}
