//! Player discovery
//!
//! A players' directory holds strategy packs: `.json` files of the form
//! `{"players": [{"developer_name": "...", "strategy": ...}, ...]}`.
//! Packs are read in file-name order. A candidate that cannot be used is
//! skipped with a warning; only a missing directory is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::roster::Roster;
use crate::strategy::{describe_strategy, InstantiateOptions, PlayerStrategy};

/// One roster entry as written in a pack
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub developer_name: String,
    pub strategy: PlayerStrategy,
}

#[derive(Deserialize)]
struct StrategyPack {
    players: Vec<serde_json::Value>,
}

/// A pack or entry that did not make it into the roster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub unit: PathBuf,
    pub reason: String,
}

/// Summary of one load
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub units_scanned: usize,
    pub players_loaded: usize,
    pub skipped: Vec<SkippedCandidate>,
}

impl LoadReport {
    fn skip(&mut self, unit: &Path, reason: String) {
        log::warn!("skipping candidate in {}: {}", unit.display(), reason);
        self.skipped.push(SkippedCandidate { unit: unit.to_path_buf(), reason });
    }
}

/// Builds a roster from a players' directory
#[derive(Clone, Debug)]
pub struct StrategyLoader {
    dir: PathBuf,
    options: InstantiateOptions,
}

impl StrategyLoader {
    pub fn new(dir: impl Into<PathBuf>, options: InstantiateOptions) -> Self {
        Self { dir: dir.into(), options }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> Result<(Roster, LoadReport), ArenaError> {
        let units = self.discover()?;
        let mut roster = Roster::new();
        let mut report = LoadReport::default();

        for unit in &units {
            report.units_scanned += 1;
            self.load_unit(unit, &mut roster, &mut report);
        }

        report.players_loaded = roster.len();
        log::info!(
            "loaded {} players from {} packs in {} ({} skipped)",
            report.players_loaded,
            report.units_scanned,
            self.dir.display(),
            report.skipped.len()
        );
        Ok((roster, report))
    }

    /// Strategy packs in the directory, sorted by path
    fn discover(&self) -> Result<Vec<PathBuf>, ArenaError> {
        let metadata = match fs::metadata(&self.dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArenaError::DiscoveryMissing(self.dir.clone()));
            }
            Err(source) => return Err(self.io_error(source)),
        };
        if !metadata.is_dir() {
            return Err(ArenaError::DiscoveryNotDirectory(self.dir.clone()));
        }

        let mut units = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| self.io_error(e))? {
            let path = entry.map_err(|e| self.io_error(e))?.path();
            let is_pack = path.extension().map_or(false, |ext| ext == "json");
            if is_pack && path.is_file() {
                units.push(path);
            }
        }
        units.sort();
        Ok(units)
    }

    fn io_error(&self, source: io::Error) -> ArenaError {
        ArenaError::DiscoveryIo { path: self.dir.clone(), source }
    }

    fn load_unit(&self, unit: &Path, roster: &mut Roster, report: &mut LoadReport) {
        let pack: StrategyPack = match fs::read_to_string(unit)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(pack) => pack,
            Err(reason) => return report.skip(unit, format!("unreadable pack: {reason}")),
        };

        if pack.players.is_empty() {
            log::debug!("{} defines no players", unit.display());
        }

        for value in pack.players {
            let entry: PlayerEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    report.skip(unit, format!("malformed entry: {e}"));
                    continue;
                }
            };
            let name = entry.developer_name.trim();
            if name.is_empty() {
                report.skip(unit, "entry has an empty developer name".into());
                continue;
            }
            if roster.contains_name(name) {
                report.skip(unit, format!("developer name {name:?} is already taken"));
                continue;
            }

            let slot = roster.len() as u32;
            match entry.strategy.instantiate(name, slot, &self.options) {
                Ok(player) => {
                    match &entry.strategy {
                        PlayerStrategy::Builtin(base) => {
                            log::debug!("{name}: {}", describe_strategy(*base));
                        }
                        PlayerStrategy::Bytecode(program) => {
                            log::debug!("{name}: bytecode program of {} bytes", program.len());
                        }
                        PlayerStrategy::Process(spec) => {
                            log::debug!("{name}: external program {}", spec.command);
                        }
                    }
                    roster.push(player);
                }
                Err(e) => report.skip(unit, format!("{name}: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jankenpon-loader-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn load(dir: &Path) -> Result<(Roster, LoadReport), ArenaError> {
        StrategyLoader::new(dir, InstantiateOptions::default()).load()
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = std::env::temp_dir().join("jankenpon-loader-does-not-exist");
        let _ = fs::remove_dir_all(&dir);
        assert!(matches!(load(&dir), Err(ArenaError::DiscoveryMissing(_))));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = scratch_dir("not-dir");
        let file = dir.join("players");
        fs::write(&file, "").unwrap();
        assert!(matches!(load(&file), Err(ArenaError::DiscoveryNotDirectory(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_gives_empty_roster() {
        let dir = scratch_dir("empty");
        let (roster, report) = load(&dir).unwrap();
        assert!(roster.is_empty());
        assert_eq!(report, LoadReport::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_loads_packs_in_name_order() {
        let dir = scratch_dir("order");
        fs::write(
            dir.join("b.json"),
            r#"{"players": [{"developer_name": "Bea", "strategy": {"Builtin": "AlwaysPaper"}}]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("a.json"),
            r#"{"players": [
                {"developer_name": "Ana", "strategy": {"Builtin": "AlwaysRock"}},
                {"developer_name": "Vic", "strategy": {"Bytecode": [20]}}
            ]}"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "not a pack").unwrap();

        let (mut roster, report) = load(&dir).unwrap();
        assert_eq!(roster.names(), vec!["Ana", "Vic", "Bea"]);
        assert_eq!(report.units_scanned, 2);
        assert_eq!(report.players_loaded, 3);
        assert!(report.skipped.is_empty());

        let (_, vic) = roster.pair_mut(0, 1).unwrap();
        assert_eq!(vic.make_move(Move::None).unwrap(), Move::Scissors);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_candidates_are_skipped() {
        let dir = scratch_dir("skips");
        fs::write(
            dir.join("mixed.json"),
            r#"{"players": [
                {"developer_name": "Good", "strategy": {"Builtin": "Mirror"}},
                {"developer_name": "Typo", "strategy": {"Builtin": "Telepathy"}},
                {"developer_name": "Short", "strategy": {"Bytecode": [1]}},
                {"developer_name": "Good", "strategy": {"Builtin": "Cycle"}},
                {"developer_name": "  ", "strategy": {"Builtin": "Cycle"}},
                {"developer_name": "Ghost", "strategy": {"Process": {"command": "/nonexistent/ghost-bot"}}},
                {"developer_name": "Fine", "strategy": {"Builtin": "Random"}}
            ]}"#,
        )
        .unwrap();
        fs::write(dir.join("broken.json"), "{ this is not json").unwrap();

        let (roster, report) = load(&dir).unwrap();
        assert_eq!(roster.names(), vec!["Good", "Fine"]);
        assert_eq!(report.units_scanned, 2);
        assert_eq!(report.skipped.len(), 6);
        assert!(report.skipped.iter().any(|s| s.unit.ends_with("broken.json")));
        assert!(report.skipped.iter().any(|s| s.reason.contains("already taken")));
        fs::remove_dir_all(&dir).unwrap();
    }
}
