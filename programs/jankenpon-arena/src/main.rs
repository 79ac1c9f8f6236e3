use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use melee_logic::{Arena, ArenaConfig, ShufflePolicy};

#[derive(Parser, Debug)]
#[command(author, version, about = "Round-robin rock-paper-scissors tournament", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the strategy packs
    #[arg(short, long)]
    players_dir: Option<PathBuf>,

    /// Turns in every match
    #[arg(short, long)]
    turns: Option<u32>,

    /// Points awarded for each won turn
    #[arg(long)]
    points_per_win: Option<u32>,

    /// Pause between turns, in milliseconds (e.g. 100, 250, 500)
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Reply deadline for external strategies, in milliseconds
    #[arg(long)]
    move_timeout_ms: Option<u64>,

    /// Seed for a reproducible schedule
    #[arg(short, long)]
    seed: Option<u64>,

    /// Match order shuffle: uniform or legacy
    #[arg(long)]
    shuffle: Option<ShufflePolicy>,
}

impl Args {
    fn into_config(self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::load(path)
                .with_context(|| format!("could not load configuration from {}", path.display()))?,
            None => ArenaConfig::default(),
        };
        if let Some(dir) = self.players_dir {
            config.players_dir = dir;
        }
        if let Some(turns) = self.turns {
            config.turns_per_match = turns;
        }
        if let Some(points) = self.points_per_win {
            config.points_per_win = points;
        }
        if let Some(delay) = self.delay_ms {
            config.tick_interval_ms = delay;
        }
        if let Some(timeout) = self.move_timeout_ms {
            config.move_timeout_ms = timeout;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(shuffle) = self.shuffle {
            config.shuffle = shuffle;
        }
        config.validate().context("invalid command line")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    let tick = config.tick_interval();
    let mut arena = Arena::new(config);
    arena
        .start_tournament()
        .context("could not load the competitors")?;

    while let Some(report) = arena.advance_turn()? {
        if report.result.turn == 0 {
            println!(
                "{},{}",
                arena.player_name(report.players.a).unwrap_or("?"),
                arena.player_name(report.players.b).unwrap_or("?")
            );
        }
        println!("{}", report.result.record);
        if !tick.is_zero() {
            thread::sleep(tick);
        }
    }

    println!();
    for (rank, standing) in arena.leaderboard().iter().enumerate() {
        println!("{:>3}. {} {}", rank + 1, standing.name, standing.score);
    }
    Ok(())
}
