use std::io;
use std::path::PathBuf;

use arena_shooter_server::config::normalize_bot_count;
use arena_shooter_server::constants::TICK_MS;
use arena_shooter_server::engine::{GameEngine, GameEngineOptions, MatchStats};
use arena_shooter_server::logging::init_tracing;
use arena_shooter_server::types::{ScoreEntry, ServerEvent};
use arena_shooter_server::world::StaticWorld;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

/// Runs a bot-only match without any network layer and prints a JSON
/// summary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 8)]
    bots: usize,
    #[arg(long, default_value_t = 60)]
    seconds: u64,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
    #[arg(long, default_value_t = 5)]
    top: usize,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u32,
    bots: usize,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    stats: MatchStats,
    #[serde(rename = "killFeed")]
    kill_feed: usize,
    #[serde(rename = "liveBots")]
    live_bots: usize,
    #[serde(rename = "topScorers")]
    top_scorers: Vec<ScoreEntry>,
    anomalies: Vec<String>,
}

fn main() -> io::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let bots = normalize_bot_count(cli.bots);
    let tick_ms = cli.tick_ms.max(1);

    let summary = run_match(seed, bots, cli.seconds * 1_000, tick_ms, cli.top);
    for anomaly in &summary.anomalies {
        warn!(%anomaly, "anomaly");
    }
    info!(
        seed,
        ticks = summary.ticks,
        kills = summary.stats.kills,
        shots = summary.stats.shots_fired,
        "simulation finished"
    );

    let rendered = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
    if let Some(path) = cli.summary_out {
        std::fs::write(&path, &rendered)?;
        info!(path = %path.display(), "summary written");
    }
    println!("{rendered}");
    Ok(())
}

fn run_match(seed: u32, bots: usize, duration_ms: u64, tick_ms: u64, top: usize) -> Summary {
    let mut game = GameEngine::new(
        GameEngineOptions {
            bot_target: bots,
            world: StaticWorld::default(),
        },
        seed,
    );

    let mut kill_feed = 0;
    let mut anomalies = Vec::new();
    while game.now_ms() < duration_ms {
        game.step(tick_ms);
        for outbound in game.drain_events() {
            if matches!(outbound.event, ServerEvent::PlayerKilled { .. }) {
                kill_feed += 1;
            }
        }
        check_invariants(&game, &mut anomalies);
    }

    let mut top_scorers = game.scoreboard();
    top_scorers.truncate(top);
    Summary {
        seed: game.seed(),
        bots,
        duration_ms: game.now_ms(),
        ticks: game.tick(),
        stats: game.stats().clone(),
        kill_feed,
        live_bots: game.bot_count(),
        top_scorers,
        anomalies,
    }
}

fn check_invariants(game: &GameEngine, anomalies: &mut Vec<String>) {
    for player in game.players() {
        if player.health <= 0 {
            anomalies.push(format!(
                "tick {}: {} is in the arena with {} health",
                game.tick(),
                player.id,
                player.health
            ));
        }
        if player.health > player.max_health {
            anomalies.push(format!(
                "tick {}: {} health {} above max",
                game.tick(),
                player.id,
                player.health
            ));
        }
        if game.world.is_out_of_bounds(player.x, player.y) {
            anomalies.push(format!(
                "tick {}: {} left the arena at ({}, {})",
                game.tick(),
                player.id,
                player.x,
                player.y
            ));
        }
    }
}
