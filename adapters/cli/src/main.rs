#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Tower Fusion simulation headlessly.

mod autopilot;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tower_fusion_core::{Command, EnemyKind, Event, HudSnapshot, TowerSnapshot};
use tower_fusion_system_update::{TickReport, UpdateSystem};
use tower_fusion_world::{apply, query, EventLog, World, WorldConfig};

use crate::autopilot::Autopilot;

/// Command-line arguments accepted by the `tower-fusion` binary.
#[derive(Parser, Debug)]
#[command(name = "tower-fusion")]
#[command(about = "Run the Tower Fusion simulation without a window")]
struct Cli {
    /// Seed for maze generation and spawns; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// TOML file with world settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Game speed multiplier, clamped to 0.25-4.0.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
    /// Build and fuse towers automatically between waves.
    #[arg(long)]
    autobuild: bool,
    /// Print the final summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Totals accumulated over a run.
#[derive(Debug, Default, Serialize)]
struct Totals {
    frames: u64,
    spawned: u32,
    shots: usize,
    kills: u32,
    fast_kills: u32,
    leaks: u32,
    rejected_commands: u32,
}

impl Totals {
    fn record(&mut self, report: &TickReport) {
        self.frames += 1;
        self.spawned += report.spawned;
        self.shots += report.shots;
        self.kills += report.kills;
        self.leaks += report.leaks;
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyDied {
                    kind: EnemyKind::Fast,
                    ..
                } => self.fast_kills += 1,
                Event::PlacementRejected { .. } | Event::FusionRejected { .. } => {
                    self.rejected_commands += 1;
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    hud: HudSnapshot,
    totals: Totals,
    towers: Vec<TowerSnapshot>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let summary = run(&cli, config);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn run(cli: &Cli, config: WorldConfig) -> Summary {
    let mut world = World::new(config, EventLog::new());
    let mut events = Vec::new();
    apply(&mut world, Command::SetGameSpeed { speed: cli.speed }, &mut events);

    let dt = Duration::from_secs_f64(1.0 / f64::from(cli.fps));
    let mut system = UpdateSystem::new();
    let mut autopilot = Autopilot::default();
    let mut commands = Vec::new();
    let mut totals = Totals::default();

    for _ in 0..cli.frames {
        if cli.autobuild {
            autopilot.plan(&world, &mut commands);
            for command in commands.drain(..) {
                apply(&mut world, command, &mut events);
            }
        }

        let report = system.update(&mut world, dt);
        totals.record(&report);
        if let Some(plan) = report.wave_started {
            log::info!("wave {} begins with {} enemies", plan.wave, plan.enemy_count);
        }

        events.append(&mut world.observer_mut().drain());
        totals.observe(&events);
        events.clear();

        if world.is_game_over() {
            log::info!("game over after {} frames", totals.frames);
            break;
        }
    }

    Summary {
        hud: query::hud(&world),
        totals,
        towers: query::towers(&world),
    }
}

fn print_summary(summary: &Summary) {
    let hud = &summary.hud;
    let totals = &summary.totals;
    println!(
        "wave {} | gold {} | lives {}{}",
        hud.wave,
        hud.gold,
        hud.lives,
        if hud.game_over { " | game over" } else { "" }
    );
    println!(
        "{} frames, {} spawned, {} killed ({} fast), {} leaked, {} shots",
        totals.frames, totals.spawned, totals.kills, totals.fast_kills, totals.leaks, totals.shots
    );
    for tower in &summary.towers {
        println!(
            "  {:?} level {} at ({}, {})",
            tower.kind,
            tower.level,
            tower.cell.column(),
            tower.cell.row()
        );
    }
    if !hud.status.is_empty() {
        println!("status: {}", hud.status);
    }
}
