#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick orchestration of the Tower Fusion simulation.
//!
//! A tick advances wave scheduling, lets towers fire, then moves enemies and
//! settles kills and leaks. Paused or finished worlds are left untouched.

use std::time::Duration;

use tower_fusion_system_movement::Movement;
use tower_fusion_system_tower_combat::TowerCombat;
use tower_fusion_world::{CombatObserver, WavePlan, World};

/// Summary of what happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Simulated seconds after applying the game speed; zero when halted.
    pub simulated: f32,
    /// Enemies spawned by the wave scheduler.
    pub spawned: u32,
    /// Wave started by the intermission countdown, if any.
    pub wave_started: Option<WavePlan>,
    /// Shots fired by towers.
    pub shots: usize,
    /// Enemies killed.
    pub kills: u32,
    /// Enemies that reached the end of the path.
    pub leaks: u32,
}

/// Runs the tick pipeline against a world.
#[derive(Debug, Default)]
pub struct UpdateSystem {
    combat: TowerCombat,
    movement: Movement,
}

impl UpdateSystem {
    /// Creates an update system with fresh sub-systems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the world by `dt` of wall-clock time scaled by the game speed.
    pub fn update<O>(&mut self, world: &mut World<O>, dt: Duration) -> TickReport
    where
        O: CombatObserver,
    {
        if world.is_halted() {
            return TickReport::default();
        }

        let dt = dt.as_secs_f32() * world.game_speed();
        let waves = world.advance_waves(dt);

        let mut frame = world.combat_frame();
        let shots = self
            .combat
            .handle(frame.towers, frame.enemies, frame.observer, dt);
        let settled = self
            .movement
            .handle(frame.enemies, &mut frame.ledger, frame.observer, dt);

        TickReport {
            simulated: dt,
            spawned: waves.spawns,
            wave_started: waves.started,
            shots,
            kills: settled.kills,
            leaks: settled.leaks,
        }
    }

    /// Shots fired over the lifetime of the system.
    #[must_use]
    pub const fn shots_fired(&self) -> u64 {
        self.combat.shots_fired()
    }
}
