#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Tower Fusion.
//!
//! The world owns the generated path, every live enemy and tower, the economy
//! and the wave scheduler. Adapters mutate it through the command methods (or
//! [`apply`]) between ticks; the per-tick systems borrow it through
//! [`World::combat_frame`].

mod config;
mod enemy;
mod observer;
mod tower;
mod waves;

use std::{collections::BTreeSet, sync::Arc};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_fusion_core::{
    CatalogEntry, CellCoord, Command, EnemyId, EnemyKind, Event, FusionError, PlacementError,
    TowerId, TowerKind, TowerStats, Viewport,
};
use tower_fusion_system_maze::{generate_path, GeneratedPath, GridSize};

pub use config::WorldConfig;
pub use enemy::{Enemy, EnemyStatus};
pub use observer::{CombatObserver, EventLog, NullObserver};
pub use tower::Tower;
pub use waves::{WavePlan, WaveTick};

use waves::WaveScheduler;

/// Slowest permitted time-scale multiplier.
pub const MIN_GAME_SPEED: f32 = 0.25;

/// Fastest permitted time-scale multiplier.
pub const MAX_GAME_SPEED: f32 = 4.0;

const GAME_OVER_STATUS: &str = "Game over.";

/// Gold and lives held by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Economy {
    gold: u32,
    lives: u32,
}

impl Economy {
    /// Gold available for building.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Lives left before the game ends.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }
}

/// Complete mutable simulation state of a world.
///
/// Exposed so callers can snapshot and compare it wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldState {
    viewport: Viewport,
    tile_size: f32,
    grid: GridSize,
    path: Vec<CellCoord>,
    waypoints: Arc<[Vec2]>,
    blocked: BTreeSet<CellCoord>,
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    economy: Economy,
    waves: WaveScheduler,
    paused: bool,
    status: String,
    selected: Option<TowerId>,
    build: CatalogEntry,
    game_speed: f32,
    next_enemy_id: u32,
    next_tower_id: u32,
}

impl WorldState {
    fn generate<R: Rng + ?Sized>(
        config: &WorldConfig,
        viewport: Viewport,
        rng: &mut R,
        next_enemy_id: u32,
        next_tower_id: u32,
    ) -> Self {
        let GeneratedPath {
            size,
            cells,
            waypoints,
        } = generate_path(config.tile_size, &viewport, rng);
        log::debug!(
            "generated a {}-cell path on a {}x{} maze",
            cells.len(),
            size.columns(),
            size.rows()
        );

        Self {
            viewport,
            tile_size: config.tile_size,
            grid: size,
            blocked: cells.iter().copied().collect(),
            path: cells,
            waypoints: waypoints
                .iter()
                .map(|point| Vec2::new(point.x, point.y))
                .collect(),
            enemies: Vec::new(),
            towers: Vec::new(),
            economy: Economy {
                gold: config.starting_gold,
                lives: config.starting_lives,
            },
            waves: WaveScheduler::new(config.first_wave_delay, config.intermission),
            paused: false,
            status: String::new(),
            selected: None,
            build: config.catalog.first_entry(),
            game_speed: 1.0,
            next_enemy_id,
            next_tower_id,
        }
    }
}

/// Outcome of [`World::select_tower_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The tower under the cell is now selected.
    Selected(TowerId),
    /// The cell held no tower, so nothing is selected.
    Cleared,
    /// The previously selected tower fused with the clicked one.
    Fused {
        /// Tower that was selected before the click.
        first: TowerId,
        /// Tower that was clicked.
        second: TowerId,
        /// Tower produced by the fusion.
        tower: TowerId,
    },
    /// Fusion was attempted and rejected; the clicked tower is now selected.
    FusionRejected {
        /// Tower that was selected before the click.
        first: TowerId,
        /// Tower that was clicked.
        second: TowerId,
        /// Specific reason the fusion failed.
        reason: FusionError,
    },
}

/// Mutable view over the parts of a world touched by a combat tick.
#[derive(Debug)]
pub struct CombatFrame<'a, O> {
    /// Towers in placement order.
    pub towers: &'a mut [Tower],
    /// Live enemies in spawn order.
    pub enemies: &'a mut Vec<Enemy>,
    /// Economy bookkeeping for kills and leaks.
    pub ledger: Ledger<'a>,
    /// Observer notified of shots and deaths.
    pub observer: &'a mut O,
}

/// Applies kill rewards and leaks to the world's economy.
#[derive(Debug)]
pub struct Ledger<'a> {
    economy: &'a mut Economy,
    status: &'a mut String,
    kill_reward: u32,
}

impl Ledger<'_> {
    /// Grants the configured reward for a kill.
    pub fn reward_kill(&mut self) {
        self.economy.gold = self.economy.gold.saturating_add(self.kill_reward);
    }

    /// Removes a life for an enemy that reached the end of the path.
    pub fn record_leak(&mut self) {
        if self.economy.lives == 0 {
            return;
        }
        self.economy.lives -= 1;
        if self.economy.lives == 0 {
            *self.status = GAME_OVER_STATUS.to_owned();
            log::info!("game over");
        }
    }

    /// Current gold and lives.
    #[must_use]
    pub const fn economy(&self) -> Economy {
        *self.economy
    }
}

/// Represents the authoritative Tower Fusion world state.
#[derive(Debug)]
pub struct World<O = NullObserver> {
    config: WorldConfig,
    rng: ChaCha8Rng,
    observer: O,
    state: WorldState,
}

impl<O> World<O> {
    /// Creates a world seeded from the configuration, or from OS entropy when
    /// no seed is configured.
    #[must_use]
    pub fn new(config: WorldConfig, observer: O) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, observer, rng)
    }

    /// Creates a world drawing all randomness from the provided source.
    #[must_use]
    pub fn with_rng(config: WorldConfig, observer: O, mut rng: ChaCha8Rng) -> Self {
        let state = WorldState::generate(&config, config.viewport, &mut rng, 0, 0);
        Self {
            config,
            rng,
            observer,
            state,
        }
    }

    /// Places a level-one tower of the current build type at the cell.
    ///
    /// Checks run in a fixed order: bounds, path, occupancy, gold. A rejection
    /// only updates the status message.
    pub fn place_tower(&mut self, cell: CellCoord) -> Result<TowerId, PlacementError> {
        let stats = match self.validate_placement(cell) {
            Ok(stats) => stats,
            Err(reason) => {
                self.state.status = reason.to_string();
                log::debug!("placement at {cell:?} rejected: {reason}");
                return Err(reason);
            }
        };

        let id = self.allocate_tower_id();
        let centre = self.state.viewport.cell_center(cell, self.state.tile_size);
        let kind = self.state.build.kind;
        self.state.towers.push(Tower::new(
            id,
            kind,
            1,
            cell,
            Vec2::new(centre.x, centre.y),
            stats,
        ));
        self.state.economy.gold -= stats.cost;
        self.state.status.clear();
        log::debug!("placed {} tower {} at {cell:?}", kind.label(), id.get());
        Ok(id)
    }

    fn validate_placement(&self, cell: CellCoord) -> Result<TowerStats, PlacementError> {
        let (max_column, max_row) = self.buildable_limits();
        if cell.column() < 0 || cell.row() < 0 || cell.column() > max_column || cell.row() > max_row
        {
            return Err(PlacementError::OutOfBounds);
        }
        if self.state.blocked.contains(&cell) {
            return Err(PlacementError::Blocked);
        }
        if self.tower_at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let stats = self.state.build.stats();
        let available = self.state.economy.gold;
        if available < stats.cost {
            return Err(PlacementError::InsufficientGold {
                required: stats.cost,
                available,
            });
        }
        Ok(stats)
    }

    /// Fuses two towers into one of the next level on `second`'s cell.
    pub fn try_fuse(&mut self, first: TowerId, second: TowerId) -> Result<TowerId, FusionError> {
        let result = self.fuse(first, second);
        if let Err(reason) = result {
            self.state.status = reason.to_string();
            log::debug!(
                "fusion of {} and {} rejected: {reason}",
                first.get(),
                second.get()
            );
        }
        result
    }

    fn fuse(&mut self, first: TowerId, second: TowerId) -> Result<TowerId, FusionError> {
        let a = self
            .tower_index(first)
            .ok_or(FusionError::UnknownTower(first))?;
        let b = self
            .tower_index(second)
            .ok_or(FusionError::UnknownTower(second))?;
        if a == b {
            return Err(FusionError::SameTower);
        }
        if !self.state.towers[a].mergeable(&self.state.towers[b]) {
            return Err(FusionError::NotMergeable);
        }

        let id = self.allocate_tower_id();
        let fused = self.state.towers[a].fused_with(&self.state.towers[b], id);
        self.state
            .towers
            .retain(|tower| tower.id() != first && tower.id() != second);
        if matches!(self.state.selected, Some(selected) if selected == first || selected == second)
        {
            self.state.selected = None;
        }
        self.state.status = format!("Fused into {} level {}.", fused.kind().label(), fused.level());
        log::debug!(
            "fused towers {} and {} into {} level {}",
            first.get(),
            second.get(),
            fused.kind().label(),
            fused.level()
        );
        self.state.towers.push(fused);
        Ok(id)
    }

    /// Handles a click on a grid cell in selection mode.
    ///
    /// Clicking a second tower while another is selected attempts to fuse the
    /// selected tower into the clicked one.
    pub fn select_tower_at(&mut self, cell: CellCoord) -> Selection {
        let Some(clicked) = self.tower_at(cell).map(Tower::id) else {
            self.state.selected = None;
            return Selection::Cleared;
        };

        match self.state.selected {
            Some(current) if current != clicked => match self.try_fuse(current, clicked) {
                Ok(tower) => Selection::Fused {
                    first: current,
                    second: clicked,
                    tower,
                },
                Err(reason) => {
                    self.state.selected = Some(clicked);
                    Selection::FusionRejected {
                        first: current,
                        second: clicked,
                        reason,
                    }
                }
            },
            _ => {
                self.state.selected = Some(clicked);
                Selection::Selected(clicked)
            }
        }
    }

    /// Drops the current selection.
    pub fn clear_selection(&mut self) {
        self.state.selected = None;
    }

    /// Advances the build type to the next catalog entry, wrapping around.
    pub fn cycle_tower_type(&mut self) -> TowerKind {
        self.state.build = self.config.catalog.next_entry(self.state.build.kind);
        self.state.build.kind
    }

    /// Starts the next wave immediately and restarts the intermission timer.
    pub fn start_next_wave(&mut self) -> WavePlan {
        let plan = self.state.waves.start_next_wave();
        log::debug!(
            "wave {} started: {} enemies, {} health, {} speed",
            plan.wave,
            plan.enemy_count,
            plan.base_health,
            plan.base_speed
        );
        plan
    }

    /// Advances spawn sequencing and the intermission countdown by `dt` seconds.
    pub fn advance_waves(&mut self, dt: f32) -> WaveTick {
        let field_is_clear = self.state.enemies.is_empty();
        let tick = self.state.waves.advance(dt, field_is_clear);
        if let Some(plan) = tick.started {
            log::debug!(
                "intermission over, wave {} started with {} enemies",
                plan.wave,
                plan.enemy_count
            );
        }
        for _ in 0..tick.spawns {
            self.spawn_enemy();
        }
        tick
    }

    fn spawn_enemy(&mut self) {
        let Some(plan) = self.state.waves.plan() else {
            return;
        };
        let kind = if self.rng.gen::<f64>() < self.config.fast_enemy_chance {
            EnemyKind::Fast
        } else {
            EnemyKind::Normal
        };
        let id = EnemyId::new(self.state.next_enemy_id);
        self.state.next_enemy_id = self.state.next_enemy_id.wrapping_add(1);

        self.state.enemies.push(Enemy::spawn(
            id,
            kind,
            plan.base_health * kind.health_scale(),
            plan.base_speed * kind.speed_scale(),
            Arc::clone(&self.state.waypoints),
        ));
        log::debug!("spawned {kind:?} enemy {} in wave {}", id.get(), plan.wave);
    }

    /// Suspends ticking.
    pub fn pause(&mut self) {
        self.state.paused = true;
    }

    /// Resumes ticking.
    pub fn resume(&mut self) {
        self.state.paused = false;
    }

    /// Rebuilds the world around a freshly generated maze.
    ///
    /// The observer, random source and current viewport carry over, and
    /// identifiers keep counting from where they were.
    pub fn reset(&mut self) {
        let viewport = self.state.viewport;
        let next_enemy_id = self.state.next_enemy_id;
        let next_tower_id = self.state.next_tower_id;
        self.state = WorldState::generate(
            &self.config,
            viewport,
            &mut self.rng,
            next_enemy_id,
            next_tower_id,
        );
        log::info!("world reset with a {}-cell path", self.state.path.len());
    }

    /// Sets the time-scale multiplier, returning the clamped value in effect.
    pub fn set_game_speed(&mut self, speed: f32) -> f32 {
        if !speed.is_nan() {
            self.state.game_speed = speed.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
        }
        self.state.game_speed
    }

    /// Replaces the viewport used for placement bounds and cell centres.
    ///
    /// The path keeps its layout until the next [`World::reset`].
    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
        log::debug!(
            "viewport resized to {}x{}",
            viewport.width,
            viewport.height
        );
    }

    /// Splits the world into the pieces a combat tick mutates.
    pub fn combat_frame(&mut self) -> CombatFrame<'_, O> {
        CombatFrame {
            towers: &mut self.state.towers,
            enemies: &mut self.state.enemies,
            ledger: Ledger {
                economy: &mut self.state.economy,
                status: &mut self.state.status,
                kill_reward: self.config.kill_reward,
            },
            observer: &mut self.observer,
        }
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.state.next_tower_id);
        self.state.next_tower_id = self.state.next_tower_id.wrapping_add(1);
        id
    }

    fn tower_index(&self, id: TowerId) -> Option<usize> {
        self.state.towers.iter().position(|tower| tower.id() == id)
    }

    /// Whether ticks are currently no-ops because of pause or game over.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state.paused || self.is_game_over()
    }

    /// Whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.economy.lives == 0
    }

    /// Whether the world is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Inclusive upper column and row bounds of the buildable area.
    #[must_use]
    pub fn buildable_limits(&self) -> (i32, i32) {
        let tile = self.state.tile_size;
        if !(tile > 0.0) {
            return (-1, -1);
        }
        let columns = (self.state.viewport.buildable_width() / tile).floor() as i32;
        let rows = (self.state.viewport.height / tile).floor() as i32;
        (columns - 1, rows - 1)
    }

    /// Tower occupying the cell, if any.
    #[must_use]
    pub fn tower_at(&self, cell: CellCoord) -> Option<&Tower> {
        self.state.towers.iter().find(|tower| tower.cell() == cell)
    }

    /// Tower with the provided identifier, if it still exists.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.state.towers.iter().find(|tower| tower.id() == id)
    }

    /// Towers in placement order.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.state.towers
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.state.enemies
    }

    /// Whether the cell is part of the enemy path.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.state.blocked.contains(&cell)
    }

    /// Path cells from the left edge to the right edge.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.state.path
    }

    /// Waypoints shared by every enemy, in world units.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.state.waypoints
    }

    /// Dimensions of the maze the path was carved from.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        self.state.grid
    }

    /// Gold available for building.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.state.economy.gold
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.state.economy.lives
    }

    /// Current wave number; zero before the first wave.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        self.state.waves.wave_number()
    }

    /// Enemies still to be emitted in the current wave.
    #[must_use]
    pub fn enemies_to_spawn(&self) -> u32 {
        self.state.waves.enemies_to_spawn()
    }

    /// Seconds until the next wave, floored at zero.
    #[must_use]
    pub fn time_to_next_wave(&self) -> f32 {
        self.state.waves.time_to_next_wave()
    }

    /// Human-readable status message; empty when there is nothing to report.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.state.status
    }

    /// Kind the next placement builds.
    #[must_use]
    pub fn build_kind(&self) -> TowerKind {
        self.state.build.kind
    }

    /// Currently selected tower.
    #[must_use]
    pub fn selected_tower(&self) -> Option<TowerId> {
        self.state.selected
    }

    /// Active time-scale multiplier.
    #[must_use]
    pub fn game_speed(&self) -> f32 {
        self.state.game_speed
    }

    /// Viewport used for placement bounds.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Complete simulation state.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Observer receiving combat notifications.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer, for draining recorded events.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

/// Applies the provided command to the world, reporting the outcome as events.
pub fn apply<O>(world: &mut World<O>, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { cell } => match world.place_tower(cell) {
            Ok(tower) => out_events.push(Event::TowerPlaced {
                tower,
                kind: world.build_kind(),
                cell,
            }),
            Err(reason) => out_events.push(Event::PlacementRejected { cell, reason }),
        },
        Command::FuseTowers { first, second } => {
            let result = world.try_fuse(first, second);
            push_fusion(world, first, second, result, out_events);
        }
        Command::SelectTower { cell } => match world.select_tower_at(cell) {
            Selection::Selected(tower) => out_events.push(Event::SelectionChanged {
                tower: Some(tower),
            }),
            Selection::Cleared => out_events.push(Event::SelectionChanged { tower: None }),
            Selection::Fused {
                first,
                second,
                tower,
            } => {
                push_fusion(world, first, second, Ok(tower), out_events);
                out_events.push(Event::SelectionChanged { tower: None });
            }
            Selection::FusionRejected {
                first,
                second,
                reason,
            } => {
                push_fusion(world, first, second, Err(reason), out_events);
                out_events.push(Event::SelectionChanged {
                    tower: Some(second),
                });
            }
        },
        Command::ClearSelection => {
            world.clear_selection();
            out_events.push(Event::SelectionChanged { tower: None });
        }
        Command::CycleTowerType => {
            let kind = world.cycle_tower_type();
            out_events.push(Event::BuildKindChanged { kind });
        }
        Command::StartNextWave => {
            let plan = world.start_next_wave();
            out_events.push(Event::WaveStarted {
                wave: plan.wave,
                enemy_count: plan.enemy_count,
            });
        }
        Command::Pause => {
            world.pause();
            out_events.push(Event::PauseChanged { paused: true });
        }
        Command::Resume => {
            world.resume();
            out_events.push(Event::PauseChanged { paused: false });
        }
        Command::Reset => {
            world.reset();
            out_events.push(Event::WorldReset);
        }
        Command::SetGameSpeed { speed } => {
            let speed = world.set_game_speed(speed);
            out_events.push(Event::GameSpeedChanged { speed });
        }
        Command::ResizeViewport { viewport } => {
            world.resize_viewport(viewport);
            out_events.push(Event::ViewportResized { viewport });
        }
    }
}

fn push_fusion<O>(
    world: &World<O>,
    first: TowerId,
    second: TowerId,
    result: Result<TowerId, FusionError>,
    out_events: &mut Vec<Event>,
) {
    match result {
        Ok(tower) => {
            if let Some(fused) = world.tower(tower) {
                out_events.push(Event::TowersFused {
                    consumed: [first, second],
                    tower,
                    kind: fused.kind(),
                    level: fused.level(),
                });
            }
        }
        Err(reason) => out_events.push(Event::FusionRejected {
            first,
            second,
            reason,
        }),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_fusion_core::{EnemySnapshot, HudSnapshot, TowerSnapshot};

    use super::World;

    /// Captures the values a heads-up display shows.
    #[must_use]
    pub fn hud<O>(world: &World<O>) -> HudSnapshot {
        HudSnapshot {
            gold: world.gold(),
            lives: world.lives(),
            wave: world.wave_number(),
            status: world.status_text().to_owned(),
            time_to_next_wave: world.time_to_next_wave(),
            build_kind: world.build_kind(),
            selected: world.selected_tower(),
            paused: world.is_paused(),
            game_over: world.is_game_over(),
            game_speed: world.game_speed(),
        }
    }

    /// Snapshots of every live enemy in spawn order.
    #[must_use]
    pub fn enemies<O>(world: &World<O>) -> Vec<EnemySnapshot> {
        world.enemies().iter().map(|enemy| enemy.snapshot()).collect()
    }

    /// Snapshots of every tower in placement order.
    #[must_use]
    pub fn towers<O>(world: &World<O>) -> Vec<TowerSnapshot> {
        world.towers().iter().map(|tower| tower.snapshot()).collect()
    }
}
