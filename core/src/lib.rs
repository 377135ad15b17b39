#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Fusion engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and the per-tick systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes them through its
//! `apply` entry point and reports the outcome as [`Event`] values. Read-only
//! snapshots ([`HudSnapshot`], [`EnemySnapshot`], [`TowerSnapshot`]) are the
//! only state adapters are expected to render from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest level a tower can reach through fusion.
pub const MAX_TOWER_LEVEL: u8 = 20;

/// Fractional damage gained per level above the first.
pub const DAMAGE_GROWTH_PER_LEVEL: f32 = 0.15;

/// Fractional range gained per level above the first.
pub const RANGE_GROWTH_PER_LEVEL: f32 = 0.05;

/// Fractional fire rate gained per level above the first.
pub const FIRE_RATE_GROWTH_PER_LEVEL: f32 = 0.03;

/// Share of the viewport width, measured from the left edge, used by the maze.
///
/// The remaining strip on the right belongs to the HUD.
pub const BUILDABLE_WIDTH_FRACTION: f32 = 0.75;

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so adapters can forward raw cursor conversions and
/// let the world reject positions left of or below the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Point in world (pixel) space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing upwards from the viewport bottom.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle the simulation is laid out in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in world units.
    pub left: f32,
    /// Bottom edge in world units.
    pub bottom: f32,
    /// Total width including the HUD strip.
    pub width: f32,
    /// Total height.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport from its edges and extent.
    #[must_use]
    pub const fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Width available to the maze and to tower placement.
    #[must_use]
    pub fn buildable_width(&self) -> f32 {
        self.width * BUILDABLE_WIDTH_FRACTION
    }

    /// Pixel centre of the provided cell for a grid of `tile_size` tiles.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord, tile_size: f32) -> WorldPoint {
        WorldPoint::new(
            self.left + cell.column() as f32 * tile_size + tile_size / 2.0,
            self.bottom + cell.row() as f32 * tile_size + tile_size / 2.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 960.0, 720.0)
    }
}

/// Unique identifier assigned to an enemy when it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of towers that can be constructed in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Balanced single-target tower.
    Cannon,
    /// Fast-firing tower with low damage per shot.
    Rapid,
    /// Long-range tower with heavy, slow shots.
    Sniper,
    /// Weak tower whose hits also slow the target down.
    Slow,
}

impl TowerKind {
    /// Every tower kind in canonical catalog order.
    pub const ALL: [TowerKind; 4] = [Self::Cannon, Self::Rapid, Self::Sniper, Self::Slow];

    /// Human-readable name used in status messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cannon => "Cannon",
            Self::Rapid => "Rapid",
            Self::Sniper => "Sniper",
            Self::Slow => "Slow",
        }
    }

    /// Entry for the kind in the built-in catalog.
    #[must_use]
    pub const fn standard_entry(self) -> CatalogEntry {
        let (cost, range, damage, fire_rate) = match self {
            Self::Cannon => (50, 140.0, 15.0, 1.0),
            Self::Rapid => (70, 110.0, 6.0, 3.0),
            Self::Sniper => (100, 260.0, 45.0, 0.4),
            Self::Slow => (60, 120.0, 4.0, 1.2),
        };
        CatalogEntry {
            kind: self,
            cost,
            range,
            damage,
            fire_rate,
        }
    }

    /// Secondary effect applied to the enemy on every hit, if any.
    #[must_use]
    pub const fn on_hit_slow(self) -> Option<SlowEffect> {
        match self {
            Self::Slow => Some(SlowEffect {
                factor: 0.5,
                duration: 1.0,
            }),
            Self::Cannon | Self::Rapid | Self::Sniper => None,
        }
    }
}

/// Movement impairment applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Multiplier applied to the enemy speed, at most `1.0`.
    pub factor: f32,
    /// Seconds the effect lasts.
    pub duration: f32,
}

/// Enemy variants produced by the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Regular enemy using the wave's base stats.
    Normal,
    /// Fragile but quick variant.
    Fast,
}

impl EnemyKind {
    /// Multiplier applied to the wave's base health.
    #[must_use]
    pub const fn health_scale(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Fast => 0.6,
        }
    }

    /// Multiplier applied to the wave's base speed.
    #[must_use]
    pub const fn speed_scale(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Fast => 1.5,
        }
    }
}

/// Combat stats of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Gold required to build a level-one tower.
    pub cost: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage dealt per shot.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
}

impl TowerStats {
    /// Scales base stats to the provided level.
    ///
    /// Each stat grows linearly with the level: `base * (1 + rate * (level - 1))`.
    /// The cost is not scaled.
    #[must_use]
    pub fn at_level(self, level: u8) -> Self {
        let steps = f32::from(level.max(1) - 1);
        Self {
            cost: self.cost,
            range: self.range * (1.0 + RANGE_GROWTH_PER_LEVEL * steps),
            damage: self.damage * (1.0 + DAMAGE_GROWTH_PER_LEVEL * steps),
            fire_rate: self.fire_rate * (1.0 + FIRE_RATE_GROWTH_PER_LEVEL * steps),
        }
    }
}

/// Single entry of the tower catalog.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Kind of tower described by the entry.
    pub kind: TowerKind,
    /// Gold required to build the tower.
    pub cost: u32,
    /// Level-one targeting radius.
    pub range: f32,
    /// Level-one damage per shot.
    pub damage: f32,
    /// Level-one shots per second.
    pub fire_rate: f32,
}

impl CatalogEntry {
    /// Base stats described by the entry.
    #[must_use]
    pub const fn stats(&self) -> TowerStats {
        TowerStats {
            cost: self.cost,
            range: self.range,
            damage: self.damage,
            fire_rate: self.fire_rate,
        }
    }
}

/// Ordered, validated set of buildable towers.
///
/// The order is the order in which the build type cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct TowerCatalog {
    entries: Vec<CatalogEntry>,
}

impl TowerCatalog {
    /// Validates and wraps the provided entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (index, entry) in entries.iter().enumerate() {
            if entries[..index].iter().any(|other| other.kind == entry.kind) {
                return Err(CatalogError::DuplicateKind(entry.kind));
            }
            if !(entry.fire_rate > 0.0) {
                return Err(CatalogError::NonPositiveFireRate(entry.kind));
            }
            if entry.range < 0.0 || entry.damage < 0.0 {
                return Err(CatalogError::NegativeStat(entry.kind));
            }
        }

        Ok(Self { entries })
    }

    /// The built-in catalog shipped with the game.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: TowerKind::ALL
                .iter()
                .map(|kind| kind.standard_entry())
                .collect(),
        }
    }

    /// Entries in cycle order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// First entry of the catalog, used as the initial build type.
    #[must_use]
    pub fn first_entry(&self) -> CatalogEntry {
        self.entries
            .first()
            .copied()
            .unwrap_or_else(|| TowerKind::Cannon.standard_entry())
    }

    /// Kind of the first entry.
    #[must_use]
    pub fn first_kind(&self) -> TowerKind {
        self.first_entry().kind
    }

    /// Base stats of the provided kind, if the catalog lists it.
    #[must_use]
    pub fn stats(&self, kind: TowerKind) -> Option<TowerStats> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(CatalogEntry::stats)
    }

    /// Entry following `current` in cycle order, wrapping around.
    ///
    /// An unlisted kind restarts the cycle at the first entry.
    #[must_use]
    pub fn next_entry(&self, current: TowerKind) -> CatalogEntry {
        match self.entries.iter().position(|entry| entry.kind == current) {
            Some(index) => self.entries[(index + 1) % self.entries.len()],
            None => self.first_entry(),
        }
    }

    /// Kind following `current` in cycle order, wrapping around.
    #[must_use]
    pub fn next_kind(&self, current: TowerKind) -> TowerKind {
        self.next_entry(current).kind
    }
}

impl Default for TowerCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<CatalogEntry>> for TowerCatalog {
    type Error = CatalogError;

    fn try_from(entries: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<TowerCatalog> for Vec<CatalogEntry> {
    fn from(catalog: TowerCatalog) -> Self {
        catalog.entries
    }
}

/// Reasons a tower catalog may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog lists no towers at all.
    #[error("tower catalog must list at least one tower")]
    Empty,
    /// The same kind appears more than once.
    #[error("tower kind {0:?} is listed more than once")]
    DuplicateKind(TowerKind),
    /// A tower would never fire.
    #[error("tower kind {0:?} must have a positive fire rate")]
    NonPositiveFireRate(TowerKind),
    /// A tower has negative range or damage.
    #[error("tower kind {0:?} has a negative range or damage")]
    NegativeStat(TowerKind),
}

/// Reasons a world configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tile size is zero, negative or not a number.
    #[error("tile_size must be a positive finite number, got {0}")]
    TileSize(f32),
    /// Viewport extent is zero, negative or not a number.
    #[error("viewport must have a positive finite width and height")]
    Viewport,
    /// `first_wave_delay` or `intermission` is negative or not a number.
    #[error("{name} must be a non-negative finite number of seconds, got {value}")]
    WaveDelay {
        /// Offending setting.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// Fast enemy chance is not a probability.
    #[error("fast_enemy_chance must lie within 0.0..=1.0, got {0}")]
    FastEnemyChance(f64),
}

/// Reasons a tower placement request may be rejected by the world.
///
/// The display strings double as the status messages shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The cell lies outside the buildable area.
    #[error("Invalid position.")]
    OutOfBounds,
    /// The cell is part of the enemy path.
    #[error("Path is blocked.")]
    Blocked,
    /// Another tower already occupies the cell.
    #[error("Cell is occupied.")]
    Occupied,
    /// The player cannot afford the selected tower.
    #[error("Not enough gold.")]
    InsufficientGold {
        /// Gold the selected tower costs.
        required: u32,
        /// Gold the player holds.
        available: u32,
    },
}

/// Reasons a fusion request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum FusionError {
    /// No tower with the provided identifier exists.
    #[error("No such tower.")]
    UnknownTower(TowerId),
    /// Both identifiers name the same tower.
    #[error("A tower cannot fuse with itself.")]
    SameTower,
    /// The towers differ in kind or level, or are already at the level cap.
    #[error("These towers cannot be fused.")]
    NotMergeable,
}

/// Commands that express all permissible world mutations issued by adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests placement of the current build type at the provided cell.
    PlaceTower {
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests fusion of two towers; the result occupies `second`'s cell.
    FuseTowers {
        /// Tower consumed by the fusion.
        first: TowerId,
        /// Tower whose cell the fused tower occupies.
        second: TowerId,
    },
    /// Selects the tower at the cell, fusing with the current selection when possible.
    SelectTower {
        /// Cell the player clicked.
        cell: CellCoord,
    },
    /// Drops the current tower selection.
    ClearSelection,
    /// Advances the build type to the next catalog entry.
    CycleTowerType,
    /// Starts the next wave immediately.
    StartNextWave,
    /// Suspends the simulation.
    Pause,
    /// Resumes a suspended simulation.
    Resume,
    /// Rebuilds the world with a freshly generated maze.
    Reset,
    /// Changes the time-scale multiplier applied to every tick.
    SetGameSpeed {
        /// Requested multiplier; clamped by the world.
        speed: f32,
    },
    /// Updates the viewport used for placement bounds.
    ResizeViewport {
        /// New viewport rectangle.
        viewport: Viewport,
    },
}

/// Events reported by the world and by the per-tick systems.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of the new tower.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that two towers were fused into a new one.
    TowersFused {
        /// Identifiers of the towers that were removed.
        consumed: [TowerId; 2],
        /// Identifier of the replacement tower.
        tower: TowerId,
        /// Kind of the replacement tower.
        kind: TowerKind,
        /// Level of the replacement tower.
        level: u8,
    },
    /// Reports that a fusion request was rejected.
    FusionRejected {
        /// First tower named in the request.
        first: TowerId,
        /// Second tower named in the request.
        second: TowerId,
        /// Specific reason the fusion failed.
        reason: FusionError,
    },
    /// Announces the currently selected tower.
    SelectionChanged {
        /// Selected tower, if any.
        tower: Option<TowerId>,
    },
    /// Announces the build type now in effect.
    BuildKindChanged {
        /// Kind that future placements will build.
        kind: TowerKind,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Enemies scheduled for the wave.
        enemy_count: u32,
    },
    /// Announces a change of the pause flag.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Announces that the world was rebuilt.
    WorldReset,
    /// Announces the time-scale multiplier now in effect.
    GameSpeedChanged {
        /// Multiplier after clamping.
        speed: f32,
    },
    /// Announces a new viewport.
    ViewportResized {
        /// Viewport now in effect.
        viewport: Viewport,
    },
    /// A tower shot at an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage dealt by the shot.
        damage: f32,
    },
    /// An enemy was killed.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
    },
}

/// Immutable representation of a single enemy used for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnemySnapshot {
    /// Identifier assigned at spawn.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Remaining health as a share of maximum health, clamped to `0.0..=1.0`.
    pub health_fraction: f32,
    /// Whether a slow effect is active.
    pub slowed: bool,
}

/// Immutable representation of a single tower used for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TowerSnapshot {
    /// Identifier assigned by the world.
    pub id: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Fusion level, starting at one.
    pub level: u8,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Pixel centre of the tower.
    pub position: WorldPoint,
    /// Current targeting radius.
    pub range: f32,
    /// Seconds until the tower can fire again.
    pub cooldown: f32,
}

/// Player-facing summary of the world refreshed every frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HudSnapshot {
    /// Currency available for building.
    pub gold: u32,
    /// Remaining lives; the game ends at zero.
    pub lives: u32,
    /// Number of the most recently started wave.
    pub wave: u32,
    /// Status line shown to the player.
    pub status: String,
    /// Seconds until the next wave, floored at zero.
    pub time_to_next_wave: f32,
    /// Kind built by the next placement.
    pub build_kind: TowerKind,
    /// Currently selected tower.
    pub selected: Option<TowerId>,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether the player ran out of lives.
    pub game_over: bool,
    /// Time-scale multiplier.
    pub game_speed: f32,
}
