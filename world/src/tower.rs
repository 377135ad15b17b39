//! Tower state: cooldown bookkeeping and fusion eligibility.

use glam::Vec2;
use tower_fusion_core::{
    CellCoord, TowerId, TowerKind, TowerSnapshot, TowerStats, WorldPoint, MAX_TOWER_LEVEL,
};

/// Tower placed on the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    level: u8,
    cell: CellCoord,
    position: Vec2,
    base: TowerStats,
    stats: TowerStats,
    cooldown: f32,
}

impl Tower {
    /// Creates a tower whose stats are derived from `base` for the provided level.
    #[must_use]
    pub fn new(
        id: TowerId,
        kind: TowerKind,
        level: u8,
        cell: CellCoord,
        position: Vec2,
        base: TowerStats,
    ) -> Self {
        let level = level.clamp(1, MAX_TOWER_LEVEL);
        Self {
            id,
            kind,
            level,
            cell,
            position,
            base,
            stats: base.at_level(level),
            cooldown: 0.0,
        }
    }

    /// Whether the cooldown has elapsed.
    #[must_use]
    pub fn can_shoot(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Counts the cooldown down by `dt` seconds.
    pub fn update_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
    }

    /// Restarts the cooldown after a shot.
    pub fn shoot(&mut self) {
        self.cooldown = 1.0 / self.stats.fire_rate;
    }

    /// Whether the two towers may fuse into one of the next level.
    #[must_use]
    pub fn mergeable(&self, other: &Tower) -> bool {
        self.kind == other.kind && self.level == other.level && self.level < MAX_TOWER_LEVEL
    }

    /// Builds the tower that replaces `self` and `other` after fusion.
    ///
    /// The result sits on `other`'s cell and starts ready to fire.
    #[must_use]
    pub(crate) fn fused_with(&self, other: &Tower, id: TowerId) -> Tower {
        Tower::new(
            id,
            other.kind,
            other.level + 1,
            other.cell,
            other.position,
            other.base,
        )
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Category of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Fusion level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Grid cell the tower occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Centre of the tower's cell in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Combat stats at the tower's current level.
    #[must_use]
    pub const fn stats(&self) -> TowerStats {
        self.stats
    }

    /// Targeting radius in world units.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.stats.range
    }

    /// Damage dealt per shot.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.stats.damage
    }

    /// Seconds until the tower may fire again; zero or negative when ready.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Captures a rendering snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            level: self.level,
            cell: self.cell,
            position: WorldPoint::new(self.position.x, self.position.y),
            range: self.stats.range,
            cooldown: self.cooldown.max(0.0),
        }
    }
}
