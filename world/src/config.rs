//! Tuning knobs for a world instance.

use serde::Deserialize;
use tower_fusion_core::{ConfigError, TowerCatalog, Viewport};

/// Parameters used to build and rebuild a [`crate::World`].
///
/// Every field has a default, so a partial TOML document is enough.
/// Deserialized documents are checked with [`WorldConfig::validate`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawWorldConfig")]
pub struct WorldConfig {
    /// Screen rectangle the maze and placement bounds derive from.
    pub viewport: Viewport,
    /// Side length of a grid cell in world units.
    pub tile_size: f32,
    /// Gold available when the world starts.
    pub starting_gold: u32,
    /// Lives available when the world starts.
    pub starting_lives: u32,
    /// Seconds before the first wave begins.
    pub first_wave_delay: f32,
    /// Seconds between the end of one wave and the start of the next.
    pub intermission: f32,
    /// Gold granted per kill.
    pub kill_reward: u32,
    /// Probability that a spawned enemy is the fast variant.
    pub fast_enemy_chance: f64,
    /// Seed for the world's random source; entropy is used when absent.
    pub seed: Option<u64>,
    /// Buildable tower kinds in build-cycle order.
    pub catalog: TowerCatalog,
}

impl WorldConfig {
    /// Rejects settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::TileSize(self.tile_size));
        }
        let Viewport {
            left,
            bottom,
            width,
            height,
        } = self.viewport;
        let extent_ok = width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0;
        if !(extent_ok && left.is_finite() && bottom.is_finite()) {
            return Err(ConfigError::Viewport);
        }
        for (name, value) in [
            ("first_wave_delay", self.first_wave_delay),
            ("intermission", self.intermission),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::WaveDelay { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.fast_enemy_chance) {
            return Err(ConfigError::FastEnemyChance(self.fast_enemy_chance));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            tile_size: 48.0,
            starting_gold: 150,
            starting_lives: 20,
            first_wave_delay: 3.0,
            intermission: 9.0,
            kill_reward: 10,
            fast_enemy_chance: 0.3,
            seed: None,
            catalog: TowerCatalog::standard(),
        }
    }
}

/// Unchecked document shape; missing keys take the [`WorldConfig`] defaults.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawWorldConfig {
    viewport: Viewport,
    tile_size: f32,
    starting_gold: u32,
    starting_lives: u32,
    first_wave_delay: f32,
    intermission: f32,
    kill_reward: u32,
    fast_enemy_chance: f64,
    seed: Option<u64>,
    catalog: TowerCatalog,
}

impl Default for RawWorldConfig {
    fn default() -> Self {
        let WorldConfig {
            viewport,
            tile_size,
            starting_gold,
            starting_lives,
            first_wave_delay,
            intermission,
            kill_reward,
            fast_enemy_chance,
            seed,
            catalog,
        } = WorldConfig::default();
        Self {
            viewport,
            tile_size,
            starting_gold,
            starting_lives,
            first_wave_delay,
            intermission,
            kill_reward,
            fast_enemy_chance,
            seed,
            catalog,
        }
    }
}

impl TryFrom<RawWorldConfig> for WorldConfig {
    type Error = ConfigError;

    fn try_from(raw: RawWorldConfig) -> Result<Self, Self::Error> {
        let config = Self {
            viewport: raw.viewport,
            tile_size: raw.tile_size,
            starting_gold: raw.starting_gold,
            starting_lives: raw.starting_lives,
            first_wave_delay: raw.first_wave_delay,
            intermission: raw.intermission,
            kill_reward: raw.kill_reward,
            fast_enemy_chance: raw.fast_enemy_chance,
            seed: raw.seed,
            catalog: raw.catalog,
        };
        config.validate()?;
        Ok(config)
    }
}
