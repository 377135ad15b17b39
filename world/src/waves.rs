//! Wave progression: spawn sequencing during a wave and the intermission countdown.

const SPAWN_INTERVAL_FLOOR: f32 = 0.28;

/// Enemy parameters derived from a wave number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePlan {
    /// One-based wave number.
    pub wave: u32,
    /// Enemies emitted over the course of the wave.
    pub enemy_count: u32,
    /// Health of a normal enemy.
    pub base_health: f32,
    /// Speed of a normal enemy in world units per second.
    pub base_speed: f32,
    /// Seconds between consecutive spawns.
    pub spawn_interval: f32,
}

impl WavePlan {
    /// Derives the plan for the provided one-based wave number.
    #[must_use]
    pub fn for_wave(wave: u32) -> Self {
        let w = wave as f32;
        Self {
            wave,
            enemy_count: 8 + 2 * wave,
            base_health: 50.0 + 15.0 * (w - 1.0),
            base_speed: 60.0 + 4.0 * w,
            spawn_interval: (0.62 - 0.03 * w).max(SPAWN_INTERVAL_FLOOR),
        }
    }
}

/// What a call to [`WaveScheduler::advance`] asks the world to do.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveTick {
    /// Enemies to emit this tick using [`WaveScheduler::plan`].
    pub spawns: u32,
    /// Wave started by the intermission countdown expiring.
    pub started: Option<WavePlan>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WaveScheduler {
    plan: Option<WavePlan>,
    wave_number: u32,
    enemies_to_spawn: u32,
    spawn_timer: f32,
    countdown: f32,
    time_to_next_wave: f32,
    intermission: f32,
}

impl WaveScheduler {
    pub(crate) fn new(first_wave_delay: f32, intermission: f32) -> Self {
        Self {
            plan: None,
            wave_number: 0,
            enemies_to_spawn: 0,
            spawn_timer: 0.0,
            countdown: first_wave_delay,
            time_to_next_wave: first_wave_delay.max(0.0),
            intermission,
        }
    }

    pub(crate) fn start_next_wave(&mut self) -> WavePlan {
        self.wave_number += 1;
        let plan = WavePlan::for_wave(self.wave_number);
        self.plan = Some(plan);
        self.enemies_to_spawn = plan.enemy_count;
        self.spawn_timer = 0.0;
        self.countdown = self.intermission;
        self.time_to_next_wave = 0.0;
        plan
    }

    /// Spawns while enemies are pending; otherwise counts the intermission
    /// down once the field is clear.
    pub(crate) fn advance(&mut self, dt: f32, field_is_clear: bool) -> WaveTick {
        let mut tick = WaveTick::default();
        if self.enemies_to_spawn > 0 {
            let interval = self
                .plan
                .map_or(SPAWN_INTERVAL_FLOOR, |plan| plan.spawn_interval);
            self.spawn_timer += dt;
            while self.enemies_to_spawn > 0 && self.spawn_timer >= interval {
                self.spawn_timer -= interval;
                self.enemies_to_spawn -= 1;
                tick.spawns += 1;
            }
        } else if field_is_clear {
            self.countdown -= dt;
            self.time_to_next_wave = self.countdown.max(0.0);
            if self.countdown <= 0.0 {
                tick.started = Some(self.start_next_wave());
            }
        }
        tick
    }

    pub(crate) const fn plan(&self) -> Option<WavePlan> {
        self.plan
    }

    pub(crate) const fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub(crate) const fn enemies_to_spawn(&self) -> u32 {
        self.enemies_to_spawn
    }

    pub(crate) const fn time_to_next_wave(&self) -> f32 {
        self.time_to_next_wave
    }
}
