//! Data-driven game balance
//!
//! Every number the simulation reads lives here so tests and experiments
//! can swap values without touching gameplay code.

/// Gameplay constants for one session
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    /// Fixed tick period (ms)
    pub tick_ms: u64,
    /// Tap-to-power-up hit radius (game units)
    pub hit_radius: f32,

    // === Combo ===
    /// Combo window with no upgrades (ms)
    pub combo_base_ms: u64,
    /// Extra combo window per combo_mastery level (ms)
    pub combo_per_level_ms: u64,

    // === Power-ups ===
    /// Spawn chance per tick at level 0
    pub power_up_base_chance: f64,
    /// Extra spawn chance per tick per level
    pub power_up_level_chance: f64,
    /// Uncollected power-up lifetime (ms)
    pub power_up_lifetime_ms: u64,
    /// How long a multiplier power-up lasts before the multiplier drops to 1 (ms)
    pub multiplier_duration_ms: u64,
    /// Flat bonus for a points power-up (before multiplier and boost)
    pub points_power_up_bonus: u64,
    /// Power-ups keep this far from the game area edges
    pub spawn_margin: f32,

    // === Boost ===
    /// Boost active duration (ms)
    pub boost_duration_ms: u64,
    /// Cooldown after boost ends (seconds, counted down once per second)
    pub boost_cooldown_secs: u32,

    // === Effects ===
    /// Retained particle cap
    pub max_particles: usize,
    /// Downward acceleration applied per tick
    pub gravity: f32,
    /// Score popup lifetime (ms)
    pub popup_lifetime_ms: u64,
    /// Tap ripple lifetime (ms)
    pub ripple_lifetime_ms: u64,

    // === Sync ===
    /// Auto-save period (ms)
    pub autosave_interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            hit_radius: 40.0,

            combo_base_ms: 1500,
            combo_per_level_ms: 1000,

            power_up_base_chance: 0.003,
            power_up_level_chance: 0.001,
            power_up_lifetime_ms: 5000,
            multiplier_duration_ms: 10_000,
            points_power_up_bonus: 50,
            spawn_margin: 30.0,

            boost_duration_ms: 7000,
            boost_cooldown_secs: 30,

            max_particles: 50,
            gravity: 0.2,
            popup_lifetime_ms: 1000,
            ripple_lifetime_ms: 200,

            autosave_interval_ms: 15_000,
        }
    }
}

impl Tuning {
    /// Balance with random power-up spawning turned off (scripted play, tests)
    pub fn without_spawns() -> Self {
        Self {
            power_up_base_chance: 0.0,
            power_up_level_chance: 0.0,
            ..Self::default()
        }
    }

    /// Power-up spawn chance for one tick at the given level
    pub fn spawn_chance(&self, level: u32) -> f64 {
        (self.power_up_base_chance + level as f64 * self.power_up_level_chance).clamp(0.0, 1.0)
    }

    /// Combo window for a combo_mastery level (ms)
    pub fn combo_window_ms(&self, combo_mastery_level: u32) -> u64 {
        self.combo_base_ms + self.combo_per_level_ms * combo_mastery_level as u64
    }
}
