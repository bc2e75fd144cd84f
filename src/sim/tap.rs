//! Tap resolution
//!
//! A tap either collects one power-up under the finger or scores a normal
//! tap. Scoring is deterministic; only particle jitter draws from the RNG.

use glam::Vec2;
use rand::Rng;

use super::boost;
use super::state::{Particle, PopupStyle, PowerUpKind, SessionState, TapRipple};
use crate::consts::MAX_MULTIPLIER;
use crate::hsl_to_rgb;
use crate::tuning::Tuning;
use crate::upgrades::UpgradeId;

/// Colour of the sparkle left by a collected power-up
pub const POWER_UP_PARTICLE_COLOR: u32 = 0xFCD34D;

/// What a tap did. The controller uses this to (re)arm timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// A multiplier power-up was collected; multiplier is now `multiplier`
    MultiplierCollected { multiplier: u32 },
    /// A points power-up was collected for `points`
    PointsCollected { points: u64 },
    /// Normal tap
    Scored { points: u64, combo: u32 },
}

/// Points a normal tap is worth before multiplier and boost
pub fn base_points(state: &SessionState) -> u64 {
    1 + state.upgrades.level(UpgradeId::TapStrength) as u64
}

/// Number of particles a normal tap bursts into (3..=8)
pub fn burst_size(combo_before_tap: u32) -> usize {
    3 + combo_before_tap.div_ceil(10).min(5) as usize
}

/// Resolve one tap at `pos`
pub fn resolve_tap<R: Rng + ?Sized>(
    state: &mut SessionState,
    pos: Vec2,
    tuning: &Tuning,
    particles: bool,
    rng: &mut R,
) -> TapOutcome {
    state.started = true;
    state.ripple = Some(TapRipple {
        pos,
        remaining_ms: tuning.ripple_lifetime_ms,
    });

    // At most one power-up per tap, first in spawn order
    let hit = state
        .power_ups
        .iter()
        .position(|p| p.pos.distance(pos) < tuning.hit_radius);
    if let Some(index) = hit {
        let power_up = state.power_ups.remove(index);
        let outcome = match power_up.kind {
            PowerUpKind::Multiplier => {
                state.multiplier = (state.multiplier + 1).min(MAX_MULTIPLIER);
                state.show_popup(
                    format!("x{}!", state.multiplier),
                    power_up.pos,
                    PopupStyle::Boost,
                    tuning.popup_lifetime_ms,
                );
                TapOutcome::MultiplierCollected {
                    multiplier: state.multiplier,
                }
            }
            PowerUpKind::Points => {
                let points =
                    tuning.points_power_up_bonus * state.multiplier as u64 * boost::yield_factor(state);
                state.score += points;
                state.show_popup(
                    format!("+{points}"),
                    power_up.pos,
                    PopupStyle::Boost,
                    tuning.popup_lifetime_ms,
                );
                TapOutcome::PointsCollected { points }
            }
        };
        if particles {
            let id = state.next_entity_id();
            state.push_particle(power_up_particle(id, power_up.pos, rng), tuning.max_particles);
        }
        return outcome;
    }

    let base = base_points(state);
    let points = base * state.multiplier as u64 * boost::yield_factor(state);
    let combo_before = state.combo;

    state.score += points;
    state.combo += 1;
    state.track_max_combo();
    boost::charge(state, base.min(u32::MAX as u64) as u32);

    let style = if state.boost_active {
        PopupStyle::Boost
    } else {
        PopupStyle::Points
    };
    state.show_popup(format!("+{points}"), pos, style, tuning.popup_lifetime_ms);

    if particles {
        for _ in 0..burst_size(combo_before) {
            let jitter = Vec2::new(
                (rng.random::<f32>() - 0.5) * 20.0,
                (rng.random::<f32>() - 0.5) * 20.0,
            );
            let id = state.next_entity_id();
            state.push_particle(tap_particle(id, pos + jitter, rng), tuning.max_particles);
        }
    }

    TapOutcome::Scored {
        points,
        combo: state.combo,
    }
}

fn tap_particle<R: Rng + ?Sized>(id: u32, pos: Vec2, rng: &mut R) -> Particle {
    let vel = Vec2::new(
        (rng.random::<f32>() - 0.5) * 8.0,
        (rng.random::<f32>() - 0.5) * 8.0 - 2.0,
    );
    let decay = 0.02 + rng.random::<f32>() * 0.02;
    let size = 4.0 + rng.random::<f32>() * 4.0;
    let hue = (330.0 + rng.random::<f32>() * 90.0) % 360.0;
    Particle {
        id,
        pos,
        vel,
        life: 1.0,
        decay,
        size,
        color: hsl_to_rgb(hue, 0.8, 0.6),
    }
}

fn power_up_particle<R: Rng + ?Sized>(id: u32, pos: Vec2, rng: &mut R) -> Particle {
    let vel = Vec2::new(
        (rng.random::<f32>() - 0.5) * 8.0,
        (rng.random::<f32>() - 0.5) * 8.0 - 2.0,
    );
    let decay = 0.02 + rng.random::<f32>() * 0.02;
    Particle {
        id,
        pos,
        vel,
        life: 1.0,
        decay,
        size: 8.0,
        color: POWER_UP_PARTICLE_COLOR,
    }
}
