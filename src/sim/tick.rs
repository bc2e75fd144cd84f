//! Fixed timestep simulation tick
//!
//! Advances particles and power-ups, keeps derived stats current and rolls
//! for new power-ups. Does nothing until the first tap starts the session.

use glam::Vec2;
use rand::Rng;

use super::state::{GameArea, PowerUp, PowerUpKind, SessionState};
use crate::level_for_score;
use crate::tuning::Tuning;

/// Pulse phase advance per tick (radians)
const PULSE_STEP: f32 = 0.1;

/// Advance the session by one fixed tick
pub fn tick<R: Rng + ?Sized>(
    state: &mut SessionState,
    tuning: &Tuning,
    area: &GameArea,
    rng: &mut R,
) {
    if !state.started {
        return;
    }

    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.vel.y += tuning.gravity;
        particle.life -= particle.decay;
    }
    state.particles.retain(|p| p.life > 0.0);

    for power_up in state.power_ups.iter_mut() {
        power_up.pulse = (power_up.pulse + PULSE_STEP) % std::f32::consts::TAU;
        power_up.remaining_lifetime_ms = power_up.remaining_lifetime_ms.saturating_sub(tuning.tick_ms);
    }
    state.power_ups.retain(|p| p.remaining_lifetime_ms > 0);

    state.level = level_for_score(state.score);
    state.track_max_combo();

    if rng.random_bool(tuning.spawn_chance(state.level)) {
        spawn_power_up(state, tuning, area, rng);
    }
}

/// Place a power-up of random kind somewhere inside the area margins
pub fn spawn_power_up<R: Rng + ?Sized>(
    state: &mut SessionState,
    tuning: &Tuning,
    area: &GameArea,
    rng: &mut R,
) {
    let margin = tuning.spawn_margin;
    let span_x = (area.width - 2.0 * margin).max(0.0);
    let span_y = (area.height - 2.0 * margin).max(0.0);
    let pos = Vec2::new(
        rng.random::<f32>() * span_x + margin.min(area.width),
        rng.random::<f32>() * span_y + margin.min(area.height),
    );
    let kind = if rng.random_bool(0.5) {
        PowerUpKind::Multiplier
    } else {
        PowerUpKind::Points
    };
    let id = state.next_entity_id();
    log::debug!("Power-up {:?} spawned at ({:.0}, {:.0})", kind, pos.x, pos.y);
    state.power_ups.push(PowerUp {
        id,
        pos,
        kind,
        remaining_lifetime_ms: tuning.power_up_lifetime_ms,
        pulse: 0.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Particle;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn started() -> SessionState {
        let mut state = SessionState::new();
        state.started = true;
        state
    }

    #[test]
    fn test_tick_is_noop_before_first_tap() {
        let mut state = SessionState::new();
        state.score = 250;
        let mut rng = Pcg32::seed_from_u64(1);
        let tuning = Tuning {
            power_up_base_chance: 1.0,
            ..Tuning::default()
        };
        tick(&mut state, &tuning, &GameArea::default(), &mut rng);
        assert_eq!(state.level, 1);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_level_recomputes_on_tick() {
        let mut state = started();
        state.score = 250;
        let mut rng = Pcg32::seed_from_u64(1);
        tick(&mut state, &Tuning::without_spawns(), &GameArea::default(), &mut rng);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn test_max_combo_tracks_combo() {
        let mut state = started();
        state.combo = 7;
        let mut rng = Pcg32::seed_from_u64(1);
        tick(&mut state, &Tuning::without_spawns(), &GameArea::default(), &mut rng);
        assert_eq!(state.max_combo, 7);
        state.combo = 0;
        tick(&mut state, &Tuning::without_spawns(), &GameArea::default(), &mut rng);
        assert_eq!(state.max_combo, 7);
    }

    #[test]
    fn test_particle_physics() {
        let mut state = started();
        state.particles.push(Particle {
            id: 1,
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(1.0, -2.0),
            life: 0.05,
            decay: 0.03,
            size: 4.0,
            color: 0,
        });
        let mut rng = Pcg32::seed_from_u64(1);
        let tuning = Tuning::without_spawns();

        tick(&mut state, &tuning, &GameArea::default(), &mut rng);
        let p = &state.particles[0];
        assert_eq!(p.pos, Vec2::new(11.0, 8.0));
        assert!((p.vel.y - (-1.8)).abs() < 1e-6);
        assert!((p.life - 0.02).abs() < 1e-6);

        // Second tick takes life to or below zero
        tick(&mut state, &tuning, &GameArea::default(), &mut rng);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_power_up_spawns_inside_margins_and_expires() {
        let mut state = started();
        let mut rng = Pcg32::seed_from_u64(42);
        let area = GameArea::new(200.0, 100.0);
        let tuning = Tuning {
            power_up_base_chance: 1.0,
            ..Tuning::default()
        };
        tick(&mut state, &tuning, &area, &mut rng);
        assert_eq!(state.power_ups.len(), 1);
        let p = state.power_ups[0].clone();
        assert!(p.pos.x >= 30.0 && p.pos.x <= 170.0);
        assert!(p.pos.y >= 30.0 && p.pos.y <= 70.0);
        assert_eq!(p.remaining_lifetime_ms, 5000);

        let quiet = Tuning::without_spawns();
        // 5000 / 16 rounds up to 313 ticks
        for _ in 0..312 {
            tick(&mut state, &quiet, &area, &mut rng);
        }
        assert_eq!(state.power_ups.len(), 1);
        tick(&mut state, &quiet, &area, &mut rng);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_spawn_kinds_are_mixed() {
        let mut state = started();
        let mut rng = Pcg32::seed_from_u64(9);
        let tuning = Tuning::default();
        let area = GameArea::default();
        for _ in 0..100 {
            spawn_power_up(&mut state, &tuning, &area, &mut rng);
        }
        let multipliers = state
            .power_ups
            .iter()
            .filter(|p| p.kind == PowerUpKind::Multiplier)
            .count();
        assert!(multipliers > 20 && multipliers < 80);
    }
}
