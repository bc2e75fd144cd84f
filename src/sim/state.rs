//! Session state and core simulation types
//!
//! `SessionState` is the single mutable aggregate for a play session. Only
//! the session controller hands out `&mut` access to it.

use glam::Vec2;

use crate::achievements::{AchievementId, Stats};
use crate::consts::*;
use crate::upgrades::UpgradeLevels;

/// Rectangle the player taps in, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameArea {
    pub width: f32,
    pub height: f32,
}

impl Default for GameArea {
    fn default() -> Self {
        Self {
            width: DEFAULT_AREA_WIDTH,
            height: DEFAULT_AREA_HEIGHT,
        }
    }
}

impl GameArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.width && pos.y <= self.height
    }

    /// Clamp a point into the area
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// +1 multiplier (max 5) for a limited time
    Multiplier,
    /// Flat point bonus
    Points,
}

/// A collectible power-up
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub remaining_lifetime_ms: u64,
    /// Pulse animation phase (radians, 0..2π)
    pub pulse: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    /// 0-1, decreases every tick by `decay`
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    /// Packed 0xRRGGBB
    pub color: u32,
}

/// How a popup should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupStyle {
    Points,
    Boost,
    Achievement,
    Upgrade,
    Error,
}

/// Transient floating text
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePopup {
    pub id: u32,
    pub text: String,
    pub pos: Vec2,
    pub style: PopupStyle,
    pub remaining_ms: u64,
}

/// Ring shown where the player last tapped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapRipple {
    pub pos: Vec2,
    pub remaining_ms: u64,
}

/// Complete session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub score: u64,
    /// Derived from score on every tick
    pub level: u32,
    pub combo: u32,
    /// Historical maximum of `combo`
    pub max_combo: u32,
    /// 1..=5
    pub multiplier: u32,
    /// 0..=100
    pub boost_points: u32,
    pub boost_active: bool,
    pub boost_cooldown_secs: u32,
    pub upgrades: UpgradeLevels,
    /// Unlocked achievements in unlock order (grow-only)
    pub achievements: Vec<AchievementId>,
    /// Active power-ups (spawn order)
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub popups: Vec<ScorePopup>,
    pub ripple: Option<TapRipple>,
    /// Set by the first tap; the tick loop idles until then
    pub started: bool,
    /// Next entity ID
    next_id: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh, empty session
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            combo: 0,
            max_combo: 0,
            multiplier: 1,
            boost_points: 0,
            boost_active: false,
            boost_cooldown_secs: 0,
            upgrades: UpgradeLevels::new(),
            achievements: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            popups: Vec::new(),
            ripple: None,
            started: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Stats used by the achievement evaluator
    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            max_combo: self.max_combo,
            level: self.level,
        }
    }

    /// Record the current combo into `max_combo`
    pub fn track_max_combo(&mut self) {
        self.max_combo = self.max_combo.max(self.combo);
    }

    /// Add a particle, dropping the oldest beyond `cap`
    pub fn push_particle(&mut self, particle: Particle, cap: usize) {
        self.particles.push(particle);
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Queue a floating popup
    pub fn show_popup(
        &mut self,
        text: impl Into<String>,
        pos: Vec2,
        style: PopupStyle,
        lifetime_ms: u64,
    ) {
        let id = self.next_entity_id();
        self.popups.push(ScorePopup {
            id,
            text: text.into(),
            pos,
            style,
            remaining_ms: lifetime_ms,
        });
    }

    /// Age popups and the tap ripple by wall time, dropping expired ones
    pub fn age_effects(&mut self, elapsed_ms: u64) {
        for popup in &mut self.popups {
            popup.remaining_ms = popup.remaining_ms.saturating_sub(elapsed_ms);
        }
        self.popups.retain(|p| p.remaining_ms > 0);

        if let Some(ripple) = &mut self.ripple {
            ripple.remaining_ms = ripple.remaining_ms.saturating_sub(elapsed_ms);
            if ripple.remaining_ms == 0 {
                self.ripple = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(id: u32) -> Particle {
        Particle {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 1.0,
            decay: 0.02,
            size: 4.0,
            color: 0xFFFFFF,
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let state = SessionState::new();
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.multiplier, 1);
        assert!(!state.started);
        assert!(state.achievements.is_empty());
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut state = SessionState::new();
        for id in 0..60 {
            state.push_particle(particle(id), 50);
        }
        assert_eq!(state.particles.len(), 50);
        assert_eq!(state.particles[0].id, 10);
        assert_eq!(state.particles[49].id, 59);
    }

    #[test]
    fn test_effects_expire() {
        let mut state = SessionState::new();
        state.show_popup("+1", Vec2::ZERO, PopupStyle::Points, 1000);
        state.ripple = Some(TapRipple {
            pos: Vec2::ZERO,
            remaining_ms: 200,
        });

        state.age_effects(200);
        assert!(state.ripple.is_none());
        assert_eq!(state.popups.len(), 1);

        state.age_effects(800);
        assert!(state.popups.is_empty());
    }

    #[test]
    fn test_area_clamp() {
        let area = GameArea::new(100.0, 50.0);
        assert_eq!(area.clamp(Vec2::new(-5.0, 80.0)), Vec2::new(0.0, 50.0));
        assert!(area.contains(Vec2::new(100.0, 50.0)));
        assert!(!area.contains(Vec2::new(100.1, 10.0)));
    }
}
