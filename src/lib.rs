//! Cosmic Tap - a tap-to-score clicker game
//!
//! Core modules:
//! - `sim`: Session simulation (tap resolution, fixed tick, boost, timers)
//! - `upgrades` / `achievements`: Static gameplay tables and their rules
//! - `session`: Session controller owning the canonical state
//! - `persistence`: Sync of progress with the game-state service
//! - `api` / `auth`: Collaborator wire types and login form validation
//! - `platform`: Browser storage and HTTP plumbing
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod api;
pub mod auth;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod upgrades;

pub use session::SessionController;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Default game area size, replaced by the real element size in the browser
    pub const DEFAULT_AREA_WIDTH: f32 = 800.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 600.0;

    /// Highest multiplier a power-up can push to
    pub const MAX_MULTIPLIER: u32 = 5;
    /// Boost meter capacity
    pub const BOOST_CAPACITY: u32 = 100;
    /// Points per level
    pub const POINTS_PER_LEVEL: u64 = 100;

    /// LocalStorage key for the auth token (the only durable client state)
    pub const TOKEN_STORAGE_KEY: &str = "userToken";
}

/// Level derived from score: one level per hundred points, starting at 1.
/// Saturates at `u32::MAX` for absurd scores.
#[inline]
pub fn level_for_score(score: u64) -> u32 {
    u32::try_from(score / consts::POINTS_PER_LEVEL)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Convert HSL (hue in degrees, saturation/lightness 0-1) to packed 0xRRGGBB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> u32 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
    (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_score() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(99), 1);
        assert_eq!(level_for_score(100), 2);
        assert_eq!(level_for_score(250), 3);
    }

    #[test]
    fn test_level_for_huge_score_saturates() {
        assert_eq!(level_for_score(429_496_729_500), u32::MAX);
        assert_eq!(level_for_score(429_496_729_600), u32::MAX);
        assert_eq!(level_for_score(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), 0xFF0000);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), 0x00FF00);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), 0x0000FF);
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), 0xFF0000);
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), 0xFFFFFF);
    }
}
