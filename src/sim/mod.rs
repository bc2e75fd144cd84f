//! Session simulation module
//!
//! All gameplay rules live here. Nothing in this module touches the DOM or
//! the network:
//! - Fixed tick only
//! - Seeded RNG only
//! - Stable iteration order (entities kept in spawn order)

pub mod boost;
pub mod state;
pub mod tap;
pub mod tick;
pub mod timers;

pub use boost::{BoostError, BoostPhase};
pub use state::{
    GameArea, Particle, PopupStyle, PowerUp, PowerUpKind, ScorePopup, SessionState, TapRipple,
};
pub use tap::{TapOutcome, resolve_tap};
pub use tick::tick;
pub use timers::{TimerKey, Timers};
