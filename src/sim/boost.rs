//! Boost meter state machine
//!
//! idle -> charging -> ready -> active -> cooldown -> idle/charging.
//! Taps charge the meter; the player spends a full meter to double point
//! yields for a while, after which the meter is locked for a cooldown.

use thiserror::Error;

use super::state::SessionState;
use crate::consts::BOOST_CAPACITY;

/// Where the boost meter currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostPhase {
    Idle,
    Charging,
    Ready,
    Active,
    Cooldown,
}

/// Why a boost activation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoostError {
    #[error("boost meter not full ({points}/100)")]
    NotCharged { points: u32 },
    #[error("boost cooling down ({secs}s left)")]
    CoolingDown { secs: u32 },
    #[error("boost already active")]
    AlreadyActive,
}

pub fn phase(state: &SessionState) -> BoostPhase {
    if state.boost_active {
        BoostPhase::Active
    } else if state.boost_cooldown_secs > 0 {
        BoostPhase::Cooldown
    } else if state.boost_points >= BOOST_CAPACITY {
        BoostPhase::Ready
    } else if state.boost_points > 0 {
        BoostPhase::Charging
    } else {
        BoostPhase::Idle
    }
}

/// Add charge, saturating at capacity
pub fn charge(state: &mut SessionState, amount: u32) {
    state.boost_points = state.boost_points.saturating_add(amount).min(BOOST_CAPACITY);
}

/// Point yield factor for taps and power-ups
pub fn yield_factor(state: &SessionState) -> u64 {
    if state.boost_active { 2 } else { 1 }
}

/// Spend a full meter to start boosting
pub fn activate(state: &mut SessionState) -> Result<(), BoostError> {
    if state.boost_active {
        return Err(BoostError::AlreadyActive);
    }
    if state.boost_cooldown_secs > 0 {
        return Err(BoostError::CoolingDown {
            secs: state.boost_cooldown_secs,
        });
    }
    if state.boost_points < BOOST_CAPACITY {
        return Err(BoostError::NotCharged {
            points: state.boost_points,
        });
    }
    state.boost_points = 0;
    state.boost_active = true;
    Ok(())
}

/// Active duration ran out: start the cooldown
pub fn expire(state: &mut SessionState, cooldown_secs: u32) {
    state.boost_active = false;
    state.boost_cooldown_secs = cooldown_secs;
}

/// One second of cooldown passed. Returns true while still cooling down.
pub fn cooldown_step(state: &mut SessionState) -> bool {
    state.boost_cooldown_secs = state.boost_cooldown_secs.saturating_sub(1);
    state.boost_cooldown_secs > 0
}
