//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time
//! - Storage (the auth token in LocalStorage on web)
//! - HTTP (fetch on web)

#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod storage;

pub use storage::TokenStore;

/// Wall-clock milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Largest gap credited in one step. Anything bigger is treated as a broken
/// clock (system time changed, machine asleep for days) and skipped.
pub const MAX_CLOCK_STEP_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Turns wall-clock readings into whole elapsed milliseconds for
/// `SessionController::advance`, carrying the fraction between calls.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    carry: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous reading (0 on the first one)
    pub fn elapsed(&mut self, now_ms: f64) -> u64 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        let dt = now_ms - last;
        if !(0.0..=MAX_CLOCK_STEP_MS).contains(&dt) {
            log::warn!("Clock jumped by {:.0} ms, not crediting it", dt);
            return 0;
        }
        self.carry += dt;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as u64
    }
}
