//! Session controller
//!
//! Owns the canonical `SessionState` together with the RNG, the timer table
//! and the sync outbox. Every mutation (user taps, ticks, timer callbacks,
//! sync results) goes through `&mut self`, so updates apply one at a time in
//! the order they happen on the session clock.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::achievements;
use crate::persistence::{Snapshot, SyncRequest, SyncResult, Synchronizer};
use crate::settings::Settings;
use crate::sim::boost::{self, BoostError, BoostPhase};
use crate::sim::{
    GameArea, PopupStyle, SessionState, TapOutcome, TimerKey, Timers, resolve_tap, tick,
};
use crate::tuning::Tuning;
use crate::upgrades::{self, PurchaseOutcome, UpgradeId};

pub struct SessionController {
    state: SessionState,
    tuning: Tuning,
    area: GameArea,
    particles: bool,
    rng: Pcg32,
    timers: Timers,
    sync: Synchronizer,
    /// Session clock (ms since construction)
    clock_ms: u64,
    /// Next fixed tick; `None` until the first tap
    next_tick_ms: Option<u64>,
}

impl SessionController {
    pub fn new(seed: u64, tuning: Tuning, credential: Option<String>) -> Self {
        Self {
            state: SessionState::new(),
            tuning,
            area: GameArea::default(),
            particles: true,
            rng: Pcg32::seed_from_u64(seed),
            timers: Timers::new(),
            sync: Synchronizer::new(credential),
            clock_ms: 0,
            next_tick_ms: None,
        }
    }

    /// Controller configured from runtime settings
    pub fn from_settings(
        settings: &Settings,
        seed: u64,
        credential: Option<String>,
    ) -> Self {
        let mut controller = Self::new(settings.seed.unwrap_or(seed), Tuning::default(), credential);
        controller.particles = settings.particles;
        controller
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn area(&self) -> GameArea {
        self.area
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// True once the first tap has started the tick loop
    pub fn is_active(&self) -> bool {
        self.state.started
    }

    pub fn boost_phase(&self) -> BoostPhase {
        boost::phase(&self.state)
    }

    pub fn set_area(&mut self, width: f32, height: f32) {
        self.area = GameArea::new(width, height);
    }

    /// Session start: ask for saved progress if the player is signed in
    pub fn start(&mut self) {
        if self.sync.request_pull() {
            log::info!("Fetching saved game state");
        }
    }

    /// Player tap at `pos` (game-area coordinates)
    pub fn tap(&mut self, pos: Vec2) -> TapOutcome {
        let pos = self.area.clamp(pos);
        let was_active = self.state.started;
        let particles = self.particles;
        let outcome = resolve_tap(&mut self.state, pos, &self.tuning, particles, &mut self.rng);

        match outcome {
            TapOutcome::MultiplierCollected { .. } => {
                self.timers.arm(
                    TimerKey::PowerUpExpiry,
                    self.clock_ms + self.tuning.multiplier_duration_ms,
                );
            }
            TapOutcome::PointsCollected { .. } => {}
            TapOutcome::Scored { .. } => {
                let mastery = self.state.upgrades.level(UpgradeId::ComboMastery);
                self.timers.arm(
                    TimerKey::ComboExpiry,
                    self.clock_ms + self.tuning.combo_window_ms(mastery),
                );
            }
        }

        if !was_active {
            self.on_activated();
        }
        self.evaluate_achievements();
        outcome
    }

    /// Spend a full boost meter
    pub fn activate_boost(&mut self) -> Result<(), BoostError> {
        boost::activate(&mut self.state)?;
        self.timers.arm(
            TimerKey::BoostActive,
            self.clock_ms + self.tuning.boost_duration_ms,
        );
        let center = self.area.center();
        self.state
            .show_popup("BOOST!", center, PopupStyle::Boost, self.tuning.popup_lifetime_ms);
        log::info!("Boost activated");
        Ok(())
    }

    /// Buy the next level of an upgrade
    pub fn purchase_upgrade(&mut self, id: UpgradeId) -> PurchaseOutcome {
        let outcome = upgrades::purchase(&mut self.state, id);
        let center = self.area.center();
        match outcome {
            PurchaseOutcome::Purchased { cost, new_level } => {
                log::info!("Purchased {} level {} for {}", id.as_str(), new_level, cost);
                self.state.show_popup(
                    format!("{} Purchased!", id.definition().name),
                    center,
                    PopupStyle::Upgrade,
                    self.tuning.popup_lifetime_ms,
                );
                if id == UpgradeId::AutoTap {
                    self.rearm_auto_tap();
                }
                self.evaluate_achievements();
            }
            PurchaseOutcome::InsufficientScore { cost } => {
                log::debug!("Cannot afford {} ({} < {})", id.as_str(), self.state.score, cost);
                self.state.show_popup(
                    "Not enough score!",
                    center,
                    PopupStyle::Error,
                    self.tuning.popup_lifetime_ms,
                );
            }
            PurchaseOutcome::MaxLevel => {
                log::debug!("{} is already at its maximum level", id.as_str());
                self.state.show_popup(
                    "Max level reached!",
                    center,
                    PopupStyle::Error,
                    self.tuning.popup_lifetime_ms,
                );
            }
        }
        outcome
    }

    /// Move the session clock forward, firing due timers and fixed ticks in
    /// deadline order (timers first on ties).
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.state.age_effects(elapsed_ms);
        let target = self.clock_ms + elapsed_ms;

        loop {
            let due_timer = self.timers.next_due(target);
            let due_tick = self.next_tick_ms.filter(|at| *at <= target);
            match (due_timer, due_tick) {
                (Some((key, at)), Some(tick_at)) if at <= tick_at => self.fire(key, at),
                (Some((key, at)), None) => self.fire(key, at),
                (_, Some(tick_at)) => self.run_tick(tick_at),
                (None, None) => break,
            }
        }

        self.clock_ms = target;
    }

    /// Wipe the session. The remote reset is only requested; local state is
    /// cleared immediately whatever the service later answers.
    pub fn reset(&mut self) {
        self.sync.begin_reset();
        self.timers.cancel_all();
        self.state = SessionState::new();
        self.next_tick_ms = None;
        log::info!("Session reset (generation {})", self.sync.generation());
    }

    /// Requests for the platform layer to execute
    pub fn drain_sync_requests(&mut self) -> Vec<SyncRequest> {
        self.sync.drain()
    }

    /// Feed back the outcome of an executed request
    pub fn complete_sync(&mut self, result: SyncResult) {
        match result {
            SyncResult::Pulled { generation, result } => {
                if let Some(snapshot) = self.sync.accept_pull(generation, result) {
                    self.apply_snapshot(&snapshot);
                }
            }
            SyncResult::Pushed(result) => self.sync.record_push(result),
            SyncResult::Reset(result) => self.sync.record_reset(result),
        }
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        for name in snapshot.apply_to(&mut self.state) {
            log::warn!("Ignoring unknown id '{}' in saved game state", name);
        }
        self.state.level = crate::level_for_score(self.state.score);
        self.rearm_auto_tap();
        self.evaluate_achievements();
        log::info!(
            "Loaded saved game: score {}, max combo {}",
            self.state.score,
            self.state.max_combo
        );
    }

    fn on_activated(&mut self) {
        self.next_tick_ms = Some(self.clock_ms + self.tuning.tick_ms.max(1));
        if self.sync.has_credential() {
            self.timers.arm(
                TimerKey::AutoSave,
                self.clock_ms + self.tuning.autosave_interval_ms,
            );
        }
        log::info!("Session started");
    }

    fn auto_tap_period_ms(&self) -> Option<u64> {
        let level = self.state.upgrades.level(UpgradeId::AutoTap) as u64;
        (level > 0).then(|| (1000 / level).max(1))
    }

    fn rearm_auto_tap(&mut self) {
        match self.auto_tap_period_ms() {
            Some(period) => self.timers.arm(TimerKey::AutoTap, self.clock_ms + period),
            None => {
                self.timers.cancel(TimerKey::AutoTap);
            }
        }
    }

    fn run_tick(&mut self, at: u64) {
        self.clock_ms = at;
        tick(&mut self.state, &self.tuning, &self.area, &mut self.rng);
        self.next_tick_ms = Some(at + self.tuning.tick_ms.max(1));
        self.evaluate_achievements();
    }

    fn fire(&mut self, key: TimerKey, at: u64) {
        self.timers.cancel(key);
        self.clock_ms = at;
        match key {
            TimerKey::ComboExpiry => {
                self.state.combo = 0;
            }
            TimerKey::PowerUpExpiry => {
                self.state.multiplier = 1;
            }
            TimerKey::BoostActive => {
                boost::expire(&mut self.state, self.tuning.boost_cooldown_secs);
                if self.state.boost_cooldown_secs > 0 {
                    self.timers.arm(TimerKey::BoostCooldown, at + 1000);
                }
            }
            TimerKey::BoostCooldown => {
                if boost::cooldown_step(&mut self.state) {
                    self.timers.arm(TimerKey::BoostCooldown, at + 1000);
                }
            }
            TimerKey::AutoTap => {
                let pos = Vec2::new(
                    self.rng.random::<f32>() * self.area.width,
                    self.rng.random::<f32>() * self.area.height,
                );
                self.tap(pos);
                if let Some(period) = self.auto_tap_period_ms() {
                    self.timers.arm(TimerKey::AutoTap, at + period);
                }
            }
            TimerKey::AutoSave => {
                if self.sync.request_push(Snapshot::capture(&self.state)) {
                    self.timers
                        .arm(TimerKey::AutoSave, at + self.tuning.autosave_interval_ms);
                }
            }
        }
    }

    fn evaluate_achievements(&mut self) {
        let stats = self.state.stats();
        let unlocked = achievements::evaluate(&mut self.state.achievements, &stats);
        if unlocked.is_empty() {
            return;
        }
        let pos = Vec2::new(self.area.width / 2.0, self.area.height / 3.0);
        for def in unlocked {
            log::info!("Achievement unlocked: {}", def.name);
            self.state.show_popup(
                def.unlock_text(),
                pos,
                PopupStyle::Achievement,
                self.tuning.popup_lifetime_ms,
            );
        }
    }
}
