//! Progress sync with the game-state service
//!
//! The session never performs I/O itself. It queues `SyncRequest`s; the
//! platform layer executes them asynchronously and hands back `SyncResult`s.
//! Each request is tagged with the session generation so results that land
//! after a reset are discarded instead of mutating the new session.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::achievements::AchievementId;
use crate::api::ApiError;
use crate::sim::SessionState;
use crate::upgrades::{MAX_UPGRADE_LEVEL, UpgradeId};

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted slice of a session (wire format of pull and push)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_combo: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub upgrades: BTreeMap<String, u32>,
}

impl Snapshot {
    pub fn capture(state: &SessionState) -> Self {
        Self {
            score: state.score,
            max_combo: state.max_combo,
            achievements: state
                .achievements
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            upgrades: state
                .upgrades
                .iter()
                .map(|(id, level)| (id.as_str().to_string(), level))
                .collect(),
        }
    }

    /// Overwrite score, max combo and upgrades of `state`. Achievements are
    /// merged into the local set, which never shrinks. Unknown ids are skipped
    /// and returned so the caller can report them.
    pub fn apply_to(&self, state: &mut SessionState) -> Vec<String> {
        let mut unknown = Vec::new();

        state.score = self.score;
        state.max_combo = self.max_combo.max(state.combo);

        for name in &self.achievements {
            match AchievementId::from_str(name) {
                Some(id) if !state.achievements.contains(&id) => state.achievements.push(id),
                Some(_) => {}
                None => unknown.push(name.clone()),
            }
        }

        state.upgrades = Default::default();
        for (name, level) in &self.upgrades {
            match UpgradeId::from_str(name) {
                Some(id) => {
                    if *level > MAX_UPGRADE_LEVEL {
                        log::warn!("Clamping {} level {} to {}", name, level, MAX_UPGRADE_LEVEL);
                    }
                    state.upgrades.set(id, *level);
                }
                None => unknown.push(name.clone()),
            }
        }

        unknown
    }
}

/// Work for the platform layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    Pull { generation: u64, token: String },
    Push {
        generation: u64,
        token: String,
        snapshot: Snapshot,
    },
    Reset { token: String },
}

/// Outcome of an executed `SyncRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    Pulled {
        generation: u64,
        result: Result<Option<Snapshot>, ApiError>,
    },
    Pushed(Result<(), ApiError>),
    Reset(Result<(), ApiError>),
}

/// Running totals for the HUD and logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub pushes_ok: u32,
    pub pushes_failed: u32,
    pub pulls_applied: u32,
    pub results_discarded: u32,
}

/// Outbox and generation bookkeeping for one player
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    credential: Option<String>,
    generation: u64,
    outbox: Vec<SyncRequest>,
    stats: SyncStats,
}

impl Synchronizer {
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: credential.filter(|t| !t.is_empty()),
            generation: 0,
            outbox: Vec::new(),
            stats: SyncStats::default(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Hand queued requests to the executor
    pub fn drain(&mut self) -> Vec<SyncRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Queue a pull of saved progress. Returns false without a credential.
    pub fn request_pull(&mut self) -> bool {
        let Some(token) = self.credential.clone() else {
            log::info!("No user token, starting new game locally");
            return false;
        };
        self.outbox.push(SyncRequest::Pull {
            generation: self.generation,
            token,
        });
        true
    }

    /// Queue a push of `snapshot`. Returns false without a credential.
    pub fn request_push(&mut self, snapshot: Snapshot) -> bool {
        let Some(token) = self.credential.clone() else {
            return false;
        };
        log::debug!("Auto-saving game state (score {})", snapshot.score);
        self.outbox.push(SyncRequest::Push {
            generation: self.generation,
            token,
            snapshot,
        });
        true
    }

    /// Start a new generation: queued pulls and pushes of the old session are
    /// dropped and late results for it will be ignored. A remote reset is
    /// queued when a credential is present.
    pub fn begin_reset(&mut self) {
        self.generation += 1;
        self.outbox.retain(|r| matches!(r, SyncRequest::Reset { .. }));
        if let Some(token) = self.credential.clone() {
            self.outbox.push(SyncRequest::Reset { token });
        }
    }

    /// Accept a pull result, returning the snapshot to apply (if any)
    pub fn accept_pull(
        &mut self,
        generation: u64,
        result: Result<Option<Snapshot>, ApiError>,
    ) -> Option<Snapshot> {
        if generation != self.generation {
            log::warn!(
                "Discarding game state from superseded session {} (current {})",
                generation,
                self.generation
            );
            self.stats.results_discarded += 1;
            return None;
        }
        match result {
            Ok(Some(snapshot)) => {
                self.stats.pulls_applied += 1;
                Some(snapshot)
            }
            Ok(None) => {
                log::info!("No existing game state found. Starting a new game.");
                None
            }
            Err(err) => {
                log::error!("Failed to fetch game state: {}", err);
                None
            }
        }
    }

    pub fn record_push(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.stats.pushes_ok += 1;
                log::info!("Game state saved successfully!");
            }
            Err(err) => {
                self.stats.pushes_failed += 1;
                log::error!("Error saving game: {}", err);
            }
        }
    }

    pub fn record_reset(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => log::info!("Game state reset on server"),
            Err(err) => log::error!("Failed to reset game state on server: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_format() {
        let mut state = SessionState::new();
        state.score = 77;
        state.max_combo = 9;
        state.achievements.push(AchievementId::FirstTap);
        state.upgrades.set(UpgradeId::ComboMastery, 1);

        let json = serde_json::to_value(Snapshot::capture(&state)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "score": 77,
                "maxCombo": 9,
                "achievements": ["first_tap"],
                "upgrades": {"combo_mastery": 1}
            })
        );
    }

    #[test]
    fn test_nulls_and_missing_fields_default() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"score":null,"achievements":null}"#).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_apply_skips_unknown_ids() {
        let snapshot = Snapshot {
            score: 300,
            max_combo: 4,
            achievements: vec!["hundred_club".into(), "moon_landing".into()],
            upgrades: BTreeMap::from([("auto_tap".into(), 2), ("laser".into(), 9)]),
        };
        let mut state = SessionState::new();
        let unknown = snapshot.apply_to(&mut state);

        assert_eq!(unknown, vec!["moon_landing".to_string(), "laser".to_string()]);
        assert_eq!(state.score, 300);
        assert_eq!(state.max_combo, 4);
        assert_eq!(state.achievements, vec![AchievementId::HundredClub]);
        assert_eq!(state.upgrades.level(UpgradeId::AutoTap), 2);
    }

    #[test]
    fn test_apply_merges_achievements_and_clamps_levels() {
        let snapshot = Snapshot {
            score: 10,
            max_combo: 0,
            achievements: vec!["hundred_club".into(), "first_tap".into()],
            upgrades: [("combo_mastery".to_string(), 3_000_000_000)]
                .into_iter()
                .collect(),
        };
        let mut state = SessionState::new();
        state.achievements.push(AchievementId::FirstTap);
        state.achievements.push(AchievementId::ComboMaster);

        assert!(snapshot.apply_to(&mut state).is_empty());
        assert_eq!(
            state.achievements,
            vec![
                AchievementId::FirstTap,
                AchievementId::ComboMaster,
                AchievementId::HundredClub,
            ]
        );
        assert_eq!(
            state.upgrades.level(UpgradeId::ComboMastery),
            crate::upgrades::MAX_UPGRADE_LEVEL
        );
    }

    #[test]
    fn test_no_requests_without_credential() {
        let mut sync = Synchronizer::new(None);
        assert!(!sync.request_pull());
        assert!(!sync.request_push(Snapshot::default()));
        sync.begin_reset();
        assert!(sync.drain().is_empty());

        // Empty token counts as absent
        assert!(!Synchronizer::new(Some(String::new())).has_credential());
    }

    #[test]
    fn test_reset_drops_stale_work_and_results() {
        let mut sync = Synchronizer::new(Some("tok".into()));
        sync.request_pull();
        sync.request_push(Snapshot::default());
        sync.begin_reset();

        assert_eq!(
            sync.drain(),
            vec![SyncRequest::Reset {
                token: "tok".into()
            }]
        );

        let stale = sync.accept_pull(0, Ok(Some(Snapshot::default())));
        assert!(stale.is_none());
        assert_eq!(sync.stats().results_discarded, 1);

        let fresh = sync.accept_pull(1, Ok(Some(Snapshot::default())));
        assert!(fresh.is_some());
    }

    #[test]
    fn test_push_failures_are_counted() {
        let mut sync = Synchronizer::new(Some("tok".into()));
        sync.record_push(Err(ApiError::Network("offline".into())));
        sync.record_push(Ok(()));
        assert_eq!(sync.stats().pushes_failed, 1);
        assert_eq!(sync.stats().pushes_ok, 1);
    }
}
