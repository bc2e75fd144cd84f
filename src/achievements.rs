//! Achievement catalogue and evaluation
//!
//! Every requirement is monotonic in its stat, so an unlocked achievement
//! never needs re-checking and is never revoked.

use serde::{Deserialize, Serialize};

/// Achievement identifiers (wire names are snake_case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstTap,
    HundredClub,
    ComboMaster,
    SpeedDemon,
    ThousandPoints,
}

impl AchievementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstTap => "first_tap",
            AchievementId::HundredClub => "hundred_club",
            AchievementId::ComboMaster => "combo_master",
            AchievementId::SpeedDemon => "speed_demon",
            AchievementId::ThousandPoints => "thousand_points",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        ACHIEVEMENTS.iter().map(|a| a.id).find(|id| id.as_str() == s)
    }
}

/// Unlock condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any score at all
    AnyScore,
    ScoreAtLeast(u64),
    MaxComboAtLeast(u32),
    LevelAtLeast(u32),
}

/// Stats achievements are judged against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub score: u64,
    pub max_combo: u32,
    pub level: u32,
}

impl Requirement {
    pub fn is_met(&self, stats: &Stats) -> bool {
        match *self {
            Requirement::AnyScore => stats.score > 0,
            Requirement::ScoreAtLeast(threshold) => stats.score >= threshold,
            Requirement::MaxComboAtLeast(threshold) => stats.max_combo >= threshold,
            Requirement::LevelAtLeast(threshold) => stats.level >= threshold,
        }
    }
}

/// Static achievement definition
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: Requirement,
}

impl AchievementDefinition {
    /// Popup text shown on unlock
    pub fn unlock_text(&self) -> String {
        format!("{} {} UNLOCKED!", self.icon, self.name)
    }
}

pub static ACHIEVEMENTS: [AchievementDefinition; 5] = [
    AchievementDefinition {
        id: AchievementId::FirstTap,
        name: "First Contact",
        description: "Make your first tap",
        icon: "🚀",
        requirement: Requirement::AnyScore,
    },
    AchievementDefinition {
        id: AchievementId::HundredClub,
        name: "Hundred Club",
        description: "Score 100 points",
        icon: "💫",
        requirement: Requirement::ScoreAtLeast(100),
    },
    AchievementDefinition {
        id: AchievementId::ComboMaster,
        name: "Combo Master",
        description: "Achieve 10x combo",
        icon: "⚡",
        requirement: Requirement::MaxComboAtLeast(10),
    },
    AchievementDefinition {
        id: AchievementId::SpeedDemon,
        name: "Speed Demon",
        description: "Reach level 5",
        icon: "🌟",
        requirement: Requirement::LevelAtLeast(5),
    },
    AchievementDefinition {
        id: AchievementId::ThousandPoints,
        name: "Cosmic Legend",
        description: "Score 1000 points",
        icon: "🌌",
        requirement: Requirement::ScoreAtLeast(1000),
    },
];

/// Unlock every achievement whose requirement is met, returning the new ones
/// in catalogue order. Already-unlocked ids are skipped.
pub fn evaluate(
    unlocked: &mut Vec<AchievementId>,
    stats: &Stats,
) -> Vec<&'static AchievementDefinition> {
    let mut newly = Vec::new();
    for def in ACHIEVEMENTS.iter() {
        if unlocked.contains(&def.id) {
            continue;
        }
        if def.requirement.is_met(stats) {
            unlocked.push(def.id);
            newly.push(def);
        }
    }
    newly
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_tap_unlocks_on_any_score() {
        let mut unlocked = Vec::new();
        let stats = Stats {
            score: 1,
            max_combo: 1,
            level: 1,
        };
        let newly = evaluate(&mut unlocked, &stats);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, AchievementId::FirstTap);
        assert_eq!(unlocked, vec![AchievementId::FirstTap]);
        assert_eq!(newly[0].unlock_text(), "🚀 First Contact UNLOCKED!");
    }

    #[test]
    fn test_nothing_at_zero() {
        let mut unlocked = Vec::new();
        let stats = Stats {
            score: 0,
            max_combo: 0,
            level: 1,
        };
        assert!(evaluate(&mut unlocked, &stats).is_empty());
    }

    #[test]
    fn test_unlocked_ids_are_kept_when_score_drops() {
        let mut unlocked = Vec::new();
        evaluate(
            &mut unlocked,
            &Stats {
                score: 150,
                max_combo: 12,
                level: 2,
            },
        );
        assert_eq!(
            unlocked,
            vec![
                AchievementId::FirstTap,
                AchievementId::HundredClub,
                AchievementId::ComboMaster
            ]
        );

        // Spending score must not revoke anything
        let newly = evaluate(&mut unlocked, &Stats::default());
        assert!(newly.is_empty());
        assert_eq!(unlocked.len(), 3);
    }

    #[test]
    fn test_wire_names() {
        for def in ACHIEVEMENTS.iter() {
            assert_eq!(AchievementId::from_str(def.id.as_str()), Some(def.id));
        }
        let json = serde_json::to_string(&AchievementId::ThousandPoints).unwrap();
        assert_eq!(json, "\"thousand_points\"");
    }

    proptest! {
        #[test]
        fn prop_evaluation_is_idempotent_and_monotonic(
            score in 0u64..3000,
            max_combo in 0u32..30,
            extra_score in 0u64..500,
            extra_combo in 0u32..10,
        ) {
            let stats = Stats { score, max_combo, level: crate::level_for_score(score) };
            let mut unlocked = Vec::new();
            evaluate(&mut unlocked, &stats);
            let before = unlocked.clone();

            let grown = Stats {
                score: score + extra_score,
                max_combo: max_combo + extra_combo,
                level: crate::level_for_score(score + extra_score),
            };
            evaluate(&mut unlocked, &grown);
            evaluate(&mut unlocked, &grown);

            // Never removed, never duplicated
            for id in &before {
                prop_assert!(unlocked.contains(id));
            }
            let mut deduped = unlocked.clone();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), unlocked.len());
        }
    }
}
