//! Upgrade catalogue and pricing
//!
//! Upgrades are permanent purchases paid for with score. Each level costs
//! `round(base_cost * cost_multiplier ^ level)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::SessionState;

/// Upgrade identifiers (wire names are snake_case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    AutoTap,
    TapStrength,
    ComboMastery,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 3] = [
        UpgradeId::AutoTap,
        UpgradeId::TapStrength,
        UpgradeId::ComboMastery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::AutoTap => "auto_tap",
            UpgradeId::TapStrength => "tap_strength",
            UpgradeId::ComboMastery => "combo_mastery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "auto_tap" => Some(UpgradeId::AutoTap),
            "tap_strength" => Some(UpgradeId::TapStrength),
            "combo_mastery" => Some(UpgradeId::ComboMastery),
            _ => None,
        }
    }

    /// Static definition for this upgrade
    pub fn definition(&self) -> &'static UpgradeDefinition {
        match self {
            UpgradeId::AutoTap => &UPGRADES[0],
            UpgradeId::TapStrength => &UPGRADES[1],
            UpgradeId::ComboMastery => &UPGRADES[2],
        }
    }
}

/// Static upgrade definition
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDefinition {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: u64,
    /// Always greater than 1
    pub cost_multiplier: f64,
    /// Per-level effect (taps/second, points/tap, or ms of combo window)
    pub effect: u32,
}

impl UpgradeDefinition {
    /// Cost of buying the next level when currently at `level`
    /// Saturates at `u64::MAX`; levels at or past `MAX_UPGRADE_LEVEL` are
    /// never for sale.
    pub fn cost(&self, level: u32) -> u64 {
        if level >= MAX_UPGRADE_LEVEL {
            return u64::MAX;
        }
        let cost = (self.base_cost as f64 * self.cost_multiplier.powf(level as f64)).round();
        if cost.is_finite() && cost < u64::MAX as f64 {
            cost as u64
        } else {
            u64::MAX
        }
    }
}

/// Highest level any upgrade can reach. Far past what a real score can buy;
/// larger values in saved data are clamped to it.
pub const MAX_UPGRADE_LEVEL: u32 = 1000;

/// All upgrades, in shop order
pub static UPGRADES: [UpgradeDefinition; 3] = [
    UpgradeDefinition {
        id: UpgradeId::AutoTap,
        name: "Auto-Tap Drone",
        description: "Automatically taps for you",
        base_cost: 100,
        cost_multiplier: 1.5,
        effect: 1,
    },
    UpgradeDefinition {
        id: UpgradeId::TapStrength,
        name: "Tap Strength",
        description: "Increase points per tap",
        base_cost: 50,
        cost_multiplier: 1.2,
        effect: 1,
    },
    UpgradeDefinition {
        id: UpgradeId::ComboMastery,
        name: "Combo Mastery",
        description: "Combo lasts longer",
        base_cost: 200,
        cost_multiplier: 1.8,
        effect: 1000,
    },
];

/// Purchased level per upgrade (missing entries are level 0)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeLevels(BTreeMap<UpgradeId, u32>);

impl UpgradeLevels {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn level(&self, id: UpgradeId) -> u32 {
        self.0.get(&id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, id: UpgradeId, level: u32) {
        self.0.insert(id, level.min(MAX_UPGRADE_LEVEL));
    }

    pub fn increment(&mut self, id: UpgradeId) -> u32 {
        let level = self.0.entry(id).or_insert(0);
        *level = (*level + 1).min(MAX_UPGRADE_LEVEL);
        *level
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeId, u32)> + '_ {
        self.0.iter().map(|(id, level)| (*id, *level))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Next-level cost of an upgrade at its current level
    pub fn next_cost(&self, id: UpgradeId) -> u64 {
        id.definition().cost(self.level(id))
    }
}

/// Result of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Paid `cost`, upgrade is now at `new_level`
    Purchased { cost: u64, new_level: u32 },
    /// Score below `cost`; nothing changed
    InsufficientScore { cost: u64 },
    /// Already at `MAX_UPGRADE_LEVEL`; nothing changed
    MaxLevel,
}

/// Try to buy the next level of an upgrade with the session's score
pub fn purchase(state: &mut SessionState, id: UpgradeId) -> PurchaseOutcome {
    if state.upgrades.level(id) >= MAX_UPGRADE_LEVEL {
        return PurchaseOutcome::MaxLevel;
    }
    let cost = state.upgrades.next_cost(id);
    if state.score < cost {
        return PurchaseOutcome::InsufficientScore { cost };
    }
    state.score -= cost;
    state.level = crate::level_for_score(state.score);
    let new_level = state.upgrades.increment(id);
    PurchaseOutcome::Purchased { cost, new_level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_costs() {
        assert_eq!(UpgradeId::TapStrength.definition().cost(0), 50);
        assert_eq!(UpgradeId::TapStrength.definition().cost(1), 60);
        assert_eq!(UpgradeId::TapStrength.definition().cost(2), 72);
        assert_eq!(UpgradeId::AutoTap.definition().cost(1), 150);
        assert_eq!(UpgradeId::AutoTap.definition().cost(2), 225);
        // 200 * 1.8^2 = 648
        assert_eq!(UpgradeId::ComboMastery.definition().cost(2), 648);
    }

    #[test]
    fn test_definitions_match_ids() {
        for id in UpgradeId::ALL {
            assert_eq!(id.definition().id, id);
            assert_eq!(UpgradeId::from_str(id.as_str()), Some(id));
            assert!(id.definition().cost_multiplier > 1.0);
        }
        assert_eq!(UpgradeId::from_str("warp_drive"), None);
    }

    #[test]
    fn test_purchase_tap_strength_at_exact_cost() {
        let mut state = SessionState::new();
        state.score = 50;
        let outcome = purchase(&mut state, UpgradeId::TapStrength);
        assert_eq!(
            outcome,
            PurchaseOutcome::Purchased {
                cost: 50,
                new_level: 1
            }
        );
        assert_eq!(state.score, 0);
        assert_eq!(state.upgrades.level(UpgradeId::TapStrength), 1);
        assert_eq!(state.upgrades.next_cost(UpgradeId::TapStrength), 60);
    }

    #[test]
    fn test_purchase_rejected_changes_nothing() {
        let mut state = SessionState::new();
        state.score = 49;
        let outcome = purchase(&mut state, UpgradeId::TapStrength);
        assert_eq!(outcome, PurchaseOutcome::InsufficientScore { cost: 50 });
        assert_eq!(state.score, 49);
        assert!(state.upgrades.is_empty());
    }

    #[test]
    fn test_huge_levels_are_never_free() {
        let def = UpgradeId::ComboMastery.definition();
        assert_eq!(def.cost(3_000_000_000), u64::MAX);
        assert_eq!(def.cost(MAX_UPGRADE_LEVEL), u64::MAX);
        // Past the u64 range long before the cap
        assert_eq!(def.cost(MAX_UPGRADE_LEVEL - 1), u64::MAX);

        let mut levels = UpgradeLevels::new();
        levels.set(UpgradeId::ComboMastery, 3_000_000_000);
        assert_eq!(levels.level(UpgradeId::ComboMastery), MAX_UPGRADE_LEVEL);
        assert_eq!(levels.increment(UpgradeId::ComboMastery), MAX_UPGRADE_LEVEL);
    }

    #[test]
    fn test_purchase_at_max_level_refused() {
        let mut state = SessionState::new();
        state.score = u64::MAX;
        state.upgrades.set(UpgradeId::AutoTap, MAX_UPGRADE_LEVEL);
        assert_eq!(purchase(&mut state, UpgradeId::AutoTap), PurchaseOutcome::MaxLevel);
        assert_eq!(state.score, u64::MAX);
        assert_eq!(state.upgrades.level(UpgradeId::AutoTap), MAX_UPGRADE_LEVEL);
    }

    #[test]
    fn test_purchase_recomputes_level() {
        let mut state = SessionState::new();
        state.score = 260;
        state.level = 3;
        purchase(&mut state, UpgradeId::TapStrength);
        purchase(&mut state, UpgradeId::TapStrength);
        assert_eq!(state.score, 150);
        assert_eq!(state.level, 2);
    }

    proptest! {
        #[test]
        fn prop_cost_follows_formula(level in 0u32..20) {
            for def in UPGRADES.iter() {
                let expected = (def.base_cost as f64 * def.cost_multiplier.powf(level as f64)).round() as u64;
                prop_assert_eq!(def.cost(level), expected);
                prop_assert!(def.cost(level + 1) >= def.cost(level));
            }
        }

        #[test]
        fn prop_purchase_succeeds_iff_affordable(score in 0u64..2000, level in 0u32..6) {
            for id in UpgradeId::ALL {
                let mut state = SessionState::new();
                state.score = score;
                state.upgrades.set(id, level);
                let cost = id.definition().cost(level);
                match purchase(&mut state, id) {
                    PurchaseOutcome::Purchased { new_level, .. } => {
                        prop_assert!(score >= cost);
                        prop_assert_eq!(state.score, score - cost);
                        prop_assert_eq!(new_level, level + 1);
                    }
                    PurchaseOutcome::InsufficientScore { .. } => {
                        prop_assert!(score < cost);
                        prop_assert_eq!(state.score, score);
                        prop_assert_eq!(state.upgrades.level(id), level);
                    }
                    PurchaseOutcome::MaxLevel => prop_assert!(false, "level {} is below the cap", level),
                }
            }
        }
    }
}
