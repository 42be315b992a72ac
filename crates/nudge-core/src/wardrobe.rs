//! Cosmetic accessory unlocks.
//!
//! Accessories are bought with snowflakes at a fixed price per tier and can
//! then be equipped freely. Any number of accessories may be worn at once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{AccessoryDef, WardrobeConfig};
use crate::error::{EngineError, Result};

/// Price tier of an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessoryTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

/// Catalog plus price table.
#[derive(Debug, Clone, Default)]
pub struct Wardrobe {
    config: WardrobeConfig,
}

impl Wardrobe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WardrobeConfig) -> Self {
        Self { config }
    }

    pub fn catalog(&self) -> &[AccessoryDef] {
        &self.config.catalog
    }

    pub fn find(&self, accessory_id: &str) -> Option<&AccessoryDef> {
        self.config.catalog.iter().find(|a| a.id == accessory_id)
    }

    pub fn tier_cost(&self, tier: AccessoryTier) -> u64 {
        let costs = &self.config.tier_costs;
        match tier {
            AccessoryTier::Tier1 => costs.tier1,
            AccessoryTier::Tier2 => costs.tier2,
            AccessoryTier::Tier3 => costs.tier3,
            AccessoryTier::Tier4 => costs.tier4,
        }
    }

    /// Price of a catalog accessory.
    pub fn cost_of(&self, accessory_id: &str) -> Result<u64> {
        self.find(accessory_id)
            .map(|a| self.tier_cost(a.tier))
            .ok_or_else(|| EngineError::UnknownAccessory(accessory_id.to_string()))
    }

    /// Buy an accessory. All checks run before anything is touched, so a
    /// failure leaves both `balance` and `unlocked` as they were.
    ///
    /// Returns the new balance.
    pub fn unlock(
        &self,
        accessory_id: &str,
        balance: &mut u64,
        unlocked: &mut BTreeSet<String>,
    ) -> Result<u64> {
        let cost = self.cost_of(accessory_id)?;

        if unlocked.contains(accessory_id) {
            return Err(EngineError::AlreadyUnlocked(accessory_id.to_string()));
        }

        if *balance < cost {
            warn!(accessory_id, cost, balance = *balance, "unlock rejected");
            return Err(EngineError::InsufficientCurrency {
                cost,
                balance: *balance,
            });
        }

        *balance -= cost;
        unlocked.insert(accessory_id.to_string());
        Ok(*balance)
    }

    /// Flip whether an unlocked accessory is worn. Returns the new state.
    pub fn toggle_equip(
        &self,
        accessory_id: &str,
        unlocked: &BTreeSet<String>,
        equipped: &mut BTreeSet<String>,
    ) -> Result<bool> {
        if !unlocked.contains(accessory_id) {
            return Err(EngineError::AccessoryNotUnlocked(accessory_id.to_string()));
        }

        if equipped.remove(accessory_id) {
            Ok(false)
        } else {
            equipped.insert(accessory_id.to_string());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // top_hat is tier 3 (30) in the default catalog
    #[test]
    fn insufficient_balance_changes_nothing() {
        let wardrobe = Wardrobe::new();
        let mut balance = 25;
        let mut unlocked = BTreeSet::new();

        let err = wardrobe
            .unlock("top_hat", &mut balance, &mut unlocked)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InsufficientCurrency {
                cost: 30,
                balance: 25
            }
        ));
        assert_eq!(balance, 25);
        assert!(unlocked.is_empty());
    }

    #[test]
    fn exact_balance_unlocks() {
        let wardrobe = Wardrobe::new();
        let mut balance = 30;
        let mut unlocked = BTreeSet::new();

        let left = wardrobe
            .unlock("top_hat", &mut balance, &mut unlocked)
            .unwrap();

        assert_eq!(left, 0);
        assert_eq!(balance, 0);
        assert!(unlocked.contains("top_hat"));
    }

    #[test]
    fn unknown_and_duplicate_unlocks_fail() {
        let wardrobe = Wardrobe::new();
        let mut balance = 100;
        let mut unlocked = BTreeSet::new();

        assert!(matches!(
            wardrobe.unlock("jetpack", &mut balance, &mut unlocked),
            Err(EngineError::UnknownAccessory(_))
        ));

        wardrobe.unlock("scarf", &mut balance, &mut unlocked).unwrap();
        assert_eq!(balance, 95);
        assert!(matches!(
            wardrobe.unlock("scarf", &mut balance, &mut unlocked),
            Err(EngineError::AlreadyUnlocked(_))
        ));
        assert_eq!(balance, 95);
    }

    #[test]
    fn tier_costs() {
        let wardrobe = Wardrobe::new();
        assert_eq!(wardrobe.cost_of("scarf").unwrap(), 5);
        assert_eq!(wardrobe.cost_of("sunglasses").unwrap(), 15);
        assert_eq!(wardrobe.cost_of("top_hat").unwrap(), 30);
        assert_eq!(wardrobe.cost_of("crown").unwrap(), 50);
    }

    #[test]
    fn equip_requires_unlock_and_toggles() {
        let wardrobe = Wardrobe::new();
        let mut unlocked = BTreeSet::new();
        let mut equipped = BTreeSet::new();

        assert!(matches!(
            wardrobe.toggle_equip("scarf", &unlocked, &mut equipped),
            Err(EngineError::AccessoryNotUnlocked(_))
        ));
        assert!(equipped.is_empty());

        unlocked.insert("scarf".to_string());
        unlocked.insert("crown".to_string());
        assert!(wardrobe.toggle_equip("scarf", &unlocked, &mut equipped).unwrap());
        assert!(wardrobe.toggle_equip("crown", &unlocked, &mut equipped).unwrap());
        assert_eq!(equipped.len(), 2);

        assert!(!wardrobe.toggle_equip("scarf", &unlocked, &mut equipped).unwrap());
        assert!(!equipped.contains("scarf"));
    }
}
