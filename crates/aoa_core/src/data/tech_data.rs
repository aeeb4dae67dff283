//! Blacksmith upgrades.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Age, BuildingKind};
use crate::economy::Cost;

/// Researchable upgrades. Bonuses are permanent and stack additively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// +2 attack to all units.
    #[serde(rename = "attack_1")]
    Attack1,
    /// +3 hit points to all units.
    #[serde(rename = "armor_1")]
    Armor1,
    /// +3 attack to all units.
    #[serde(rename = "attack_2")]
    Attack2,
    /// +5 hit points to all units.
    #[serde(rename = "armor_2")]
    Armor2,
}

/// Fixed stats of an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeStats {
    /// Research cost.
    pub cost: Cost,
    /// Added to the player's attack bonus.
    pub attack_bonus: u32,
    /// Added to the player's armor bonus.
    pub armor_bonus: u32,
    /// Earliest age the upgrade can be researched in.
    pub min_age: Age,
    /// Building the player must own somewhere.
    pub requires_building: Option<BuildingKind>,
    /// Upgrade that must already be researched.
    pub requires_upgrade: Option<Upgrade>,
}

const ATTACK_1: UpgradeStats = UpgradeStats {
    cost: Cost::new(200, 0, 100),
    attack_bonus: 2,
    armor_bonus: 0,
    min_age: Age::Castle,
    requires_building: Some(BuildingKind::Blacksmith),
    requires_upgrade: None,
};

const ARMOR_1: UpgradeStats = UpgradeStats {
    cost: Cost::new(0, 200, 100),
    attack_bonus: 0,
    armor_bonus: 3,
    min_age: Age::Castle,
    requires_building: Some(BuildingKind::Blacksmith),
    requires_upgrade: None,
};

const ATTACK_2: UpgradeStats = UpgradeStats {
    cost: Cost::new(0, 0, 400),
    attack_bonus: 3,
    armor_bonus: 0,
    min_age: Age::Imperial,
    requires_building: Some(BuildingKind::Blacksmith),
    requires_upgrade: Some(Upgrade::Attack1),
};

const ARMOR_2: UpgradeStats = UpgradeStats {
    cost: Cost::new(0, 300, 200),
    attack_bonus: 0,
    armor_bonus: 5,
    min_age: Age::Imperial,
    requires_building: Some(BuildingKind::Blacksmith),
    requires_upgrade: Some(Upgrade::Armor1),
};

impl Upgrade {
    /// All upgrades in canonical order.
    pub const ALL: [Upgrade; 4] = [
        Upgrade::Attack1,
        Upgrade::Armor1,
        Upgrade::Attack2,
        Upgrade::Armor2,
    ];

    /// Stats for this upgrade.
    #[must_use]
    pub const fn stats(self) -> &'static UpgradeStats {
        match self {
            Upgrade::Attack1 => &ATTACK_1,
            Upgrade::Armor1 => &ARMOR_1,
            Upgrade::Attack2 => &ATTACK_2,
            Upgrade::Armor2 => &ARMOR_2,
        }
    }

    /// Wire name of the upgrade.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Upgrade::Attack1 => "attack_1",
            Upgrade::Armor1 => "armor_1",
            Upgrade::Attack2 => "attack_2",
            Upgrade::Armor2 => "armor_2",
        }
    }

    /// Parse a wire name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|upgrade| upgrade.name() == name)
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
