//! Unit definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Age, BuildingKind};
use crate::economy::Cost;

/// The five trainable unit types.
///
/// Declaration order is the canonical unit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Worker; gathers resources, weak in a fight.
    Villager,
    /// Cheap infantry.
    Militia,
    /// Ranged unit, strong against infantry.
    Archer,
    /// Heavy cavalry, strong against archers.
    Knight,
    /// Siege engine, strong against anything it finds.
    Catapult,
}

/// Which defenders trigger a unit's counter bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Counter {
    /// Any Villager or Militia among the defenders.
    Infantry,
    /// A specific unit type among the defenders.
    Unit(UnitKind),
    /// Any living defender at all.
    AnyPresent,
}

/// Fixed stats of a unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitStats {
    /// Per-unit training cost.
    pub cost: Cost,
    /// Hit points before armor bonus.
    pub hp: u32,
    /// Attack before attack bonus.
    pub attack: u32,
    /// Counter relationship, if any.
    pub counter: Option<Counter>,
    /// Turns spent in the production queue.
    pub train_turns: u32,
    /// Earliest age the unit can be trained in.
    pub min_age: Age,
    /// Building that must exist somewhere before training.
    pub requires: Option<BuildingKind>,
    /// Score value per living unit.
    pub value: u32,
}

const VILLAGER: UnitStats = UnitStats {
    cost: Cost::new(50, 0, 0),
    hp: 5,
    attack: 1,
    counter: None,
    train_turns: 1,
    min_age: Age::Dark,
    requires: None,
    value: 25,
};

const MILITIA: UnitStats = UnitStats {
    cost: Cost::new(60, 0, 0),
    hp: 8,
    attack: 3,
    counter: None,
    train_turns: 1,
    min_age: Age::Feudal,
    requires: Some(BuildingKind::Barracks),
    value: 30,
};

const ARCHER: UnitStats = UnitStats {
    cost: Cost::new(0, 60, 0),
    hp: 6,
    attack: 4,
    counter: Some(Counter::Infantry),
    train_turns: 2,
    min_age: Age::Feudal,
    requires: Some(BuildingKind::Range),
    value: 30,
};

const KNIGHT: UnitStats = UnitStats {
    cost: Cost::new(0, 0, 80),
    hp: 15,
    attack: 6,
    counter: Some(Counter::Unit(UnitKind::Archer)),
    train_turns: 3,
    min_age: Age::Castle,
    requires: Some(BuildingKind::Barracks),
    value: 40,
};

const CATAPULT: UnitStats = UnitStats {
    cost: Cost::new(0, 50, 100),
    hp: 10,
    attack: 12,
    counter: Some(Counter::AnyPresent),
    train_turns: 4,
    min_age: Age::Castle,
    requires: None,
    value: 75,
};

impl UnitKind {
    /// All unit types in canonical order.
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Villager,
        UnitKind::Militia,
        UnitKind::Archer,
        UnitKind::Knight,
        UnitKind::Catapult,
    ];

    /// Stats for this unit type.
    #[must_use]
    pub const fn stats(self) -> &'static UnitStats {
        match self {
            UnitKind::Villager => &VILLAGER,
            UnitKind::Militia => &MILITIA,
            UnitKind::Archer => &ARCHER,
            UnitKind::Knight => &KNIGHT,
            UnitKind::Catapult => &CATAPULT,
        }
    }

    /// Wire name of the unit type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Villager => "Villager",
            UnitKind::Militia => "Militia",
            UnitKind::Archer => "Archer",
            UnitKind::Knight => "Knight",
            UnitKind::Catapult => "Catapult",
        }
    }

    /// Parse a wire name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Villagers and Militia form the infantry class.
    #[must_use]
    pub const fn is_infantry(self) -> bool {
        matches!(self, UnitKind::Villager | UnitKind::Militia)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_table_values() {
        let knight = UnitKind::Knight.stats();
        assert_eq!(knight.hp, 15);
        assert_eq!(knight.attack, 6);
        assert_eq!(knight.cost, Cost::new(0, 0, 80));
        assert_eq!(knight.counter, Some(Counter::Unit(UnitKind::Archer)));

        let catapult = UnitKind::Catapult.stats();
        assert_eq!(catapult.train_turns, 4);
        assert_eq!(catapult.counter, Some(Counter::AnyPresent));
        assert_eq!(catapult.requires, None);
    }

    #[test]
    fn test_age_gates() {
        assert_eq!(UnitKind::Villager.stats().min_age, Age::Dark);
        assert_eq!(UnitKind::Militia.stats().min_age, Age::Feudal);
        assert_eq!(UnitKind::Archer.stats().min_age, Age::Feudal);
        assert_eq!(UnitKind::Knight.stats().min_age, Age::Castle);
        assert_eq!(UnitKind::Catapult.stats().min_age, Age::Castle);
    }

    #[test]
    fn test_hit_points_are_distinct() {
        let mut hps: Vec<u32> = UnitKind::ALL.iter().map(|u| u.stats().hp).collect();
        hps.sort_unstable();
        hps.dedup();
        assert_eq!(hps.len(), UnitKind::ALL.len());
    }

    #[test]
    fn test_infantry_class() {
        assert!(UnitKind::Villager.is_infantry());
        assert!(UnitKind::Militia.is_infantry());
        assert!(!UnitKind::Archer.is_infantry());
        assert!(!UnitKind::Knight.is_infantry());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(UnitKind::from_name("Archer"), Some(UnitKind::Archer));
        assert_eq!(UnitKind::from_name("archer"), None);
        assert_eq!(UnitKind::from_name("Dragon"), None);
    }
}
