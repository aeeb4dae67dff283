//! Building definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Age;
use crate::economy::Cost;

/// The five constructible building types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Enables Militia and Knights.
    Barracks,
    /// Enables Archers.
    Range,
    /// Absorbs damage aimed at the headquarters in its zone.
    Wall,
    /// Fires at enemy units in its zone every turn.
    Tower,
    /// Enables upgrade research.
    Blacksmith,
}

/// Fixed stats of a building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildingStats {
    /// Construction cost.
    pub cost: Cost,
    /// Base hit points added to the zone's pool on construction.
    pub hp: u32,
    /// Earliest age the building can be constructed in.
    pub min_age: Age,
}

const BARRACKS: BuildingStats = BuildingStats {
    cost: Cost::new(0, 100, 0),
    hp: 50,
    min_age: Age::Feudal,
};

const RANGE: BuildingStats = BuildingStats {
    cost: Cost::new(0, 80, 0),
    hp: 40,
    min_age: Age::Feudal,
};

const WALL: BuildingStats = BuildingStats {
    cost: Cost::new(0, 50, 0),
    hp: 100,
    min_age: Age::Castle,
};

const TOWER: BuildingStats = BuildingStats {
    cost: Cost::new(0, 80, 50),
    hp: 60,
    min_age: Age::Castle,
};

const BLACKSMITH: BuildingStats = BuildingStats {
    cost: Cost::new(0, 150, 100),
    hp: 0,
    min_age: Age::Castle,
};

impl BuildingKind {
    /// All building types in canonical order.
    pub const ALL: [BuildingKind; 5] = [
        BuildingKind::Barracks,
        BuildingKind::Range,
        BuildingKind::Wall,
        BuildingKind::Tower,
        BuildingKind::Blacksmith,
    ];

    /// Stats for this building type.
    #[must_use]
    pub const fn stats(self) -> &'static BuildingStats {
        match self {
            BuildingKind::Barracks => &BARRACKS,
            BuildingKind::Range => &RANGE,
            BuildingKind::Wall => &WALL,
            BuildingKind::Tower => &TOWER,
            BuildingKind::Blacksmith => &BLACKSMITH,
        }
    }

    /// Wire name of the building type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::Barracks => "Barracks",
            BuildingKind::Range => "Range",
            BuildingKind::Wall => "Wall",
            BuildingKind::Tower => "Tower",
            BuildingKind::Blacksmith => "Blacksmith",
        }
    }

    /// Parse a wire name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the building keeps a hit-point pool.
    ///
    /// Only the defensive structures track durability; the others have
    /// instantaneous effects.
    #[must_use]
    pub const fn is_durable(self) -> bool {
        matches!(self, BuildingKind::Wall | BuildingKind::Tower)
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
