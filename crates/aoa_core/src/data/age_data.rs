//! Age tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::economy::Cost;

/// One of four ordered unlock tiers. Serialized as its level (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Age {
    /// Level 1, the starting age.
    Dark,
    /// Level 2.
    Feudal,
    /// Level 3.
    Castle,
    /// Level 4, the final age.
    Imperial,
}

impl Age {
    /// All ages in order.
    pub const ALL: [Age; 4] = [Age::Dark, Age::Feudal, Age::Castle, Age::Imperial];

    /// Numeric level, 1 through 4.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Age::Dark => 1,
            Age::Feudal => 2,
            Age::Castle => 3,
            Age::Imperial => 4,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Age::Dark => "Dark",
            Age::Feudal => "Feudal",
            Age::Castle => "Castle",
            Age::Imperial => "Imperial",
        }
    }

    /// The following age, or `None` at the last tier.
    #[must_use]
    pub const fn next(self) -> Option<Age> {
        match self {
            Age::Dark => Some(Age::Feudal),
            Age::Feudal => Some(Age::Castle),
            Age::Castle => Some(Age::Imperial),
            Age::Imperial => None,
        }
    }

    /// Cost of advancing *into* this age. The starting age has none.
    #[must_use]
    pub const fn cost_to_reach(self) -> Option<Cost> {
        match self {
            Age::Dark => None,
            Age::Feudal => Some(Cost::new(400, 200, 0)),
            Age::Castle => Some(Cost::new(500, 300, 200)),
            Age::Imperial => Some(Cost::new(0, 800, 500)),
        }
    }
}

impl From<Age> for u8 {
    fn from(age: Age) -> Self {
        age.level()
    }
}

impl TryFrom<u8> for Age {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Age::ALL
            .into_iter()
            .find(|age| age.level() == level)
            .ok_or_else(|| format!("age level must be 1-4, got {level}"))
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Age {} ({})", self.level(), self.name())
    }
}
