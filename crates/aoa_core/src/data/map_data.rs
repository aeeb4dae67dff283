//! The three-lane map.
//!
//! ```text
//!          [Top_A] ────── [Top_B]
//!         /   |                |   \
//! [Base_A]  [Mid_A] ────── [Mid_B]  [Base_B]
//!         \   |                |   /
//!          [Bot_A] ────── [Bot_B]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// One of the eight fixed map regions.
///
/// Declaration order is the canonical zone order: combat resolves zones in
/// this order and ordered maps keyed by zone iterate in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Side A headquarters.
    #[serde(rename = "Base_A")]
    BaseA,
    /// Side A top lane.
    #[serde(rename = "Top_A")]
    TopA,
    /// Side A middle lane.
    #[serde(rename = "Mid_A")]
    MidA,
    /// Side A bottom lane.
    #[serde(rename = "Bot_A")]
    BotA,
    /// Side B top lane.
    #[serde(rename = "Top_B")]
    TopB,
    /// Side B middle lane.
    #[serde(rename = "Mid_B")]
    MidB,
    /// Side B bottom lane.
    #[serde(rename = "Bot_B")]
    BotB,
    /// Side B headquarters.
    #[serde(rename = "Base_B")]
    BaseB,
}

impl Zone {
    /// All zones in canonical order.
    pub const ALL: [Zone; 8] = [
        Zone::BaseA,
        Zone::TopA,
        Zone::MidA,
        Zone::BotA,
        Zone::TopB,
        Zone::MidB,
        Zone::BotB,
        Zone::BaseB,
    ];

    /// Wire name of the zone.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Zone::BaseA => "Base_A",
            Zone::TopA => "Top_A",
            Zone::MidA => "Mid_A",
            Zone::BotA => "Bot_A",
            Zone::TopB => "Top_B",
            Zone::MidB => "Mid_B",
            Zone::BotB => "Bot_B",
            Zone::BaseB => "Base_B",
        }
    }

    /// Parse a wire name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| zone.name() == name)
    }

    /// Zones reachable from this one in a single move.
    #[must_use]
    pub const fn neighbors(self) -> &'static [Zone] {
        match self {
            Zone::BaseA => &[Zone::TopA, Zone::MidA, Zone::BotA],
            Zone::TopA => &[Zone::BaseA, Zone::MidA, Zone::TopB],
            Zone::MidA => &[Zone::BaseA, Zone::TopA, Zone::BotA, Zone::MidB],
            Zone::BotA => &[Zone::BaseA, Zone::MidA, Zone::BotB],
            Zone::TopB => &[Zone::TopA, Zone::MidB, Zone::BaseB],
            Zone::MidB => &[Zone::MidA, Zone::TopB, Zone::BotB, Zone::BaseB],
            Zone::BotB => &[Zone::BotA, Zone::MidB, Zone::BaseB],
            Zone::BaseB => &[Zone::TopB, Zone::MidB, Zone::BotB],
        }
    }

    /// Check whether a unit can move from `self` to `other` in one step.
    #[must_use]
    pub fn is_adjacent(self, other: Zone) -> bool {
        self.neighbors().contains(&other)
    }

    /// The side whose half of the map this zone lies in.
    #[must_use]
    pub const fn half(self) -> PlayerId {
        match self {
            Zone::BaseA | Zone::TopA | Zone::MidA | Zone::BotA => PlayerId::A,
            Zone::TopB | Zone::MidB | Zone::BotB | Zone::BaseB => PlayerId::B,
        }
    }

    /// Headquarters zone of a side.
    #[must_use]
    pub const fn home_of(player: PlayerId) -> Zone {
        match player {
            PlayerId::A => Zone::BaseA,
            PlayerId::B => Zone::BaseB,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
