//! Static rule tables.
//!
//! Zones and adjacency, unit, building and upgrade stats, age gating.
//! Everything here is `const` data behind `match` on small enums: the tables
//! have no lifecycle and are never mutated at runtime.

mod age_data;
mod building_data;
mod map_data;
mod tech_data;
mod unit_data;

pub use age_data::Age;
pub use building_data::{BuildingKind, BuildingStats};
pub use map_data::Zone;
pub use tech_data::{Upgrade, UpgradeStats};
pub use unit_data::{Counter, UnitKind, UnitStats};

use serde::Serialize;

/// Serializable snapshot of every rule table, for tooling and agent prompts.
#[derive(Debug, Clone, Serialize)]
pub struct RuleBook {
    /// Zone adjacency lists in zone order.
    pub adjacency: Vec<(Zone, &'static [Zone])>,
    /// Unit stats in unit order.
    pub units: Vec<(UnitKind, &'static UnitStats)>,
    /// Building stats in building order.
    pub buildings: Vec<(BuildingKind, &'static BuildingStats)>,
    /// Upgrade stats in upgrade order.
    pub upgrades: Vec<(Upgrade, &'static UpgradeStats)>,
    /// Cost of reaching each age beyond the first.
    pub age_costs: Vec<(Age, crate::economy::Cost)>,
}

impl RuleBook {
    /// Collect all tables.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            adjacency: Zone::ALL.iter().map(|&z| (z, z.neighbors())).collect(),
            units: UnitKind::ALL.iter().map(|&u| (u, u.stats())).collect(),
            buildings: BuildingKind::ALL.iter().map(|&b| (b, b.stats())).collect(),
            upgrades: Upgrade::ALL.iter().map(|&u| (u, u.stats())).collect(),
            age_costs: Age::ALL
                .iter()
                .filter_map(|&age| age.cost_to_reach().map(|cost| (age, cost)))
                .collect(),
        }
    }
}
