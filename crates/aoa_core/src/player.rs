//! Per-player state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Age, BuildingKind, UnitKind, Upgrade, Zone};
use crate::economy::{Cost, ResourcePool, VillagerTasks};
use crate::error::Result;
use crate::production::ProductionQueue;

/// Headquarters hit points at the start of a match.
pub const HEADQUARTERS_HP: u32 = 200;

/// Villagers each player starts with.
pub const STARTING_VILLAGERS: u32 = 3;

/// Score value of each standing building.
pub const BUILDING_SCORE: u32 = 10;

/// Unit counts in one zone, keyed by type.
pub type Stack = BTreeMap<UnitKind, u32>;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    /// Side A, home zone `Base_A`.
    A,
    /// Side B, home zone `Base_B`.
    B,
}

impl PlayerId {
    /// Both sides, A first. Every per-side loop in the engine uses this order.
    pub const ALL: [PlayerId; 2] = [PlayerId::A, PlayerId::B];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::A => PlayerId::B,
            PlayerId::B => PlayerId::A,
        }
    }

    /// Position in [`PlayerId::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PlayerId::A => 0,
            PlayerId::B => 1,
        }
    }

    /// Parse "A" or "B".
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "A" => Some(PlayerId::A),
            "B" => Some(PlayerId::B),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayerId::A => "A",
            PlayerId::B => "B",
        })
    }
}

/// Everything one side owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Which side this is.
    pub id: PlayerId,
    /// Zone holding the headquarters; units spawn here.
    pub home: Zone,
    /// Stockpile.
    pub resources: ResourcePool,
    /// Units per zone. Zones and types with no units are pruned.
    pub units: BTreeMap<Zone, Stack>,
    /// Buildings per zone, one entry per building.
    pub buildings: BTreeMap<Zone, Vec<BuildingKind>>,
    /// Combined HP per durable building type per zone.
    pub building_hp: BTreeMap<Zone, BTreeMap<BuildingKind, u32>>,
    /// Headquarters HP; the side loses when it hits zero.
    pub headquarters_hp: u32,
    /// Units in training.
    pub production: ProductionQueue,
    /// Standing villager assignment.
    pub villager_tasks: VillagerTasks,
    /// Current age.
    pub age: Age,
    /// Researched upgrades.
    pub upgrades: BTreeSet<Upgrade>,
    /// Flat attack added to every unit.
    pub attack_bonus: u32,
    /// Flat HP added to every unit.
    pub armor_bonus: u32,
    /// Enemy units this side has killed.
    pub units_killed: u32,
    /// Units this side has lost.
    pub units_lost: u32,
    /// Sum of every cost component paid so far.
    pub resources_spent: u32,
}

impl PlayerState {
    /// Starting state: three villagers at home, full headquarters.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        let home = Zone::home_of(id);
        let mut player = Self {
            id,
            home,
            resources: ResourcePool::STARTING,
            units: BTreeMap::new(),
            buildings: BTreeMap::new(),
            building_hp: BTreeMap::new(),
            headquarters_hp: HEADQUARTERS_HP,
            production: ProductionQueue::new(),
            villager_tasks: VillagerTasks::new(),
            age: Age::Dark,
            upgrades: BTreeSet::new(),
            attack_bonus: 0,
            armor_bonus: 0,
            units_killed: 0,
            units_lost: 0,
            resources_spent: 0,
        };
        player.add_units(home, UnitKind::Villager, STARTING_VILLAGERS);
        player
    }

    /// Units of `kind` in `zone`.
    #[must_use]
    pub fn unit_count(&self, zone: Zone, kind: UnitKind) -> u32 {
        self.units
            .get(&zone)
            .and_then(|stack| stack.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of the living units in `zone`.
    #[must_use]
    pub fn stack(&self, zone: Zone) -> Stack {
        self.units
            .get(&zone)
            .map(|stack| {
                stack
                    .iter()
                    .filter(|(_, &n)| n > 0)
                    .map(|(&k, &n)| (k, n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether this side has any living unit in `zone`.
    #[must_use]
    pub fn has_units_in(&self, zone: Zone) -> bool {
        self.units
            .get(&zone)
            .is_some_and(|stack| stack.values().any(|&n| n > 0))
    }

    /// Zones holding at least one living unit, in zone order.
    pub fn occupied_zones(&self) -> impl Iterator<Item = Zone> + '_ {
        self.units
            .iter()
            .filter(|(_, stack)| stack.values().any(|&n| n > 0))
            .map(|(&zone, _)| zone)
    }

    /// Villagers across all zones.
    #[must_use]
    pub fn villager_count(&self) -> u32 {
        self.total_of(UnitKind::Villager)
    }

    /// Units of `kind` across all zones.
    #[must_use]
    pub fn total_of(&self, kind: UnitKind) -> u32 {
        self.units
            .values()
            .filter_map(|stack| stack.get(&kind))
            .sum()
    }

    /// Add `count` units of `kind` to `zone`.
    pub fn add_units(&mut self, zone: Zone, kind: UnitKind, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.units.entry(zone).or_default().entry(kind).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Remove up to `count` units of `kind` from `zone`.
    ///
    /// Returns how many were actually removed. Emptied entries are pruned.
    pub fn remove_units(&mut self, zone: Zone, kind: UnitKind, count: u32) -> u32 {
        let Some(stack) = self.units.get_mut(&zone) else {
            return 0;
        };
        let Some(present) = stack.get_mut(&kind) else {
            return 0;
        };
        let removed = count.min(*present);
        *present -= removed;
        if *present == 0 {
            stack.remove(&kind);
        }
        if stack.is_empty() {
            self.units.remove(&zone);
        }
        removed
    }

    /// Check whether this side owns at least one `kind` anywhere.
    #[must_use]
    pub fn owns_building(&self, kind: BuildingKind) -> bool {
        self.buildings.values().any(|list| list.contains(&kind))
    }

    /// Buildings of `kind` in `zone`.
    #[must_use]
    pub fn building_count(&self, zone: Zone, kind: BuildingKind) -> u32 {
        self.buildings
            .get(&zone)
            .map_or(0, |list| list.iter().filter(|&&b| b == kind).count() as u32)
    }

    /// Buildings across all zones.
    #[must_use]
    pub fn total_buildings(&self) -> u32 {
        self.buildings.values().map(|list| list.len() as u32).sum()
    }

    /// Place a building in `zone`, adding its HP to the zone pool if durable.
    pub fn add_building(&mut self, zone: Zone, kind: BuildingKind) {
        self.buildings.entry(zone).or_default().push(kind);
        if kind.is_durable() {
            let pool = self
                .building_hp
                .entry(zone)
                .or_default()
                .entry(kind)
                .or_insert(0);
            *pool = pool.saturating_add(kind.stats().hp);
        }
    }

    /// Remove every `kind` from `zone` along with its HP pool.
    ///
    /// Returns how many buildings were removed.
    pub fn demolish_all(&mut self, zone: Zone, kind: BuildingKind) -> u32 {
        let mut removed = 0;
        if let Some(list) = self.buildings.get_mut(&zone) {
            let before = list.len();
            list.retain(|&b| b != kind);
            removed = (before - list.len()) as u32;
            if list.is_empty() {
                self.buildings.remove(&zone);
            }
        }
        if let Some(pools) = self.building_hp.get_mut(&zone) {
            pools.remove(&kind);
            if pools.is_empty() {
                self.building_hp.remove(&zone);
            }
        }
        removed
    }

    /// Combined HP of every `kind` in `zone`.
    #[must_use]
    pub fn building_hp(&self, zone: Zone, kind: BuildingKind) -> u32 {
        self.building_hp
            .get(&zone)
            .and_then(|pools| pools.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite the HP pool of `kind` in `zone`.
    pub fn set_building_hp(&mut self, zone: Zone, kind: BuildingKind, hp: u32) {
        self.building_hp.entry(zone).or_default().insert(kind, hp);
    }

    /// Pay `cost` and record it as spent. Refuses overdrafts.
    pub fn spend(&mut self, cost: &Cost) -> Result<()> {
        self.resources.spend(cost)?;
        self.resources_spent = self.resources_spent.saturating_add(cost.total());
        Ok(())
    }

    /// Record `count` units lost by this side.
    pub fn record_losses(&mut self, count: u32) {
        self.units_lost = self.units_lost.saturating_add(count);
    }

    /// Record `count` kills by this side.
    pub fn record_kills(&mut self, count: u32) {
        self.units_killed = self.units_killed.saturating_add(count);
    }

    /// Value of every living unit.
    #[must_use]
    pub fn army_value(&self) -> u32 {
        self.units
            .values()
            .flat_map(|stack| stack.iter())
            .map(|(kind, &n)| kind.stats().value * n)
            .sum()
    }

    /// Turn-limit score: lifetime spend, twice the army value, building value.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.resources_spent + 2 * self.army_value() + BUILDING_SCORE * self.total_buildings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_state() {
        let player = PlayerState::new(PlayerId::B);
        assert_eq!(player.home, Zone::BaseB);
        assert_eq!(player.headquarters_hp, HEADQUARTERS_HP);
        assert_eq!(player.unit_count(Zone::BaseB, UnitKind::Villager), 3);
        assert_eq!(player.resources, ResourcePool::new(200, 150, 50));
        assert_eq!(player.age, Age::Dark);
        assert!(player.villager_tasks.is_empty());
        // 3 villagers at 25 each, doubled
        assert_eq!(player.score(), 150);
    }

    #[test]
    fn test_remove_units_clamps_and_prunes() {
        let mut player = PlayerState::new(PlayerId::A);
        player.add_units(Zone::MidA, UnitKind::Militia, 2);
        assert_eq!(player.remove_units(Zone::MidA, UnitKind::Militia, 5), 2);
        assert!(!player.has_units_in(Zone::MidA));
        assert!(!player.units.contains_key(&Zone::MidA));
        assert_eq!(player.remove_units(Zone::TopA, UnitKind::Knight, 1), 0);
    }

    #[test]
    fn test_durable_buildings_pool_hp() {
        let mut player = PlayerState::new(PlayerId::A);
        player.add_building(Zone::BaseA, BuildingKind::Wall);
        player.add_building(Zone::BaseA, BuildingKind::Wall);
        player.add_building(Zone::BaseA, BuildingKind::Barracks);
        assert_eq!(player.building_hp(Zone::BaseA, BuildingKind::Wall), 200);
        assert_eq!(player.building_hp(Zone::BaseA, BuildingKind::Barracks), 0);
        assert_eq!(player.building_count(Zone::BaseA, BuildingKind::Wall), 2);

        assert_eq!(player.demolish_all(Zone::BaseA, BuildingKind::Wall), 2);
        assert_eq!(player.building_hp(Zone::BaseA, BuildingKind::Wall), 0);
        assert!(player.owns_building(BuildingKind::Barracks));
        assert!(!player.owns_building(BuildingKind::Wall));
    }

    #[test]
    fn test_spend_tracks_total() {
        let mut player = PlayerState::new(PlayerId::A);
        player.spend(&Cost::new(50, 30, 10)).expect("affordable");
        assert_eq!(player.resources_spent, 90);
        assert!(player.spend(&Cost::new(0, 0, 500)).is_err());
        assert_eq!(player.resources_spent, 90);
    }

    #[test]
    fn test_score_components() {
        let mut player = PlayerState::new(PlayerId::A);
        player.add_units(Zone::MidA, UnitKind::Knight, 1);
        player.add_building(Zone::BaseA, BuildingKind::Tower);
        player.resources_spent = 100;
        player.units_killed = 4;
        // kills do not count
        assert_eq!(player.score(), 100 + 2 * (75 + 40) + 10);
    }

    #[test]
    fn test_player_id_serde() {
        assert_eq!(serde_json::to_value(PlayerId::A).expect("serializes"), "A");
        assert_eq!(PlayerId::B.opponent(), PlayerId::A);
        assert_eq!(PlayerId::from_name("B"), Some(PlayerId::B));
    }
}
