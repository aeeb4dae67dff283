//! Test fixtures and helpers.
//!
//! Pre-built world states for consistent testing.

use aoa_core::data::{Age, BuildingKind, UnitKind, Upgrade, Zone};
use aoa_core::economy::ResourcePool;
use aoa_core::player::{PlayerId, Stack};
use aoa_core::world::WorldState;
/// Build a unit stack from `(type, count)` pairs.
#[must_use]
pub fn stack(entries: &[(UnitKind, u32)]) -> Stack {
    entries.iter().copied().collect()
}

/// Fluent builder over [`WorldState::new_game`].
///
/// # Example
///
/// ```
/// use aoa_core::data::{UnitKind, Zone};
/// use aoa_core::player::PlayerId;
/// use aoa_test_utils::fixtures::WorldBuilder;
///
/// let world = WorldBuilder::new()
///     .units(PlayerId::A, Zone::MidA, UnitKind::Knight, 2)
///     .units(PlayerId::B, Zone::MidA, UnitKind::Militia, 3)
///     .build();
/// assert_eq!(world.player(PlayerId::B).unit_count(Zone::MidA, UnitKind::Militia), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    world: WorldState,
}

impl WorldBuilder {
    /// Start from the opening state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the turn counter.
    #[must_use]
    pub fn turn(mut self, turn: u32) -> Self {
        self.world.turn = turn;
        self
    }

    /// Overwrite a side's stockpile.
    #[must_use]
    pub fn resources(mut self, id: PlayerId, food: u32, wood: u32, gold: u32) -> Self {
        self.world.player_mut(id).resources = ResourcePool::new(food, wood, gold);
        self
    }

    /// Set a side's age.
    #[must_use]
    pub fn age(mut self, id: PlayerId, age: Age) -> Self {
        self.world.player_mut(id).age = age;
        self
    }

    /// Add units to a zone.
    #[must_use]
    pub fn units(mut self, id: PlayerId, zone: Zone, kind: UnitKind, count: u32) -> Self {
        self.world.player_mut(id).add_units(zone, kind, count);
        self
    }

    /// Remove every unit a side has, villagers included.
    #[must_use]
    pub fn no_units(mut self, id: PlayerId) -> Self {
        self.world.player_mut(id).units.clear();
        self
    }

    /// Place a building.
    #[must_use]
    pub fn building(mut self, id: PlayerId, zone: Zone, kind: BuildingKind) -> Self {
        self.world.player_mut(id).add_building(zone, kind);
        self
    }

    /// Overwrite a side's Wall pool in a zone. A Wall must already stand there.
    #[must_use]
    pub fn wall_hp(mut self, id: PlayerId, zone: Zone, hp: u32) -> Self {
        self.world
            .player_mut(id)
            .set_building_hp(zone, BuildingKind::Wall, hp);
        self
    }

    /// Set a side's headquarters HP.
    #[must_use]
    pub fn headquarters(mut self, id: PlayerId, hp: u32) -> Self {
        self.world.player_mut(id).headquarters_hp = hp;
        self
    }

    /// Mark an upgrade researched and apply its bonuses.
    #[must_use]
    pub fn upgrade(mut self, id: PlayerId, upgrade: Upgrade) -> Self {
        let player = self.world.player_mut(id);
        if player.upgrades.insert(upgrade) {
            player.attack_bonus += upgrade.stats().attack_bonus;
            player.armor_bonus += upgrade.stats().armor_bonus;
        }
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> WorldState {
        self.world
    }
}

/// Both sides in the Castle age with plenty of resources and every
/// production building at home.
#[must_use]
pub fn castle_age_world() -> WorldState {
    let mut builder = WorldBuilder::new();
    for id in PlayerId::ALL {
        let home = Zone::home_of(id);
        builder = builder
            .age(id, Age::Castle)
            .resources(id, 2000, 2000, 2000)
            .building(id, home, BuildingKind::Barracks)
            .building(id, home, BuildingKind::Range)
            .building(id, home, BuildingKind::Blacksmith);
    }
    builder.build()
}

/// The textbook skirmish: two Knights of A against three Militia of B in
/// `Mid_A`, no bonuses.
#[must_use]
pub fn knights_vs_militia() -> WorldState {
    WorldBuilder::new()
        .units(PlayerId::A, Zone::MidA, UnitKind::Knight, 2)
        .units(PlayerId::B, Zone::MidA, UnitKind::Militia, 3)
        .build()
}
