//! Fog-of-war views.
//!
//! An [`Observation`] is what one side is allowed to see: its own state in
//! full, enemy units only in zones it occupies or in its own half of the
//! map, the enemy's age and headquarters HP, and the tail of the log.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::{Age, BuildingKind, Upgrade, Zone};
use crate::economy::{ResourcePool, VillagerTasks};
use crate::player::{PlayerId, PlayerState, Stack};
use crate::production::ProductionItem;
use crate::world::WorldState;

/// Default number of log lines included in an observation.
pub const DEFAULT_RECENT_LINES: usize = 5;

/// The observer's own state, in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnState {
    /// Stockpile.
    pub resources: ResourcePool,
    /// Units per zone; empty zones omitted.
    pub units: BTreeMap<Zone, Stack>,
    /// Buildings per zone.
    pub buildings: BTreeMap<Zone, Vec<BuildingKind>>,
    /// Wall and Tower HP pools per zone.
    pub building_hp: BTreeMap<Zone, BTreeMap<BuildingKind, u32>>,
    /// Headquarters HP.
    pub headquarters_hp: u32,
    /// Units in training.
    pub production_queue: Vec<ProductionItem>,
    /// Current age.
    pub age: Age,
    /// Standing villager assignment.
    pub villager_tasks: VillagerTasks,
    /// Researched upgrades.
    pub upgrades: BTreeSet<Upgrade>,
    /// Flat attack bonus.
    pub attack_bonus: u32,
    /// Flat HP bonus.
    pub armor_bonus: u32,
}

impl OwnState {
    fn of(player: &PlayerState) -> Self {
        Self {
            resources: player.resources,
            units: player
                .occupied_zones()
                .map(|zone| (zone, player.stack(zone)))
                .collect(),
            buildings: player
                .buildings
                .iter()
                .filter(|(_, list)| !list.is_empty())
                .map(|(&zone, list)| (zone, list.clone()))
                .collect(),
            building_hp: player.building_hp.clone(),
            headquarters_hp: player.headquarters_hp,
            production_queue: player.production.items().to_vec(),
            age: player.age,
            villager_tasks: player.villager_tasks.clone(),
            upgrades: player.upgrades.clone(),
            attack_bonus: player.attack_bonus,
            armor_bonus: player.armor_bonus,
        }
    }
}

/// What the observer sees in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneView {
    /// The observer's units.
    pub your_units: Stack,
    /// Enemy units; empty when the zone is fogged.
    pub enemy_units: Stack,
}

/// One side's view of the match at the start of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Current turn.
    pub turn: u32,
    /// Observer.
    pub you: PlayerId,
    /// Observer's full state.
    pub your_state: OwnState,
    /// Every zone, with enemy units masked by fog.
    pub visible_zones: BTreeMap<Zone, ZoneView>,
    /// Enemy age, always visible.
    pub enemy_age: Age,
    /// Enemy headquarters HP, always visible.
    pub enemy_headquarters_hp: u32,
    /// Most recent log lines, oldest first.
    pub recent_events: Vec<String>,
}

impl Observation {
    /// Check whether the observer can see enemy units in `zone`.
    #[must_use]
    pub fn sees(world: &WorldState, side: PlayerId, zone: Zone) -> bool {
        zone.half() == side || world.player(side).has_units_in(zone)
    }
}

/// Build `side`'s view of `world` with the last `recent_lines` log entries.
#[must_use]
pub fn build_observation(world: &WorldState, side: PlayerId, recent_lines: usize) -> Observation {
    let me = world.player(side);
    let enemy = world.player(side.opponent());

    let visible_zones = Zone::ALL
        .into_iter()
        .map(|zone| {
            let enemy_units = if Observation::sees(world, side, zone) {
                enemy.stack(zone)
            } else {
                Stack::new()
            };
            let view = ZoneView {
                your_units: me.stack(zone),
                enemy_units,
            };
            (zone, view)
        })
        .collect();

    Observation {
        turn: world.turn,
        you: side,
        your_state: OwnState::of(me),
        visible_zones,
        enemy_age: enemy.age,
        enemy_headquarters_hp: enemy.headquarters_hp,
        recent_events: world.recent_log(recent_lines),
    }
}
