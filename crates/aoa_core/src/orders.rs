//! Intent validation.
//!
//! Agents submit arbitrary JSON. [`validate_action`] turns it into a typed
//! [`Action`] containing only the sub-orders that pass the rules against the
//! submitting player's state *before* anything this turn is applied. Invalid
//! sub-orders are dropped silently; nothing here ever fails.
//!
//! Each category is checked on its own against the unmodified state, so
//! combined sub-orders may still exceed the player's resources. The resolver
//! re-checks affordability as it applies them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::{BuildingKind, UnitKind, Upgrade, Zone};
use crate::economy::{Resource, VillagerTasks};
use crate::player::PlayerState;

/// Queue `count` units of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainOrder {
    /// Unit type.
    pub unit: UnitKind,
    /// Number to queue, at least 1.
    pub count: u32,
}

/// Construct one building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildOrder {
    /// Building type.
    pub building: BuildingKind,
    /// Target zone; the player's home when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
}

/// Move units between adjacent zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveOrder {
    /// Unit type.
    pub unit: UnitKind,
    /// Number to move, at least 1.
    pub count: u32,
    /// Source zone.
    pub from: Zone,
    /// Destination zone, adjacent to `from`.
    pub to: Zone,
}

/// Research one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResearchOrder {
    /// Upgrade to research.
    pub upgrade: Upgrade,
}

/// A validated set of orders for one turn.
///
/// Serializes in the same shape agents submit, so a validated action fed
/// back through [`validate_action`] comes out unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Units to queue.
    pub train: Vec<TrainOrder>,
    /// Buildings to construct.
    pub build: Vec<BuildOrder>,
    /// Unit movements.
    #[serde(rename = "move")]
    pub moves: Vec<MoveOrder>,
    /// Reserved; always empty. Combat is implicit in zone co-occupancy.
    pub attack: Vec<Value>,
    /// Advance to the next age.
    pub advance_age: bool,
    /// Replacement villager assignment; empty keeps the standing one.
    pub task_villagers: VillagerTasks,
    /// Upgrades to research.
    pub research: Vec<ResearchOrder>,
}

impl Action {
    /// Check whether the action carries no orders at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.train.is_empty()
            && self.build.is_empty()
            && self.moves.is_empty()
            && !self.advance_age
            && self.task_villagers.is_empty()
            && self.research.is_empty()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.advance_age {
            parts.push("advance age".to_string());
        }
        if !self.task_villagers.is_empty() {
            parts.push(format!("tasks [{}]", self.task_villagers));
        }
        for order in &self.research {
            parts.push(format!("research {}", order.upgrade));
        }
        for order in &self.build {
            match order.zone {
                Some(zone) => parts.push(format!("build {}@{zone}", order.building)),
                None => parts.push(format!("build {}", order.building)),
            }
        }
        for order in &self.train {
            parts.push(format!("train {}x{}", order.count, order.unit));
        }
        for order in &self.moves {
            parts.push(format!(
                "move {}x{} {}->{}",
                order.count, order.unit, order.from, order.to
            ));
        }
        if parts.is_empty() {
            f.write_str("no orders")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

/// Filter a raw intent down to the orders `player` may legally issue.
///
/// Anything that is not a JSON object yields the empty action. Unknown keys
/// are ignored.
#[must_use]
pub fn validate_action(raw: &Value, player: &PlayerState) -> Action {
    let Some(intent) = raw.as_object() else {
        return Action::default();
    };
    Action {
        train: objects(intent.get("train"))
            .filter_map(|item| validate_train(item, player))
            .collect(),
        build: objects(intent.get("build"))
            .filter_map(|item| validate_build(item, player))
            .collect(),
        moves: objects(intent.get("move"))
            .filter_map(|item| validate_move(item, player))
            .collect(),
        attack: Vec::new(),
        advance_age: validate_advance(intent.get("advance_age"), player),
        task_villagers: validate_tasks(intent.get("task_villagers"), player),
        research: objects(intent.get("research"))
            .filter_map(|item| validate_research(item, player))
            .collect(),
    }
}

/// The object items of a list field. Non-lists and non-object items vanish.
fn objects(field: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    field
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// A `count` field: absent means 1; otherwise a positive integer.
fn count(item: &Map<String, Value>) -> Option<u32> {
    match item.get("count") {
        None => Some(1),
        Some(value) => value
            .as_u64()
            .filter(|&n| n >= 1)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
    }
}

fn named<T>(item: &Map<String, Value>, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    item.get(key).and_then(Value::as_str).and_then(parse)
}

fn validate_train(item: &Map<String, Value>, player: &PlayerState) -> Option<TrainOrder> {
    let unit = named(item, "unit", UnitKind::from_name)?;
    let requested = count(item)?;
    let stats = unit.stats();
    if player.age < stats.min_age {
        return None;
    }
    if let Some(building) = stats.requires {
        if !player.owns_building(building) {
            return None;
        }
    }
    let affordable = player.resources.max_affordable(&stats.cost, requested);
    (affordable > 0).then_some(TrainOrder {
        unit,
        count: affordable,
    })
}

fn validate_build(item: &Map<String, Value>, player: &PlayerState) -> Option<BuildOrder> {
    let building = named(item, "building", BuildingKind::from_name)?;
    let zone = match item.get("zone") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_str().and_then(Zone::from_name)?),
    };
    let stats = building.stats();
    if player.age < stats.min_age || !player.resources.can_afford(&stats.cost) {
        return None;
    }
    Some(BuildOrder { building, zone })
}

fn validate_move(item: &Map<String, Value>, player: &PlayerState) -> Option<MoveOrder> {
    let unit = named(item, "unit", UnitKind::from_name)?;
    let requested = count(item)?;
    let from = named(item, "from", Zone::from_name)?;
    let to = named(item, "to", Zone::from_name)?;
    if !from.is_adjacent(to) {
        return None;
    }
    let present = player.unit_count(from, unit);
    if present == 0 {
        return None;
    }
    Some(MoveOrder {
        unit,
        count: requested.min(present),
        from,
        to,
    })
}

fn validate_advance(field: Option<&Value>, player: &PlayerState) -> bool {
    if field.and_then(Value::as_bool) != Some(true) {
        return false;
    }
    player
        .age
        .next()
        .and_then(|next| next.cost_to_reach())
        .is_some_and(|cost| player.resources.can_afford(&cost))
}

fn validate_tasks(field: Option<&Value>, player: &PlayerState) -> VillagerTasks {
    let Some(entries) = field.and_then(Value::as_object) else {
        return VillagerTasks::new();
    };
    let requested: VillagerTasks = entries
        .iter()
        .filter_map(|(key, value)| {
            let resource = Resource::from_name(key)?;
            let n = u32::try_from(value.as_u64()?).unwrap_or(u32::MAX);
            Some((resource, n))
        })
        .collect();
    requested.clamped_to(player.villager_count())
}

fn validate_research(item: &Map<String, Value>, player: &PlayerState) -> Option<ResearchOrder> {
    let upgrade = named(item, "upgrade", Upgrade::from_name)?;
    if player.upgrades.contains(&upgrade) {
        return None;
    }
    let stats = upgrade.stats();
    if player.age < stats.min_age {
        return None;
    }
    if let Some(building) = stats.requires_building {
        if !player.owns_building(building) {
            return None;
        }
    }
    if let Some(prerequisite) = stats.requires_upgrade {
        if !player.upgrades.contains(&prerequisite) {
            return None;
        }
    }
    player
        .resources
        .can_afford(&stats.cost)
        .then_some(ResearchOrder { upgrade })
}
