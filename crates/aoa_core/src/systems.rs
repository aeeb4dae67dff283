//! Turn resolver phases.
//!
//! Each system applies one category of a validated [`Action`] for one side.
//! The simulation runs every phase for A then for B before moving on to the
//! next phase, so the order in which sub-orders land is fixed.
//!
//! Costs are re-checked here: the validator looks at each category in
//! isolation, so a combined action can ask for more than the stockpile
//! holds. Whatever no longer fits is skipped.

use crate::data::BuildingKind;
use crate::economy::Cost;
use crate::orders::Action;
use crate::player::PlayerId;
use crate::world::WorldState;

/// Buildings placed this turn whose cost is reserved but not yet paid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildLedger {
    committed: Vec<BuildingKind>,
    reserved: Cost,
}

impl BuildLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a placed building and reserve its cost.
    pub fn commit(&mut self, building: BuildingKind) {
        self.committed.push(building);
        self.reserved += building.stats().cost;
    }

    /// Buildings placed this turn, in placement order.
    #[must_use]
    pub fn committed(&self) -> &[BuildingKind] {
        &self.committed
    }

    /// Sum of reserved costs.
    #[must_use]
    pub const fn reserved(&self) -> Cost {
        self.reserved
    }
}

/// Advance one age if requested and still affordable.
pub fn age_advance_system(world: &mut WorldState, id: PlayerId, action: &Action) {
    if !action.advance_age {
        return;
    }
    let player = world.player_mut(id);
    let Some(next) = player.age.next() else {
        return;
    };
    let Some(cost) = next.cost_to_reach() else {
        return;
    };
    if player.spend(&cost).is_err() {
        return;
    }
    player.age = next;
    world.log(format!("P{id} advanced to {next}"));
}

/// Replace the standing villager assignment if a new one was submitted.
pub fn task_assignment_system(world: &mut WorldState, id: PlayerId, action: &Action) {
    if action.task_villagers.is_empty() {
        return;
    }
    world.player_mut(id).villager_tasks = action.task_villagers.clone();
    world.log(format!("P{id} villager tasks: {}", action.task_villagers));
}

/// Research each requested upgrade that is still new and affordable.
pub fn research_system(world: &mut WorldState, id: PlayerId, action: &Action) {
    for order in &action.research {
        let upgrade = order.upgrade;
        let stats = upgrade.stats();
        let player = world.player_mut(id);
        if player.upgrades.contains(&upgrade) || player.spend(&stats.cost).is_err() {
            continue;
        }
        player.upgrades.insert(upgrade);
        player.attack_bonus += stats.attack_bonus;
        player.armor_bonus += stats.armor_bonus;
        world.log(format!(
            "P{id} researched {upgrade} (+{} atk, +{} armor)",
            stats.attack_bonus, stats.armor_bonus
        ));
    }
}

/// Place each requested building whose cost fits beside the costs already
/// reserved this turn.
///
/// Buildings appear immediately; payment happens in
/// [`build_cost_system`].
pub fn build_system(
    world: &mut WorldState,
    id: PlayerId,
    action: &Action,
    ledger: &mut BuildLedger,
) {
    for order in &action.build {
        let building = order.building;
        let player = world.player_mut(id);
        let zone = order.zone.unwrap_or(player.home);
        let needed = ledger.reserved() + building.stats().cost;
        if !player.resources.can_afford(&needed) {
            continue;
        }
        player.add_building(zone, building);
        ledger.commit(building);
        world.log(format!("P{id} built {building} in {zone}"));
    }
}

/// Queue units one at a time while the stockpile, less reserved build
/// costs, still covers them.
pub fn train_system(world: &mut WorldState, id: PlayerId, action: &Action, ledger: &BuildLedger) {
    for order in &action.train {
        let unit = order.unit;
        let stats = unit.stats();
        let player = world.player_mut(id);
        let mut queued = 0;
        for _ in 0..order.count {
            let fits = player
                .resources
                .without(&ledger.reserved())
                .is_some_and(|free| free.can_afford(&stats.cost));
            if !fits || player.spend(&stats.cost).is_err() {
                break;
            }
            player.production.enqueue(unit);
            queued += 1;
        }
        if queued > 0 {
            world.log(format!(
                "P{id} queued {queued}x{unit} ({} turn(s) each)",
                stats.train_turns
            ));
        }
    }
}

/// Pay for every building placed this turn.
pub fn build_cost_system(world: &mut WorldState, id: PlayerId, ledger: &BuildLedger) {
    let player = world.player_mut(id);
    for &building in ledger.committed() {
        if let Err(err) = player.spend(&building.stats().cost) {
            // Unreachable while trains respect the reservation.
            tracing::error!(player = %id, %building, %err, "reserved build cost could not be paid");
        }
    }
}

/// Move units between adjacent zones.
///
/// A move is blocked outright when the opponent holds the source zone at
/// this point in the turn. Otherwise it carries at most as many units as are
/// still present.
pub fn movement_system(world: &mut WorldState, id: PlayerId, action: &Action) {
    for order in &action.moves {
        let (player, opponent) = world.sides_mut(id);
        if opponent.has_units_in(order.from) {
            world.log(format!(
                "P{id} move of {} out of {} blocked: zone contested",
                order.unit, order.from
            ));
            continue;
        }
        let moved = player.remove_units(order.from, order.unit, order.count);
        if moved == 0 {
            continue;
        }
        player.add_units(order.to, order.unit, moved);
        world.log(format!(
            "P{id} moved {moved}x{}: {}->{}",
            order.unit, order.from, order.to
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Age, UnitKind, Upgrade, Zone};
    use crate::economy::{Resource, ResourcePool, VillagerTasks};
    use crate::orders::{BuildOrder, MoveOrder, ResearchOrder, TrainOrder};

    fn world_with(resources: ResourcePool, age: Age) -> WorldState {
        let mut world = WorldState::new_game();
        let player = world.player_mut(PlayerId::A);
        player.resources = resources;
        player.age = age;
        world
    }

    #[test]
    fn test_age_advance_deducts_and_logs() {
        let mut world = world_with(ResourcePool::new(400, 200, 0), Age::Dark);
        let action = Action {
            advance_age: true,
            ..Action::default()
        };
        age_advance_system(&mut world, PlayerId::A, &action);
        let player = world.player(PlayerId::A);
        assert_eq!(player.age, Age::Feudal);
        assert_eq!(player.resources, ResourcePool::default());
        assert_eq!(player.resources_spent, 600);
        assert_eq!(world.log[0].text, "PA advanced to Age 2 (Feudal)");
    }

    #[test]
    fn test_empty_tasks_keep_standing_assignment() {
        let mut world = WorldState::new_game();
        let standing: VillagerTasks = [(Resource::Wood, 2)].into_iter().collect();
        world.player_mut(PlayerId::A).villager_tasks = standing.clone();
        task_assignment_system(&mut world, PlayerId::A, &Action::default());
        assert_eq!(world.player(PlayerId::A).villager_tasks, standing);
        assert!(world.log.is_empty());

        let replacement: VillagerTasks = [(Resource::Gold, 1)].into_iter().collect();
        let action = Action {
            task_villagers: replacement.clone(),
            ..Action::default()
        };
        task_assignment_system(&mut world, PlayerId::A, &action);
        assert_eq!(world.player(PlayerId::A).villager_tasks, replacement);
    }

    #[test]
    fn test_research_adds_bonus_once() {
        let mut world = world_with(ResourcePool::new(1000, 1000, 1000), Age::Castle);
        let action = Action {
            research: vec![
                ResearchOrder {
                    upgrade: Upgrade::Armor1,
                },
                ResearchOrder {
                    upgrade: Upgrade::Armor1,
                },
            ],
            ..Action::default()
        };
        research_system(&mut world, PlayerId::A, &action);
        let player = world.player(PlayerId::A);
        assert_eq!(player.armor_bonus, 3);
        assert_eq!(player.resources, ResourcePool::new(1000, 800, 900));
    }

    #[test]
    fn test_builds_respect_reserved_costs() {
        let mut world = world_with(ResourcePool::new(0, 150, 0), Age::Feudal);
        let action = Action {
            build: vec![
                BuildOrder {
                    building: BuildingKind::Barracks,
                    zone: None,
                },
                BuildOrder {
                    building: BuildingKind::Range,
                    zone: Some(Zone::TopA),
                },
            ],
            ..Action::default()
        };
        let mut ledger = BuildLedger::new();
        build_system(&mut world, PlayerId::A, &action, &mut ledger);
        assert_eq!(ledger.committed(), &[BuildingKind::Barracks]);
        assert_eq!(ledger.reserved(), Cost::new(0, 100, 0));
        // placed but not paid yet
        assert_eq!(world.player(PlayerId::A).resources.wood, 150);
        assert!(world.player(PlayerId::A).owns_building(BuildingKind::Barracks));

        build_cost_system(&mut world, PlayerId::A, &ledger);
        let player = world.player(PlayerId::A);
        assert_eq!(player.resources.wood, 50);
        assert_eq!(player.resources_spent, 100);
    }

    #[test]
    fn test_trains_cannot_spend_reserved_costs() {
        let mut world = world_with(ResourcePool::new(0, 200, 0), Age::Feudal);
        world
            .player_mut(PlayerId::A)
            .add_building(Zone::BaseA, BuildingKind::Range);
        let mut ledger = BuildLedger::new();
        ledger.commit(BuildingKind::Barracks);
        let action = Action {
            train: vec![TrainOrder {
                unit: UnitKind::Archer,
                count: 3,
            }],
            ..Action::default()
        };
        train_system(&mut world, PlayerId::A, &action, &ledger);
        // 200 wood less 100 reserved leaves room for one archer
        assert_eq!(world.player(PlayerId::A).production.len(), 1);
        assert_eq!(world.player(PlayerId::A).resources.wood, 140);
        assert_eq!(world.log[0].text, "PA queued 1xArcher (2 turn(s) each)");

        build_cost_system(&mut world, PlayerId::A, &ledger);
        assert_eq!(world.player(PlayerId::A).resources.wood, 40);
    }

    #[test]
    fn test_move_blocked_by_enemy_in_source() {
        let mut world = WorldState::new_game();
        world
            .player_mut(PlayerId::A)
            .add_units(Zone::MidA, UnitKind::Militia, 3);
        world
            .player_mut(PlayerId::B)
            .add_units(Zone::MidA, UnitKind::Archer, 1);
        let action = Action {
            moves: vec![MoveOrder {
                unit: UnitKind::Militia,
                count: 3,
                from: Zone::MidA,
                to: Zone::MidB,
            }],
            ..Action::default()
        };
        movement_system(&mut world, PlayerId::A, &action);
        assert_eq!(world.player(PlayerId::A).unit_count(Zone::MidA, UnitKind::Militia), 3);
        assert_eq!(world.player(PlayerId::A).unit_count(Zone::MidB, UnitKind::Militia), 0);
    }

    #[test]
    fn test_move_clamped_to_present() {
        let mut world = WorldState::new_game();
        world
            .player_mut(PlayerId::A)
            .add_units(Zone::BaseA, UnitKind::Militia, 2);
        let order = MoveOrder {
            unit: UnitKind::Militia,
            count: 2,
            from: Zone::BaseA,
            to: Zone::MidA,
        };
        let action = Action {
            moves: vec![order, order],
            ..Action::default()
        };
        movement_system(&mut world, PlayerId::A, &action);
        let player = world.player(PlayerId::A);
        assert_eq!(player.unit_count(Zone::MidA, UnitKind::Militia), 2);
        assert_eq!(player.unit_count(Zone::BaseA, UnitKind::Militia), 0);
        assert_eq!(world.log.len(), 1);
        assert_eq!(world.log[0].text, "PA moved 2xMilitia: Base_A->Mid_A");
    }
}
