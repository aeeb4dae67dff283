//! Zone combat.
//!
//! Runs once per zone after all movement, in three steps:
//!
//! 1. Towers fire at enemy units in their zone.
//! 2. If both sides still have units there, they exchange damage
//!    simultaneously, computed from the pre-combat stacks.
//! 3. If exactly one side is left and the zone is the other side's home, the
//!    survivors attack the headquarters through any Wall pool.
//!
//! Damage totals carry the 1.5 counter multiplier, so they are [`Fixed`]
//! values; unit hit points are whole numbers.

use std::cmp::Reverse;

use crate::data::{BuildingKind, Counter, UnitKind, Zone};
use crate::math::{ratio, whole_multiples, Fixed};
use crate::player::{PlayerId, Stack};
use crate::world::WorldState;

/// Damage each Tower deals per turn.
pub const TOWER_DAMAGE: u32 = 8;

/// Multiplier applied when an attacker's counter class is present.
#[must_use]
pub fn counter_multiplier() -> Fixed {
    ratio(3, 2)
}

/// Check whether `counter` is triggered by the defending stack.
#[must_use]
pub fn counter_triggered(counter: Counter, defenders: &Stack) -> bool {
    let mut present = defenders.iter().filter(|(_, &n)| n > 0).map(|(&k, _)| k);
    match counter {
        Counter::Infantry => present.any(UnitKind::is_infantry),
        Counter::Unit(kind) => present.any(|k| k == kind),
        Counter::AnyPresent => present.next().is_some(),
    }
}

/// Total damage `attackers` deal to `defenders` in field combat.
///
/// Per unit type: `(attack + attack_bonus) * count`, times the counter
/// multiplier when the type's counter class is among the defenders.
#[must_use]
pub fn field_damage(attackers: &Stack, attack_bonus: u32, defenders: &Stack) -> Fixed {
    attackers
        .iter()
        .filter(|(_, &n)| n > 0)
        .map(|(kind, &count)| {
            let stats = kind.stats();
            let base = Fixed::saturating_from_num(
                u64::from(stats.attack + attack_bonus) * u64::from(count),
            );
            if stats
                .counter
                .is_some_and(|counter| counter_triggered(counter, defenders))
            {
                base.saturating_mul(counter_multiplier())
            } else {
                base
            }
        })
        .fold(Fixed::ZERO, |total, damage| total.saturating_add(damage))
}

/// Base attack of a stack with no bonus and no counters.
#[must_use]
pub fn plain_attack(attackers: &Stack) -> u32 {
    attackers
        .iter()
        .map(|(kind, &count)| kind.stats().attack.saturating_mul(count))
        .fold(0, u32::saturating_add)
}

/// Losses per unit type when `damage` lands on `defenders`.
///
/// Types are hit toughest first. Each type loses as many whole units as the
/// remaining damage covers; a leftover that cannot kill a whole unit still
/// kills one more if any survive, and is then spent.
#[must_use]
pub fn casualties(defenders: &Stack, damage: Fixed, armor_bonus: u32) -> Vec<(UnitKind, u32)> {
    let mut order: Vec<(UnitKind, u32)> = defenders
        .iter()
        .filter(|(_, &n)| n > 0)
        .map(|(&k, &n)| (k, n))
        .collect();
    order.sort_by_key(|&(kind, _)| Reverse(kind.stats().hp));

    let mut remaining = damage;
    let mut losses = Vec::new();
    for (kind, count) in order {
        if remaining <= Fixed::ZERO {
            break;
        }
        let hp = kind.stats().hp + armor_bonus;
        let mut killed = whole_multiples(remaining, hp).min(count);
        remaining -= Fixed::saturating_from_num(u64::from(killed) * u64::from(hp));
        if remaining > Fixed::ZERO && killed < count {
            killed += 1;
            remaining = Fixed::ZERO;
        }
        if killed > 0 {
            losses.push((kind, killed));
        }
    }
    losses
}

/// Split `damage` between a Wall pool and what gets through.
///
/// Returns `(pool_left, damage_through)`.
#[must_use]
pub const fn absorb(wall_pool: u32, damage: u32) -> (u32, u32) {
    if damage >= wall_pool {
        (0, damage - wall_pool)
    } else {
        (wall_pool - damage, 0)
    }
}

/// Resolve all combat in one zone.
pub fn combat_system(world: &mut WorldState, zone: Zone) {
    tower_fire(world, zone);
    field_combat(world, zone);
    base_assault(world, zone);
}

fn tower_fire(world: &mut WorldState, zone: Zone) {
    for owner in PlayerId::ALL {
        let target = owner.opponent();
        let towers = world.player(owner).building_count(zone, BuildingKind::Tower);
        if towers == 0 {
            continue;
        }
        let defenders = world.player(target).stack(zone);
        if defenders.is_empty() {
            continue;
        }
        let damage = towers * TOWER_DAMAGE;
        let losses = casualties(
            &defenders,
            Fixed::from_num(damage),
            world.player(target).armor_bonus,
        );
        world.log(format!("P{owner} towers in {zone} fire for {damage}"));
        apply_losses(world, zone, target, &losses);
    }
}

fn field_combat(world: &mut WorldState, zone: Zone) {
    let stack_a = world.player(PlayerId::A).stack(zone);
    let stack_b = world.player(PlayerId::B).stack(zone);
    if stack_a.is_empty() || stack_b.is_empty() {
        return;
    }
    let a = world.player(PlayerId::A);
    let b = world.player(PlayerId::B);
    let to_b = field_damage(&stack_a, a.attack_bonus, &stack_b);
    let to_a = field_damage(&stack_b, b.attack_bonus, &stack_a);
    let losses_a = casualties(&stack_a, to_a, a.armor_bonus);
    let losses_b = casualties(&stack_b, to_b, b.armor_bonus);

    world.log(format!(
        "Combat in {zone}: A[{}] deals {to_b} vs B[{}] deals {to_a}",
        describe(&stack_a),
        describe(&stack_b)
    ));
    apply_losses(world, zone, PlayerId::A, &losses_a);
    apply_losses(world, zone, PlayerId::B, &losses_b);
}

fn base_assault(world: &mut WorldState, zone: Zone) {
    for attacker in PlayerId::ALL {
        let defender = attacker.opponent();
        if zone != Zone::home_of(defender)
            || world.player(defender).has_units_in(zone)
            || !world.player(attacker).has_units_in(zone)
        {
            continue;
        }
        let damage = plain_attack(&world.player(attacker).stack(zone));
        if damage == 0 {
            continue;
        }

        let target = world.player_mut(defender);
        let pool = target.building_hp(zone, BuildingKind::Wall);
        let (pool_left, through) = absorb(pool, damage);
        let mut walls_fell = false;
        if pool > 0 {
            if pool_left == 0 {
                target.demolish_all(zone, BuildingKind::Wall);
                walls_fell = true;
            } else {
                target.set_building_hp(zone, BuildingKind::Wall, pool_left);
            }
        }
        target.headquarters_hp = target.headquarters_hp.saturating_sub(through);
        let hq_left = target.headquarters_hp;

        if pool > 0 {
            world.log(format!(
                "P{defender} walls in {zone} absorb {}",
                damage - through
            ));
        }
        if walls_fell {
            world.log(format!("P{defender} walls in {zone} destroyed"));
        }
        if through > 0 {
            world.log(format!(
                "P{attacker} hits P{defender} headquarters for {through} (HP {hq_left})"
            ));
        }
    }
}

fn apply_losses(world: &mut WorldState, zone: Zone, victim: PlayerId, losses: &[(UnitKind, u32)]) {
    let (loser, killer) = world.sides_mut(victim);
    let mut removed = Stack::new();
    for &(kind, count) in losses {
        let n = loser.remove_units(zone, kind, count);
        if n > 0 {
            removed.insert(kind, n);
        }
    }
    let total: u32 = removed.values().sum();
    if total == 0 {
        return;
    }
    loser.record_losses(total);
    killer.record_kills(total);
    world.log(format!("P{victim} lost {} in {zone}", describe(&removed)));
}

fn describe(stack: &Stack) -> String {
    let parts: Vec<String> = stack
        .iter()
        .map(|(kind, count)| format!("{count}x{kind}"))
        .collect();
    parts.join(", ")
}
