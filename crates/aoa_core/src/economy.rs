//! Resources, costs and villager income.
//!
//! Three resources (food, wood, gold) held per player. Villagers assigned to
//! a resource gather at the task rate; unassigned villagers gather a little
//! food and wood; every player gets a passive gold trickle.
//!
//! All amounts are unsigned. Deductions go through [`ResourcePool::spend`],
//! which refuses overdrafts instead of wrapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::PlayerState;

/// Food gathered per tasked villager per turn.
pub const FOOD_TASK_RATE: u32 = 15;
/// Wood gathered per tasked villager per turn.
pub const WOOD_TASK_RATE: u32 = 12;
/// Gold gathered per tasked villager per turn.
pub const GOLD_TASK_RATE: u32 = 8;
/// Food gathered per idle villager per turn.
pub const FOOD_IDLE_RATE: u32 = 3;
/// Wood gathered per idle villager per turn.
pub const WOOD_IDLE_RATE: u32 = 2;
/// Gold every player receives each turn regardless of villagers.
pub const GOLD_TRICKLE: u32 = 5;

/// One of the three gatherable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Food.
    Food,
    /// Wood.
    Wood,
    /// Gold.
    Gold,
}

impl Resource {
    /// All resources in canonical order.
    pub const ALL: [Resource; 3] = [Resource::Food, Resource::Wood, Resource::Gold];

    /// Wire name of the resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Wood => "wood",
            Resource::Gold => "gold",
        }
    }

    /// Parse a wire name. Exact match only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Per-villager rate when tasked to this resource.
    #[must_use]
    pub const fn task_rate(self) -> u32 {
        match self {
            Resource::Food => FOOD_TASK_RATE,
            Resource::Wood => WOOD_TASK_RATE,
            Resource::Gold => GOLD_TASK_RATE,
        }
    }

    /// Per-villager rate when idle.
    #[must_use]
    pub const fn idle_rate(self) -> u32 {
        match self {
            Resource::Food => FOOD_IDLE_RATE,
            Resource::Wood => WOOD_IDLE_RATE,
            Resource::Gold => 0,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bundle of food, wood and gold: a price, or an amount gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Food component.
    pub food: u32,
    /// Wood component.
    pub wood: u32,
    /// Gold component.
    pub gold: u32,
}

impl Cost {
    /// Nothing.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a cost.
    #[must_use]
    pub const fn new(food: u32, wood: u32, gold: u32) -> Self {
        Self { food, wood, gold }
    }

    /// Component for one resource.
    #[must_use]
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Gold => self.gold,
        }
    }

    /// Sum of all components.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.food + self.wood + self.gold
    }
}

impl std::ops::Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.food.saturating_add(rhs.food),
            self.wood.saturating_add(rhs.wood),
            self.gold.saturating_add(rhs.gold),
        )
    }
}

impl std::ops::AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}f {}w {}g", self.food, self.wood, self.gold)
    }
}

/// A player's stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    /// Food on hand.
    pub food: u32,
    /// Wood on hand.
    pub wood: u32,
    /// Gold on hand.
    pub gold: u32,
}

impl ResourcePool {
    /// Stockpile every player starts with.
    pub const STARTING: Self = Self::new(200, 150, 50);

    /// Create a stockpile.
    #[must_use]
    pub const fn new(food: u32, wood: u32, gold: u32) -> Self {
        Self { food, wood, gold }
    }

    /// Amount of one resource on hand.
    #[must_use]
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Gold => self.gold,
        }
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Wood => &mut self.wood,
            Resource::Gold => &mut self.gold,
        }
    }

    /// Add a gain to the stockpile.
    pub fn deposit(&mut self, gain: Cost) {
        for resource in Resource::ALL {
            let slot = self.slot_mut(resource);
            *slot = slot.saturating_add(gain.get(resource));
        }
    }

    /// Check whether every component of `cost` is on hand.
    #[must_use]
    pub fn can_afford(&self, cost: &Cost) -> bool {
        Resource::ALL
            .into_iter()
            .all(|r| self.get(r) >= cost.get(r))
    }

    /// How many copies of `cost` can be paid for, capped at `requested`.
    ///
    /// Computed per resource; the scarcest resource decides.
    #[must_use]
    pub fn max_affordable(&self, cost: &Cost, requested: u32) -> u32 {
        Resource::ALL
            .into_iter()
            .filter(|&r| cost.get(r) > 0)
            .map(|r| self.get(r) / cost.get(r))
            .fold(requested, u32::min)
    }

    /// Deduct `cost`, or leave the stockpile untouched if any component is short.
    pub fn spend(&mut self, cost: &Cost) -> Result<()> {
        if let Some(resource) = Resource::ALL
            .into_iter()
            .find(|&r| self.get(r) < cost.get(r))
        {
            return Err(GameError::InsufficientResources {
                resource,
                required: cost.get(resource),
                available: self.get(resource),
            });
        }
        for resource in Resource::ALL {
            *self.slot_mut(resource) -= cost.get(resource);
        }
        Ok(())
    }

    /// The stockpile left after setting `reserved` aside, if it covers it.
    #[must_use]
    pub fn without(&self, reserved: &Cost) -> Option<ResourcePool> {
        Some(Self::new(
            self.food.checked_sub(reserved.food)?,
            self.wood.checked_sub(reserved.wood)?,
            self.gold.checked_sub(reserved.gold)?,
        ))
    }
}

impl fmt::Display for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}f {}w {}g", self.food, self.wood, self.gold)
    }
}

/// Villager assignment: resource to number of villagers gathering it.
///
/// Persists across turns until replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VillagerTasks(BTreeMap<Resource, u32>);

impl VillagerTasks {
    /// No villagers assigned.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Villagers assigned to `resource`.
    #[must_use]
    pub fn get(&self, resource: Resource) -> u32 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    /// Assign `count` villagers to `resource`. Zero removes the entry.
    pub fn set(&mut self, resource: Resource, count: u32) {
        if count == 0 {
            self.0.remove(&resource);
        } else {
            self.0.insert(resource, count);
        }
    }

    /// Total villagers assigned.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().fold(0, |acc, &n| acc.saturating_add(n))
    }

    /// Check whether nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&n| n == 0)
    }

    /// Iterate over assignments in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.0.iter().map(|(&r, &n)| (r, n))
    }

    /// Fit the assignment into `population` villagers.
    ///
    /// If more villagers are assigned than exist, every entry is scaled by
    /// `population / total` and floored. Zero entries are dropped.
    #[must_use]
    pub fn clamped_to(&self, population: u32) -> Self {
        let total: u64 = self.0.values().map(|&n| u64::from(n)).sum();
        let mut clamped = Self::new();
        for (resource, count) in self.iter() {
            let scaled = if total > u64::from(population) {
                (u64::from(count) * u64::from(population) / total) as u32
            } else {
                count
            };
            clamped.set(resource, scaled);
        }
        clamped
    }
}

impl FromIterator<(Resource, u32)> for VillagerTasks {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(iter: I) -> Self {
        let mut tasks = Self::new();
        for (resource, count) in iter {
            tasks.set(resource, count);
        }
        tasks
    }
}

impl fmt::Display for VillagerTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{r} {n}")).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Income earned by one player in one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Income {
    /// Resources gained.
    pub gain: Cost,
    /// Villagers that gathered at task rates.
    pub tasked: u32,
    /// Villagers that gathered at idle rates.
    pub idle: u32,
}

/// Compute one turn of income for `population` villagers under `tasks`.
///
/// The assignment is clamped to the living population first; with no
/// villagers at all it counts as empty. The caller's assignment is not
/// modified.
#[must_use]
pub fn compute_income(tasks: &VillagerTasks, population: u32) -> Income {
    let effective = if population == 0 {
        VillagerTasks::new()
    } else {
        tasks.clamped_to(population)
    };
    let tasked = effective.total();
    let idle = population.saturating_sub(tasked);

    let gather = |resource: Resource| {
        effective.get(resource) * resource.task_rate() + idle * resource.idle_rate()
    };

    Income {
        gain: Cost::new(
            gather(Resource::Food),
            gather(Resource::Wood),
            gather(Resource::Gold) + GOLD_TRICKLE,
        ),
        tasked,
        idle,
    }
}

/// Apply one turn of income to a player.
///
/// Returns what was earned so the caller can log it.
pub fn income_system(player: &mut PlayerState) -> Income {
    let income = compute_income(&player.villager_tasks, player.villager_count());
    player.resources.deposit(income.gain);
    income
}
