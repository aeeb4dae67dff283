//! Scripted strategies for headless play.
//!
//! A [`Strategy`] is a build order plus standing rules for the economy, the
//! army mix and when to attack. [`StrategyExecutor`] turns it into one raw
//! intent per turn.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use aoa_core::data::{BuildingKind, UnitKind, Upgrade, Zone};
use aoa_core::economy::{Resource, ResourcePool, VillagerTasks};
use aoa_core::observation::Observation;
use aoa_core::player::PlayerId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Names accepted by [`Strategy::preset`].
pub const PRESETS: [&str; 4] = ["balanced", "rush", "boom", "turtle"];

/// Most units of one type queued in a single turn once the build order is done.
const BATCH: u32 = 2;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with that name.
    #[error("Unknown strategy preset `{0}` (expected one of: balanced, rush, boom, turtle)")]
    UnknownPreset(String),
}

/// Route an army takes toward the enemy headquarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lane {
    /// Through `Top_A` and `Top_B`.
    Top,
    /// Through `Mid_A` and `Mid_B`.
    #[default]
    Mid,
    /// Through `Bot_A` and `Bot_B`.
    Bot,
}

impl Lane {
    /// First zone out of `side`'s base on this lane.
    #[must_use]
    pub const fn entry(self, side: PlayerId) -> Zone {
        match (self, side) {
            (Lane::Top, PlayerId::A) => Zone::TopA,
            (Lane::Mid, PlayerId::A) => Zone::MidA,
            (Lane::Bot, PlayerId::A) => Zone::BotA,
            (Lane::Top, PlayerId::B) => Zone::TopB,
            (Lane::Mid, PlayerId::B) => Zone::MidB,
            (Lane::Bot, PlayerId::B) => Zone::BotB,
        }
    }

    /// Next zone for `side`'s army standing in `zone`, or `None` once it has
    /// reached the enemy base.
    #[must_use]
    pub fn next_step(self, zone: Zone, side: PlayerId) -> Option<Zone> {
        let enemy_base = Zone::home_of(side.opponent());
        if zone == enemy_base {
            None
        } else if zone == Zone::home_of(side) {
            Some(self.entry(side))
        } else if zone.half() == side {
            zone.neighbors().iter().copied().find(|n| n.half() != side)
        } else {
            Some(enemy_base)
        }
    }
}

/// A single item in a build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOrderItem {
    /// Train one unit.
    Unit(UnitKind),
    /// Construct a building at home.
    Building(BuildingKind),
    /// Research an upgrade.
    Research(Upgrade),
    /// Advance to the next age.
    AdvanceAge,
    /// Wait until the stockpile holds this much in total.
    WaitForResources(u32),
    /// Wait until this many units of a type are alive.
    WaitForUnits(UnitKind, u32),
    /// Wait for a specific turn.
    WaitForTurn(u32),
}

/// Villager targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyTargets {
    /// Keep training villagers until this many are alive or queued.
    pub target_villagers: u32,
    /// Relative share of villagers on food.
    pub food: u32,
    /// Relative share of villagers on wood.
    pub wood: u32,
    /// Relative share of villagers on gold.
    pub gold: u32,
}

impl Default for EconomyTargets {
    fn default() -> Self {
        Self {
            target_villagers: 8,
            food: 4,
            wood: 3,
            gold: 2,
        }
    }
}

impl EconomyTargets {
    /// Divide `villagers` by the shares.
    ///
    /// Whole shares are floored; the remainder goes one at a time to food,
    /// wood, gold in turn, skipping resources with no share.
    #[must_use]
    pub fn split(&self, villagers: u32) -> VillagerTasks {
        let shares = [
            (Resource::Food, self.food),
            (Resource::Wood, self.wood),
            (Resource::Gold, self.gold),
        ];
        let total: u32 = shares.iter().map(|&(_, w)| w).sum();
        if total == 0 || villagers == 0 {
            return VillagerTasks::new();
        }

        let mut counts: Vec<(Resource, u32)> = shares
            .iter()
            .map(|&(r, w)| (r, (u64::from(villagers) * u64::from(w) / u64::from(total)) as u32))
            .collect();
        let mut left = villagers - counts.iter().map(|&(_, n)| n).sum::<u32>();
        for (index, &(_, weight)) in shares.iter().enumerate().cycle() {
            if left == 0 {
                break;
            }
            if weight > 0 {
                counts[index].1 += 1;
                left -= 1;
            }
        }
        counts.into_iter().collect()
    }
}

/// A complete scripted strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Build order to follow.
    pub build_order: Vec<BuildOrderItem>,
    /// Earliest turn the first wave leaves home.
    pub attack_timing: u32,
    /// Turns between waves after the first.
    pub attack_interval: u32,
    /// Army units that must be at home before a wave leaves.
    pub wave_size: u32,
    /// Route to the enemy base.
    pub lane: Lane,
    /// Army mix once the build order is done (unit -> weight).
    pub composition: BTreeMap<UnitKind, u32>,
    /// Economic targets.
    pub economy: EconomyTargets,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::balanced()
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let strategy: Strategy = ron::from_str(&contents)?;
        Ok(strategy)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self, StrategyError> {
        match name {
            "balanced" => Ok(Self::balanced()),
            "rush" => Ok(Self::rush()),
            "boom" => Ok(Self::boom()),
            "turtle" => Ok(Self::turtle()),
            other => Err(StrategyError::UnknownPreset(other.to_string())),
        }
    }

    /// Mixed army, steady economy, mid-game push through the middle.
    #[must_use]
    pub fn balanced() -> Self {
        use BuildOrderItem::{AdvanceAge, Building, Research, Unit};
        Self {
            name: "balanced".to_string(),
            description: "Steady economy into a mixed Castle age army".to_string(),
            build_order: vec![
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                AdvanceAge,
                Building(BuildingKind::Barracks),
                Building(BuildingKind::Range),
                Unit(UnitKind::Militia),
                Unit(UnitKind::Archer),
                AdvanceAge,
                Building(BuildingKind::Blacksmith),
                Research(Upgrade::Attack1),
            ],
            attack_timing: 18,
            attack_interval: 5,
            wave_size: 4,
            lane: Lane::Mid,
            composition: [
                (UnitKind::Militia, 2),
                (UnitKind::Archer, 2),
                (UnitKind::Knight, 1),
            ]
            .into_iter()
            .collect(),
            economy: EconomyTargets::default(),
        }
    }

    /// Early Feudal aggression with Militia.
    #[must_use]
    pub fn rush() -> Self {
        use BuildOrderItem::{AdvanceAge, Building, Unit, WaitForUnits};
        Self {
            name: "rush".to_string(),
            description: "Fast Feudal age and constant Militia waves".to_string(),
            build_order: vec![
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                AdvanceAge,
                Building(BuildingKind::Barracks),
                Unit(UnitKind::Militia),
                Unit(UnitKind::Militia),
                Unit(UnitKind::Militia),
                WaitForUnits(UnitKind::Militia, 3),
            ],
            attack_timing: 10,
            attack_interval: 3,
            wave_size: 3,
            lane: Lane::Mid,
            composition: [(UnitKind::Militia, 3), (UnitKind::Archer, 1)]
                .into_iter()
                .collect(),
            economy: EconomyTargets {
                target_villagers: 6,
                food: 3,
                wood: 2,
                gold: 0,
            },
        }
    }

    /// Heavy economy, late Knights and Catapults.
    #[must_use]
    pub fn boom() -> Self {
        use BuildOrderItem::{AdvanceAge, Building, Research, Unit};
        Self {
            name: "boom".to_string(),
            description: "Villagers first, then a late Knight and Catapult army".to_string(),
            build_order: vec![
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                AdvanceAge,
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                Building(BuildingKind::Barracks),
                AdvanceAge,
                Building(BuildingKind::Blacksmith),
                Research(Upgrade::Armor1),
                Research(Upgrade::Attack1),
            ],
            attack_timing: 28,
            attack_interval: 6,
            wave_size: 5,
            lane: Lane::Top,
            composition: [(UnitKind::Knight, 2), (UnitKind::Catapult, 1)]
                .into_iter()
                .collect(),
            economy: EconomyTargets {
                target_villagers: 12,
                food: 4,
                wood: 3,
                gold: 3,
            },
        }
    }

    /// Walls and Towers at home, Archers behind them.
    #[must_use]
    pub fn turtle() -> Self {
        use BuildOrderItem::{AdvanceAge, Building, Research, Unit};
        Self {
            name: "turtle".to_string(),
            description: "Fortified base, late counter-attack".to_string(),
            build_order: vec![
                Unit(UnitKind::Villager),
                Unit(UnitKind::Villager),
                AdvanceAge,
                Building(BuildingKind::Range),
                Unit(UnitKind::Archer),
                AdvanceAge,
                Building(BuildingKind::Wall),
                Building(BuildingKind::Tower),
                Building(BuildingKind::Blacksmith),
                Building(BuildingKind::Wall),
                Building(BuildingKind::Tower),
                Research(Upgrade::Armor1),
            ],
            attack_timing: 35,
            attack_interval: 8,
            wave_size: 8,
            lane: Lane::Bot,
            composition: [(UnitKind::Archer, 3), (UnitKind::Catapult, 1)]
                .into_iter()
                .collect(),
            economy: EconomyTargets {
                target_villagers: 9,
                food: 3,
                wood: 4,
                gold: 2,
            },
        }
    }
}

/// Orders collected for one turn, with the stockpile they still leave.
#[derive(Debug)]
struct TurnPlan {
    budget: ResourcePool,
    train: BTreeMap<UnitKind, u32>,
    build: Vec<Value>,
    research: Vec<Value>,
    advance_age: bool,
}

impl TurnPlan {
    fn new(budget: ResourcePool) -> Self {
        Self {
            budget,
            train: BTreeMap::new(),
            build: Vec::new(),
            research: Vec::new(),
            advance_age: false,
        }
    }

    fn queued(&self, unit: UnitKind) -> u32 {
        self.train.get(&unit).copied().unwrap_or(0)
    }
}

/// Runtime state for executing a strategy.
#[derive(Debug, Clone)]
pub struct StrategyExecutor {
    /// The strategy being executed.
    strategy: Strategy,
    /// Remaining build order items.
    build_queue: VecDeque<BuildOrderItem>,
    /// Build order items consumed so far.
    current_index: usize,
    /// Whether the first wave has left.
    attack_triggered: bool,
    /// Turn the last wave left.
    last_attack_turn: u32,
}

impl StrategyExecutor {
    /// Create a new executor for a strategy.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        let build_queue = strategy.build_order.iter().copied().collect();
        Self {
            strategy,
            build_queue,
            current_index: 0,
            attack_triggered: false,
            last_attack_turn: 0,
        }
    }

    /// Get the strategy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.strategy.name
    }

    /// Get build order progress as a fraction.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.strategy.build_order.is_empty() {
            1.0
        } else {
            self.current_index as f64 / self.strategy.build_order.len() as f64
        }
    }

    /// Check whether a wave should leave this turn, given the army at home.
    pub fn should_attack(&mut self, turn: u32, home_army: u32) -> bool {
        if home_army == 0 || home_army < self.strategy.wave_size {
            return false;
        }
        let due = if self.attack_triggered {
            turn >= self.last_attack_turn + self.strategy.attack_interval
        } else {
            turn >= self.strategy.attack_timing
        };
        if due {
            self.attack_triggered = true;
            self.last_attack_turn = turn;
        }
        due
    }

    /// Decide this turn's raw intent.
    pub fn decide(&mut self, obs: &Observation) -> Value {
        let mut plan = TurnPlan::new(obs.your_state.resources);
        self.follow_build_order(obs, &mut plan);
        if self.build_queue.is_empty() {
            self.fill_production(obs, &mut plan);
        }
        let moves = self.army_moves(obs);
        let tasks = self.strategy.economy.split(count_units(obs, UnitKind::Villager));

        let train: Vec<Value> = plan
            .train
            .iter()
            .map(|(unit, count)| json!({"unit": unit, "count": count}))
            .collect();
        json!({
            "train": train,
            "build": plan.build,
            "move": moves,
            "advance_age": plan.advance_age,
            "task_villagers": tasks,
            "research": plan.research,
        })
    }

    /// Pop build order items for as long as each one can be afforded now.
    fn follow_build_order(&mut self, obs: &Observation, plan: &mut TurnPlan) {
        let me = &obs.your_state;
        while let Some(&item) = self.build_queue.front() {
            let ready = match item {
                BuildOrderItem::WaitForResources(amount) => {
                    let r = me.resources;
                    r.food + r.wood + r.gold >= amount
                }
                BuildOrderItem::WaitForUnits(unit, count) => count_units(obs, unit) >= count,
                BuildOrderItem::WaitForTurn(turn) => obs.turn >= turn,
                BuildOrderItem::Unit(unit) => {
                    let stats = unit.stats();
                    let allowed = me.age >= stats.min_age
                        && stats.requires.map_or(true, |b| owns(obs, b));
                    allowed && plan.budget.spend(&stats.cost).is_ok()
                }
                BuildOrderItem::Building(building) => {
                    let stats = building.stats();
                    me.age >= stats.min_age && plan.budget.spend(&stats.cost).is_ok()
                }
                BuildOrderItem::Research(upgrade) => {
                    let stats = upgrade.stats();
                    let allowed = me.age >= stats.min_age
                        && !me.upgrades.contains(&upgrade)
                        && stats.requires_building.map_or(true, |b| owns(obs, b))
                        && stats
                            .requires_upgrade
                            .map_or(true, |u| me.upgrades.contains(&u));
                    allowed && plan.budget.spend(&stats.cost).is_ok()
                }
                BuildOrderItem::AdvanceAge => {
                    let cost = me.age.next().and_then(|next| next.cost_to_reach());
                    // One advance per turn: the new age only shows next turn.
                    !plan.advance_age && cost.is_some_and(|cost| plan.budget.spend(&cost).is_ok())
                }
            };
            if !ready {
                return;
            }

            match item {
                BuildOrderItem::Unit(unit) => *plan.train.entry(unit).or_insert(0) += 1,
                BuildOrderItem::Building(building) => {
                    plan.build.push(json!({"building": building}));
                }
                BuildOrderItem::Research(upgrade) => {
                    plan.research.push(json!({"upgrade": upgrade}));
                }
                BuildOrderItem::AdvanceAge => plan.advance_age = true,
                _ => {}
            }
            self.build_queue.pop_front();
            self.current_index += 1;
        }
    }

    /// Keep villagers at target, then spend the rest on the army mix.
    fn fill_production(&self, obs: &Observation, plan: &mut TurnPlan) {
        let villagers = count_units(obs, UnitKind::Villager) + count_queued(obs, UnitKind::Villager);
        let wanted = self
            .strategy
            .economy
            .target_villagers
            .saturating_sub(villagers)
            .min(BATCH);
        queue_affordable(plan, UnitKind::Villager, wanted);

        // Most under-represented first: lowest count per unit of weight.
        let mut mix: Vec<(UnitKind, u32, u32)> = self
            .strategy
            .composition
            .iter()
            .filter(|&(&unit, &weight)| weight > 0 && can_train(obs, unit))
            .map(|(&unit, &weight)| {
                let have = count_units(obs, unit) + count_queued(obs, unit);
                (unit, weight, have)
            })
            .collect();
        mix.sort_by(|a, b| {
            (u64::from(a.2) * u64::from(b.1))
                .cmp(&(u64::from(b.2) * u64::from(a.1)))
                .then(a.0.cmp(&b.0))
        });
        for (unit, _, _) in mix {
            queue_affordable(plan, unit, BATCH);
        }
    }

    /// Advance field units one step; send the home army when a wave is due.
    fn army_moves(&mut self, obs: &Observation) -> Vec<Value> {
        let side = obs.you;
        let home = Zone::home_of(side);
        let lane = self.strategy.lane;
        let units = &obs.your_state.units;

        let home_army: u32 = units
            .get(&home)
            .map(|stack| army_only(stack).map(|(_, n)| n).sum::<u32>())
            .unwrap_or(0);
        let wave = self.should_attack(obs.turn, home_army);

        let mut moves = Vec::new();
        for (&zone, stack) in units {
            if zone == home && !wave {
                continue;
            }
            let Some(to) = lane.next_step(zone, side) else {
                continue;
            };
            for (unit, count) in army_only(stack) {
                moves.push(json!({"unit": unit, "count": count, "from": zone, "to": to}));
            }
        }
        moves
    }
}

fn army_only(stack: &BTreeMap<UnitKind, u32>) -> impl Iterator<Item = (UnitKind, u32)> + '_ {
    stack
        .iter()
        .filter(|&(&unit, &n)| unit != UnitKind::Villager && n > 0)
        .map(|(&unit, &n)| (unit, n))
}

fn count_units(obs: &Observation, unit: UnitKind) -> u32 {
    obs.your_state
        .units
        .values()
        .filter_map(|stack| stack.get(&unit))
        .sum()
}

fn count_queued(obs: &Observation, unit: UnitKind) -> u32 {
    obs.your_state
        .production_queue
        .iter()
        .filter(|item| item.unit == unit)
        .count() as u32
}

fn owns(obs: &Observation, building: BuildingKind) -> bool {
    obs.your_state
        .buildings
        .values()
        .any(|list| list.contains(&building))
}

fn can_train(obs: &Observation, unit: UnitKind) -> bool {
    let stats = unit.stats();
    obs.your_state.age >= stats.min_age && stats.requires.map_or(true, |b| owns(obs, b))
}

/// Add up to `count` of `unit` to the plan while the budget covers them.
fn queue_affordable(plan: &mut TurnPlan, unit: UnitKind, count: u32) {
    let cost = unit.stats().cost;
    for _ in 0..count {
        if plan.budget.spend(&cost).is_err() {
            break;
        }
        *plan.train.entry(unit).or_insert(0) += 1;
    }
    tracing::trace!(%unit, queued = plan.queued(unit), "production planned");
}
