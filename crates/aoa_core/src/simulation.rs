//! Turn resolution.
//!
//! A turn is split in two so the caller can ask agents for intents in
//! between:
//!
//! 1. [`Simulation::begin_turn`] applies income and advances production.
//! 2. [`Simulation::observe`] builds each side's view of the prepared state.
//! 3. [`Simulation::resolve`] validates both intents and runs every phase,
//!    combat in every zone and the victory check, then increments the turn.
//!
//! Every call takes a state and returns a new one; the input is never
//! touched, so a caller that abandons a turn halfway still holds the last
//! complete state.
//!
//! # Determinism
//!
//! - No randomness anywhere in the engine
//! - Damage goes through fixed-point math
//! - Every per-side loop runs A then B; every per-zone loop runs in zone order
//!
//! # Example
//!
//! ```
//! use aoa_core::player::PlayerId;
//! use aoa_core::simulation::{Simulation, SimulationConfig};
//! use serde_json::json;
//!
//! let sim = Simulation::new(SimulationConfig::default());
//! let state = sim.new_game();
//!
//! let prepared = sim.begin_turn(&state);
//! let intent_a = json!({"train": [{"unit": "Villager", "count": 2}]});
//! let next = sim.resolve(prepared, &intent_a, &json!({}));
//!
//! assert_eq!(next.turn, 2);
//! assert_eq!(next.player(PlayerId::A).production.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::combat::combat_system;
use crate::data::Zone;
use crate::economy::income_system;
use crate::observation::{build_observation, Observation, DEFAULT_RECENT_LINES};
use crate::orders::{validate_action, Action};
use crate::player::PlayerId;
use crate::production::production_system;
use crate::systems::{
    age_advance_system, build_cost_system, build_system, movement_system, research_system,
    task_assignment_system, train_system, BuildLedger,
};
use crate::victory::check_victory;
use crate::world::WorldState;

/// Default number of turns before the score decides.
pub const DEFAULT_TURN_LIMIT: u32 = 50;

/// Tunables for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Turn at which the score decides the match.
    pub turn_limit: u32,
    /// Log lines included in each observation.
    pub recent_log_lines: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
            recent_log_lines: DEFAULT_RECENT_LINES,
        }
    }
}

/// The turn-resolution engine.
///
/// Stateless apart from its configuration; all match state lives in
/// [`WorldState`] values passed in and out.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Create an engine with the given configuration.
    #[must_use]
    pub const fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Opening state of a match.
    #[must_use]
    pub fn new_game(&self) -> WorldState {
        WorldState::new_game()
    }

    /// Apply income and advance production for both sides.
    ///
    /// A finished match is returned unchanged.
    #[must_use]
    pub fn begin_turn(&self, state: &WorldState) -> WorldState {
        let mut world = state.clone();
        if world.is_over() {
            return world;
        }
        for id in PlayerId::ALL {
            let income = income_system(world.player_mut(id));
            let totals = world.player(id).resources;
            world.log(format!(
                "P{id} income: +{}f +{}w +{}g (total: {totals})",
                income.gain.food, income.gain.wood, income.gain.gold
            ));
            let home = world.player(id).home;
            for unit in production_system(world.player_mut(id)) {
                world.log(format!("P{id} trained {unit} at {home}"));
            }
        }
        world
    }

    /// `side`'s view of `state`.
    #[must_use]
    pub fn observe(&self, state: &WorldState, side: PlayerId) -> Observation {
        build_observation(state, side, self.config.recent_log_lines)
    }

    /// Validate both intents and resolve the rest of the turn.
    ///
    /// `prepared` is the output of [`Simulation::begin_turn`]. A finished
    /// match is returned unchanged.
    ///
    /// # Panics
    ///
    /// With debug assertions or the `debug-validation` feature enabled,
    /// panics if the resolved state breaks an engine invariant.
    #[must_use]
    pub fn resolve(&self, prepared: WorldState, intent_a: &Value, intent_b: &Value) -> WorldState {
        let mut world = prepared;
        if world.is_over() {
            return world;
        }

        let actions = [
            validate_action(intent_a, world.player(PlayerId::A)),
            validate_action(intent_b, world.player(PlayerId::B)),
        ];
        for id in PlayerId::ALL {
            world.log(format!("P{id} orders: {}", actions[id.index()]));
        }

        apply_actions(&mut world, &actions);
        for zone in Zone::ALL {
            combat_system(&mut world, zone);
        }

        if let Some(verdict) = check_victory(&world, self.config.turn_limit) {
            world.log(verdict.to_string());
            world.winner = Some(verdict.outcome);
            tracing::info!(turn = world.turn, outcome = %verdict.outcome, "match decided");
        }
        tracing::info!(
            turn = world.turn,
            hq_a = world.player(PlayerId::A).headquarters_hp,
            hq_b = world.player(PlayerId::B).headquarters_hp,
            "turn resolved"
        );
        world.turn += 1;

        #[cfg(any(debug_assertions, feature = "debug-validation"))]
        {
            if let Err(err) = world.check_invariants() {
                panic!("engine invariant violated after turn {}: {err}", world.turn - 1);
            }
            tracing::debug!(turn = world.turn, state_hash = world.state_hash(), "state hash");
        }

        world
    }

    /// Run a whole turn with no observation step in between.
    #[must_use]
    pub fn step(&self, state: &WorldState, intent_a: &Value, intent_b: &Value) -> WorldState {
        self.resolve(self.begin_turn(state), intent_a, intent_b)
    }
}

/// Run the resolver phases. Each phase runs for A then for B.
fn apply_actions(world: &mut WorldState, actions: &[Action; 2]) {
    let mut ledgers = [BuildLedger::new(), BuildLedger::new()];

    for id in PlayerId::ALL {
        age_advance_system(world, id, &actions[id.index()]);
    }
    for id in PlayerId::ALL {
        task_assignment_system(world, id, &actions[id.index()]);
    }
    for id in PlayerId::ALL {
        research_system(world, id, &actions[id.index()]);
    }
    for id in PlayerId::ALL {
        build_system(world, id, &actions[id.index()], &mut ledgers[id.index()]);
    }
    for id in PlayerId::ALL {
        train_system(world, id, &actions[id.index()], &ledgers[id.index()]);
    }
    for id in PlayerId::ALL {
        build_cost_system(world, id, &ledgers[id.index()]);
    }
    for id in PlayerId::ALL {
        movement_system(world, id, &actions[id.index()]);
    }
}
