//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every turn must be a pure function of the previous state and the two
//! intents. Sources of non-determinism include:
//!
//! - **Floating-point math**: Counter bonuses are fractional. Damage goes
//!   through [`aoa_core::math::Fixed`] instead.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   All state maps are `BTreeMap`s, iterated in key order.
//!
//! - **Hidden inputs**: The engine reads no clock and no randomness. Agents
//!   may; their output is captured as an intent script and replayed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual phases (income, validation, combat)
//! 2. **Property tests**: Arbitrary intents still produce deterministic outputs
//! 3. **Integration tests**: Scripted matches are reproducible
//! 4. **Parallel tests**: Running N matches on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use aoa_core::simulation::Simulation;
use aoa_core::world::WorldState;
use serde_json::Value;

/// One turn of scripted input: A's intent, then B's.
pub type IntentPair = (Value, Value);

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns played per run.
    pub turns: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stepped process several times and verify every run ends the same.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for turn in 0..turns {
            step(&mut state, turn);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Play `script` from `start`, one full turn per entry.
///
/// Stops early if the match ends.
#[must_use]
pub fn replay_match(sim: &Simulation, start: &WorldState, script: &[IntentPair]) -> WorldState {
    let mut state = start.clone();
    for (intent_a, intent_b) in script {
        if state.is_over() {
            break;
        }
        state = sim.step(&state, intent_a, intent_b);
    }
    state
}

/// Replay the same script `runs` times and compare final state hashes.
pub fn verify_match_determinism<F>(
    sim: &Simulation,
    setup: F,
    script: &[IntentPair],
    runs: usize,
) -> DeterminismResult
where
    F: Fn() -> WorldState,
{
    verify_determinism(
        runs,
        script.len() as u64,
        setup,
        |state: &mut WorldState, turn: u64| {
            if !state.is_over() {
                let (a, b) = &script[turn as usize];
                *state = sim.step(state, a, b);
            }
        },
        WorldState::state_hash,
    )
}

/// Compare two replays turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the replays agree throughout, `Some(turn)` for the first
/// script index after which they differ (0 means the setups differ).
pub fn find_first_divergence<F>(sim: &Simulation, setup: F, script: &[IntentPair]) -> Option<usize>
where
    F: Fn() -> WorldState,
{
    let mut first = setup();
    let mut second = setup();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, (a, b)) in script.iter().enumerate() {
        first = sim.step(&first, a, b);
        second = sim.step(&second, a, b);

        if first.state_hash() != second.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Verify that a JSON round-trip preserves the state exactly.
#[must_use]
pub fn verify_serialization_determinism(state: &WorldState) -> bool {
    let Ok(json) = serde_json::to_string(state) else {
        return false;
    };
    let Ok(restored) = serde_json::from_str::<WorldState>(&json) else {
        return false;
    };
    restored.state_hash() == state.state_hash()
}

/// Result of parallel match runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each match.
    pub hashes: Vec<u64>,
    /// Number of matches run.
    pub num_matches: usize,
}

impl ParallelRunResult {
    /// Check if all matches produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all matches agreed.
    ///
    /// # Panics
    ///
    /// Panics if matches produced different hashes.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "Parallel matches diverged!\nMatches: {}\nAll hashes: {:?}",
            self.num_matches,
            self.hashes
        );
    }
}

/// Replay the same script on `num_matches` scoped threads.
///
/// # Panics
///
/// Panics if a match thread panics.
pub fn run_parallel_matches<F>(
    sim: &Simulation,
    setup: F,
    script: &[IntentPair],
    num_matches: usize,
) -> ParallelRunResult
where
    F: Fn() -> WorldState + Sync,
{
    let setup = &setup;
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| s.spawn(move || replay_match(sim, &setup(), script).state_hash()))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        num_matches,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for untrusted intents.
///
/// Intents are generated as raw JSON, mostly well-formed and plausible so
/// the resolver gets exercised, with a steady share of garbage: unknown
/// names, bad counts, wrong types, non-object intents.
pub mod strategies {
    use proptest::collection::vec;
    use proptest::option;
    use proptest::prelude::*;
    use proptest::sample::select;
    use serde_json::{json, Map, Value};

    use super::IntentPair;

    const UNIT_NAMES: &[&str] = &["Villager", "Militia", "Archer", "Knight", "Catapult"];
    const BUILDING_NAMES: &[&str] = &["Barracks", "Range", "Wall", "Tower", "Blacksmith"];
    const UPGRADE_NAMES: &[&str] = &["attack_1", "armor_1", "attack_2", "armor_2"];
    const ZONE_NAMES: &[&str] = &[
        "Base_A", "Top_A", "Mid_A", "Bot_A", "Top_B", "Mid_B", "Bot_B", "Base_B",
    ];
    const RESOURCE_NAMES: &[&str] = &["food", "wood", "gold"];

    fn name_from(valid: &'static [&'static str]) -> impl Strategy<Value = Value> {
        prop_oneof![
            8 => select(valid).prop_map(|s| json!(s)),
            1 => "[A-Za-z_]{0,10}".prop_map(Value::from),
            1 => any::<i32>().prop_map(Value::from),
        ]
    }

    /// A unit name, usually valid.
    pub fn arb_unit_name() -> impl Strategy<Value = Value> {
        name_from(UNIT_NAMES)
    }

    /// A building name, usually valid.
    pub fn arb_building_name() -> impl Strategy<Value = Value> {
        name_from(BUILDING_NAMES)
    }

    /// An upgrade name, usually valid.
    pub fn arb_upgrade_name() -> impl Strategy<Value = Value> {
        name_from(UPGRADE_NAMES)
    }

    /// A zone name, usually valid.
    pub fn arb_zone_name() -> impl Strategy<Value = Value> {
        name_from(ZONE_NAMES)
    }

    /// A `count` value: mostly small positives, sometimes zero, negative,
    /// fractional or the wrong type.
    pub fn arb_count() -> impl Strategy<Value = Value> {
        prop_oneof![
            8 => (1u32..12).prop_map(Value::from),
            1 => (-5i64..=0).prop_map(Value::from),
            1 => Just(json!(2.5)),
            1 => Just(json!("3")),
            1 => Just(Value::Null),
            1 => Just(json!(u64::MAX)),
        ]
    }

    fn object(entries: Vec<(&str, Option<Value>)>) -> Value {
        let map: Map<String, Value> = entries
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect();
        Value::Object(map)
    }

    /// A train sub-order.
    pub fn arb_train_item() -> impl Strategy<Value = Value> {
        (arb_unit_name(), option::of(arb_count()))
            .prop_map(|(unit, count)| object(vec![("unit", Some(unit)), ("count", count)]))
    }

    /// A build sub-order, zone optional.
    pub fn arb_build_item() -> impl Strategy<Value = Value> {
        (arb_building_name(), option::of(arb_zone_name()))
            .prop_map(|(building, zone)| object(vec![("building", Some(building)), ("zone", zone)]))
    }

    /// A move sub-order.
    pub fn arb_move_item() -> impl Strategy<Value = Value> {
        (
            arb_unit_name(),
            option::of(arb_count()),
            arb_zone_name(),
            arb_zone_name(),
        )
            .prop_map(|(unit, count, from, to)| {
                object(vec![
                    ("unit", Some(unit)),
                    ("count", count),
                    ("from", Some(from)),
                    ("to", Some(to)),
                ])
            })
    }

    /// A research sub-order.
    pub fn arb_research_item() -> impl Strategy<Value = Value> {
        arb_upgrade_name().prop_map(|upgrade| json!({ "upgrade": upgrade }))
    }

    /// A villager assignment, with the odd unknown resource or bad count.
    pub fn arb_task_villagers() -> impl Strategy<Value = Value> {
        vec(
            (
                prop_oneof![
                    6 => select(RESOURCE_NAMES).prop_map(String::from),
                    1 => "[a-z]{1,6}",
                ],
                prop_oneof![
                    6 => (0u32..8).prop_map(Value::from),
                    1 => (-3i64..0).prop_map(Value::from),
                    1 => Just(json!("two")),
                ],
            ),
            0..4,
        )
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    }

    /// A whole intent: usually an object with every category, sometimes
    /// something that is not an object at all.
    pub fn arb_intent() -> impl Strategy<Value = Value> {
        let structured = (
            vec(arb_train_item(), 0..4),
            vec(arb_build_item(), 0..3),
            vec(arb_move_item(), 0..4),
            prop_oneof![4 => any::<bool>().prop_map(Value::from), 1 => Just(json!("yes"))],
            option::of(arb_task_villagers()),
            vec(arb_research_item(), 0..2),
        )
            .prop_map(|(train, build, moves, advance, tasks, research)| {
                object(vec![
                    ("train", Some(Value::Array(train))),
                    ("build", Some(Value::Array(build))),
                    ("move", Some(Value::Array(moves))),
                    ("attack", Some(json!([{"zone": "Mid_B"}]))),
                    ("advance_age", Some(advance)),
                    ("task_villagers", tasks),
                    ("research", Some(Value::Array(research))),
                ])
            });

        prop_oneof![
            12 => structured,
            1 => Just(json!({})),
            1 => Just(Value::Null),
            1 => Just(json!([1, 2, 3])),
            1 => Just(json!({"train": "Militia", "move": {"unit": "Knight"}})),
            1 => any::<i64>().prop_map(Value::from),
        ]
    }

    /// A script of up to `max_turns` intent pairs.
    pub fn arb_intent_script(max_turns: usize) -> impl Strategy<Value = Vec<IntentPair>> {
        vec((arb_intent(), arb_intent()), 1..max_turns.max(2))
    }
}
