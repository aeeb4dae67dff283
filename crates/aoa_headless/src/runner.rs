//! Concurrent match loop.
//!
//! Each turn the runner prepares the state, asks both agents at once and
//! resolves when both calls have settled. An agent that errors or runs out
//! of time is logged and plays the empty intent for that turn only.
//!
//! A match can be stopped by a shutdown future at any point. A turn still in
//! flight is dropped whole; the report describes the last resolved state.

use std::future::Future;
use std::time::Duration;

use aoa_core::observation::Observation;
use aoa_core::player::PlayerId;
use aoa_core::simulation::{Simulation, SimulationConfig};
use aoa_core::world::WorldState;
use serde_json::{json, Value};

use crate::agent::{Agent, AgentError};
use crate::config::{MatchConfig, DEFAULT_AGENT_TIMEOUT_SECS};
use crate::metrics::MatchReport;

/// Longest agent error text copied into the game log.
const MAX_ERROR_CHARS: usize = 160;

/// Drives matches between two agents.
#[derive(Debug, Clone)]
pub struct MatchRunner {
    sim: Simulation,
    agent_timeout: Duration,
}

impl Default for MatchRunner {
    fn default() -> Self {
        Self::new(
            SimulationConfig::default(),
            Duration::from_secs(DEFAULT_AGENT_TIMEOUT_SECS),
        )
    }
}

/// Result of one agent call after the timeout is applied.
type CallResult = Result<Value, AgentError>;

impl MatchRunner {
    /// Create a runner.
    #[must_use]
    pub const fn new(config: SimulationConfig, agent_timeout: Duration) -> Self {
        Self {
            sim: Simulation::new(config),
            agent_timeout,
        }
    }

    /// Create a runner from a match config.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.simulation(), config.agent_timeout())
    }

    /// The engine this runner drives.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Play one turn from `state`.
    ///
    /// Returns the resolved state and which sides' calls failed.
    pub async fn play_turn<A: Agent, B: Agent>(
        &self,
        state: &WorldState,
        agent_a: &mut A,
        agent_b: &mut B,
    ) -> (WorldState, [bool; 2]) {
        let mut prepared = self.sim.begin_turn(state);
        let obs_a = self.sim.observe(&prepared, PlayerId::A);
        let obs_b = self.sim.observe(&prepared, PlayerId::B);

        let (result_a, result_b) = tokio::join!(
            self.call(agent_a, &obs_a),
            self.call(agent_b, &obs_b),
        );

        let mut failed = [false; 2];
        let intent_a = settle(&mut prepared, PlayerId::A, result_a, &mut failed);
        let intent_b = settle(&mut prepared, PlayerId::B, result_b, &mut failed);
        (self.sim.resolve(prepared, &intent_a, &intent_b), failed)
    }

    /// Play a full match. Never stops early.
    pub async fn run<A: Agent, B: Agent>(&self, agent_a: &mut A, agent_b: &mut B) -> MatchReport {
        self.run_until(agent_a, agent_b, std::future::pending()).await
    }

    /// Play a full match, or stop as soon as `shutdown` completes.
    pub async fn run_until<A, B, F>(&self, agent_a: &mut A, agent_b: &mut B, shutdown: F) -> MatchReport
    where
        A: Agent,
        B: Agent,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut state = self.sim.new_game();
        let mut failures = [0u32; 2];
        let mut cancelled = false;

        tracing::info!(a = agent_a.name(), b = agent_b.name(), "match started");
        while !state.is_over() {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::warn!(turn = state.turn, "match cancelled");
                    cancelled = true;
                    break;
                }
                (next, failed) = self.play_turn(&state, agent_a, agent_b) => {
                    for id in PlayerId::ALL {
                        failures[id.index()] += u32::from(failed[id.index()]);
                    }
                    state = next;
                }
            }
        }

        agent_a.finish(state.winner, state.turn).await;
        agent_b.finish(state.winner, state.turn).await;

        let report = MatchReport::from_state(&state, [agent_a.name(), agent_b.name()], failures, cancelled);
        tracing::info!(
            outcome = ?report.outcome,
            turns = report.turns_played,
            score_a = report.players[0].score,
            score_b = report.players[1].score,
            "match finished"
        );
        report.with_log(&state)
    }

    async fn call<G: Agent>(&self, agent: &mut G, observation: &Observation) -> CallResult {
        match tokio::time::timeout(self.agent_timeout, agent.decide(observation)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(self.agent_timeout)),
        }
    }
}

/// Unwrap a call result, logging failures into the turn and substituting the
/// empty intent.
fn settle(world: &mut WorldState, id: PlayerId, result: CallResult, failed: &mut [bool; 2]) -> Value {
    match result {
        Ok(intent) => intent,
        Err(err) => {
            tracing::warn!(player = %id, turn = world.turn, error = %err, "agent call failed");
            let message = match err {
                AgentError::Timeout(_) => format!("P{id} agent timed out: no-op"),
                other => format!("P{id} agent error: {}: no-op", truncate(&other.to_string())),
            };
            world.log(message);
            failed[id.index()] = true;
            json!({})
        }
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
