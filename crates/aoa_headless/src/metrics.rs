//! End-of-match reporting.
//!
//! A [`MatchReport`] summarizes a finished (or cancelled) match for the CLI
//! and for anything comparing runs.

use aoa_core::data::Age;
use aoa_core::player::{PlayerId, PlayerState};
use aoa_core::world::{Outcome, WorldState};
use serde::{Deserialize, Serialize};

/// Final numbers for one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReport {
    /// Side.
    pub player: PlayerId,
    /// Agent that played it.
    pub agent: String,
    /// Turn-limit score at the end.
    pub score: u32,
    /// Headquarters HP at the end.
    pub headquarters_hp: u32,
    /// Age reached.
    pub age: Age,
    /// Living units, villagers included.
    pub units: u32,
    /// Buildings standing.
    pub buildings: u32,
    /// Enemy units destroyed.
    pub units_killed: u32,
    /// Own units lost.
    pub units_lost: u32,
    /// Lifetime spend.
    pub resources_spent: u32,
    /// Agent calls that failed or timed out.
    pub agent_failures: u32,
}

impl PlayerReport {
    fn of(player: &PlayerState, agent: &str, agent_failures: u32) -> Self {
        Self {
            player: player.id,
            agent: agent.to_string(),
            score: player.score(),
            headquarters_hp: player.headquarters_hp,
            age: player.age,
            units: player
                .units
                .values()
                .flat_map(|stack| stack.values())
                .sum(),
            buildings: player.total_buildings(),
            units_killed: player.units_killed,
            units_lost: player.units_lost,
            resources_spent: player.resources_spent,
            agent_failures,
        }
    }
}

/// Summary of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Result, or `None` if the match was cancelled first.
    pub outcome: Option<Outcome>,
    /// Final line of the game log when the match was decided.
    pub verdict: Option<String>,
    /// Turns fully resolved.
    pub turns_played: u32,
    /// Whether the match was stopped before a result.
    pub cancelled: bool,
    /// Side A, then side B.
    pub players: [PlayerReport; 2],
    /// Final state hash, for comparing runs.
    pub final_state_hash: u64,
    /// Full game log, if requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
}

impl MatchReport {
    /// Summarize `state`.
    ///
    /// `agents` and `failures` are indexed by side.
    #[must_use]
    pub fn from_state(
        state: &WorldState,
        agents: [&str; 2],
        failures: [u32; 2],
        cancelled: bool,
    ) -> Self {
        let player = |id: PlayerId| {
            PlayerReport::of(state.player(id), agents[id.index()], failures[id.index()])
        };
        Self {
            outcome: state.winner,
            verdict: state
                .winner
                .and_then(|_| state.log.last())
                .map(|entry| entry.text.clone()),
            turns_played: state.turn - 1,
            cancelled,
            players: [player(PlayerId::A), player(PlayerId::B)],
            final_state_hash: state.state_hash(),
            log: Vec::new(),
        }
    }

    /// Attach the full game log.
    #[must_use]
    pub fn with_log(mut self, state: &WorldState) -> Self {
        self.log = state.log.iter().map(ToString::to_string).collect();
        self
    }

    /// Winning side, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome.and_then(|outcome| outcome.winner())
    }
}
