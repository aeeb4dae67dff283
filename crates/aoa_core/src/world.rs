//! The complete match state.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::{PlayerId, PlayerState};

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Outcome {
    /// One side won.
    Victory(PlayerId),
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// The winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Outcome::Victory(id) => Some(id),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory(id) => write!(f, "{id}"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

impl TryFrom<String> for Outcome {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value == "draw" {
            return Ok(Outcome::Draw);
        }
        PlayerId::from_name(&value)
            .map(Outcome::Victory)
            .ok_or_else(|| format!("expected \"A\", \"B\" or \"draw\", got {value:?}"))
    }
}

/// One line of the match log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    /// Turn the entry was written in.
    pub turn: u32,
    /// Message text.
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[T{}] {}", self.turn, self.text)
    }
}

/// Both players, the turn counter, the log and the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldState {
    /// Turn about to be played (or being played). Starts at 1.
    pub turn: u32,
    /// Player states, indexed by [`PlayerId::index`].
    pub players: [PlayerState; 2],
    /// Append-only match log.
    pub log: Vec<LogEntry>,
    /// Set once the match has ended.
    pub winner: Option<Outcome>,
}

impl WorldState {
    /// Turn 1, both sides in their starting state, empty log.
    #[must_use]
    pub fn new_game() -> Self {
        Self {
            turn: 1,
            players: [PlayerState::new(PlayerId::A), PlayerState::new(PlayerId::B)],
            log: Vec::new(),
            winner: None,
        }
    }

    /// State of one side.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    /// Mutable state of one side.
    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    /// Mutable access to `id` and its opponent at once.
    pub fn sides_mut(&mut self, id: PlayerId) -> (&mut PlayerState, &mut PlayerState) {
        let [a, b] = &mut self.players;
        match id {
            PlayerId::A => (a, b),
            PlayerId::B => (b, a),
        }
    }

    /// Check whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Append a message to the log, stamped with the current turn.
    pub fn log(&mut self, text: impl Into<String>) {
        let entry = LogEntry {
            turn: self.turn,
            text: text.into(),
        };
        tracing::debug!(turn = entry.turn, "{}", entry.text);
        self.log.push(entry);
    }

    /// The last `n` log entries, formatted `[T<turn>] <text>`, oldest first.
    #[must_use]
    pub fn recent_log(&self, n: usize) -> Vec<String> {
        let start = self.log.len().saturating_sub(n);
        self.log[start..].iter().map(ToString::to_string).collect()
    }

    /// Hash of the full state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Verify the structural invariants the resolver must maintain.
    ///
    /// Resource non-negativity holds by construction (unsigned counters,
    /// overdraft-refusing deductions) and is not re-checked here.
    pub fn check_invariants(&self) -> Result<()> {
        if self.turn == 0 {
            return Err(GameError::InvalidState("turn counter is zero".into()));
        }
        for player in &self.players {
            for (&zone, pools) in &player.building_hp {
                for &building in pools.keys() {
                    if player.building_count(zone, building) == 0 {
                        return Err(GameError::OrphanBuildingHp {
                            player: player.id,
                            zone,
                            building,
                        });
                    }
                }
            }
            if player.home != crate::data::Zone::home_of(player.id) {
                return Err(GameError::InvalidState(format!(
                    "player {} has home {} instead of {}",
                    player.id,
                    player.home,
                    crate::data::Zone::home_of(player.id)
                )));
            }
        }
        if self.winner.is_none() {
            if let Some(fallen) = self.players.iter().find(|p| p.headquarters_hp == 0) {
                return Err(GameError::InvalidState(format!(
                    "headquarters of {} destroyed but no winner recorded",
                    fallen.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new_game()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BuildingKind, Zone};

    #[test]
    fn test_new_game() {
        let world = WorldState::new_game();
        assert_eq!(world.turn, 1);
        assert!(world.log.is_empty());
        assert!(!world.is_over());
        assert_eq!(world.player(PlayerId::B).home, Zone::BaseB);
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn test_recent_log_format() {
        let mut world = WorldState::new_game();
        for i in 0..7 {
            world.log(format!("event {i}"));
        }
        world.turn = 2;
        world.log("late");
        let recent = world.recent_log(3);
        assert_eq!(recent, vec!["[T1] event 5", "[T1] event 6", "[T2] late"]);
        assert_eq!(world.recent_log(100).len(), 8);
    }

    #[test]
    fn test_outcome_serde() {
        assert_eq!(
            serde_json::to_value(Outcome::Victory(PlayerId::A)).expect("serializes"),
            "A"
        );
        assert_eq!(serde_json::to_value(Outcome::Draw).expect("serializes"), "draw");
        let parsed: Outcome = serde_json::from_str("\"B\"").expect("parses");
        assert_eq!(parsed, Outcome::Victory(PlayerId::B));
        assert!(serde_json::from_str::<Outcome>("\"C\"").is_err());
    }

    #[test]
    fn test_orphan_hp_pool_detected() {
        let mut world = WorldState::new_game();
        world
            .player_mut(PlayerId::B)
            .set_building_hp(Zone::BaseB, BuildingKind::Wall, 40);
        assert_eq!(
            world.check_invariants(),
            Err(GameError::OrphanBuildingHp {
                player: PlayerId::B,
                zone: Zone::BaseB,
                building: BuildingKind::Wall,
            })
        );
    }

    #[test]
    fn test_fallen_headquarters_needs_winner() {
        let mut world = WorldState::new_game();
        world.player_mut(PlayerId::A).headquarters_hp = 0;
        assert!(world.check_invariants().is_err());
        world.winner = Some(Outcome::Victory(PlayerId::B));
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let a = WorldState::new_game();
        let mut b = WorldState::new_game();
        assert_eq!(a.state_hash(), b.state_hash());
        b.player_mut(PlayerId::A).resources.food += 1;
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_sides_mut_orders_by_perspective() {
        let mut world = WorldState::new_game();
        let (me, them) = world.sides_mut(PlayerId::B);
        assert_eq!(me.id, PlayerId::B);
        assert_eq!(them.id, PlayerId::A);
    }
}
