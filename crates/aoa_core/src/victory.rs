//! End-of-turn victory check.

use std::cmp::Ordering;
use std::fmt;

use crate::player::PlayerId;
use crate::world::{Outcome, WorldState};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VictoryReason {
    /// Both headquarters fell in the same turn.
    MutualDestruction,
    /// One headquarters fell.
    HeadquartersDestroyed {
        /// Side whose headquarters fell.
        fallen: PlayerId,
    },
    /// The turn limit was reached; scores decided.
    TurnLimit {
        /// Side A's score.
        score_a: u32,
        /// Side B's score.
        score_b: u32,
    },
}

/// A terminal result and how it came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// The result.
    pub outcome: Outcome,
    /// How it was reached.
    pub reason: VictoryReason,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.reason, self.outcome) {
            (VictoryReason::MutualDestruction, _) => {
                f.write_str("Draw: both headquarters destroyed")
            }
            (VictoryReason::HeadquartersDestroyed { fallen }, _) => write!(
                f,
                "Player {} wins: destroyed {fallen}'s headquarters",
                fallen.opponent()
            ),
            (VictoryReason::TurnLimit { score_a, .. }, Outcome::Draw) => {
                write!(f, "Turn limit: draw ({score_a} each)")
            }
            (VictoryReason::TurnLimit { score_a, score_b }, Outcome::Victory(id)) => {
                let (won, lost) = match id {
                    PlayerId::A => (score_a, score_b),
                    PlayerId::B => (score_b, score_a),
                };
                write!(f, "Turn limit: {id} wins by score ({won} vs {lost})")
            }
        }
    }
}

/// Decide whether the match is over.
///
/// Checked in priority order: both headquarters down, B's down, A's down,
/// then the turn limit with a score comparison.
#[must_use]
pub fn check_victory(world: &WorldState, turn_limit: u32) -> Option<Verdict> {
    let a = world.player(PlayerId::A);
    let b = world.player(PlayerId::B);

    let verdict = match (a.headquarters_hp == 0, b.headquarters_hp == 0) {
        (true, true) => Verdict {
            outcome: Outcome::Draw,
            reason: VictoryReason::MutualDestruction,
        },
        (_, true) => Verdict {
            outcome: Outcome::Victory(PlayerId::A),
            reason: VictoryReason::HeadquartersDestroyed {
                fallen: PlayerId::B,
            },
        },
        (true, _) => Verdict {
            outcome: Outcome::Victory(PlayerId::B),
            reason: VictoryReason::HeadquartersDestroyed {
                fallen: PlayerId::A,
            },
        },
        (false, false) if world.turn >= turn_limit => {
            let (score_a, score_b) = (a.score(), b.score());
            let outcome = match score_a.cmp(&score_b) {
                Ordering::Greater => Outcome::Victory(PlayerId::A),
                Ordering::Less => Outcome::Victory(PlayerId::B),
                Ordering::Equal => Outcome::Draw,
            };
            Verdict {
                outcome,
                reason: VictoryReason::TurnLimit { score_a, score_b },
            }
        }
        (false, false) => return None,
    };
    Some(verdict)
}
