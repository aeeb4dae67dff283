//! JSON-lines protocol for external agent programs.
//!
//! The driver talks to a [`CommandAgent`](crate::agent::CommandAgent) child
//! process over its stdin/stdout, one JSON object per line:
//!
//! **To the agent (stdin):** one request per turn
//! **From the agent (stdout):** one intent object per request
//!
//! # Protocol Flow
//!
//! 1. Each turn the driver writes `{"type":"observation", ...}` with the
//!    agent's [`Observation`] fields inlined
//! 2. The agent answers with a single line holding its intent object
//! 3. When the match ends the driver writes `{"type":"match_over", ...}`
//!    and closes the pipe; no answer is expected
//!
//! # Example Session
//!
//! ```text
//! -> {"type":"observation","turn":1,"you":"A","your_state":{...},...}
//! <- {"train":[{"unit":"Villager","count":2}],"task_villagers":{"food":3}}
//! -> {"type":"observation","turn":2,...}
//! <- {}
//! -> {"type":"match_over","outcome":"A","turn":31}
//! ```

use aoa_core::observation::Observation;
use aoa_core::world::Outcome;
use serde::Serialize;
use serde_json::Value;

use crate::agent::AgentError;

// ============================================================================
// Driver -> Agent
// ============================================================================

/// Messages written to an agent's stdin.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request<'a> {
    /// Decide this turn's intent.
    Observation(&'a Observation),

    /// The match has ended.
    MatchOver {
        /// Final result.
        outcome: Outcome,
        /// Turn counter at the end.
        turn: u32,
    },
}

impl Request<'_> {
    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        Ok(json)
    }
}

// ============================================================================
// Agent -> Driver
// ============================================================================

/// Parse one reply line into a raw intent.
///
/// Chatter around the object is tolerated: the outermost `{...}` span is
/// taken. What the object contains is the validator's business.
pub fn parse_intent(line: &str) -> Result<Value, AgentError> {
    let json = extract_json(line).ok_or(AgentError::NoJson)?;
    Ok(serde_json::from_str(json)?)
}

/// The span from the first `{` to the last `}`, if any.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoa_core::observation::build_observation;
    use aoa_core::player::PlayerId;
    use aoa_core::world::WorldState;
    use serde_json::json;

    #[test]
    fn test_observation_request_is_tagged_and_flat() {
        let world = WorldState::new_game();
        let obs = build_observation(&world, PlayerId::B, 5);
        let line = Request::Observation(&obs).to_json_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "observation");
        assert_eq!(value["you"], "B");
        assert_eq!(value["turn"], 1);
        assert_eq!(value["enemy_headquarters_hp"], 200);
    }

    #[test]
    fn test_match_over_request() {
        let line = Request::MatchOver {
            outcome: Outcome::Draw,
            turn: 51,
        }
        .to_json_line()
        .unwrap();
        assert_eq!(line, "{\"type\":\"match_over\",\"outcome\":\"draw\",\"turn\":51}\n");
    }

    #[test]
    fn test_parse_plain_intent() {
        let intent = parse_intent("{\"advance_age\":true}\n").unwrap();
        assert_eq!(intent, json!({"advance_age": true}));
    }

    #[test]
    fn test_parse_intent_with_chatter() {
        let intent = parse_intent("intent: {\"train\":[{\"unit\":\"Militia\"}]} done").unwrap();
        assert_eq!(intent["train"][0]["unit"], "Militia");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_intent("pass"), Err(AgentError::NoJson)));
        assert!(matches!(parse_intent("} {"), Err(AgentError::NoJson)));
        assert!(matches!(
            parse_intent("{train: yes}"),
            Err(AgentError::BadJson(_))
        ));
    }
}
