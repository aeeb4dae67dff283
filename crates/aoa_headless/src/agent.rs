//! Intent producers.
//!
//! An [`Agent`] turns an [`Observation`] into a raw intent. Raw means
//! untrusted: the engine's validator filters whatever comes back, so an agent
//! only fails when it produces nothing at all.
//!
//! Built-in agents:
//!
//! - [`IdleAgent`]: always `{}`
//! - [`ScriptedAgent`]: build-order bot driven by a [`Strategy`]
//! - [`CommandAgent`]: an external program speaking the [`protocol`](crate::protocol)

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use aoa_core::observation::Observation;
use aoa_core::world::Outcome;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout};

use crate::protocol::{parse_intent, Request};
use crate::strategies::{Strategy, StrategyExecutor};

/// Why an agent produced no intent this turn.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The call did not finish within the per-turn budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The agent program could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Reading from or writing to the agent failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The agent closed its output.
    #[error("agent closed its output")]
    Closed,
    /// The reply held no JSON object.
    #[error("reply contained no JSON object")]
    NoJson,
    /// The reply's JSON did not parse.
    #[error("invalid JSON: {0}")]
    BadJson(#[from] serde_json::Error),
}

/// Something that decides a side's intent each turn.
///
/// Calls for the two sides run concurrently, so the returned future must be
/// `Send`.
pub trait Agent: Send {
    /// Display name for logs and reports.
    fn name(&self) -> &str;

    /// Produce a raw intent for the observed turn.
    fn decide(
        &mut self,
        observation: &Observation,
    ) -> impl Future<Output = Result<Value, AgentError>> + Send;

    /// Called once when the match ends.
    fn finish(&mut self, _outcome: Option<Outcome>, _turn: u32) -> impl Future<Output = ()> + Send {
        async {}
    }
}

// ============================================================================
// Idle
// ============================================================================

/// Submits the empty intent every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAgent;

impl Agent for IdleAgent {
    fn name(&self) -> &str {
        "idle"
    }

    async fn decide(&mut self, _observation: &Observation) -> Result<Value, AgentError> {
        Ok(json!({}))
    }
}

// ============================================================================
// Scripted
// ============================================================================

/// Deterministic bot following a [`Strategy`].
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    name: String,
    executor: StrategyExecutor,
}

impl ScriptedAgent {
    /// Create a bot for `strategy`.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            name: format!("scripted:{}", strategy.name),
            executor: StrategyExecutor::new(strategy),
        }
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&mut self, observation: &Observation) -> Result<Value, AgentError> {
        Ok(self.executor.decide(observation))
    }
}

// ============================================================================
// External program
// ============================================================================

/// An external program answering observations over stdin/stdout.
///
/// Replies come from one line stream kept for the agent's lifetime, and
/// reading from it is cancel-safe. A call cut short by a timeout loses no
/// bytes: the late reply is picked up and discarded on the next call.
#[derive(Debug)]
pub struct CommandAgent {
    name: String,
    child: Child,
    stdin: Option<ChildStdin>,
    replies: Lines<BufReader<ChildStdout>>,
    unanswered: u32,
}

impl CommandAgent {
    /// Start `program` with `args`.
    ///
    /// Must be called inside a tokio runtime. The child's stderr is passed
    /// through; it is killed when the agent is dropped.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, AgentError> {
        let spawn_error = |source| AgentError::Spawn {
            program: program.to_string(),
            source,
        };
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let missing = || std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe not captured");
        let stdin = child.stdin.take().ok_or_else(|| spawn_error(missing()))?;
        let stdout = child.stdout.take().ok_or_else(|| spawn_error(missing()))?;
        tracing::debug!(program, ?args, "agent process started");

        Ok(Self {
            name: format!("cmd:{program}"),
            child,
            stdin: Some(stdin),
            replies: BufReader::new(stdout).lines(),
            unanswered: 0,
        })
    }

    async fn send(&mut self, request: &Request<'_>) -> Result<(), AgentError> {
        let stdin = self.stdin.as_mut().ok_or(AgentError::Closed)?;
        stdin.write_all(request.to_json_line()?.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Next complete reply line.
    async fn read_reply(&mut self) -> Result<String, AgentError> {
        self.replies.next_line().await?.ok_or(AgentError::Closed)
    }
}

impl Agent for CommandAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&mut self, observation: &Observation) -> Result<Value, AgentError> {
        self.send(&Request::Observation(observation)).await?;
        self.unanswered += 1;
        loop {
            let reply = self.read_reply().await?;
            self.unanswered -= 1;
            if self.unanswered == 0 {
                return parse_intent(&reply);
            }
            tracing::debug!(agent = %self.name, "discarding late reply");
        }
    }

    async fn finish(&mut self, outcome: Option<Outcome>, turn: u32) {
        if let Some(outcome) = outcome {
            if let Err(err) = self.send(&Request::MatchOver { outcome, turn }).await {
                tracing::debug!(agent = %self.name, %err, "agent gone before match_over");
            }
        }
        // Closing stdin lets a well-behaved agent exit on EOF.
        self.stdin = None;
        if let Err(err) = self.child.kill().await {
            tracing::debug!(agent = %self.name, %err, "agent already exited");
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Any built-in agent, chosen at runtime from configuration.
#[derive(Debug)]
pub enum BuiltinAgent {
    /// See [`IdleAgent`].
    Idle(IdleAgent),
    /// See [`ScriptedAgent`].
    Scripted(ScriptedAgent),
    /// See [`CommandAgent`].
    Command(CommandAgent),
}

impl Agent for BuiltinAgent {
    fn name(&self) -> &str {
        match self {
            Self::Idle(agent) => agent.name(),
            Self::Scripted(agent) => agent.name(),
            Self::Command(agent) => agent.name(),
        }
    }

    async fn decide(&mut self, observation: &Observation) -> Result<Value, AgentError> {
        match self {
            Self::Idle(agent) => agent.decide(observation).await,
            Self::Scripted(agent) => agent.decide(observation).await,
            Self::Command(agent) => agent.decide(observation).await,
        }
    }

    async fn finish(&mut self, outcome: Option<Outcome>, turn: u32) {
        match self {
            Self::Idle(agent) => agent.finish(outcome, turn).await,
            Self::Scripted(agent) => agent.finish(outcome, turn).await,
            Self::Command(agent) => agent.finish(outcome, turn).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoa_core::observation::build_observation;
    use aoa_core::player::PlayerId;
    use aoa_core::world::WorldState;

    fn opening(side: PlayerId) -> Observation {
        build_observation(&WorldState::new_game(), side, 5)
    }

    #[tokio::test]
    async fn test_idle_agent_submits_nothing() {
        let mut agent = IdleAgent;
        assert_eq!(agent.decide(&opening(PlayerId::A)).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_scripted_agent_name() {
        let agent = BuiltinAgent::Scripted(ScriptedAgent::new(Strategy::rush()));
        assert_eq!(agent.name(), "scripted:rush");
    }

    #[tokio::test]
    async fn test_spawn_failure_names_program() {
        let err = CommandAgent::spawn("aoa-no-such-agent-program", &[]).unwrap_err();
        assert!(matches!(err, AgentError::Spawn { .. }));
        assert!(err.to_string().contains("aoa-no-such-agent-program"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_program_answers_each_turn() {
        // `cat` echoes the observation back; any object is a valid raw intent
        let mut agent = CommandAgent::spawn("cat", &[]).unwrap();
        for side in PlayerId::ALL {
            let reply = agent.decide(&opening(side)).await.unwrap();
            assert_eq!(reply["type"], "observation");
            assert_eq!(reply["you"], side.to_string());
        }
        agent.finish(Some(Outcome::Draw), 3).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reply_split_across_timeout_stays_whole() {
        let script = r#"printf '{"advance_'; sleep 1; echo 'age": true}'"#;
        let mut agent = CommandAgent::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap();

        let cut_short = tokio::time::timeout(Duration::from_millis(200), agent.read_reply()).await;
        assert!(cut_short.is_err());

        let reply = agent.read_reply().await.unwrap();
        assert_eq!(parse_intent(&reply).unwrap(), json!({"advance_age": true}));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_program_is_an_error() {
        let mut agent = CommandAgent::spawn("true", &[]).unwrap();
        assert!(agent.decide(&opening(PlayerId::A)).await.is_err());
    }
}
