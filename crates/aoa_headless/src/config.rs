//! Match configuration.
//!
//! A [`MatchConfig`] says who plays and under which limits. It loads from
//! RON; every field has a default, so a file only needs what it changes:
//!
//! ```ron
//! (
//!     turn_limit: 30,
//!     agent_timeout_secs: 10,
//!     player_a: Scripted("rush"),
//!     player_b: Command(program: "python3", args: ["bot.py"]),
//! )
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use aoa_core::observation::DEFAULT_RECENT_LINES;
use aoa_core::simulation::{SimulationConfig, DEFAULT_TURN_LIMIT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{AgentError, BuiltinAgent, CommandAgent, IdleAgent, ScriptedAgent};
use crate::strategies::{Strategy, StrategyError};

/// Default per-call agent budget in seconds.
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;

/// Error type for configuration loading and agent construction.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// An agent spec string did not parse.
    #[error("Invalid agent spec `{0}` (expected idle, scripted:<preset>, strategy:<file.ron> or cmd:<program> [args])")]
    BadAgentSpec(String),
    /// A strategy could not be loaded.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// An agent could not be started.
    #[error("Failed to start agent: {0}")]
    Agent(#[from] AgentError),
}

/// Which agent plays a side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgentSpec {
    /// Never issues orders.
    #[default]
    Idle,
    /// A built-in strategy preset by name.
    Scripted(String),
    /// A strategy loaded from a RON file.
    StrategyFile(PathBuf),
    /// An external program speaking JSON lines.
    Command {
        /// Executable to run.
        program: String,
        /// Arguments passed to it.
        #[serde(default)]
        args: Vec<String>,
    },
}

impl AgentSpec {
    /// Construct the agent. Command agents are spawned here, so this must run
    /// inside a tokio runtime.
    pub fn build(&self) -> Result<BuiltinAgent, ConfigError> {
        let agent = match self {
            Self::Idle => BuiltinAgent::Idle(IdleAgent),
            Self::Scripted(preset) => BuiltinAgent::Scripted(ScriptedAgent::new(Strategy::preset(preset)?)),
            Self::StrategyFile(path) => BuiltinAgent::Scripted(ScriptedAgent::new(Strategy::load(path)?)),
            Self::Command { program, args } => BuiltinAgent::Command(CommandAgent::spawn(program, args)?),
        };
        Ok(agent)
    }
}

/// Parses the CLI form: `idle`, `scripted:<preset>`, `strategy:<path>` or
/// `cmd:<program> [args...]`.
///
/// `cmd:` arguments are split on whitespace with no quoting, so an argument
/// containing a space cannot be passed this way. Use the RON
/// `Command(program: ..., args: [...])` form in a config file for those.
impl FromStr for AgentSpec {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::BadAgentSpec(text.to_string());
        let (kind, rest) = text.split_once(':').unwrap_or((text, ""));
        let rest = rest.trim();
        match kind.trim() {
            "idle" if rest.is_empty() => Ok(Self::Idle),
            "scripted" if !rest.is_empty() => Ok(Self::Scripted(rest.to_string())),
            "strategy" if !rest.is_empty() => Ok(Self::StrategyFile(PathBuf::from(rest))),
            "cmd" => {
                let mut words = rest.split_whitespace().map(String::from);
                let program = words.next().ok_or_else(bad)?;
                Ok(Self::Command {
                    program,
                    args: words.collect(),
                })
            }
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Scripted(preset) => write!(f, "scripted:{preset}"),
            Self::StrategyFile(path) => write!(f, "strategy:{}", path.display()),
            Self::Command { program, args } if args.is_empty() => write!(f, "cmd:{program}"),
            Self::Command { program, args } => write!(f, "cmd:{program} {}", args.join(" ")),
        }
    }
}

/// Everything needed to play one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Turn at which the score decides.
    pub turn_limit: u32,
    /// Per-call agent budget in seconds.
    pub agent_timeout_secs: u64,
    /// Log lines included in each observation.
    pub recent_log_lines: usize,
    /// Agent for side A.
    pub player_a: AgentSpec,
    /// Agent for side B.
    pub player_b: AgentSpec,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
            agent_timeout_secs: DEFAULT_AGENT_TIMEOUT_SECS,
            recent_log_lines: DEFAULT_RECENT_LINES,
            player_a: AgentSpec::Idle,
            player_b: AgentSpec::Idle,
        }
    }
}

impl MatchConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = ron::from_str(ron)?;
        Ok(config)
    }

    /// Engine settings.
    #[must_use]
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            turn_limit: self.turn_limit,
            recent_log_lines: self.recent_log_lines,
        }
    }

    /// Per-call agent budget.
    #[must_use]
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.turn_limit, 50);
        assert_eq!(config.agent_timeout(), Duration::from_secs(60));
        assert_eq!(config.simulation(), SimulationConfig::default());
    }

    #[test]
    fn test_partial_ron() {
        let config = MatchConfig::from_ron_str(
            r#"(turn_limit: 12, player_b: Command(program: "python3", args: ["bot.py", "--fast"]))"#,
        )
        .unwrap();
        assert_eq!(config.turn_limit, 12);
        assert_eq!(config.agent_timeout_secs, 60);
        assert_eq!(config.player_a, AgentSpec::Idle);
        assert_eq!(config.player_b.to_string(), "cmd:python3 bot.py --fast");
    }

    #[test]
    fn test_bad_ron_is_parse_error() {
        assert!(matches!(
            MatchConfig::from_ron_str("(turn_limit: \"soon\")"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_agent_spec_strings() {
        assert_eq!("idle".parse::<AgentSpec>().unwrap(), AgentSpec::Idle);
        assert_eq!(
            "scripted:rush".parse::<AgentSpec>().unwrap(),
            AgentSpec::Scripted("rush".to_string())
        );
        assert_eq!(
            "strategy:plans/towers.ron".parse::<AgentSpec>().unwrap(),
            AgentSpec::StrategyFile(PathBuf::from("plans/towers.ron"))
        );
        assert_eq!(
            "cmd:node agent.js".parse::<AgentSpec>().unwrap(),
            AgentSpec::Command {
                program: "node".to_string(),
                args: vec!["agent.js".to_string()],
            }
        );
        for bad in ["", "scripted", "scripted:", "cmd:", "idle:now", "llm:gpt"] {
            assert!(bad.parse::<AgentSpec>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_cmd_args_split_on_whitespace_only() {
        let spec: AgentSpec = r#"cmd:python3 bot.py --name "red team""#.parse().unwrap();
        assert_eq!(
            spec,
            AgentSpec::Command {
                program: "python3".to_string(),
                args: ["bot.py", "--name", "\"red", "team\""]
                    .map(String::from)
                    .to_vec(),
            }
        );

        let config = MatchConfig::from_ron_str(
            r#"(player_a: Command(program: "python3", args: ["bot.py", "--name", "red team"]))"#,
        )
        .unwrap();
        assert!(matches!(&config.player_a, AgentSpec::Command { args, .. } if args[2] == "red team"));
    }

    #[test]
    fn test_unknown_preset_fails_to_build() {
        let err = AgentSpec::Scripted("zerg".to_string()).build().unwrap_err();
        assert!(matches!(err, ConfigError::Strategy(StrategyError::UnknownPreset(_))));
    }
}
