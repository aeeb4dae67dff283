//! Headless match driver for Age of Agents.
//!
//! This crate plays matches between two agents without any presentation:
//!
//! - **Agents**: built-in bots or external programs produce raw intents
//! - **Concurrency**: both agents are asked at once each turn, with a
//!   per-call timeout; failures become empty intents
//! - **Reporting**: a JSON [`MatchReport`] per match
//!
//! # Protocol
//!
//! External agents speak JSON lines (one JSON object per line):
//!
//! - **stdin**: one observation request per turn
//! - **stdout**: one intent object per request
//! - **stderr**: passed through untouched
//!
//! See the [`protocol`] module for message shapes.
//!
//! # Example
//!
//! ```bash
//! # Two built-in bots
//! cargo run -p aoa_headless -- run --a scripted:rush --b scripted:turtle
//!
//! # An external agent against a bot, from a config file
//! cargo run -p aoa_headless -- run --config match.ron --b "cmd:python3 bot.py"
//!
//! # Rule tables as JSON
//! cargo run -p aoa_headless -- rules
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod config;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod strategies;

pub use agent::{Agent, AgentError, BuiltinAgent, CommandAgent, IdleAgent, ScriptedAgent};
pub use config::{AgentSpec, ConfigError, MatchConfig};
pub use metrics::{MatchReport, PlayerReport};
pub use protocol::Request;
pub use runner::MatchRunner;
pub use strategies::{Strategy, StrategyError, StrategyExecutor};
