//! # Age of Agents Core
//!
//! Deterministic turn resolution for a two-player, zone-based strategy game
//! played by external agents.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No randomness
//! - No floating-point math (uses fixed-point)
//!
//! Agents submit untrusted JSON intents. The engine filters them down to
//! legal orders, applies them, resolves combat and checks for a winner, and
//! hands back a brand new state each turn.
//!
//! ## Crate Structure
//!
//! - [`data`] - Static rule tables
//! - [`player`], [`world`] - Match state
//! - [`economy`], [`production`] - Income and unit production
//! - [`orders`] - Intent validation
//! - [`systems`] - Resolver phases
//! - [`combat`] - Zone combat
//! - [`victory`] - End-of-turn check
//! - [`observation`] - Fog-of-war views
//! - [`simulation`] - Turn driver
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod data;
pub mod economy;
pub mod error;
pub mod math;
pub mod observation;
pub mod orders;
pub mod player;
pub mod production;
pub mod simulation;
pub mod systems;
pub mod victory;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{Age, BuildingKind, RuleBook, UnitKind, Upgrade, Zone};
    pub use crate::economy::{Cost, Resource, ResourcePool, VillagerTasks};
    pub use crate::error::{GameError, Result};
    pub use crate::math::Fixed;
    pub use crate::observation::{build_observation, Observation};
    pub use crate::orders::{validate_action, Action};
    pub use crate::player::{PlayerId, PlayerState};
    pub use crate::simulation::{Simulation, SimulationConfig};
    pub use crate::world::{LogEntry, Outcome, WorldState};
}
