//! Error types for the turn-resolution engine.
//!
//! Untrusted intents never produce errors (they are filtered). These variants
//! describe broken engine invariants and are surfaced by
//! [`WorldState::check_invariants`](crate::world::WorldState::check_invariants)
//! and by overdraft-refusing resource deductions.

use thiserror::Error;

use crate::data::{BuildingKind, Zone};
use crate::economy::Resource;
use crate::player::PlayerId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for engine invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A deduction would drive a resource counter below zero.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: Resource,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// A building HP pool exists without a matching building in its zone.
    #[error("Player {player} has {building} HP in {zone} but no {building} there")]
    OrphanBuildingHp {
        /// Owning player.
        player: PlayerId,
        /// Zone holding the pool.
        zone: Zone,
        /// Building type of the pool.
        building: BuildingKind,
    },

    /// The winner marker and headquarters HP disagree.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
