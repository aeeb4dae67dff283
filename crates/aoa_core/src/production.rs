//! Unit production queues.
//!
//! Each player has one queue. Every queued unit counts down independently;
//! there is no parallelism limit and no ordering between items. A unit is
//! paid for when queued and spawns at its owner's home zone when its
//! countdown reaches zero.

use serde::{Deserialize, Serialize};

use crate::data::UnitKind;
use crate::player::PlayerState;

/// One unit in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionItem {
    /// Unit being trained.
    pub unit: UnitKind,
    /// Turns until it spawns. Always at least 1 while queued.
    pub turns_left: u32,
}

/// A player's production queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionQueue {
    items: Vec<ProductionItem>,
}

impl ProductionQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one unit with its full training time.
    pub fn enqueue(&mut self, unit: UnitKind) {
        self.items.push(ProductionItem {
            unit,
            turns_left: unit.stats().train_turns.max(1),
        });
    }

    /// Count every item down by one turn and remove the ones that finish.
    ///
    /// Returns the finished units in queue order.
    pub fn advance(&mut self) -> Vec<UnitKind> {
        let mut finished = Vec::new();
        self.items.retain_mut(|item| {
            item.turns_left = item.turns_left.saturating_sub(1);
            if item.turns_left == 0 {
                finished.push(item.unit);
                false
            } else {
                true
            }
        });
        finished
    }

    /// Items currently in training.
    #[must_use]
    pub fn items(&self) -> &[ProductionItem] {
        &self.items
    }

    /// Number of units in training.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether nothing is in training.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Advance a player's queue one turn, spawning finished units at home.
///
/// Returns the spawned units so the caller can log them.
pub fn production_system(player: &mut PlayerState) -> Vec<UnitKind> {
    let spawned = player.production.advance();
    let home = player.home;
    for &unit in &spawned {
        player.add_units(home, unit, 1);
    }
    spawned
}
