//! Inventory change notifications.
//!
//! # Responsibility
//! - Record one event per successful service mutation for external
//!   consumers (UI refresh, audio cues, quest triggers).
//!
//! # Invariants
//! - Failed operations never append an event.
//! - Events are delivered in mutation order and drained exactly once.

use crate::model::container::ContainerId;
use crate::model::item::ItemId;
use crate::service::inventory::OwnerId;

/// One observed inventory change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemTransferred {
        from: ContainerId,
        to: ContainerId,
        item: ItemId,
    },
    ItemDestroyed {
        container: ContainerId,
        item: ItemId,
    },
    FrameEquipped {
        owner: OwnerId,
    },
    FrameUnequipped {
        owner: OwnerId,
    },
}

/// Ordered log of pending notifications.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<InventoryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: InventoryEvent) {
        self.events.push(event);
    }

    /// Pending events without consuming them.
    pub fn pending(&self) -> &[InventoryEvent] {
        &self.events
    }

    /// Hands all pending events to the consumer and clears the log.
    pub fn drain(&mut self) -> Vec<InventoryEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
