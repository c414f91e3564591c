//! Orchestration layer: ownership registry, transfers, notifications.

pub mod events;
pub mod inventory;

pub use events::{EventLog, InventoryEvent};
pub use inventory::{ContainerAccess, InventoryService, LootableOwner, OwnerId, PlayerOwner};
