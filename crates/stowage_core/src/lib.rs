//! Core spatial-inventory engine for Stowage.
//! This crate is the single source of truth for placement invariants.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod snapshot;

pub use catalog::{CatalogError, DefinitionCatalog, DefinitionSource};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::container::{Container, ContainerId, GridItem};
pub use model::frame::{Frame, FrameDefinition, FrameId};
pub use model::grid::{Cell, GridSize, Span};
pub use model::item::{DefinitionError, Item, ItemDefinition, ItemId};
pub use model::state::{StateBag, StateValue};
pub use repo::{SaveRepoError, SaveRepoResult, SaveRepository, SqliteSaveRepository};
pub use service::{ContainerAccess, InventoryEvent, InventoryService, LootableOwner, OwnerId, PlayerOwner};
pub use snapshot::{
    capture_container_item, capture_frame, capture_save, restore_container_item, restore_frame,
    ContainerRecord, FrameRecord, ItemRecord, ModuleRecord, RestoreError, SaveGame,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
