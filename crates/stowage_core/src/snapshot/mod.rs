//! Position-preserving persistence records.
//!
//! # Responsibility
//! - Capture container and frame layouts as (definition id, root position)
//!   records matching the external camelCase format.
//! - Restore layouts against an externally-owned definition registry using
//!   only explicit-position placement.
//!
//! # Invariants
//! - Restore reproduces the exact saved layout or fails loudly; it never
//!   silently drops an item and never falls back to first-fit search.
//! - Records carry identity and position only; per-instance state bags are
//!   not persisted and behaviors re-derive their data on load.

use crate::catalog::DefinitionSource;
use crate::model::container::Container;
use crate::model::frame::Frame;
use crate::model::grid::Cell;
use crate::model::item::Item;
use crate::service::inventory::InventoryService;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One placed item: which definition, at which root cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub definition_id: String,
    pub root_x: u32,
    pub root_y: u32,
}

/// One container-item and its placements, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    pub definition_id: String,
    pub items: Vec<ItemRecord>,
}

/// One attached module: its root on the frame grid plus its own contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub definition_id: String,
    pub root_x: u32,
    pub root_y: u32,
    pub module_container: ContainerRecord,
}

/// One frame: the module grid layout plus each module's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub module_grid_container: ContainerRecord,
    pub modules: Vec<ModuleRecord>,
}

/// Everything the service can reach, as one restorable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGame {
    pub containers: Vec<ContainerRecord>,
    pub frames: Vec<FrameRecord>,
}

/// Restore failures. Each variant names exactly what the saved layout
/// demanded and the current registry/grid could not honor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    UnknownItemDefinition(String),
    UnknownFrameDefinition(String),
    /// The record claims storage contents but the definition has no grid.
    NotAContainer(String),
    /// The saved root is out of bounds or already covered.
    PlacementConflict {
        definition_id: String,
        x: u32,
        y: u32,
    },
}

impl Display for RestoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItemDefinition(id) => {
                write!(f, "item definition not found in registry: {id}")
            }
            Self::UnknownFrameDefinition(id) => {
                write!(f, "frame definition not found in registry: {id}")
            }
            Self::NotAContainer(id) => {
                write!(f, "definition has no storage grid: {id}")
            }
            Self::PlacementConflict { definition_id, x, y } => {
                write!(f, "cannot re-place `{definition_id}` at saved root ({x}, {y})")
            }
        }
    }
}

impl Error for RestoreError {}

/// Captures a container-item's current layout; `None` for plain items.
///
/// A container-item whose storage was never touched captures as an empty
/// record.
pub fn capture_container_item(item: &Item) -> Option<ContainerRecord> {
    if !item.is_container() {
        return None;
    }
    Some(ContainerRecord {
        definition_id: item.definition().id.clone(),
        items: item.storage().map(capture_placements).unwrap_or_default(),
    })
}

/// Captures a frame: the module grid layout plus, per module, its root and
/// internal contents.
pub fn capture_frame(frame: &Frame) -> FrameRecord {
    let modules = frame
        .module_grid()
        .grid_items()
        .iter()
        .map(|placed| ModuleRecord {
            definition_id: placed.item().definition().id.clone(),
            root_x: placed.origin().x,
            root_y: placed.origin().y,
            module_container: ContainerRecord {
                definition_id: placed.item().definition().id.clone(),
                items: placed.item().storage().map(capture_placements).unwrap_or_default(),
            },
        })
        .collect();

    FrameRecord {
        module_grid_container: ContainerRecord {
            definition_id: frame.definition().id.clone(),
            items: capture_placements(frame.module_grid()),
        },
        modules,
    }
}

/// Captures every vended container and equipped frame of a service.
pub fn capture_save(service: &InventoryService) -> SaveGame {
    SaveGame {
        containers: service
            .vended_containers()
            .filter_map(capture_container_item)
            .collect(),
        frames: service.equipped_frames().map(capture_frame).collect(),
    }
}

/// Rebuilds one container-item from its record.
///
/// Fresh instances are created through `source` and re-placed at their
/// saved roots via the explicit-position path only.
///
/// # Errors
/// - `UnknownItemDefinition` when any id fails to resolve.
/// - `NotAContainer` when the outer definition has no storage grid.
/// - `PlacementConflict` when a saved root cannot be honored.
pub fn restore_container_item(
    record: &ContainerRecord,
    source: &dyn DefinitionSource,
) -> Result<Item, RestoreError> {
    let definition = source
        .item_definition(record.definition_id.as_str())
        .ok_or_else(|| RestoreError::UnknownItemDefinition(record.definition_id.clone()))?;
    if !definition.is_container() {
        return Err(RestoreError::NotAContainer(record.definition_id.clone()));
    }

    let mut item = Item::new(definition);
    let Some(storage) = item.storage_mut() else {
        return Err(RestoreError::NotAContainer(record.definition_id.clone()));
    };
    for placed in &record.items {
        let child_definition = source
            .item_definition(placed.definition_id.as_str())
            .ok_or_else(|| RestoreError::UnknownItemDefinition(placed.definition_id.clone()))?;
        let child = Item::new(child_definition);
        if storage
            .try_add_at(child, Cell::new(placed.root_x, placed.root_y))
            .is_err()
        {
            return Err(RestoreError::PlacementConflict {
                definition_id: placed.definition_id.clone(),
                x: placed.root_x,
                y: placed.root_y,
            });
        }
    }
    Ok(item)
}

/// Rebuilds one frame from its record.
///
/// The frame starts empty (no default modules); each saved module is
/// restored with its contents and attached at its saved root. The module
/// grid's own item list is carried redundantly by the external format; the
/// per-module records are authoritative here.
pub fn restore_frame(
    record: &FrameRecord,
    source: &dyn DefinitionSource,
) -> Result<Frame, RestoreError> {
    let frame_definition_id = record.module_grid_container.definition_id.as_str();
    let definition = source
        .frame_definition(frame_definition_id)
        .ok_or_else(|| RestoreError::UnknownFrameDefinition(frame_definition_id.to_string()))?;

    let mut frame = Frame::empty(definition);
    for module in &record.modules {
        let restored = restore_container_item(&module.module_container, source)?;
        if frame
            .attach_module_at(restored, Cell::new(module.root_x, module.root_y))
            .is_err()
        {
            return Err(RestoreError::PlacementConflict {
                definition_id: module.definition_id.clone(),
                x: module.root_x,
                y: module.root_y,
            });
        }
    }
    Ok(frame)
}

fn capture_placements(container: &Container) -> Vec<ItemRecord> {
    container
        .grid_items()
        .iter()
        .map(|placed| ItemRecord {
            definition_id: placed.item().definition().id.clone(),
            root_x: placed.origin().x,
            root_y: placed.origin().y,
        })
        .collect()
}
