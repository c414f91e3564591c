//! Frame and module hierarchy.
//!
//! # Responsibility
//! - Own one module grid per frame and place modules on it.
//! - Keep the two coordinate spaces independent: frame cell -> module,
//!   module cell -> item.
//!
//! # Invariants
//! - Only container-items are accepted as modules.
//! - A module's storage grid is allocated when the module is attached, so
//!   every attached module is addressable as a container.
//! - Default-module population never aborts frame construction; modules
//!   that cannot resolve or fit are skipped.

use crate::catalog::DefinitionSource;
use crate::model::container::Container;
use crate::model::grid::{Cell, GridSize};
use crate::model::item::{validate_definition_id, DefinitionError, Item};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier for one frame instance.
pub type FrameId = Uuid;

/// Immutable frame template: the module grid bounds and the modules a
/// freshly built frame starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDefinition {
    pub id: String,
    pub name: String,
    pub module_grid: GridSize,
    pub default_modules: Vec<String>,
}

impl FrameDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        module_grid: GridSize,
    ) -> Result<Self, DefinitionError> {
        let id = id.into();
        validate_definition_id(id.as_str())?;
        if !module_grid.is_positive() {
            return Err(DefinitionError::InvalidSize {
                width: module_grid.width,
                height: module_grid.height,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            module_grid,
            default_modules: Vec::new(),
        })
    }

    /// Definition ids of modules to pre-populate, in placement order.
    pub fn with_default_modules(mut self, default_modules: Vec<String>) -> Self {
        self.default_modules = default_modules;
        self
    }
}

/// A wearable frame: one module grid whose placements are modules, each
/// with its own internal storage grid.
#[derive(Debug)]
pub struct Frame {
    id: FrameId,
    definition: Arc<FrameDefinition>,
    module_grid: Container,
}

impl Frame {
    /// Builds a frame and pre-populates its default modules in
    /// definition-list order via first-fit placement.
    ///
    /// A default module whose definition cannot be resolved, is not a
    /// container, or does not fit is skipped; construction itself never
    /// fails.
    pub fn new(definition: Arc<FrameDefinition>, source: &dyn DefinitionSource) -> Self {
        let mut frame = Self::empty(Arc::clone(&definition));
        for module_id in &definition.default_modules {
            let Some(module_definition) = source.item_definition(module_id) else {
                warn!(
                    "event=default_module_skipped module=frame frame={} definition={} reason=unknown_definition",
                    definition.id, module_id
                );
                continue;
            };
            let module = Item::new(module_definition);
            if let Err(skipped) = frame.attach_module(module) {
                warn!(
                    "event=default_module_skipped module=frame frame={} definition={} reason={}",
                    definition.id,
                    module_id,
                    if skipped.is_container() { "no_fit" } else { "not_a_container" }
                );
            }
        }
        frame
    }

    /// Builds a frame without default modules; the restore path places
    /// saved modules explicitly instead.
    pub fn empty(definition: Arc<FrameDefinition>) -> Self {
        let module_grid = Container::new(definition.module_grid);
        Self {
            id: Uuid::new_v4(),
            definition,
            module_grid,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn definition(&self) -> &Arc<FrameDefinition> {
        &self.definition
    }

    /// The grid modules are placed on.
    pub fn module_grid(&self) -> &Container {
        &self.module_grid
    }

    pub fn module_grid_mut(&mut self) -> &mut Container {
        &mut self.module_grid
    }

    /// Attaches one module via first-fit placement.
    ///
    /// The module's storage grid is allocated here so the attached module is
    /// immediately addressable as a container. Non-container items are
    /// handed back unchanged.
    pub fn attach_module(&mut self, mut module: Item) -> Result<Cell, Item> {
        if module.storage_mut().is_none() {
            return Err(module);
        }
        self.module_grid.try_add(module)
    }

    /// Attaches one module at an explicit root cell; the restore path.
    pub fn attach_module_at(&mut self, mut module: Item, origin: Cell) -> Result<(), Item> {
        if module.storage_mut().is_none() {
            return Err(module);
        }
        self.module_grid.try_add_at(module, origin)
    }

    /// Attached modules in placement order.
    pub fn modules(&self) -> impl Iterator<Item = &Item> + '_ {
        self.module_grid.items()
    }

    /// Attached modules with their roots on the frame grid, for
    /// placement-sensitive consumers.
    pub fn module_placements(&self) -> impl Iterator<Item = (Cell, &Item)> + '_ {
        self.module_grid
            .grid_items()
            .iter()
            .map(|placed| (placed.origin(), placed.item()))
    }

    /// Module whose span covers `cell` on the frame grid.
    pub fn module_at(&self, cell: Cell) -> Option<&Item> {
        self.module_grid.item_at(cell)
    }

    /// Mutable internal storage of the module covering `cell`.
    ///
    /// Always `Some` for attached modules, whose storage is allocated at
    /// attach time.
    pub fn module_storage_mut(&mut self, cell: Cell) -> Option<&mut Container> {
        self.module_grid
            .grid_items_mut()
            .find(|placed| placed.span().contains(cell))
            .and_then(|placed| placed.item_mut().storage_if_allocated_mut())
    }
}
