//! Definition registry seam and reference catalog.
//!
//! # Responsibility
//! - Define the resolution interface (`DefinitionSource`) frames and the
//!   restore path program against.
//! - Provide the in-process reference implementation used by hosts that do
//!   not bring their own registry.
//!
//! # Invariants
//! - Registered ids are unique per kind (item vs frame).
//! - Instantiation of an unknown id is a hard failure, never a silently
//!   defaulted item.

use crate::model::frame::{Frame, FrameDefinition};
use crate::model::item::{Item, ItemDefinition};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Resolution seam to the externally-owned definition registry.
///
/// The engine never assumes a concrete registry; anything that can resolve
/// ids to shared definitions qualifies.
pub trait DefinitionSource {
    fn item_definition(&self, id: &str) -> Option<Arc<ItemDefinition>>;
    fn frame_definition(&self, id: &str) -> Option<Arc<FrameDefinition>>;
}

/// Catalog registration/instantiation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateDefinition(String),
    UnknownDefinition(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateDefinition(id) => write!(f, "definition id already registered: {id}"),
            Self::UnknownDefinition(id) => write!(f, "definition not found: {id}"),
        }
    }
}

impl Error for CatalogError {}

/// In-memory definition catalog.
///
/// Registering definitions is cheap deliberately: no instance data and no
/// storage grids exist until a definition is instantiated and its storage
/// touched.
#[derive(Default)]
pub struct DefinitionCatalog {
    items: BTreeMap<String, Arc<ItemDefinition>>,
    frames: BTreeMap<String, Arc<FrameDefinition>>,
}

impl DefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one item definition.
    pub fn register_item(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        if self.items.contains_key(definition.id.as_str()) {
            return Err(CatalogError::DuplicateDefinition(definition.id));
        }
        debug!(
            "event=definition_registered module=catalog kind=item definition={}",
            definition.id
        );
        self.items.insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Registers one frame definition.
    pub fn register_frame(&mut self, definition: FrameDefinition) -> Result<(), CatalogError> {
        if self.frames.contains_key(definition.id.as_str()) {
            return Err(CatalogError::DuplicateDefinition(definition.id));
        }
        debug!(
            "event=definition_registered module=catalog kind=frame definition={}",
            definition.id
        );
        self.frames.insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Instantiates one item from a registered definition.
    ///
    /// # Errors
    /// - `UnknownDefinition` when `id` was never registered; the "missing
    ///   definition" construction failure.
    pub fn instantiate(&self, id: &str) -> Result<Item, CatalogError> {
        let definition = self
            .items
            .get(id)
            .ok_or_else(|| CatalogError::UnknownDefinition(id.to_string()))?;
        Ok(Item::new(Arc::clone(definition)))
    }

    /// Builds a frame from a registered definition, pre-populating its
    /// default modules out of this catalog.
    pub fn build_frame(&self, id: &str) -> Result<Frame, CatalogError> {
        let definition = self
            .frames
            .get(id)
            .ok_or_else(|| CatalogError::UnknownDefinition(id.to_string()))?;
        Ok(Frame::new(Arc::clone(definition), self))
    }

    /// Registered item definition ids, sorted.
    pub fn item_ids(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Registered frame definition ids, sorted.
    pub fn frame_ids(&self) -> Vec<String> {
        self.frames.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len() + self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.frames.is_empty()
    }
}

impl DefinitionSource for DefinitionCatalog {
    fn item_definition(&self, id: &str) -> Option<Arc<ItemDefinition>> {
        self.items.get(id).cloned()
    }

    fn frame_definition(&self, id: &str) -> Option<Arc<FrameDefinition>> {
        self.frames.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, DefinitionCatalog, DefinitionSource};
    use crate::model::grid::GridSize;
    use crate::model::item::ItemDefinition;

    fn catalog_with_coin() -> DefinitionCatalog {
        let mut catalog = DefinitionCatalog::new();
        catalog
            .register_item(ItemDefinition::new("coin", "Coin", GridSize::new(1, 1)).expect("coin"))
            .expect("register coin");
        catalog
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut catalog = catalog_with_coin();
        let err = catalog
            .register_item(ItemDefinition::new("coin", "Coin", GridSize::new(1, 1)).expect("coin"))
            .expect_err("duplicate must fail");
        assert_eq!(err, CatalogError::DuplicateDefinition("coin".to_string()));
    }

    #[test]
    fn instantiate_unknown_definition_fails() {
        let catalog = catalog_with_coin();
        let err = catalog.instantiate("gem").expect_err("unknown id");
        assert_eq!(err, CatalogError::UnknownDefinition("gem".to_string()));
    }

    #[test]
    fn instances_share_one_definition() {
        let catalog = catalog_with_coin();
        let a = catalog.instantiate("coin").expect("first");
        let b = catalog.instantiate("coin").expect("second");
        assert!(std::sync::Arc::ptr_eq(a.definition(), b.definition()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn resolves_as_definition_source() {
        let catalog = catalog_with_coin();
        assert!(catalog.item_definition("coin").is_some());
        assert!(catalog.item_definition("gem").is_none());
        assert!(catalog.frame_definition("coin").is_none());
    }
}
