//! Item templates and instances.
//!
//! # Responsibility
//! - Define the immutable, shared item template (`ItemDefinition`).
//! - Define the mutable instance (`Item`) with state bag, holder
//!   back-reference and lazily allocated storage grid.
//!
//! # Invariants
//! - Definition ids are non-blank lowercase slugs; sizes are at least 1x1.
//! - An item's holder back-reference is set iff the item currently sits in
//!   exactly one container's placement list.
//! - A storage grid exists only for container definitions and only after
//!   the first mutable storage access.

use crate::model::container::{Container, ContainerId};
use crate::model::grid::GridSize;
use crate::model::state::StateBag;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier for one item instance.
pub type ItemId = Uuid;

static DEFINITION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]*$").expect("valid definition id regex"));

/// Validates one definition id slug.
///
/// Ids are the stable keys persistence records and catalogs resolve by, so
/// the accepted alphabet is deliberately narrow.
pub fn validate_definition_id(id: &str) -> Result<(), DefinitionError> {
    if DEFINITION_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(DefinitionError::InvalidId(id.to_string()))
    }
}

/// Definition construction errors. Hard failures: a definition that fails
/// here must never reach a catalog or an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Id is blank or not a lowercase slug.
    InvalidId(String),
    /// Either dimension is zero.
    InvalidSize { width: u32, height: u32 },
}

impl Display for DefinitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "definition id is invalid: `{id}`"),
            Self::InvalidSize { width, height } => {
                write!(f, "definition size must be at least 1x1, got {width}x{height}")
            }
        }
    }
}

impl Error for DefinitionError {}

/// Immutable, sharable item template.
///
/// Behaviors are opaque capability tags consumed by external collaborators;
/// the engine never interprets them. A definition with `storage` set yields
/// container-item instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub size: GridSize,
    pub behaviors: Vec<String>,
    pub storage: Option<GridSize>,
}

impl ItemDefinition {
    /// Creates a definition with display fields defaulted to empty.
    ///
    /// # Errors
    /// - `InvalidId` when `id` is not a lowercase slug.
    /// - `InvalidSize` when either footprint dimension is zero.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: GridSize,
    ) -> Result<Self, DefinitionError> {
        let id = id.into();
        validate_definition_id(id.as_str())?;
        ensure_positive(size)?;
        Ok(Self {
            id,
            name: name.into(),
            description: String::new(),
            icon: String::new(),
            size,
            behaviors: Vec::new(),
            storage: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_behaviors(mut self, behaviors: Vec<String>) -> Self {
        self.behaviors = behaviors;
        self
    }

    /// Marks instances of this definition as container-items with an
    /// internal grid of `size`.
    pub fn with_storage(mut self, size: GridSize) -> Result<Self, DefinitionError> {
        ensure_positive(size)?;
        self.storage = Some(size);
        Ok(self)
    }

    /// Whether instances own an internal storage grid.
    pub fn is_container(&self) -> bool {
        self.storage.is_some()
    }
}

fn ensure_positive(size: GridSize) -> Result<(), DefinitionError> {
    if size.is_positive() {
        Ok(())
    } else {
        Err(DefinitionError::InvalidSize {
            width: size.width,
            height: size.height,
        })
    }
}

/// One item instance.
///
/// Behaviors attach their data through the state bag at construction time
/// and afterwards; the instance itself never interprets it.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    definition: Arc<ItemDefinition>,
    state: StateBag,
    holder: Option<ContainerId>,
    storage: Option<Container>,
}

impl Item {
    /// Instantiates a definition.
    ///
    /// Storage is not allocated here even for container definitions; it
    /// materializes on the first `storage_mut` call.
    pub fn new(definition: Arc<ItemDefinition>) -> Self {
        Self {
            id: Uuid::new_v4(),
            definition,
            state: StateBag::new(),
            holder: None,
            storage: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn definition(&self) -> &Arc<ItemDefinition> {
        &self.definition
    }

    /// Footprint on the grid holding this item.
    pub fn size(&self) -> GridSize {
        self.definition.size
    }

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateBag {
        &mut self.state
    }

    /// Container currently holding this item, if any.
    pub fn holder(&self) -> Option<ContainerId> {
        self.holder
    }

    pub(crate) fn set_holder(&mut self, holder: Option<ContainerId>) {
        self.holder = holder;
    }

    /// Whether this instance can own an internal storage grid.
    pub fn is_container(&self) -> bool {
        self.definition.is_container()
    }

    /// Whether the storage grid has been materialized yet.
    pub fn storage_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// Internal storage grid, if allocated. Never allocates.
    pub fn storage(&self) -> Option<&Container> {
        self.storage.as_ref()
    }

    /// Internal storage grid for container-items, allocated on first call.
    ///
    /// Returns `None` for plain items.
    pub fn storage_mut(&mut self) -> Option<&mut Container> {
        let size = self.definition.storage?;
        if self.storage.is_none() {
            log::debug!(
                "event=storage_alloc module=model definition={} width={} height={}",
                self.definition.id,
                size.width,
                size.height
            );
            self.storage = Some(Container::new(size));
        }
        self.storage.as_mut()
    }

    /// Mutable storage access that never allocates; used by traversals that
    /// must not disturb the lazy-allocation guarantee.
    pub(crate) fn storage_if_allocated_mut(&mut self) -> Option<&mut Container> {
        self.storage.as_mut()
    }
}
