//! Fixed-size placement grid.
//!
//! # Responsibility
//! - Place rectangular items without overlap and within bounds.
//! - Maintain the occupied-cell set as placements change.
//! - Expose the query surface rendering/drag-drop collaborators draw from.
//!
//! # Invariants
//! - No two placed items' spans intersect.
//! - Every placed item's span lies inside the grid bounds.
//! - The occupied-cell set equals the union of all current spans.
//! - Placement and removal keep the holder back-reference of the affected
//!   item in sync.

use crate::model::grid::{Cell, GridSize, Span};
use crate::model::item::{Item, ItemId};
use log::trace;
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier for one container instance.
pub type ContainerId = Uuid;

/// An item bound to its root position inside one container.
#[derive(Debug)]
pub struct GridItem {
    origin: Cell,
    item: Item,
}

impl GridItem {
    pub fn origin(&self) -> Cell {
        self.origin
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub(crate) fn item_mut(&mut self) -> &mut Item {
        &mut self.item
    }

    /// The cells this placement occupies; the authoritative occupancy proof.
    pub fn span(&self) -> Span {
        Span::new(self.origin, self.item.size())
    }
}

/// Fixed-bounds 2D grid holding placed items.
///
/// Every mutation either commits completely or leaves the grid untouched;
/// ordinary capacity/overlap failures hand the rejected item back to the
/// caller instead of raising errors.
#[derive(Debug)]
pub struct Container {
    id: ContainerId,
    size: GridSize,
    items: Vec<GridItem>,
    occupied: HashSet<Cell>,
}

impl Container {
    pub fn new(size: GridSize) -> Self {
        debug_assert!(size.is_positive(), "container bounds must be at least 1x1");
        Self {
            id: Uuid::new_v4(),
            size,
            items: Vec::new(),
            occupied: HashSet::new(),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First-fit placement.
    ///
    /// Scans rows top to bottom and columns left to right, committing at the
    /// first root position whose span is in bounds and free. The scan order
    /// is part of the contract: for a fixed grid state and item size the
    /// chosen root is always the lexicographically smallest valid one.
    ///
    /// Returns the committed root, or the item back when no position fits.
    pub fn try_add(&mut self, item: Item) -> Result<Cell, Item> {
        let size = item.size();
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let origin = Cell::new(x, y);
                if self.fits_at(size, origin) {
                    return Ok(self.commit(item, origin));
                }
            }
        }
        Err(item)
    }

    /// Explicit-position placement; same validity rule as `try_add` at one
    /// root. Returns the item back when the span is out of bounds or
    /// collides.
    pub fn try_add_at(&mut self, item: Item, origin: Cell) -> Result<(), Item> {
        if self.fits_at(item.size(), origin) {
            self.commit(item, origin);
            Ok(())
        } else {
            Err(item)
        }
    }

    /// Pure dry-run of the placement validity predicate.
    pub fn fits_at(&self, size: GridSize, origin: Cell) -> bool {
        let span = Span::new(origin, size);
        span.within(self.size) && span.cells().all(|cell| !self.occupied.contains(&cell))
    }

    /// Removes the exact instance `item_id`, clearing its cells and holder
    /// back-reference. Returns the evicted item, or `None` when this
    /// container does not hold it.
    pub fn remove(&mut self, item_id: ItemId) -> Option<Item> {
        let index = self
            .items
            .iter()
            .position(|placed| placed.item.id() == item_id)?;
        Some(self.evict(index))
    }

    /// Removes whichever placement covers `cell`; `None` when the cell is
    /// free.
    pub fn remove_at(&mut self, cell: Cell) -> Option<Item> {
        let index = self.items.iter().position(|placed| placed.span().contains(cell))?;
        Some(self.evict(index))
    }

    /// First placement whose span covers `cell`.
    pub fn grid_item_at(&self, cell: Cell) -> Option<&GridItem> {
        self.items.iter().find(|placed| placed.span().contains(cell))
    }

    /// Item whose span covers `cell`.
    pub fn item_at(&self, cell: Cell) -> Option<&Item> {
        self.grid_item_at(cell).map(GridItem::item)
    }

    /// Placement of the exact instance `item_id`.
    pub fn find(&self, item_id: ItemId) -> Option<&GridItem> {
        self.items.iter().find(|placed| placed.item.id() == item_id)
    }

    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.find(item_id).is_some()
    }

    /// Current placements in insertion order.
    pub fn grid_items(&self) -> &[GridItem] {
        &self.items
    }

    pub(crate) fn grid_items_mut(&mut self) -> impl Iterator<Item = &mut GridItem> + '_ {
        self.items.iter_mut()
    }

    /// Placed items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().map(GridItem::item)
    }

    /// Cells covered by at least one placement.
    pub fn occupied_cells(&self) -> &HashSet<Cell> {
        &self.occupied
    }

    fn commit(&mut self, mut item: Item, origin: Cell) -> Cell {
        let span = Span::new(origin, item.size());
        for cell in span.cells() {
            let inserted = self.occupied.insert(cell);
            debug_assert!(inserted, "placement committed over an occupied cell");
        }
        item.set_holder(Some(self.id));
        trace!(
            "event=item_placed module=container container={} item={} x={} y={}",
            self.id,
            item.id(),
            origin.x,
            origin.y
        );
        self.items.push(GridItem { origin, item });
        origin
    }

    fn evict(&mut self, index: usize) -> Item {
        let placed = self.items.remove(index);
        for cell in placed.span().cells() {
            let removed = self.occupied.remove(&cell);
            debug_assert!(removed, "evicted span covered an unoccupied cell");
        }
        let mut item = placed.item;
        item.set_holder(None);
        trace!(
            "event=item_removed module=container container={} item={}",
            self.id,
            item.id()
        );
        item
    }
}
