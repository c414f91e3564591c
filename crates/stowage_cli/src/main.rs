//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stowage_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use stowage_core::{Container, GridSize, Item, ItemDefinition};
use std::sync::Arc;

fn main() {
    println!("stowage_core version={}", stowage_core::core_version());

    let definition = ItemDefinition::new("probe", "Probe", GridSize::new(2, 1))
        .expect("probe definition is valid");
    let mut grid = Container::new(GridSize::new(5, 4));
    let root = grid
        .try_add(Item::new(Arc::new(definition)))
        .expect("empty 5x4 grid fits a 2x1 item");
    println!("stowage_core first_fit_root={},{}", root.x, root.y);
}
