use std::collections::HashSet;
use std::sync::Arc;
use stowage_core::{Cell, Container, GridSize, Item, ItemDefinition};

fn item(id: &str, width: u32, height: u32) -> Item {
    Item::new(Arc::new(
        ItemDefinition::new(id, id, GridSize::new(width, height)).unwrap(),
    ))
}

fn span_union(grid: &Container) -> HashSet<Cell> {
    grid.grid_items()
        .iter()
        .flat_map(|placed| placed.span().cells())
        .collect()
}

fn assert_invariants(grid: &Container) {
    let placements = grid.grid_items();
    for (index, a) in placements.iter().enumerate() {
        assert!(
            a.span().within(grid.size()),
            "placement at {:?} leaves bounds",
            a.origin()
        );
        for b in placements.iter().skip(index + 1) {
            assert!(
                !a.span().intersects(&b.span()),
                "placements at {:?} and {:?} overlap",
                a.origin(),
                b.origin()
            );
        }
    }
    assert_eq!(*grid.occupied_cells(), span_union(grid));
}

#[test]
fn empty_grid_places_first_item_at_origin() {
    let mut grid = Container::new(GridSize::new(5, 4));
    let root = grid.try_add(item("bar", 2, 1)).unwrap();
    assert_eq!(root, Cell::new(0, 0));
}

#[test]
fn second_item_lands_at_first_free_slot_in_scan_order() {
    let mut grid = Container::new(GridSize::new(5, 4));
    grid.try_add(item("bar", 2, 1)).unwrap();
    let root = grid.try_add(item("bar", 2, 1)).unwrap();
    assert_eq!(root, Cell::new(2, 0));
}

#[test]
fn first_fit_is_deterministic_across_runs() {
    let mut roots_by_run = Vec::new();
    for _ in 0..2 {
        let mut grid = Container::new(GridSize::new(6, 5));
        let mut roots = Vec::new();
        for (id, width, height) in [("a", 3, 2), ("b", 2, 2), ("c", 4, 1), ("d", 1, 3)] {
            roots.push(grid.try_add(item(id, width, height)).unwrap());
        }
        roots_by_run.push(roots);
    }
    assert_eq!(roots_by_run[0], roots_by_run[1]);
}

#[test]
fn invariants_hold_under_interleaved_adds_and_removes() {
    let mut grid = Container::new(GridSize::new(6, 6));

    let first = grid.try_add(item("block", 2, 2)).unwrap();
    grid.try_add(item("bar", 3, 1)).unwrap();
    grid.try_add(item("rod", 1, 4)).unwrap();
    assert_invariants(&grid);

    let removed = grid.remove_at(first).unwrap();
    assert!(removed.holder().is_none());
    assert_invariants(&grid);

    grid.try_add(item("slab", 4, 2)).unwrap();
    grid.try_add(item("pebble", 1, 1)).unwrap();
    assert_invariants(&grid);

    while let Some(id) = grid.grid_items().first().map(|placed| placed.item().id()) {
        grid.remove(id).unwrap();
        assert_invariants(&grid);
    }
    assert!(grid.occupied_cells().is_empty());
}

#[test]
fn oversized_item_is_rejected_and_grid_unchanged() {
    let mut grid = Container::new(GridSize::new(5, 4));
    grid.try_add_at(item("pebble", 1, 1), Cell::new(2, 1)).unwrap();

    let rejected = grid.try_add(item("plate", 5, 4)).unwrap_err();
    assert_eq!(rejected.size(), GridSize::new(5, 4));
    assert!(rejected.holder().is_none());
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.occupied_cells().len(), 1);
    assert_invariants(&grid);
}

#[test]
fn fragmented_grid_rejects_item_that_only_fits_in_total_area() {
    // 4 free cells remain but never 2x2-contiguous.
    let mut grid = Container::new(GridSize::new(3, 3));
    grid.try_add_at(item("bar", 3, 1), Cell::new(0, 1)).unwrap();
    grid.try_add_at(item("pebble", 1, 1), Cell::new(1, 0)).unwrap();
    grid.try_add_at(item("pebble", 1, 1), Cell::new(1, 2)).unwrap();

    assert!(grid.try_add(item("block", 2, 2)).is_err());
    assert_invariants(&grid);
}

#[test]
fn fits_at_is_a_pure_dry_run() {
    let mut grid = Container::new(GridSize::new(4, 4));
    grid.try_add_at(item("block", 2, 2), Cell::new(0, 0)).unwrap();

    let before = grid.occupied_cells().clone();
    assert!(grid.fits_at(GridSize::new(2, 2), Cell::new(2, 2)));
    assert!(!grid.fits_at(GridSize::new(2, 2), Cell::new(1, 1)));
    assert!(!grid.fits_at(GridSize::new(2, 2), Cell::new(3, 3)));
    assert_eq!(*grid.occupied_cells(), before);
    assert_eq!(grid.len(), 1);
}

#[test]
fn queries_report_covered_cells_and_instances() {
    let mut grid = Container::new(GridSize::new(4, 4));
    grid.try_add_at(item("block", 2, 2), Cell::new(1, 1)).unwrap();
    let id = grid.item_at(Cell::new(1, 1)).unwrap().id();

    assert!(grid.item_at(Cell::new(0, 0)).is_none());
    assert_eq!(grid.item_at(Cell::new(2, 2)).unwrap().id(), id);
    assert_eq!(grid.find(id).unwrap().origin(), Cell::new(1, 1));
    assert!(grid.contains_item(id));
}
