//! Inventory orchestration service.
//!
//! # Responsibility
//! - Track which owner wears which frame and which containers were vended.
//! - Perform cross-container transfers transactionally with best-effort
//!   rollback.
//! - Resolve owners to their concrete container set via capability
//!   dispatch.
//!
//! # Invariants
//! - One equipped frame per owner at most.
//! - A transfer leaves the item either in the destination or back in the
//!   source, never in both and never in neither.
//! - Exactly one notification per successful mutation, none on failure.

use crate::model::container::{Container, ContainerId};
use crate::model::frame::Frame;
use crate::model::grid::Cell;
use crate::model::item::{Item, ItemId};
use crate::service::events::{EventLog, InventoryEvent};
use log::{debug, error, info};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identity of anything that can have containers associated with
/// it: a player, a world chest, a vehicle.
pub type OwnerId = Uuid;

/// Capability of an owner kind to name the containers it exposes.
///
/// The service dispatches through this trait instead of switching on owner
/// kinds, so new owner types need no service change.
pub trait ContainerAccess {
    fn owner_id(&self) -> OwnerId;

    /// Container ids this owner currently exposes, in presentation order.
    fn accessible_containers(&self, service: &InventoryService) -> Vec<ContainerId>;
}

/// An owner whose containers are the modules of its equipped frame.
#[derive(Debug, Clone, Copy)]
pub struct PlayerOwner {
    id: OwnerId,
}

impl PlayerOwner {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn with_id(id: OwnerId) -> Self {
        Self { id }
    }
}

impl Default for PlayerOwner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerAccess for PlayerOwner {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn accessible_containers(&self, service: &InventoryService) -> Vec<ContainerId> {
        match service.equipped_frame(self.id) {
            Some(frame) => frame
                .modules()
                .filter_map(|module| module.storage().map(Container::id))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// An owner with one fixed world container, e.g. a lootable chest.
#[derive(Debug, Clone, Copy)]
pub struct LootableOwner {
    id: OwnerId,
    container: ContainerId,
}

impl LootableOwner {
    pub fn new(container: ContainerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            container,
        }
    }
}

impl ContainerAccess for LootableOwner {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn accessible_containers(&self, _service: &InventoryService) -> Vec<ContainerId> {
        vec![self.container]
    }
}

/// Orchestration facade over containers, frames and owners.
///
/// Constructed once and passed to collaborators explicitly; the service
/// holds no global state and there is exactly as much of it as the host
/// creates.
#[derive(Default)]
pub struct InventoryService {
    directory: BTreeMap<ContainerId, Item>,
    equipped: BTreeMap<OwnerId, Frame>,
    events: EventLog,
}

impl InventoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container-item in the directory and returns the id of
    /// its storage grid, allocating it if this is the first access.
    ///
    /// Plain items are handed back unchanged.
    pub fn vend_container(&mut self, mut item: Item) -> Result<ContainerId, Item> {
        let container_id = match item.storage_mut() {
            Some(storage) => storage.id(),
            None => return Err(item),
        };
        info!(
            "event=container_vended module=service container={} definition={}",
            container_id,
            item.definition().id
        );
        self.directory.insert(container_id, item);
        Ok(container_id)
    }

    /// Container-items the service has vended, in id order.
    pub fn vended_containers(&self) -> impl Iterator<Item = &Item> + '_ {
        self.directory.values()
    }

    /// Equips `frame` on `owner`.
    ///
    /// Fails (handing the frame back) when the owner already wears one;
    /// notifies only on success.
    pub fn equip_frame(&mut self, owner: OwnerId, frame: Frame) -> Result<(), Frame> {
        if self.equipped.contains_key(&owner) {
            debug!(
                "event=frame_equip module=service status=rejected owner={owner} reason=already_equipped"
            );
            return Err(frame);
        }
        info!(
            "event=frame_equip module=service status=ok owner={owner} frame={}",
            frame.id()
        );
        self.equipped.insert(owner, frame);
        self.events.push(InventoryEvent::FrameEquipped { owner });
        Ok(())
    }

    /// Removes and returns the owner's equipped frame; `None` (and no
    /// notification) when the owner wears none.
    pub fn unequip_frame(&mut self, owner: OwnerId) -> Option<Frame> {
        let frame = self.equipped.remove(&owner);
        match &frame {
            Some(frame) => {
                info!(
                    "event=frame_unequip module=service status=ok owner={owner} frame={}",
                    frame.id()
                );
                self.events.push(InventoryEvent::FrameUnequipped { owner });
            }
            None => {
                debug!(
                    "event=frame_unequip module=service status=rejected owner={owner} reason=none_equipped"
                );
            }
        }
        frame
    }

    pub fn equipped_frame(&self, owner: OwnerId) -> Option<&Frame> {
        self.equipped.get(&owner)
    }

    /// Currently equipped frames, in owner-id order.
    pub fn equipped_frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.equipped.values()
    }

    /// Resolves `id` to any container the service can reach: vended
    /// container-items (including container-items nested inside them) and
    /// equipped frames (module grid and module storages).
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        for item in self.directory.values() {
            if let Some(found) = item.storage().and_then(|storage| find_container(storage, id)) {
                return Some(found);
            }
        }
        for frame in self.equipped.values() {
            if let Some(found) = find_container(frame.module_grid(), id) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`InventoryService::container`].
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        for item in self.directory.values_mut() {
            if let Some(storage) = item.storage_if_allocated_mut() {
                if let Some(found) = find_container_mut(storage, id) {
                    return Some(found);
                }
            }
        }
        for frame in self.equipped.values_mut() {
            if let Some(found) = find_container_mut(frame.module_grid_mut(), id) {
                return Some(found);
            }
        }
        None
    }

    /// Containers an owner exposes, via its capability.
    pub fn resolve_containers(&self, owner: &dyn ContainerAccess) -> Vec<ContainerId> {
        owner.accessible_containers(self)
    }

    /// Moves one item between containers.
    ///
    /// The item must actually sit in `from`; placement into `to` uses
    /// first-fit or the explicit `target` root. On a failed placement the
    /// item is re-inserted into the source via first-fit as best-effort
    /// rollback and the transfer reports failure. Exactly one
    /// `ItemTransferred` notification fires on success.
    pub fn transfer(
        &mut self,
        from: ContainerId,
        to: ContainerId,
        item_id: ItemId,
        target: Option<Cell>,
    ) -> bool {
        let item = match self.container_mut(from).and_then(|source| source.remove(item_id)) {
            Some(item) => item,
            None => {
                debug!(
                    "event=transfer module=service status=rejected item={item_id} from={from} reason=not_in_source"
                );
                return false;
            }
        };

        let rejected = match self.container_mut(to) {
            Some(destination) => match target {
                Some(origin) => destination.try_add_at(item, origin).err(),
                None => destination.try_add(item).err(),
            },
            None => Some(item),
        };

        match rejected {
            None => {
                info!(
                    "event=transfer module=service status=ok item={item_id} from={from} to={to}"
                );
                self.events.push(InventoryEvent::ItemTransferred {
                    from,
                    to,
                    item: item_id,
                });
                true
            }
            Some(item) => {
                self.rollback_into(from, item);
                debug!(
                    "event=transfer module=service status=rejected item={item_id} from={from} to={to} reason=no_placement"
                );
                false
            }
        }
    }

    /// Removes the exact instance from whichever reachable container holds
    /// it. Fails when no reachable container does.
    pub fn try_destroy(&mut self, item_id: ItemId) -> bool {
        let Some(holder) = self.find_holder(item_id) else {
            debug!("event=destroy module=service status=rejected item={item_id} reason=not_held");
            return false;
        };
        let removed = self
            .container_mut(holder)
            .and_then(|container| container.remove(item_id));
        match removed {
            Some(_) => {
                info!("event=destroy module=service status=ok item={item_id} container={holder}");
                self.events.push(InventoryEvent::ItemDestroyed {
                    container: holder,
                    item: item_id,
                });
                true
            }
            None => false,
        }
    }

    /// Reachable container currently holding `item_id`.
    pub fn find_holder(&self, item_id: ItemId) -> Option<ContainerId> {
        for item in self.directory.values() {
            if let Some(found) = item.storage().and_then(|storage| holder_of(storage, item_id)) {
                return Some(found);
            }
        }
        for frame in self.equipped.values() {
            if let Some(found) = holder_of(frame.module_grid(), item_id) {
                return Some(found);
            }
        }
        None
    }

    /// Notifications pending since the last drain.
    pub fn pending_events(&self) -> &[InventoryEvent] {
        self.events.pending()
    }

    /// Hands pending notifications to the external consumer.
    pub fn drain_events(&mut self) -> Vec<InventoryEvent> {
        self.events.drain()
    }

    fn rollback_into(&mut self, from: ContainerId, item: Item) {
        let item_id = item.id();
        match self.container_mut(from) {
            Some(source) => {
                // The source freed this item's cells and no call ran in
                // between; a failure here drops the item.
                if source.try_add(item).is_err() {
                    error!(
                        "event=transfer_rollback module=service status=error item={item_id} from={from} reason=no_placement"
                    );
                }
            }
            None => {
                error!(
                    "event=transfer_rollback module=service status=error item={item_id} from={from} reason=source_unresolved"
                );
            }
        }
    }
}

fn find_container(container: &Container, id: ContainerId) -> Option<&Container> {
    if container.id() == id {
        return Some(container);
    }
    for placed in container.grid_items() {
        if let Some(storage) = placed.item().storage() {
            if let Some(found) = find_container(storage, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_container_mut(container: &mut Container, id: ContainerId) -> Option<&mut Container> {
    if container.id() == id {
        return Some(container);
    }
    for placed in container.grid_items_mut() {
        if let Some(storage) = placed.item_mut().storage_if_allocated_mut() {
            if let Some(found) = find_container_mut(storage, id) {
                return Some(found);
            }
        }
    }
    None
}

fn holder_of(container: &Container, item_id: ItemId) -> Option<ContainerId> {
    if container.contains_item(item_id) {
        return Some(container.id());
    }
    for placed in container.grid_items() {
        if let Some(storage) = placed.item().storage() {
            if let Some(found) = holder_of(storage, item_id) {
                return Some(found);
            }
        }
    }
    None
}
