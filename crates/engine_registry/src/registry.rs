//! The component registry: storage, indexes and lifetime management.
//!
//! A [`ComponentRegistry`] owns three views of the same records:
//!
//! 1. **Storage**: a vector of slots addressed by [`ComponentId`].
//! 2. **Entity index**: for each entity, the ids of the components it owns.
//! 3. **Family index**: for each [`FamilyId`], the ids of its components.
//!
//! Only the storage owns records; the two indexes hold ids. Every mutating
//! method updates all three views before returning, so callers never observe
//! a half-applied change.
//!
//! ## Slot lifecycle
//!
//! ```text
//! Empty ──create/attach/replace──▶ Live ──release/delete──▶ Empty
//!                                   │
//!                                   └─ungated delete while referenced──▶ Retired ──last ref dropped──▶ Empty
//! ```
//!
//! An id is recycled only once its slot is `Empty`, which guarantees a
//! [`ComponentHandle`] never observes its id being handed to another record.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::component::{Component, ComponentHeader, ComponentId, FamilyId};
use crate::config::RegistryConfig;
use crate::diagnostics::{SlotReport, SlotState};
use crate::entity::{Entity, EntityAllocator};
use crate::error::RegistryError;
use crate::handle::{ComponentCell, ComponentHandle};
use crate::recycle::RecycleQueue;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Live(Arc<ComponentCell>),
    /// Removed from every index but still externally referenced.
    Retired(Arc<ComponentCell>),
}

/// Owns component records and indexes them by entity and by family.
#[derive(Debug)]
pub struct ComponentRegistry {
    entities: EntityAllocator,
    /// Slot 0 is reserved and always empty.
    slots: Vec<Slot>,
    recycled: RecycleQueue<ComponentId>,
    retired: Vec<ComponentId>,
    by_entity: Vec<Vec<ComponentId>>,
    by_family: BTreeMap<FamilyId, Vec<ComponentId>>,
}

impl ComponentRegistry {
    /// Largest number of empty slots that [`replace`](Self::replace) or
    /// [`attach_component`](Self::attach_component) may add to reach an id.
    pub const MAX_SLOT_GAP: u64 = 1 << 20;

    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Create an empty registry pre-sized according to `config`.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        let mut slots = Vec::with_capacity(config.component_capacity.max(1));
        slots.push(Slot::Empty);
        Self {
            entities: EntityAllocator::new(),
            slots,
            recycled: RecycleQueue::new(),
            retired: Vec::new(),
            by_entity: Vec::with_capacity(config.entity_capacity),
            by_family: BTreeMap::new(),
        }
    }

    // -- Entities --

    /// Allocate a new entity.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create_new()
    }

    /// Allocate a specific entity id. Used when reloading a saved id space.
    pub fn create_entity_under_id(&mut self, entity: Entity) -> Result<Entity, RegistryError> {
        Ok(self.entities.create_under_id(entity)?)
    }

    #[must_use]
    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.entities.exists(entity)
    }

    /// The entity allocator backing this registry.
    #[must_use]
    pub fn entities(&self) -> &EntityAllocator {
        &self.entities
    }

    // -- Creation --

    /// Create a default-initialized `T` owned by `entity`.
    ///
    /// Reuses the oldest recycled id if there is one, otherwise grows
    /// storage by one slot.
    pub fn create_component<T: Component>(
        &mut self,
        entity: Entity,
    ) -> Result<ComponentHandle, RegistryError> {
        self.create_with(entity, T::default())
    }

    /// Create a component on `new_entity` whose payload is a copy of
    /// `source`'s. The copy gets its own unique id.
    pub fn duplicate_component<T: Component + Clone>(
        &mut self,
        new_entity: Entity,
        source: &ComponentHandle,
    ) -> Result<ComponentHandle, RegistryError> {
        if !source.is::<T>() {
            return Err(RegistryError::FamilyMismatch {
                id: source.id(),
                expected: T::type_name(),
                found: source.type_name(),
            });
        }
        let payload = source
            .try_read::<T>()
            .map(|payload| payload.clone())
            .ok_or(RegistryError::PayloadLocked(source.id()))?;
        self.create_with(new_entity, payload)
    }

    fn create_with<T: Component>(
        &mut self,
        entity: Entity,
        payload: T,
    ) -> Result<ComponentHandle, RegistryError> {
        self.ensure_creatable::<T>(entity)?;
        self.reclaim_retired();

        if let Some(id) = self.recycled.pop() {
            return match self.replace_with(id, entity, payload) {
                Ok(handle) => Ok(handle),
                Err(err) => {
                    self.recycled.push(id);
                    Err(err)
                }
            };
        }

        let id = ComponentId(self.slots.len() as u64);
        let cell = ComponentCell::new(id, entity, payload);
        self.install(&cell);
        trace!(%id, %entity, family = %T::FAMILY, "created component");
        Ok(ComponentHandle::pin(&cell))
    }

    fn ensure_creatable<T: Component>(&self, entity: Entity) -> Result<(), RegistryError> {
        if !T::FAMILY.is_known() {
            return Err(RegistryError::UnknownFamily(T::type_name()));
        }
        if !self.entities.exists(entity) {
            return Err(RegistryError::EntityNotLive(entity));
        }
        Ok(())
    }

    /// Overwrite slot `id` with a fresh default `T` owned by `entity`.
    ///
    /// Refused with [`RegistryError::RefGated`] while the slot has external
    /// references. Storage grows if `id` is past the end; any slots skipped
    /// over become recyclable.
    pub fn replace<T: Component>(
        &mut self,
        id: ComponentId,
        entity: Entity,
    ) -> Result<ComponentHandle, RegistryError> {
        self.ensure_creatable::<T>(entity)?;
        self.replace_with(id, entity, T::default())
    }

    fn replace_with<T: Component>(
        &mut self,
        id: ComponentId,
        entity: Entity,
        payload: T,
    ) -> Result<ComponentHandle, RegistryError> {
        if !id.is_valid() {
            return Err(RegistryError::InvalidId(id));
        }
        self.check_growth(id)?;
        let refs = self.ref_count(id);
        if refs > 0 {
            warn!(%id, refs, "replace refused: component still referenced");
            return Err(RegistryError::RefGated { id, refs });
        }

        match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) => {
                let header = cell.header();
                self.unlink(header)?;
                if let Slot::Live(old) = std::mem::take(&mut self.slots[id.index()]) {
                    old.unregister();
                }
            }
            Some(Slot::Retired(_)) => {
                self.slots[id.index()] = Slot::Empty;
                self.retired.retain(|&retired| retired != id);
            }
            Some(Slot::Empty) | None => {}
        }

        let cell = ComponentCell::new(id, entity, payload);
        self.install(&cell);
        trace!(%id, %entity, family = %T::FAMILY, "replaced component");
        Ok(ComponentHandle::pin(&cell))
    }

    /// Insert an existing record, keeping its unique id, entity and family.
    ///
    /// Used to share components between registries: afterwards both
    /// registries see the record, and each counts the other's registration
    /// as an external reference. The owning entity is allocated here if it
    /// is not already live.
    pub fn attach_component(&mut self, component: &ComponentHandle) -> Result<(), RegistryError> {
        let header = component.header();
        if !header.unique_id.is_valid() {
            return Err(RegistryError::InvalidId(header.unique_id));
        }
        self.reclaim_retired();
        if let Some(Slot::Live(_) | Slot::Retired(_)) = self.slots.get(header.unique_id.index()) {
            return Err(RegistryError::SlotOccupied(header.unique_id));
        }
        self.check_growth(header.unique_id)?;
        if !self.entities.exists(header.entity) {
            self.entities.create_under_id(header.entity)?;
        }

        self.install(component.cell());
        trace!(id = %header.unique_id, entity = %header.entity, "attached component");
        Ok(())
    }

    /// Attach each record in order, stopping at the first failure.
    pub fn attach_array(&mut self, components: &[ComponentHandle]) -> Result<(), RegistryError> {
        for component in components {
            self.attach_component(component)?;
        }
        Ok(())
    }

    /// Refuse ids that would grow storage by more than
    /// [`MAX_SLOT_GAP`](Self::MAX_SLOT_GAP) empty slots.
    fn check_growth(&self, id: ComponentId) -> Result<(), RegistryError> {
        let gap = id.id().saturating_sub(self.slots.len() as u64);
        if gap > Self::MAX_SLOT_GAP {
            warn!(%id, gap, "refusing to grow storage");
            return Err(RegistryError::GapTooLarge { id, gap });
        }
        Ok(())
    }

    /// Place `cell` in its slot and index it. The slot must be free.
    fn install(&mut self, cell: &Arc<ComponentCell>) {
        let header = cell.header();
        let index = header.unique_id.index();
        while self.slots.len() <= index {
            let gap = ComponentId(self.slots.len() as u64);
            self.slots.push(Slot::Empty);
            if gap != header.unique_id {
                self.recycled.push(gap);
            }
        }
        self.recycled.remove(header.unique_id);

        cell.register();
        self.link(header);
        self.slots[index] = Slot::Live(Arc::clone(cell));
    }

    fn link(&mut self, header: ComponentHeader) {
        let index = header.entity.index();
        if index >= self.by_entity.len() {
            self.by_entity.resize_with(index + 1, Vec::new);
        }
        self.by_entity[index].push(header.unique_id);
        self.by_family
            .entry(header.family)
            .or_default()
            .push(header.unique_id);
    }

    /// Remove `header`'s id from both indexes, or from neither.
    fn unlink(&mut self, header: ComponentHeader) -> Result<(), RegistryError> {
        let id = header.unique_id;
        let family_pos = self
            .by_family
            .get(&header.family)
            .and_then(|bucket| bucket.iter().position(|&member| member == id));
        let entity_pos = self
            .by_entity
            .get(header.entity.index())
            .and_then(|bucket| bucket.iter().position(|&member| member == id));

        let (Some(family_pos), Some(entity_pos)) = (family_pos, entity_pos) else {
            let index = if family_pos.is_none() { "family" } else { "entity" };
            warn!(%id, index, "component missing from index");
            return Err(RegistryError::StructuralInconsistency { id, index });
        };

        self.remove_from_family(header.family, family_pos);
        self.by_entity[header.entity.index()].remove(entity_pos);
        Ok(())
    }

    fn remove_from_family(&mut self, family: FamilyId, pos: usize) {
        if let Some(bucket) = self.by_family.get_mut(&family) {
            bucket.remove(pos);
            if bucket.is_empty() {
                self.by_family.remove(&family);
            }
        }
    }

    // -- Reference counting --

    /// References to component `id` held outside this registry: live
    /// handles plus registrations in other registries.
    ///
    /// Returns 0 for invalid ids, out-of-range ids and empty slots.
    #[must_use]
    pub fn ref_count(&self, id: ComponentId) -> usize {
        match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) => cell.external_refs(true),
            Some(Slot::Retired(cell)) => cell.external_refs(false),
            Some(Slot::Empty) | None => 0,
        }
    }

    /// Return retired slots with no remaining references to the recycled pool.
    fn reclaim_retired(&mut self) {
        let slots = &mut self.slots;
        let recycled = &mut self.recycled;
        self.retired.retain(|&id| {
            let reclaimable = matches!(
                slots.get(id.index()),
                Some(Slot::Retired(cell)) if cell.external_refs(false) == 0
            );
            if reclaimable {
                slots[id.index()] = Slot::Empty;
                recycled.push(id);
                trace!(%id, "reclaimed retired component slot");
            }
            !reclaimable
        });
    }

    // -- Deletion --

    /// Remove component `id` from storage and both indexes, recycling its id.
    ///
    /// Refused with [`RegistryError::RefGated`] while external references
    /// remain; drop every handle (and detach it from other registries) first.
    pub fn release(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let (header, refs) = match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) if id.is_valid() => (cell.header(), cell.external_refs(true)),
            _ => return Err(RegistryError::InvalidId(id)),
        };
        if refs > 0 {
            warn!(%id, refs, "release refused: component still referenced");
            return Err(RegistryError::RefGated { id, refs });
        }

        self.unlink(header)?;
        if let Slot::Live(cell) = std::mem::take(&mut self.slots[id.index()]) {
            cell.unregister();
        }
        self.recycled.push(id);
        trace!(%id, "released component");
        Ok(())
    }

    /// Remove component `id` regardless of outstanding references.
    ///
    /// Fails with [`RegistryError::StructuralInconsistency`] if the id is
    /// missing from either index, in which case nothing is changed.
    pub fn delete_component(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let header = match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) if id.is_valid() => cell.header(),
            _ => return Err(RegistryError::InvalidId(id)),
        };

        self.unlink(header)?;
        if !self.vacate(id) {
            if id.index() == self.slots.len() - 1 {
                self.slots.pop();
            } else {
                self.recycled.push(id);
            }
        }
        trace!(%id, "deleted component");
        Ok(())
    }

    /// Delete `entity` and every component it owns.
    ///
    /// Trailing empty storage slots are trimmed afterwards.
    pub fn delete_entity(&mut self, entity: Entity) -> Result<(), RegistryError> {
        if !self.entities.exists(entity) {
            return Err(RegistryError::EntityNotLive(entity));
        }

        let owned = self
            .by_entity
            .get_mut(entity.index())
            .map(std::mem::take)
            .unwrap_or_default();

        for &id in &owned {
            let Some(family) = self.header_of(id).map(|header| header.family) else {
                warn!(%id, %entity, "entity index points at an empty slot");
                continue;
            };
            match self
                .by_family
                .get(&family)
                .and_then(|bucket| bucket.iter().position(|&member| member == id))
            {
                Some(pos) => self.remove_from_family(family, pos),
                None => warn!(%id, %family, "component missing from family index"),
            }
        }

        for &id in &owned {
            if !self.vacate(id) {
                self.recycled.push(id);
            }
        }
        self.compact_storage();
        self.trim_entity_index();

        self.entities.delete(entity)?;
        debug!(%entity, components = owned.len(), "deleted entity");
        Ok(())
    }

    /// Clear slot `id`. A record that is still externally referenced is
    /// parked as retired instead. Returns `true` if it was retired.
    fn vacate(&mut self, id: ComponentId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return false;
        };
        if let Slot::Live(cell) = std::mem::take(slot) {
            cell.unregister();
            if cell.external_refs(false) > 0 {
                *slot = Slot::Retired(cell);
                self.retired.push(id);
                debug!(%id, "component retired while still referenced");
                return true;
            }
        }
        false
    }

    fn compact_storage(&mut self) {
        while self.slots.len() > 1 && matches!(self.slots.last(), Some(Slot::Empty)) {
            self.slots.pop();
            self.recycled.remove(ComponentId(self.slots.len() as u64));
        }
    }

    fn trim_entity_index(&mut self) {
        while self.by_entity.last().is_some_and(Vec::is_empty) {
            self.by_entity.pop();
        }
    }

    // -- Queries --

    fn header_of(&self, id: ComponentId) -> Option<ComponentHeader> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) => Some(cell.header()),
            _ => None,
        }
    }

    fn pin(&self, id: ComponentId) -> Option<ComponentHandle> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(cell)) => Some(ComponentHandle::pin(cell)),
            _ => None,
        }
    }

    /// Look up a live component by unique id.
    #[must_use]
    pub fn get_component(&self, id: ComponentId) -> Option<ComponentHandle> {
        if !id.is_valid() {
            return None;
        }
        self.pin(id)
    }

    /// The first `T` owned by `entity`.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<ComponentHandle> {
        self.component_ids_by_entity(entity)
            .iter()
            .find_map(|&id| match self.slots.get(id.index()) {
                Some(Slot::Live(cell)) if cell.holds::<T>() => Some(ComponentHandle::pin(cell)),
                _ => None,
            })
    }

    /// Ids of the components owned by `entity`, in insertion order.
    #[must_use]
    pub fn component_ids_by_entity(&self, entity: Entity) -> &[ComponentId] {
        self.by_entity
            .get(entity.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of the components in `family`, in insertion order.
    #[must_use]
    pub fn component_ids_by_family(&self, family: FamilyId) -> &[ComponentId] {
        self.by_family
            .get(&family)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_components_by_entity(&self, entity: Entity) -> Vec<ComponentHandle> {
        let mut components = Vec::new();
        self.append_components_by_entity(entity, &mut components);
        components
    }

    /// Append every component owned by `entity` to `components`.
    pub fn append_components_by_entity(&self, entity: Entity, components: &mut Vec<ComponentHandle>) {
        let ids = self.component_ids_by_entity(entity);
        components.reserve(ids.len());
        components.extend(ids.iter().filter_map(|&id| self.pin(id)));
    }

    #[must_use]
    pub fn get_components_by_family(&self, family: FamilyId) -> Vec<ComponentHandle> {
        self.component_ids_by_family(family)
            .iter()
            .filter_map(|&id| self.pin(id))
            .collect()
    }

    /// Components of `family` owned by `entity`, scanning the entity's bucket.
    ///
    /// Prefer this when the entity owns fewer components than the family
    /// has members.
    #[must_use]
    pub fn get_components_by_entity_and_family(
        &self,
        entity: Entity,
        family: FamilyId,
    ) -> Vec<ComponentHandle> {
        self.component_ids_by_entity(entity)
            .iter()
            .filter(|&&id| self.header_of(id).is_some_and(|header| header.family == family))
            .filter_map(|&id| self.pin(id))
            .collect()
    }

    /// Same result set as
    /// [`get_components_by_entity_and_family`](Self::get_components_by_entity_and_family),
    /// scanning the family's bucket instead.
    #[must_use]
    pub fn get_components_by_family_and_entity(
        &self,
        entity: Entity,
        family: FamilyId,
    ) -> Vec<ComponentHandle> {
        self.component_ids_by_family(family)
            .iter()
            .filter(|&&id| self.header_of(id).is_some_and(|header| header.entity == entity))
            .filter_map(|&id| self.pin(id))
            .collect()
    }

    #[must_use]
    pub fn find_first_component_by_entity_and_family(
        &self,
        entity: Entity,
        family: FamilyId,
    ) -> Option<ComponentHandle> {
        self.component_ids_by_entity(entity)
            .iter()
            .find(|&&id| self.header_of(id).is_some_and(|header| header.family == family))
            .and_then(|&id| self.pin(id))
    }

    #[must_use]
    pub fn find_first_component_by_family(&self, family: FamilyId) -> Option<ComponentHandle> {
        self.component_ids_by_family(family)
            .first()
            .and_then(|&id| self.pin(id))
    }

    #[must_use]
    pub fn count_components_by_entity_and_family(&self, entity: Entity, family: FamilyId) -> usize {
        self.component_ids_by_entity(entity)
            .iter()
            .filter(|&&id| self.header_of(id).is_some_and(|header| header.family == family))
            .count()
    }

    // -- Maintenance --

    /// Reset to the empty state, including the entity allocator.
    ///
    /// Records that are still externally referenced stay behind as retired
    /// slots, so their ids are not reissued until the last reference drops.
    pub fn clear(&mut self) {
        let slots = std::mem::replace(&mut self.slots, vec![Slot::Empty]);
        self.recycled.clear();
        self.retired.clear();
        self.by_entity.clear();
        self.by_family.clear();
        self.entities.clear();

        for (index, slot) in slots.into_iter().enumerate() {
            let cell = match slot {
                Slot::Live(cell) => {
                    cell.unregister();
                    cell
                }
                Slot::Retired(cell) => cell,
                Slot::Empty => continue,
            };
            if cell.external_refs(false) == 0 {
                continue;
            }
            while self.slots.len() < index {
                let gap = ComponentId(self.slots.len() as u64);
                self.slots.push(Slot::Empty);
                self.recycled.push(gap);
            }
            self.slots.push(Slot::Retired(cell));
            self.retired.push(ComponentId(index as u64));
        }
        debug!(retired = self.retired.len(), "cleared component registry");
    }

    fn unregister_all(&mut self) {
        for slot in &self.slots {
            if let Slot::Live(cell) = slot {
                cell.unregister();
            }
        }
    }

    /// Reserve room for `slots` storage slots. Has no logical effect.
    pub fn resize(&mut self, slots: usize) {
        self.slots.reserve(slots.saturating_sub(self.slots.len()));
    }

    /// Recompute the recycled-id set from the empty slots in storage.
    ///
    /// Only needed to repair a registry whose recycled set is suspect.
    pub fn rebuild_erased_ids(&mut self) {
        self.reclaim_retired();
        self.recycled.clear();
        for (index, slot) in self.slots.iter().enumerate().skip(1) {
            if matches!(slot, Slot::Empty) {
                self.recycled.push(ComponentId(index as u64));
            }
        }
        debug!(recycled = self.recycled.len(), "rebuilt recycled component ids");
    }

    /// Number of storage slots, including the reserved slot 0.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of entity id slots, including the reserved id 0.
    #[must_use]
    pub fn entity_slot_count(&self) -> u64 {
        self.entities.len()
    }

    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.recycled.len()
    }

    /// Slots removed from the indexes but still awaiting their last reference.
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Number of live components.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// Family ids that currently have at least one component.
    pub fn families(&self) -> impl Iterator<Item = FamilyId> + '_ {
        self.by_family.keys().copied()
    }

    /// Report the state of slot `id`, or `None` if it is out of range.
    #[must_use]
    pub fn slot_report(&self, id: ComponentId) -> Option<SlotReport> {
        let state = match self.slots.get(id.index())? {
            Slot::Empty => SlotState::Empty,
            Slot::Live(cell) => SlotState::Live {
                header: cell.header(),
                refs: cell.external_refs(true),
            },
            Slot::Retired(cell) => SlotState::Retired {
                header: cell.header(),
                refs: cell.external_refs(false),
            },
        };
        Some(SlotReport { id, state })
    }

    /// Report the state of every storage slot.
    #[must_use]
    pub fn slot_reports(&self) -> Vec<SlotReport> {
        (0..self.slots.len() as u64)
            .filter_map(|index| self.slot_report(ComponentId(index)))
            .collect()
    }

    /// Verify that storage, both indexes and the recycled set agree.
    ///
    /// A failure means an invariant was broken elsewhere; callers that
    /// cannot tolerate that should treat the error as fatal.
    pub fn check_consistency(&self) -> Result<(), RegistryError> {
        let broken = |id, index| Err(RegistryError::StructuralInconsistency { id, index });

        if !matches!(self.slots.first(), Some(Slot::Empty)) {
            return broken(ComponentId::INVALID, "storage");
        }

        for (index, slot) in self.slots.iter().enumerate().skip(1) {
            let id = ComponentId(index as u64);
            match slot {
                Slot::Live(cell) => {
                    let header = cell.header();
                    if header.unique_id != id {
                        return broken(id, "storage");
                    }
                    if !self.entities.exists(header.entity) {
                        return broken(id, "allocator");
                    }
                    let in_entity = self
                        .component_ids_by_entity(header.entity)
                        .iter()
                        .filter(|&&member| member == id)
                        .count();
                    if in_entity != 1 {
                        return broken(id, "entity");
                    }
                    let in_family = self
                        .component_ids_by_family(header.family)
                        .iter()
                        .filter(|&&member| member == id)
                        .count();
                    if in_family != 1 {
                        return broken(id, "family");
                    }
                    if self.recycled.contains(id) {
                        return broken(id, "recycled");
                    }
                }
                Slot::Retired(_) => {
                    if !self.retired.contains(&id) || self.recycled.contains(id) {
                        return broken(id, "retired");
                    }
                }
                Slot::Empty => {
                    if !self.recycled.contains(id) {
                        return broken(id, "recycled");
                    }
                }
            }
        }

        for id in self.recycled.iter() {
            if !matches!(self.slots.get(id.index()), Some(Slot::Empty)) || !id.is_valid() {
                return broken(id, "recycled");
            }
        }

        for (index, bucket) in self.by_entity.iter().enumerate() {
            for &id in bucket {
                if self.header_of(id).map(|header| header.entity.index()) != Some(index) {
                    return broken(id, "entity");
                }
            }
        }

        for (&family, bucket) in &self.by_family {
            if bucket.is_empty() {
                return broken(ComponentId::INVALID, "family");
            }
            for &id in bucket {
                if self.header_of(id).map(|header| header.family) != Some(family) {
                    return broken(id, "family");
                }
            }
        }

        Ok(())
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ComponentRegistry {
    fn drop(&mut self) {
        self.unregister_all();
    }
}
