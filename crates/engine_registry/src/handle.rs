//! Shared component records and the handles that pin them.
//!
//! A record lives in a [`ComponentCell`] shared by `Arc` between the storage
//! slot of every registry that holds it and every outstanding
//! [`ComponentHandle`]. Instead of inferring liveness from the `Arc` strong
//! count, the cell keeps two explicit counters:
//!
//! - **pins**: one per live `ComponentHandle`.
//! - **registrations**: one per registry whose storage holds the record.
//!
//! A registry treats everything except its own registration as an external
//! reference; see [`ComponentCell::external_refs`].

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::component::{self, Component, ComponentHeader, ComponentId, FamilyId, Payload};
use crate::entity::Entity;

/// A component record: immutable header plus lock-protected payload.
///
/// The payload's concrete type is recorded at construction so type checks
/// never touch the lock.
pub(crate) struct ComponentCell {
    header: ComponentHeader,
    type_id: TypeId,
    type_name: &'static str,
    payload: RwLock<Box<dyn Payload>>,
    pins: AtomicUsize,
    registrations: AtomicUsize,
}

impl ComponentCell {
    pub(crate) fn new<T: Component>(unique_id: ComponentId, entity: Entity, payload: T) -> Arc<Self> {
        Arc::new(Self {
            header: ComponentHeader {
                unique_id,
                entity,
                family: T::FAMILY,
            },
            type_id: TypeId::of::<T>(),
            type_name: T::type_name(),
            payload: RwLock::new(Box::new(payload)),
            pins: AtomicUsize::new(0),
            registrations: AtomicUsize::new(0),
        })
    }

    pub(crate) fn header(&self) -> ComponentHeader {
        self.header
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the payload is a `T`.
    pub(crate) fn holds<T: Component>(&self) -> bool {
        self.header.family == T::FAMILY && self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn register(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unregister(&self) {
        self.registrations.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn pins(&self) -> usize {
        self.pins.load(Ordering::Acquire)
    }

    pub(crate) fn registrations(&self) -> usize {
        self.registrations.load(Ordering::Acquire)
    }

    /// References held outside a registry, given whether that registry
    /// currently holds a registration of its own.
    pub(crate) fn external_refs(&self, held_by_caller: bool) -> usize {
        let registrations = self.registrations();
        let others = if held_by_caller {
            registrations.saturating_sub(1)
        } else {
            registrations
        };
        self.pins() + others
    }
}

impl fmt::Debug for ComponentCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCell")
            .field("header", &self.header)
            .field("pins", &self.pins())
            .field("registrations", &self.registrations())
            .finish_non_exhaustive()
    }
}

/// An externally held reference to a component record.
///
/// Every live handle counts towards the record's
/// [`ref_count`](crate::ComponentRegistry::ref_count); while any exist the
/// registry refuses to [`release`](crate::ComponentRegistry::release) or
/// [`replace`](crate::ComponentRegistry::replace) the record and will not
/// reuse its id. Drop handles as soon as you are done with them.
pub struct ComponentHandle {
    cell: Arc<ComponentCell>,
}

impl ComponentHandle {
    pub(crate) fn pin(cell: &Arc<ComponentCell>) -> Self {
        cell.pins.fetch_add(1, Ordering::Relaxed);
        Self {
            cell: Arc::clone(cell),
        }
    }

    pub(crate) fn cell(&self) -> &Arc<ComponentCell> {
        &self.cell
    }

    #[must_use]
    pub fn header(&self) -> ComponentHeader {
        self.cell.header
    }

    /// The record's unique id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.cell.header.unique_id
    }

    /// The owning entity.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.cell.header.entity
    }

    #[must_use]
    pub fn family(&self) -> FamilyId {
        self.cell.header.family
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    /// Returns `true` if the payload is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.cell.holds::<T>()
    }

    /// Borrow the payload as `T`.
    ///
    /// Returns `None` when the record's family or concrete type is not `T`.
    #[must_use]
    pub fn read<T: Component>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.cell.payload.read(), |payload| {
            component::downcast_ref::<T>(&**payload)
        })
        .ok()
    }

    /// Like [`read`](Self::read), but returns `None` instead of blocking
    /// while the payload is write-locked.
    #[must_use]
    pub fn try_read<T: Component>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.cell.payload.try_read()?, |payload| {
            component::downcast_ref::<T>(&**payload)
        })
        .ok()
    }

    /// Mutably borrow the payload as `T`.
    ///
    /// The registry does not version payload writes; every holder of the
    /// record observes the change.
    #[must_use]
    pub fn write<T: Component>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.cell.payload.write(), |payload| {
            component::downcast_mut::<T>(&mut **payload)
        })
        .ok()
    }

    /// Returns `true` if both handles point at the same record.
    #[must_use]
    pub fn ptr_eq(&self, other: &ComponentHandle) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Clone for ComponentHandle {
    fn clone(&self) -> Self {
        Self::pin(&self.cell)
    }
}

impl Drop for ComponentHandle {
    fn drop(&mut self) {
        self.cell.pins.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("id", &self.id())
            .field("entity", &self.entity())
            .field("family", &self.family())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Name {
        value: String,
    }

    impl Default for Name {
        fn default() -> Self {
            Self {
                value: "unnamed".to_string(),
            }
        }
    }

    impl Component for Name {
        const FAMILY: FamilyId = FamilyId(4);

        fn type_name() -> &'static str {
            "Name"
        }
    }

    #[derive(Debug, Default)]
    struct Armor;

    impl Component for Armor {
        const FAMILY: FamilyId = FamilyId(2);

        fn type_name() -> &'static str {
            "Armor"
        }
    }

    fn make_cell() -> Arc<ComponentCell> {
        ComponentCell::new(ComponentId(1), Entity(1), Name::default())
    }

    #[test]
    fn test_pins_follow_handle_lifetime() {
        let cell = make_cell();
        let handle = ComponentHandle::pin(&cell);
        assert_eq!(cell.pins(), 1);
        let copy = handle.clone();
        assert_eq!(cell.pins(), 2);
        drop(handle);
        assert_eq!(cell.pins(), 1);
        drop(copy);
        assert_eq!(cell.pins(), 0);
    }

    #[test]
    fn test_external_refs_exclude_own_registration() {
        let cell = make_cell();
        cell.register();
        assert_eq!(cell.external_refs(true), 0);

        cell.register();
        assert_eq!(cell.external_refs(true), 1);

        let _handle = ComponentHandle::pin(&cell);
        assert_eq!(cell.external_refs(true), 2);
        assert_eq!(cell.external_refs(false), 3);
    }

    #[test]
    fn test_header_accessors() {
        let handle = ComponentHandle::pin(&make_cell());
        assert_eq!(handle.id(), ComponentId(1));
        assert_eq!(handle.entity(), Entity(1));
        assert_eq!(handle.family(), FamilyId(4));
        assert_eq!(handle.type_name(), "Name");
    }

    #[test]
    fn test_read_and_write_typed() {
        let handle = ComponentHandle::pin(&make_cell());
        assert!(handle.is::<Name>());
        handle.write::<Name>().unwrap().value = "Sherman".to_string();
        assert_eq!(handle.read::<Name>().unwrap().value, "Sherman");
    }

    #[test]
    fn test_read_wrong_type_is_none() {
        let handle = ComponentHandle::pin(&make_cell());
        assert!(!handle.is::<Armor>());
        assert!(handle.read::<Armor>().is_none());
        assert!(handle.write::<Armor>().is_none());
    }

    #[test]
    fn test_type_checks_do_not_wait_for_writers() {
        let handle = ComponentHandle::pin(&make_cell());
        let _guard = handle.write::<Name>().unwrap();
        assert!(handle.is::<Name>());
        assert!(!handle.is::<Armor>());
        assert_eq!(handle.type_name(), "Name");
        assert!(handle.try_read::<Name>().is_none());
    }

    #[test]
    fn test_try_read_when_unlocked() {
        let handle = ComponentHandle::pin(&make_cell());
        assert_eq!(handle.try_read::<Name>().unwrap().value, "unnamed");
        assert!(handle.try_read::<Armor>().is_none());
    }

    #[test]
    fn test_clones_share_the_record() {
        let handle = ComponentHandle::pin(&make_cell());
        let other = handle.clone();
        assert!(handle.ptr_eq(&other));
        other.write::<Name>().unwrap().value = "Panzer".to_string();
        assert_eq!(handle.read::<Name>().unwrap().value, "Panzer");
    }
}
