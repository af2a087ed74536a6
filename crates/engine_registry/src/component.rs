//! Core [`Component`] trait and associated identifiers.
//!
//! Every payload stored in the registry implements [`Component`]. A payload
//! declares its [`FamilyId`] (the integer tag the registry indexes by) and a
//! human-readable name for diagnostics. The registry stores payloads
//! type-erased behind [`Payload`] and recovers them with a downcast that
//! checks both the family tag and the concrete type.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Stable identifier of one component record (its "unique id").
///
/// Equal to the index of the storage slot that holds the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// The reserved "no component" id.
    pub const INVALID: ComponentId = ComponentId(0);

    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// Integer tag classifying a component's payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyId(pub u32);

impl FamilyId {
    /// Unclassified. No well-formed component carries this family.
    pub const UNKNOWN: FamilyId = FamilyId(0);

    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Family({})", self.0)
    }
}

/// Identity fields shared by every component record.
///
/// The header is fixed when the record is built; replacing a component
/// builds a new record rather than rewriting a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentHeader {
    pub unique_id: ComponentId,
    pub entity: Entity,
    pub family: FamilyId,
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use engine_registry::{Component, FamilyId};
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: i32,
/// }
///
/// impl Default for Health {
///     fn default() -> Self {
///         Self { current: 10 }
///     }
/// }
///
/// impl Component for Health {
///     const FAMILY: FamilyId = FamilyId(1);
///
///     fn type_name() -> &'static str {
///         "Health"
///     }
/// }
/// ```
pub trait Component: Any + Send + Sync + fmt::Debug + Default {
    /// The family every instance of this type is indexed under.
    ///
    /// Must not be [`FamilyId::UNKNOWN`].
    const FAMILY: FamilyId;

    /// A human-readable name for this component type.
    fn type_name() -> &'static str;
}

/// Object-safe view of a [`Component`] used for type-erased storage.
pub trait Payload: Any + Send + Sync + fmt::Debug {
    fn family(&self) -> FamilyId;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> Payload for T {
    fn family(&self) -> FamilyId {
        T::FAMILY
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcast a stored payload to `T`, checking the family tag first.
pub(crate) fn downcast_ref<T: Component>(payload: &dyn Payload) -> Option<&T> {
    if payload.family() != T::FAMILY {
        return None;
    }
    payload.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Component>(payload: &mut dyn Payload) -> Option<&mut T> {
    if payload.family() != T::FAMILY {
        return None;
    }
    payload.as_any_mut().downcast_mut::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Armor {
        value: i32,
    }

    impl Component for Armor {
        const FAMILY: FamilyId = FamilyId(2);

        fn type_name() -> &'static str {
            "Armor"
        }
    }

    #[derive(Debug, Default)]
    struct Impostor;

    // Claims Armor's family without being Armor.
    impl Component for Impostor {
        const FAMILY: FamilyId = FamilyId(2);

        fn type_name() -> &'static str {
            "Impostor"
        }
    }

    #[derive(Debug, Default)]
    struct Attack;

    impl Component for Attack {
        const FAMILY: FamilyId = FamilyId(3);

        fn type_name() -> &'static str {
            "Attack"
        }
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!ComponentId::INVALID.is_valid());
        assert!(ComponentId::from_raw(3).is_valid());
        assert!(!FamilyId::UNKNOWN.is_known());
    }

    #[test]
    fn test_payload_reports_family_and_name() {
        let armor: Box<dyn Payload> = Box::new(Armor { value: 3 });
        assert_eq!(armor.family(), FamilyId(2));
        assert_eq!(armor.type_name(), "Armor");
    }

    #[test]
    fn test_downcast_matches_type() {
        let armor: Box<dyn Payload> = Box::new(Armor { value: 3 });
        assert_eq!(downcast_ref::<Armor>(&*armor), Some(&Armor { value: 3 }));
    }

    #[test]
    fn test_downcast_rejects_other_family() {
        let armor: Box<dyn Payload> = Box::new(Armor { value: 3 });
        assert!(downcast_ref::<Attack>(&*armor).is_none());
    }

    #[test]
    fn test_downcast_rejects_same_family_other_type() {
        let armor: Box<dyn Payload> = Box::new(Armor { value: 3 });
        assert!(downcast_ref::<Impostor>(&*armor).is_none());
    }

    #[test]
    fn test_downcast_mut_writes_through() {
        let mut armor: Box<dyn Payload> = Box::new(Armor { value: 3 });
        if let Some(inner) = downcast_mut::<Armor>(&mut *armor) {
            inner.value = 7;
        }
        assert_eq!(downcast_ref::<Armor>(&*armor).map(|a| a.value), Some(7));
    }

    #[test]
    fn test_component_id_serialization_roundtrip() {
        let id = ComponentId::from_raw(12);
        let bytes = rmp_serde::to_vec(&id).unwrap();
        let restored: ComponentId = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(id, restored);
    }
}
