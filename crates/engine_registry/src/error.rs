//! Registry error types.

use crate::component::ComponentId;
use crate::entity::Entity;

/// Errors returned by the [`EntityAllocator`](crate::EntityAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// Entity id 0 is reserved and can never be allocated.
    #[error("entity id 0 is reserved")]
    InvalidId,

    /// The requested id is already live.
    #[error("{0} is already allocated")]
    AlreadyExists(Entity),

    /// The id does not denote a live entity.
    #[error("{0} is not live")]
    NotLive(Entity),

    /// Allocating the id would materialize too many intermediate ids.
    #[error("{requested} is {gap} ids past the allocated range")]
    GapTooLarge { requested: Entity, gap: u64 },
}

/// Errors returned by the [`ComponentRegistry`](crate::ComponentRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Zero, out-of-range, or empty-slot component id.
    #[error("{0} does not denote a live component")]
    InvalidId(ComponentId),

    /// The owning entity is not live in this registry.
    #[error("{0} is not live")]
    EntityNotLive(Entity),

    /// The component type declares family 0.
    #[error("component type `{0}` declares the unknown family")]
    UnknownFamily(&'static str),

    /// The slot still has external references; nothing was changed.
    #[error("{id} still has {refs} external reference(s)")]
    RefGated {
        /// The component that was refused.
        id: ComponentId,
        /// Outstanding external references at the time of the call.
        refs: usize,
    },

    /// The record's payload is not of the requested component type.
    #[error("{id} holds a `{found}` payload, not `{expected}`")]
    FamilyMismatch {
        id: ComponentId,
        expected: &'static str,
        found: &'static str,
    },

    /// The payload is write-locked by the caller or another thread.
    #[error("payload of {0} is locked for writing")]
    PayloadLocked(ComponentId),

    /// Installing the id would grow storage by too many empty slots.
    #[error("{id} is {gap} slots past the end of storage")]
    GapTooLarge { id: ComponentId, gap: u64 },

    /// The slot addressed by an attached record is already taken.
    #[error("slot for {0} is already occupied")]
    SlotOccupied(ComponentId),

    /// A live component is missing from one of the index buckets.
    #[error("{id} is missing from the {index} index")]
    StructuralInconsistency {
        /// The component whose alias could not be located.
        id: ComponentId,
        /// Which view was inconsistent (`"entity"`, `"family"`, `"storage"`, `"recycled"`).
        index: &'static str,
    },

    /// Entity allocation failed.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}
