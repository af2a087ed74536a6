//! Entity type and allocation utilities.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data.
//! The [`EntityAllocator`] hands out ids, recycles deleted ones oldest-first,
//! and compacts trailing recycled ids so the allocated range stays close to
//! the live count.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::AllocError;
use crate::recycle::RecycleQueue;

/// A unique entity identifier.
///
/// Entities are pure identifiers; they carry no data of their own.
/// Components are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The null / invalid entity sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates and reclaims entity ids.
///
/// Ids `1..len` form the allocated range; an id in that range is live unless
/// it is queued in the recycled set. Id 0 is always reserved.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    /// One past the highest allocated id.
    len: u64,
    recycled: RecycleQueue<Entity>,
}

impl EntityAllocator {
    /// Largest number of ids [`create_under_id`](Self::create_under_id) will
    /// materialize as recycled in one call.
    pub const MAX_GAP: u64 = 1 << 20;

    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`Entity::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            len: 1,
            recycled: RecycleQueue::new(),
        }
    }

    /// Allocates an entity id, preferring the oldest recycled one.
    pub fn create_new(&mut self) -> Entity {
        if let Some(entity) = self.recycled.pop() {
            trace!(%entity, "reusing recycled entity id");
            return entity;
        }
        let entity = Entity(self.len);
        self.len += 1;
        entity
    }

    /// Allocates a specific entity id, e.g. when restoring a saved id space.
    ///
    /// Ids between the current high-water mark and `requested` are
    /// materialized as recycled so later calls to [`create_new`](Self::create_new)
    /// fill them in.
    pub fn create_under_id(&mut self, requested: Entity) -> Result<Entity, AllocError> {
        if !requested.is_valid() {
            return Err(AllocError::InvalidId);
        }
        if self.exists(requested) {
            return Err(AllocError::AlreadyExists(requested));
        }
        if self.recycled.remove(requested) {
            return Ok(requested);
        }
        if requested.0 == self.len {
            return Ok(self.create_new_unrecycled());
        }
        // Below the high-water mark and not recycled means it's taken.
        if requested.0 < self.len {
            return Err(AllocError::AlreadyExists(requested));
        }
        let gap = requested.0 - self.len;
        if gap > Self::MAX_GAP {
            return Err(AllocError::GapTooLarge { requested, gap });
        }

        for gap in self.len..requested.0 {
            self.recycled.push(Entity(gap));
        }
        trace!(
            entity = %requested,
            gap,
            "materialized entity ids up to requested id"
        );
        self.len = requested.0 + 1;
        Ok(requested)
    }

    fn create_new_unrecycled(&mut self) -> Entity {
        let entity = Entity(self.len);
        self.len += 1;
        entity
    }

    /// Releases a live entity id.
    pub fn delete(&mut self, entity: Entity) -> Result<(), AllocError> {
        if !self.exists(entity) {
            return Err(AllocError::NotLive(entity));
        }

        if entity.0 == self.len - 1 {
            self.len -= 1;
        } else {
            self.recycled.push(entity);
        }

        // Absorb trailing recycled ids into the unallocated range.
        while self.len > 1 && self.recycled.remove(Entity(self.len - 1)) {
            self.len -= 1;
        }
        Ok(())
    }

    /// Returns `true` if `entity` is currently live.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        entity.is_valid() && entity.0 < self.len && !self.recycled.contains(entity)
    }

    /// Resets to the empty state with only the invalid id reserved.
    pub fn clear(&mut self) {
        self.len = 1;
        self.recycled.clear();
    }

    /// Number of id slots, including the reserved id 0.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if no entity has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Number of live entities.
    #[must_use]
    pub fn live_count(&self) -> u64 {
        self.len - 1 - self.recycled.len() as u64
    }

    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.recycled.len()
    }

    /// Recycled ids in the order they will be reissued.
    pub fn recycled(&self) -> impl Iterator<Item = Entity> + '_ {
        self.recycled.iter()
    }

    /// Iterate all live entities in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (1..self.len)
            .map(Entity)
            .filter(|&entity| !self.recycled.contains(entity))
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
