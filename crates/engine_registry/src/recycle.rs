//! FIFO queue of recycled identifiers.
//!
//! Both the [`EntityAllocator`](crate::EntityAllocator) and the
//! [`ComponentRegistry`](crate::ComponentRegistry) hand freed ids back out
//! oldest-first, and both need to ask "is this id currently recycled?" on hot
//! paths. [`RecycleQueue`] keeps the order in a `VecDeque` and mirrors the
//! membership in a `HashSet`.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// An insertion-ordered set of recycled ids.
#[derive(Debug, Clone)]
pub struct RecycleQueue<T> {
    order: VecDeque<T>,
    members: HashSet<T>,
}

impl<T: Copy + Eq + Hash> RecycleQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
        }
    }

    /// Append `id` at the back. Returns `false` if it was already queued.
    pub fn push(&mut self, id: T) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Take the oldest id.
    pub fn pop(&mut self) -> Option<T> {
        let id = self.order.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }

    /// Remove `id` wherever it sits in the queue.
    ///
    /// Returns `true` if it was present.
    pub fn remove(&mut self, id: T) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|&queued| queued == id) {
            self.order.remove(pos);
        }
        true
    }

    #[must_use]
    pub fn contains(&self, id: T) -> bool {
        self.members.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Iterate ids oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.order.iter().copied()
    }
}

impl<T: Copy + Eq + Hash> Default for RecycleQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
