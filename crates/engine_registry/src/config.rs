//! Registry configuration.

/// Capacity hints for a [`ComponentRegistry`](crate::ComponentRegistry).
///
/// None of these settings change behaviour; they only pre-size storage so a
/// registry that is about to be bulk-loaded avoids repeated reallocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Component storage slots to reserve up front.
    pub component_capacity: usize,
    /// Per-entity index buckets to reserve up front.
    pub entity_capacity: usize,
}

impl RegistryConfig {
    /// Create a config with no pre-sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` component slots.
    #[must_use]
    pub fn with_component_capacity(mut self, capacity: usize) -> Self {
        self.component_capacity = capacity;
        self
    }

    /// Reserve room for `capacity` entity buckets.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }
}
