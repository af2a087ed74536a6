//! Example component definitions for the tank demos.
//!
//! Each type implements [`Component`] with its own [`FamilyId`]. The family
//! constants are collected here so callers can query by family without
//! naming the payload type.

use engine_registry::{Component, FamilyId};
use serde::{Deserialize, Serialize};

pub const HEALTH: FamilyId = FamilyId(1);
pub const ARMOR: FamilyId = FamilyId(2);
pub const ATTACK: FamilyId = FamilyId(3);
pub const NAME: FamilyId = FamilyId(4);

/// Remaining hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub health: i32,
}

impl Health {
    /// Returns `true` while hit points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract `amount` hit points. May go negative.
    pub fn damage(&mut self, amount: i32) {
        self.health -= amount;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self { health: 10 }
    }
}

impl Component for Health {
    const FAMILY: FamilyId = HEALTH;

    fn type_name() -> &'static str {
        "Health"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Armor {
    pub armor: i32,
}

impl Default for Armor {
    fn default() -> Self {
        Self { armor: 3 }
    }
}

impl Component for Armor {
    const FAMILY: FamilyId = ARMOR;

    fn type_name() -> &'static str {
        "Armor"
    }
}

/// Attack power. An attack roll of `0..6` hits when it is below `strength`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attack {
    pub strength: i32,
}

impl Attack {
    #[must_use]
    pub fn hits(&self, roll: i32) -> bool {
        roll < self.strength
    }
}

impl Default for Attack {
    fn default() -> Self {
        Self { strength: 2 }
    }
}

impl Component for Attack {
    const FAMILY: FamilyId = ATTACK;

    fn type_name() -> &'static str {
        "Attack"
    }
}

/// Display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Name {
    pub name: String,
}

impl Name {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Component for Name {
    const FAMILY: FamilyId = NAME;

    fn type_name() -> &'static str {
        "Name"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Health::default().health, 10);
        assert_eq!(Armor::default().armor, 3);
        assert_eq!(Attack::default().strength, 2);
        assert_eq!(Name::default().name, "");
    }

    #[test]
    fn test_families_are_distinct_and_known() {
        let families = [Health::FAMILY, Armor::FAMILY, Attack::FAMILY, Name::FAMILY];
        for (i, family) in families.iter().enumerate() {
            assert!(family.is_known());
            assert!(!families[i + 1..].contains(family));
        }
    }

    #[test]
    fn test_health_damage() {
        let mut h = Health { health: 2 };
        h.damage(1);
        assert!(h.is_alive());
        h.damage(1);
        assert!(!h.is_alive());
    }

    #[test]
    fn test_attack_hits_below_strength() {
        let attack = Attack::default();
        assert!(attack.hits(0));
        assert!(attack.hits(1));
        assert!(!attack.hits(2));
        assert!(!attack.hits(5));
    }

    #[test]
    fn test_name_serialization() {
        let name = Name::new("Sherman");
        let bytes = rmp_serde::to_vec(&name).unwrap();
        let restored: Name = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(name, restored);
    }
}
