//! Builds tanks in the factory's own registry.

use components::{Armor, Attack, Health, Name};
use engine_registry::{ComponentHandle, ComponentRegistry, Entity, RegistryError};
use rand::Rng;
use tracing::info;

#[derive(Default)]
pub struct TankFactory {
    registry: ComponentRegistry,
}

impl TankFactory {
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
        }
    }

    /// Build a tank with slightly randomized health and armor.
    pub fn create(&mut self, name: &str, rng: &mut impl Rng) -> Result<Entity, RegistryError> {
        let tank = self.registry.create_entity();

        self.registry.create_component::<Attack>(tank)?;
        let armor = self.registry.create_component::<Armor>(tank)?;
        let health = self.registry.create_component::<Health>(tank)?;
        let label = self.registry.create_component::<Name>(tank)?;

        if let Some(mut health) = health.write::<Health>() {
            health.health = 5 + rng.gen_range(0..5);
        }
        if let Some(mut armor) = armor.write::<Armor>() {
            armor.armor += rng.gen_range(0..2) - 1;
        }
        if let Some(mut label) = label.write::<Name>() {
            label.name = name.to_owned();
        }

        info!(%tank, name, "tank built");
        Ok(tank)
    }

    /// Handles to every component of `tank`, for handing to another system.
    pub fn components(&self, tank: Entity) -> Vec<ComponentHandle> {
        self.registry.get_components_by_entity(tank)
    }

    pub fn name(&self, tank: Entity) -> Option<String> {
        let label = self.registry.get::<Name>(tank)?;
        let name = label.read::<Name>()?.name.clone();
        Some(name)
    }

    /// Release every component of `tank` and delete it.
    ///
    /// Fails without changing anything while another system still holds
    /// one of the tank's components.
    pub fn scrap(&mut self, tank: Entity) -> Result<(), RegistryError> {
        let ids = self.registry.component_ids_by_entity(tank).to_vec();
        for &id in &ids {
            let refs = self.registry.ref_count(id);
            if refs > 0 {
                return Err(RegistryError::RefGated { id, refs });
            }
        }
        for id in ids {
            self.registry.release(id)?;
        }
        self.registry.delete_entity(tank)
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_create_builds_four_components() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut factory = TankFactory::new();
        let tank = factory.create("Sherman", &mut rng).unwrap();

        assert_eq!(factory.components(tank).len(), 4);
        assert_eq!(factory.name(tank).as_deref(), Some("Sherman"));

        let registry = factory.registry();
        let health = registry.get::<Health>(tank).unwrap().read::<Health>().unwrap().health;
        let armor = registry.get::<Armor>(tank).unwrap().read::<Armor>().unwrap().armor;
        let strength = registry.get::<Attack>(tank).unwrap().read::<Attack>().unwrap().strength;
        assert!((5..10).contains(&health));
        assert!((2..=3).contains(&armor));
        assert_eq!(strength, 2);
        registry.check_consistency().unwrap();
    }

    #[test]
    fn test_scrap_is_gated_by_outside_holders() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut factory = TankFactory::new();
        let tank = factory.create("Panzer", &mut rng).unwrap();

        let held = factory.components(tank);
        assert!(matches!(factory.scrap(tank), Err(RegistryError::RefGated { .. })));
        assert_eq!(factory.components(tank).len(), 4);

        drop(held);
        factory.scrap(tank).unwrap();
        assert!(!factory.registry().entity_exists(tank));
        assert_eq!(factory.registry().slot_count(), 1);
        assert!(factory.name(tank).is_none());
    }
}
