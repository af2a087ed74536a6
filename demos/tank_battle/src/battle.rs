//! Runs a duel between tanks whose components were attached from elsewhere.

use anyhow::{Context, Result};
use components::{Attack, Health, Name};
use engine_registry::{Component, ComponentHandle, ComponentRegistry, Entity};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Miss,
    Hit,
    Destroyed,
}

pub struct BattleSystem {
    registry: ComponentRegistry,
    rng: StdRng,
}

impl BattleSystem {
    pub fn new(rng: StdRng) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            rng,
        }
    }

    /// Attach a tank's components to this system's registry.
    pub fn enlist(&mut self, components: &[ComponentHandle]) -> Result<()> {
        self.registry
            .attach_array(components)
            .context("failed to enlist tank")
    }

    /// Drop a tank from this system. The factory keeps its own copy.
    pub fn withdraw(&mut self, tank: Entity) -> Result<()> {
        self.registry
            .delete_entity(tank)
            .with_context(|| format!("failed to withdraw {tank}"))
    }

    fn component<T: Component>(&self, tank: Entity) -> Result<ComponentHandle> {
        self.registry
            .get::<T>(tank)
            .with_context(|| format!("{tank} has no {} component", T::type_name()))
    }

    fn name(&self, tank: Entity) -> Result<String> {
        let label = self.component::<Name>(tank)?;
        let name = label.read::<Name>().map(|label| label.name.clone());
        name.with_context(|| format!("{tank} has a malformed name"))
    }

    /// One attack roll. A hit costs the defender one point of health.
    pub fn make_attack(&mut self, attacker: Entity, defender: Entity) -> Result<AttackOutcome> {
        let attack = *self
            .component::<Attack>(attacker)?
            .read::<Attack>()
            .context("malformed attack component")?;
        let attacker_name = self.name(attacker)?;
        let defender_name = self.name(defender)?;

        let roll = self.rng.gen_range(0..6);
        if !attack.hits(roll) {
            info!("{attacker_name} misses {defender_name}");
            return Ok(AttackOutcome::Miss);
        }

        let target = self.component::<Health>(defender)?;
        let mut health = target.write::<Health>().context("malformed health component")?;
        health.damage(1);
        info!(
            "{attacker_name} reduces {defender_name}'s health with 1 damage to {} health.",
            health.health
        );

        if health.is_alive() {
            Ok(AttackOutcome::Hit)
        } else {
            Ok(AttackOutcome::Destroyed)
        }
    }

    /// Alternate attacks until one tank is destroyed or `max_rounds` pass.
    ///
    /// Returns the winner, if any.
    pub fn fight(&mut self, first: Entity, second: Entity, max_rounds: u32) -> Result<Option<Entity>> {
        for round in 1..=max_rounds {
            debug!(round, "round");
            if self.make_attack(first, second)? == AttackOutcome::Destroyed {
                return Ok(Some(first));
            }
            if self.make_attack(second, first)? == AttackOutcome::Destroyed {
                return Ok(Some(second));
            }
        }
        Ok(None)
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::factory::TankFactory;

    fn setup(seed: u64) -> (TankFactory, BattleSystem, Entity, Entity) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut factory = TankFactory::new();
        let first = factory.create("Sherman", &mut rng).unwrap();
        let second = factory.create("Panzer", &mut rng).unwrap();

        let mut battle = BattleSystem::new(StdRng::seed_from_u64(seed + 1));
        battle.enlist(&factory.components(first)).unwrap();
        battle.enlist(&factory.components(second)).unwrap();
        (factory, battle, first, second)
    }

    #[test]
    fn test_enlist_shares_components() {
        let (factory, battle, first, second) = setup(3);
        assert_eq!(battle.registry().get_components_by_entity(first).len(), 4);
        assert_eq!(battle.registry().get_components_by_entity(second).len(), 4);
        for handle in factory.components(first) {
            // The handle itself plus the battle registry.
            assert_eq!(factory.registry().ref_count(handle.id()), 2);
        }
        battle.registry().check_consistency().unwrap();
    }

    #[test]
    fn test_damage_is_visible_to_factory() {
        let (factory, mut battle, first, second) = setup(4);
        let before = factory.registry().get::<Health>(second).unwrap().read::<Health>().unwrap().health;

        let mut hits = 0;
        for _ in 0..20 {
            if let AttackOutcome::Hit | AttackOutcome::Destroyed = battle.make_attack(first, second).unwrap() {
                hits += 1;
            }
        }

        let after = factory.registry().get::<Health>(second).unwrap().read::<Health>().unwrap().health;
        assert_eq!(after, before - hits);
    }

    #[test]
    fn test_fight_produces_winner() {
        let (factory, mut battle, first, second) = setup(5);
        let winner = battle.fight(first, second, 1000).unwrap().unwrap();
        let loser = if winner == first { second } else { first };

        let health = |tank: Entity| factory.registry().get::<Health>(tank).unwrap().read::<Health>().unwrap().health;
        assert!(health(winner) > 0);
        assert!(health(loser) <= 0);
    }

    #[test]
    fn test_withdraw_releases_factory_gate() {
        let (mut factory, mut battle, first, second) = setup(6);
        assert!(factory.scrap(first).is_err());

        battle.withdraw(first).unwrap();
        factory.scrap(first).unwrap();
        assert!(battle.make_attack(second, first).is_err());
    }

    #[test]
    fn test_missing_tank_is_an_error() {
        let (_factory, mut battle, first, _second) = setup(7);
        assert!(battle.make_attack(first, Entity(42)).is_err());
    }
}
