//! Tank battle demo.
//!
//! A [`TankFactory`] builds two tanks in its own registry. Their components
//! are attached to a [`BattleSystem`], which owns a second registry, and the
//! tanks trade attacks until one is destroyed. Damage dealt through the
//! battle registry is visible to the factory because both registries hold
//! the same records.
//!
//! Afterwards the factory tries to scrap a tank that the battle system still
//! holds, which the reference-count gate refuses, then succeeds once the
//! battle system lets go.

mod battle;
mod factory;

use anyhow::{Result, anyhow};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use battle::BattleSystem;
use factory::TankFactory;

#[derive(Parser)]
#[command(name = "tank_battle", about = "Two tanks fight until one is destroyed")]
struct Args {
    /// RNG seed. Random if omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many rounds without a winner
    #[arg(short, long, default_value_t = 1000)]
    max_rounds: u32,

    /// Names of the two tanks
    #[arg(num_args = 2, default_values = ["Sherman", "Panzer"])]
    names: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tank_battle=info".parse()?))
        .init();

    let args = Args::parse();
    let [first_name, second_name]: [String; 2] = args
        .names
        .try_into()
        .map_err(|_| anyhow!("expected exactly two tank names"))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "battle starting");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut factory = TankFactory::new();
    let first = factory.create(&first_name, &mut rng)?;
    let second = factory.create(&second_name, &mut rng)?;

    let mut battle = BattleSystem::new(StdRng::seed_from_u64(rng.r#gen()));
    battle.enlist(&factory.components(first))?;
    battle.enlist(&factory.components(second))?;

    match battle.fight(first, second, args.max_rounds)? {
        Some(winner) => {
            let name = factory.name(winner).unwrap_or_else(|| winner.to_string());
            info!("{name} wins.");
        }
        None => warn!(rounds = args.max_rounds, "no winner"),
    }

    info!(
        shared = battle.registry().live_count(),
        "battle over"
    );
    if let Err(err) = factory.scrap(first) {
        info!(%err, "factory cannot scrap a tank the battle system still holds");
    }
    battle.withdraw(first)?;
    battle.withdraw(second)?;
    factory.scrap(first)?;
    factory.scrap(second)?;

    factory.registry().dump();
    info!(
        live = factory.registry().live_count(),
        slots = factory.registry().slot_count(),
        "factory emptied"
    );
    Ok(())
}
