//! Random walk over grid diagrams, printing the energy along the way.
//!
//! Usage: cargo run --release --example walk -- <steps> [seed] [registry.json <name>]
//!
//! Without a registry the walk starts from the trefoil. Set `RUST_LOG=trace`
//! to see every move.
//!
//! Example:
//!   RUST_LOG=debug cargo run --release --example walk -- 10000 7 data/links.json mirror-trefoil

use grid_diagrams::{
    Axis, Energy, EnergyConfig, GridDiagram, GridError, JsonRegistry, Move, StabilizationKind,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;
use std::env;
use tracing_subscriber::EnvFilter;

const MAX_SIZE: usize = 12;

fn random_move<R: Rng>(n: usize, rng: &mut R) -> Move {
    let axis = if rng.random() { Axis::Row } else { Axis::Column };
    match rng.random_range(0..3) {
        0 if n < MAX_SIZE => {
            let kind = StabilizationKind::ALL[rng.random_range(0..4)];
            let (row, col) = match kind.split_axis() {
                Axis::Row => (rng.random_range(0..n), rng.random_range(0..=n)),
                Axis::Column => (rng.random_range(0..=n), rng.random_range(0..n)),
            };
            Move::Stabilization { row, col, kind }
        }
        1 => Move::Destabilization {
            axis,
            index: rng.random_range(0..n),
        },
        _ => Move::Commutation {
            axis,
            index: rng.random_range(0..n),
        },
    }
}

fn main() -> Result<(), GridError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let steps: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("Usage: {} <steps> [seed] [registry.json <name>]", args[0]);
        std::process::exit(1);
    });
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    let mut diagram = match (args.get(3), args.get(4)) {
        (Some(path), Some(name)) => {
            let registry = JsonRegistry::open(path)?;
            GridDiagram::from_registry(&registry, name)?
        }
        _ => GridDiagram::new(&[0, 1, 2, 3, 4], &[2, 3, 4, 0, 1])?,
    };
    println!("start:{diagram}");

    let config = EnergyConfig::default();
    let mut energy = Energy::of(&config, &diagram);
    let mut visits: BTreeMap<Vec<i64>, u64> = BTreeMap::new();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut accepted = 0u64;

    for _ in 0..steps {
        let mv = random_move(diagram.size(), &mut rng);
        if let Some(next) = energy.advance(&config, &mut diagram, mv)? {
            energy = next;
            accepted += 1;
        }
        *visits.entry(energy.values().to_vec()).or_default() += 1;
    }

    println!("accepted {accepted} of {steps} moves");
    println!("final energy {energy}:{diagram}");
    println!("visits per (size, writhe):");
    for (values, count) in &visits {
        println!("  {}: {count}", Energy::from_values(values.clone()));
    }
    Ok(())
}
