use grid_diagrams::{Axis, Energy, EnergyConfig, GridDiagram, InvariantKind, Move, StabilizationKind};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn diagram(n: usize, seed: u64) -> GridDiagram {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    GridDiagram::random(n, &mut rng).unwrap()
}

/// Turns raw numbers into a move whose indices fit a diagram of size `n`.
fn shape_move(n: usize, (code, a, b, k): (u8, usize, usize, usize)) -> Move {
    let axis = if a % 2 == 0 { Axis::Row } else { Axis::Column };
    match code % 3 {
        0 => Move::Commutation {
            axis,
            index: b % n,
        },
        1 => {
            let kind = StabilizationKind::ALL[k % 4];
            match kind.split_axis() {
                Axis::Row => Move::Stabilization {
                    row: a % n,
                    col: b % (n + 1),
                    kind,
                },
                Axis::Column => Move::Stabilization {
                    row: a % (n + 1),
                    col: b % n,
                    kind,
                },
            }
        }
        _ => Move::Destabilization {
            axis,
            index: b % n,
        },
    }
}

fn raw_moves() -> impl Strategy<Value = Vec<(u8, usize, usize, usize)>> {
    proptest::collection::vec((any::<u8>(), 0..64usize, 0..64usize, 0..4usize), 0..60)
}

proptest! {
    #[test]
    fn prop_grid_stays_consistent(n in 2..9usize, seed in any::<u64>(), raw in raw_moves()) {
        let mut g = diagram(n, seed);
        for r in raw {
            let mv = shape_move(g.size(), r);
            if g.size() >= 14 && matches!(mv, Move::Stabilization { .. }) {
                continue;
            }
            g.apply_if_valid(mv).unwrap();
            prop_assert!(g.is_consistent());
            prop_assert_eq!(g.rows().len(), g.columns().len());
        }
    }

    #[test]
    fn prop_writhe_delta_is_exact(n in 2..9usize, seed in any::<u64>(), raw in raw_moves()) {
        let mut g = diagram(n, seed);
        for r in raw {
            let mv = shape_move(g.size(), r);
            if !g.is_valid(mv).unwrap() || g.size() >= 14 {
                continue;
            }
            let before = g.writhe();
            let delta = g.delta_writhe(mv).unwrap();
            g.apply(mv).unwrap();
            prop_assert_eq!(g.writhe() - before, delta, "{}", mv);
        }
    }

    #[test]
    fn prop_commutation_is_an_involution(
        n in 2..9usize,
        seed in any::<u64>(),
        index in 0..64usize,
        row in any::<bool>(),
    ) {
        let g = diagram(n, seed);
        let axis = if row { Axis::Row } else { Axis::Column };
        let index = index % n;
        let mut h = g.clone();
        if h.commute_if_valid(axis, index).unwrap() {
            h.commute(axis, index).unwrap();
        }
        prop_assert_eq!(h, g);
    }

    #[test]
    fn prop_destabilization_undoes_stabilization(
        n in 2..9usize,
        seed in any::<u64>(),
        a in 0..64usize,
        b in 0..64usize,
        k in 0..4usize,
    ) {
        let g = diagram(n, seed);
        let kind = StabilizationKind::ALL[k];
        let (row, col, undo) = match kind.split_axis() {
            Axis::Row => {
                let col = b % (n + 1);
                (a % n, col, Move::Destabilization { axis: Axis::Column, index: col })
            }
            Axis::Column => {
                let row = a % (n + 1);
                (row, b % n, Move::Destabilization { axis: Axis::Row, index: row })
            }
        };
        let mut h = g.clone();
        h.stabilize(row, col, kind).unwrap();
        prop_assert_eq!(h.size(), n + 1);
        prop_assert!(h.is_valid(undo).unwrap());
        h.apply(undo).unwrap();
        prop_assert_eq!(h, g);
    }

    #[test]
    fn prop_mirror_twice_is_identity(n in 2..12usize, seed in any::<u64>()) {
        let g = diagram(n, seed);
        let mut h = g.clone();
        h.mirror();
        prop_assert_eq!(h.writhe(), -g.writhe());
        h.mirror();
        prop_assert_eq!(h, g);
    }

    #[test]
    fn prop_translation_is_invertible(
        n in 2..12usize,
        seed in any::<u64>(),
        dx in -20..20i64,
        dy in -20..20i64,
    ) {
        let g = diagram(n, seed);
        let mut h = g.clone();
        h.translate(dx, dy);
        prop_assert!(h.is_consistent());
        prop_assert_eq!(h.size(), g.size());
        h.translate(-dx, -dy);
        prop_assert_eq!(h, g);
    }

    #[test]
    fn prop_incremental_energy_matches_recount(
        n in 2..9usize,
        seed in any::<u64>(),
        raw in raw_moves(),
        writhe_first in any::<bool>(),
    ) {
        let config = if writhe_first {
            EnergyConfig::new([InvariantKind::Writhe, InvariantKind::Size]).unwrap()
        } else {
            EnergyConfig::default()
        };
        let mut g = diagram(n, seed);
        let mut energy = Energy::of(&config, &g);
        for r in raw {
            let mv = shape_move(g.size(), r);
            if g.size() >= 14 && matches!(mv, Move::Stabilization { .. }) {
                continue;
            }
            if let Some(next) = energy.advance(&config, &mut g, mv).unwrap() {
                energy = next;
            }
            let fresh = Energy::of(&config, &g);
            prop_assert_eq!(energy.hash_code(), fresh.hash_code());
            prop_assert_eq!(&energy, &fresh);
        }
    }

    #[test]
    fn prop_saved_form_reloads(n in 2..12usize, seed in any::<u64>()) {
        let g = diagram(n, seed);
        let json = serde_json::to_string(&g.saved()).unwrap();
        let back = GridDiagram::from_saved(&serde_json::from_str(&json).unwrap()).unwrap();
        prop_assert_eq!(back, g);
    }
}
