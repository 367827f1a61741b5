//! Seeded random scenario generation.

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{Connectivity, RangeAccounting};
use skirmish_host::{GridSection, MapSection, Scenario, UnitEntry};

const UNITS_PER_TEAM: usize = 3;
const DEPLOYMENT_DEPTH: u32 = 2;

/// Terrain symbols with their relative weights.
const TERRAIN_WEIGHTS: [(char, u32); 5] = [('.', 70), ('f', 12), ('h', 8), ('~', 6), ('#', 4)];

pub(crate) fn scenario(seed: u64) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let width = rng.gen_range(10..=14);
    let height = rng.gen_range(8..=12);

    let mut rows: Vec<Vec<char>> = (0..height)
        .map(|_| (0..width).map(|_| terrain(&mut rng)).collect())
        .collect();

    let mut units = Vec::with_capacity(UNITS_PER_TEAM * 2);
    for team in 0..2u8 {
        let columns = if team == 0 {
            0..DEPLOYMENT_DEPTH
        } else {
            width - DEPLOYMENT_DEPTH..width
        };
        let mut slots: Vec<(u32, u32)> = columns
            .flat_map(|x| (0..height).map(move |z| (x, z)))
            .collect();
        slots.shuffle(&mut rng);
        let chosen: BTreeSet<(u32, u32)> = slots.into_iter().take(UNITS_PER_TEAM).collect();

        for (x, z) in chosen {
            rows[z as usize][x as usize] = '.';
            units.push(UnitEntry {
                team,
                x,
                z,
                health: rng.gen_range(8..=12),
                damage: rng.gen_range(3..=5),
                range: rng.gen_range(1..=2),
                movement: f32::from(rng.gen_range(3u8..=4)),
            });
        }
    }

    Scenario {
        grid: GridSection {
            width,
            height,
            connectivity: Connectivity::Four,
            accounting: RangeAccounting::FirstDiscovery,
        },
        terrain: Vec::new(),
        map: Some(MapSection {
            rows: rows.into_iter().map(String::from_iter).collect(),
            legend: Default::default(),
        }),
        units,
        script: Vec::new(),
    }
}

fn terrain(rng: &mut ChaCha8Rng) -> char {
    let total: u32 = TERRAIN_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (symbol, weight) in TERRAIN_WEIGHTS {
        if roll < weight {
            return symbol;
        }
        roll -= weight;
    }
    '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_generates_same_scenario() {
        assert_eq!(scenario(7), scenario(7));
    }

    #[test]
    fn generated_scenarios_set_up_cleanly() {
        for seed in 0..16 {
            let generated = scenario(seed);
            assert_eq!(generated.units.len(), UNITS_PER_TEAM * 2);
            let _ = generated
                .into_session()
                .expect("generated scenario is playable");
        }
    }
}
