//! ASCII rendering of the map and highlighted ranges.

use std::{collections::BTreeSet, fmt::Write as _};

use skirmish_core::{CellCoord, TeamId, TerrainId, UnitId};
use skirmish_world::{query, World};

fn terrain_symbol(terrain: TerrainId) -> char {
    match terrain {
        TerrainId::PLAINS => '.',
        TerrainId::FOREST => 'f',
        TerrainId::HILLS => 'h',
        TerrainId::WATER => '~',
        TerrainId::WALL => '#',
        _ => '?',
    }
}

fn unit_symbol(team: TeamId) -> char {
    if team == TeamId::FIRST {
        'a'
    } else {
        'b'
    }
}

/// Draws the map row by row.
///
/// `@` marks the selected unit, `a`/`b` the units of each team, `*` the
/// movement range and `!` cells that are only attackable.
pub(crate) fn ranges(
    world: &World,
    selected: Option<UnitId>,
    movement: &BTreeSet<CellCoord>,
    attack: &BTreeSet<CellCoord>,
) -> String {
    let (columns, rows) = query::dimensions(world);
    let mut out = String::with_capacity((columns as usize + 1) * rows as usize);
    for z in 0..rows {
        for x in 0..columns {
            let cell = CellCoord::new(x, z);
            let occupant = query::occupant(world, cell);
            let symbol = match occupant {
                Some(unit) if Some(unit) == selected => '@',
                Some(unit) => query::unit(world, unit)
                    .map_or('?', |snapshot| unit_symbol(snapshot.team)),
                None if movement.contains(&cell) => '*',
                None if attack.contains(&cell) => '!',
                None => query::cell_info(world, cell)
                    .map_or('?', |info| terrain_symbol(info.terrain)),
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "movement: {} cells, attack: {} cells",
        movement.len(),
        attack.len()
    );
    out
}
