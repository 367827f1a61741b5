#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the grid, the terrain table, every unit and the turn state
//! machine. Adapters mutate it exclusively through [`apply`] and read it
//! through the [`query`] module.

mod grid;
mod turn;
mod units;

use std::collections::BTreeSet;

use skirmish_core::{
    CellCoord, Command, CommandError, Connectivity, Event, GameStatus, RangeAccounting, TeamId,
    TerrainTable, UnitId,
};
use skirmish_system_combat::CombatResolver;
use skirmish_system_pathfinding::PathGraph;
use skirmish_system_range::RangeCalculator;
use tracing::{debug, warn};

use crate::{grid::Grid, units::Roster};

const DEFAULT_GRID_COLUMNS: u32 = 10;
const DEFAULT_GRID_ROWS: u32 = 10;
const FIRST_TURN: u32 = 1;

/// Cells highlighted for the current selection.
#[derive(Debug, Default)]
struct Highlights {
    movement: BTreeSet<CellCoord>,
    attack: BTreeSet<CellCoord>,
}

impl Highlights {
    fn clear(&mut self) {
        self.movement.clear();
        self.attack.clear();
    }
}

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    terrain: TerrainTable,
    graph: PathGraph,
    accounting: RangeAccounting,
    ranges: RangeCalculator,
    combat: CombatResolver,
    roster: Roster,
    active_team: TeamId,
    turn: u32,
    selection: Option<UnitId>,
    highlights: Highlights,
    status: GameStatus,
}

impl World {
    /// Creates a new world holding an empty 10x10 plains map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            terrain: TerrainTable::default(),
            graph: PathGraph::build(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, Connectivity::Four),
            accounting: RangeAccounting::FirstDiscovery,
            ranges: RangeCalculator::new(),
            combat: CombatResolver::new(),
            roster: Roster::new(),
            active_team: TeamId::FIRST,
            turn: FIRST_TURN,
            selection: None,
            highlights: Highlights::default(),
            status: GameStatus::InProgress,
        }
    }

    fn ensure_in_bounds(&self, cell: CellCoord) -> Result<(), CommandError> {
        if self.grid.contains(cell) {
            Ok(())
        } else {
            Err(CommandError::OutOfBounds { cell })
        }
    }

    fn ensure_in_progress(&self) -> Result<(), CommandError> {
        match self.status {
            GameStatus::InProgress => Ok(()),
            GameStatus::Victory(_) => Err(CommandError::GameOver),
        }
    }

    fn ensure_no_selection(&self) -> Result<(), CommandError> {
        if self.selection.is_some() {
            Err(CommandError::IllegalTransition)
        } else {
            Ok(())
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that cannot be honoured leave the world untouched and emit
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let result = match command {
        Command::ConfigureGrid {
            columns,
            rows,
            connectivity,
            accounting,
        } => configure_grid(world, columns, rows, connectivity, accounting, out_events),
        Command::ConfigureTerrainTable { table } => {
            configure_terrain_table(world, table, out_events)
        }
        Command::SetTerrain { cell, terrain } => set_terrain(world, cell, terrain, out_events),
        Command::PlaceUnit { team, cell, stats } => {
            turn::place_unit(world, team, cell, stats, out_events)
        }
        Command::SelectUnit { cell } => turn::select(world, cell, out_events),
        Command::ConfirmDestination { cell } => turn::confirm_destination(world, cell, out_events),
        Command::StepUnit { unit } => turn::step(world, unit, out_events),
        Command::ConfirmAttack { cell } => turn::confirm_attack(world, cell, out_events),
        Command::CompleteCombatAction { unit } => {
            turn::complete_combat_action(world, unit, out_events)
        }
        Command::ConfirmWait => turn::confirm_wait(world, out_events),
        Command::Deselect => {
            turn::deselect(world, out_events);
            Ok(())
        }
        Command::EndTurn => turn::end_turn(world, out_events),
    };

    if let Err(reason) = result {
        reject(reason, out_events);
    }
}

fn configure_grid(
    world: &mut World,
    columns: u32,
    rows: u32,
    connectivity: Connectivity,
    accounting: RangeAccounting,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    if columns == 0 || rows == 0 {
        return Err(CommandError::IllegalTransition);
    }

    world.grid = Grid::new(columns, rows);
    world.graph = PathGraph::build(columns, rows, connectivity);
    world.accounting = accounting;
    world.roster = Roster::new();
    world.active_team = TeamId::FIRST;
    world.turn = FIRST_TURN;
    world.selection = None;
    world.highlights.clear();
    world.status = GameStatus::InProgress;

    debug!(columns, rows, ?connectivity, ?accounting, "grid configured");
    out_events.push(Event::GridConfigured {
        columns,
        rows,
        connectivity,
    });
    Ok(())
}

fn configure_terrain_table(
    world: &mut World,
    table: TerrainTable,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_no_selection()?;

    let terrains = table.iter().count();
    world.terrain = table;
    debug!(terrains, "terrain table configured");
    out_events.push(Event::TerrainTableConfigured { terrains });
    Ok(())
}

fn set_terrain(
    world: &mut World,
    cell: CellCoord,
    terrain: skirmish_core::TerrainId,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    world.ensure_in_bounds(cell)?;
    world.ensure_no_selection()?;
    if world.grid.occupant(cell).is_some() && !world.terrain.is_walkable(terrain) {
        return Err(CommandError::IllegalTransition);
    }

    world.grid.set_terrain(cell, terrain);
    out_events.push(Event::TerrainChanged { cell, terrain });
    Ok(())
}

fn reject(reason: CommandError, out_events: &mut Vec<Event>) {
    match reason {
        CommandError::OutOfBounds { cell } => {
            warn!(%cell, "command referenced a cell outside the grid");
        }
        _ => debug!(%reason, "command rejected"),
    }
    out_events.push(Event::CommandRejected { reason });
}

/// Prices a step for a unit of `team`: the entry cost of the destination
/// terrain, or infinity when an enemy stands there.
fn movement_cost<'a>(
    grid: &'a Grid,
    terrain: &'a TerrainTable,
    roster: &'a Roster,
    team: TeamId,
) -> impl Fn(CellCoord, CellCoord) -> f32 + 'a {
    move |_from, to| {
        let Some(cell) = grid.cell(to) else {
            return f32::INFINITY;
        };
        let hostile = cell
            .occupant
            .and_then(|occupant| roster.get(occupant))
            .is_some_and(|unit| unit.team != team);
        if hostile {
            f32::INFINITY
        } else {
            terrain.entry_cost(cell.terrain)
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use super::World;
    use skirmish_core::{
        CellCoord, CommandError, GameStatus, TeamId, TerrainId, TerrainTable, UnitId,
        UnitSnapshot, UnitView,
    };
    use skirmish_system_pathfinding::PathGraph;

    /// Read-only description of a single grid cell.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CellInfo {
        /// Terrain covering the cell.
        pub terrain: TerrainId,
        /// Cost of entering the cell; infinite when impassable.
        pub movement_cost: f32,
        /// Whether units may stand on the cell.
        pub walkable: bool,
        /// Unit standing on the cell, if any.
        pub occupant: Option<UnitId>,
    }

    /// Number of columns and rows of the map.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Provides read-only access to the immutable path graph.
    #[must_use]
    pub fn graph(world: &World) -> &PathGraph {
        &world.graph
    }

    /// Provides read-only access to the active terrain table.
    #[must_use]
    pub fn terrain_table(world: &World) -> &TerrainTable {
        &world.terrain
    }

    /// Describes the cell at the provided coordinate.
    pub fn cell_info(world: &World, cell: CellCoord) -> Result<CellInfo, CommandError> {
        let slot = world
            .grid
            .cell(cell)
            .ok_or(CommandError::OutOfBounds { cell })?;
        Ok(CellInfo {
            terrain: slot.terrain,
            movement_cost: world.terrain.entry_cost(slot.terrain),
            walkable: world.terrain.is_walkable(slot.terrain),
            occupant: slot.occupant,
        })
    }

    /// Unit committed to the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<UnitId> {
        world.grid.occupant(cell)
    }

    /// Captures a read-only view of every living unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.roster.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Snapshot of a single unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.roster.get(unit).map(|unit| unit.snapshot())
    }

    /// Cell a unit should be drawn on, which trails its committed cell while moving.
    #[must_use]
    pub fn display_cell(world: &World, unit: UnitId) -> Option<CellCoord> {
        world.roster.get(unit).map(|unit| unit.display_cell)
    }

    /// Currently selected unit.
    #[must_use]
    pub fn selected_unit(world: &World) -> Option<UnitId> {
        world.selection
    }

    /// Highlighted movement range of the selection.
    #[must_use]
    pub fn movement_range(world: &World) -> &BTreeSet<CellCoord> {
        &world.highlights.movement
    }

    /// Highlighted attack range of the selection.
    #[must_use]
    pub fn attack_range(world: &World) -> &BTreeSet<CellCoord> {
        &world.highlights.attack
    }

    /// Team whose turn it is.
    #[must_use]
    pub fn active_team(world: &World) -> TeamId {
        world.active_team
    }

    /// Turn counter, starting at one.
    #[must_use]
    pub fn turn_number(world: &World) -> u32 {
        world.turn
    }

    /// Progress of the match.
    #[must_use]
    pub fn game_status(world: &World) -> GameStatus {
        world.status
    }

    /// Reports whether any unit still has queued movement or combat work.
    #[must_use]
    pub fn is_busy(world: &World) -> bool {
        world.roster.iter().any(|unit| unit.is_busy())
    }

    /// Number of movement steps queued for the unit.
    #[must_use]
    pub fn movement_queue_len(world: &World, unit: UnitId) -> usize {
        world
            .roster
            .get(unit)
            .map_or(0, |unit| unit.movement_queue.len())
    }

    /// Number of combat actions queued for the unit.
    #[must_use]
    pub fn combat_queue_len(world: &World, unit: UnitId) -> usize {
        world
            .roster
            .get(unit)
            .map_or(0, |unit| unit.combat_queue.len())
    }

    /// Living units of a team in placement order.
    #[must_use]
    pub fn team_units(world: &World, team: TeamId) -> Vec<UnitId> {
        world.roster.team(team).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{TerrainId, TerrainProperties};

    fn configure(world: &mut World, columns: u32, rows: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::ConfigureGrid {
                columns,
                rows,
                connectivity: Connectivity::Four,
                accounting: RangeAccounting::FirstDiscovery,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn new_world_is_ten_by_ten_plains() {
        let world = World::new();

        assert_eq!(query::dimensions(&world), (10, 10));
        assert_eq!(query::active_team(&world), TeamId::FIRST);
        assert_eq!(query::turn_number(&world), 1);
        let info = query::cell_info(&world, CellCoord::new(9, 9)).expect("in bounds");
        assert_eq!(info.terrain, TerrainId::PLAINS);
        assert_eq!(info.movement_cost, 1.0);
        assert!(info.walkable);
    }

    #[test]
    fn apply_configures_grid() {
        let mut world = World::new();

        let events = configure(&mut world, 12, 8);

        assert_eq!(query::dimensions(&world), (12, 8));
        assert_eq!(query::graph(&world).len(), 96);
        assert_eq!(
            events,
            vec![Event::GridConfigured {
                columns: 12,
                rows: 8,
                connectivity: Connectivity::Four,
            }]
        );
    }

    #[test]
    fn empty_grid_is_rejected() {
        let mut world = World::new();

        let events = configure(&mut world, 0, 4);

        assert_eq!(query::dimensions(&world), (10, 10));
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::IllegalTransition,
            }]
        );
    }

    #[test]
    fn set_terrain_outside_grid_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTerrain {
                cell: CellCoord::new(10, 0),
                terrain: TerrainId::WALL,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: CommandError::OutOfBounds {
                    cell: CellCoord::new(10, 0),
                },
            }]
        );
        assert!(query::cell_info(&world, CellCoord::new(10, 0)).is_err());
    }

    #[test]
    fn terrain_table_override_changes_costs() {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut table = TerrainTable::default();
        table.insert(TerrainId::PLAINS, TerrainProperties::new("mud", 2.5, true));

        apply(
            &mut world,
            Command::ConfigureTerrainTable { table },
            &mut events,
        );

        assert_eq!(events, vec![Event::TerrainTableConfigured { terrains: 5 }]);
        let info = query::cell_info(&world, CellCoord::new(0, 0)).expect("in bounds");
        assert_eq!(info.movement_cost, 2.5);
    }

    #[test]
    fn set_terrain_updates_cell() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(3, 4);

        apply(
            &mut world,
            Command::SetTerrain {
                cell,
                terrain: TerrainId::WATER,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TerrainChanged {
                cell,
                terrain: TerrainId::WATER,
            }]
        );
        let info = query::cell_info(&world, cell).expect("in bounds");
        assert!(!info.walkable);
        assert!(info.movement_cost.is_infinite());
    }
}
