#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish tactics engine.
//!
//! This crate defines the message surface that connects host adapters, the
//! authoritative world, and the pure pathfinding, range, and combat systems.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what changed. Rejected commands never mutate
//! state; they surface as [`Event::CommandRejected`] carrying a
//! [`CommandError`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Number of teams taking part in a match.
pub const TEAM_COUNT: usize = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the map with the provided dimensions, discarding all units.
    ConfigureGrid {
        /// Number of cells along the x axis.
        columns: u32,
        /// Number of cells along the z axis.
        rows: u32,
        /// Neighbour wiring used by the path graph.
        connectivity: Connectivity,
        /// Cost bookkeeping used when flood-filling movement ranges.
        accounting: RangeAccounting,
    },
    /// Replaces the terrain table used to derive cell movement costs.
    ConfigureTerrainTable {
        /// Table mapping terrain identifiers to their properties.
        table: TerrainTable,
    },
    /// Assigns a terrain type to a single cell.
    SetTerrain {
        /// Cell whose terrain changes.
        cell: CellCoord,
        /// Terrain identifier looked up in the terrain table.
        terrain: TerrainId,
    },
    /// Places a new unit on the map during scenario setup.
    PlaceUnit {
        /// Team that owns the unit.
        team: TeamId,
        /// Cell the unit starts on.
        cell: CellCoord,
        /// Combat and movement statistics of the unit.
        stats: UnitStats,
    },
    /// Selects the active-team unit standing on the provided cell.
    SelectUnit {
        /// Cell clicked by the player.
        cell: CellCoord,
    },
    /// Commits the selected unit to move towards the provided cell.
    ConfirmDestination {
        /// Destination cell inside the current movement range.
        cell: CellCoord,
    },
    /// Consumes one queued step of a moving unit.
    StepUnit {
        /// Unit whose movement queue is advanced.
        unit: UnitId,
    },
    /// Attacks the enemy unit standing on the provided cell.
    ConfirmAttack {
        /// Cell occupied by the intended target.
        cell: CellCoord,
    },
    /// Signals that the presentation of a queued combat action finished.
    CompleteCombatAction {
        /// Unit whose combat queue is drained by one entry.
        unit: UnitId,
    },
    /// Ends the selected unit's activity without attacking.
    ConfirmWait,
    /// Cancels the current selection, rolling back uncommitted movement.
    Deselect,
    /// Hands the turn over to the other team.
    EndTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the map was rebuilt.
    GridConfigured {
        /// Number of cells along the x axis.
        columns: u32,
        /// Number of cells along the z axis.
        rows: u32,
        /// Neighbour wiring used by the path graph.
        connectivity: Connectivity,
    },
    /// Confirms that the terrain table was replaced.
    TerrainTableConfigured {
        /// Number of terrain kinds the table defines.
        terrains: usize,
    },
    /// Confirms that a cell changed terrain.
    TerrainChanged {
        /// Cell whose terrain changed.
        cell: CellCoord,
        /// Terrain now covering the cell.
        terrain: TerrainId,
    },
    /// Confirms that a unit joined the match.
    UnitPlaced {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Team owning the unit.
        team: TeamId,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// Announces that a unit became the current selection.
    UnitSelected {
        /// Unit that was selected.
        unit: UnitId,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// Announces that the selection was cleared.
    UnitDeselected {
        /// Unit that lost the selection.
        unit: UnitId,
        /// Cell the unit stands on after any rollback.
        cell: CellCoord,
    },
    /// Announces that the highlighted movement and attack ranges changed.
    RangesUpdated {
        /// Unit whose ranges are highlighted.
        unit: UnitId,
        /// Number of cells in the movement range.
        movement_cells: usize,
        /// Number of cells in the attack range.
        attack_cells: usize,
    },
    /// Confirms that a path was planned and queued for the unit.
    PathPlanned {
        /// Unit that will travel along the path.
        unit: UnitId,
        /// Planned route, including both endpoints.
        path: Path,
    },
    /// Confirms that a moving unit advanced by one cell.
    UnitStepped {
        /// Unit that advanced.
        unit: UnitId,
        /// Cell the unit left.
        from: CellCoord,
        /// Cell the unit entered.
        to: CellCoord,
        /// Steps still queued after this one.
        remaining: usize,
    },
    /// Confirms that a unit finished its movement and committed its position.
    MovementCompleted {
        /// Unit that arrived.
        unit: UnitId,
        /// Cell the unit now occupies.
        cell: CellCoord,
    },
    /// Reports the result of an attack.
    CombatResolved {
        /// Unit that initiated the attack.
        attacker: UnitId,
        /// Unit that was attacked.
        defender: UnitId,
        /// Survival of both participants.
        outcome: CombatOutcome,
    },
    /// Reports that a unit lost health.
    UnitDamaged {
        /// Unit that was hit.
        unit: UnitId,
        /// Amount of damage dealt.
        damage: u32,
        /// Health remaining after the hit.
        health: Health,
    },
    /// Reports that a unit died and left the map.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Team the unit belonged to.
        team: TeamId,
        /// Cell the unit vacated.
        cell: CellCoord,
    },
    /// Announces that a unit committed its turn.
    UnitWaiting {
        /// Unit that is now waiting.
        unit: UnitId,
    },
    /// Confirms that a queued combat action finished presenting.
    CombatActionCompleted {
        /// Unit whose combat queue advanced.
        unit: UnitId,
        /// Unit that was attacked in the completed action.
        target: UnitId,
        /// Combat actions still queued for the unit.
        remaining: usize,
    },
    /// Announces that the turn passed to the other team.
    TurnEnded {
        /// Team whose turn finished.
        team: TeamId,
        /// Team that becomes active.
        next: TeamId,
        /// Turn counter after the rotation.
        turn: u32,
    },
    /// Announces that a team lost its last unit.
    GameOver {
        /// Team that won the match.
        winner: TeamId,
    },
    /// Reports that a command was refused without mutating state.
    CommandRejected {
        /// Specific reason the command failed.
        reason: CommandError,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandError {
    /// The coordinate lies outside the configured grid.
    #[error("cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
    },
    /// No route connects the source with the destination.
    #[error("no route reaches the destination")]
    NoRoute,
    /// The operation is not permitted in the current state or against the target.
    #[error("operation is not permitted in the current state")]
    IllegalTransition,
    /// The target cell is held by an enemy unit.
    #[error("cell is occupied by an enemy unit")]
    OccupiedByEnemy,
    /// The target cell is held by an allied unit.
    #[error("cell is occupied by an allied unit")]
    OccupiedByAlly,
    /// The match already has a winner.
    #[error("the match is over")]
    GameOver,
}

/// Location of a single grid cell expressed as x and z coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    z: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based x index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based z index of the cell.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of one of the two teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(u8);

impl TeamId {
    /// Team that opens the match.
    pub const FIRST: TeamId = TeamId(0);
    /// Team that moves second.
    pub const SECOND: TeamId = TeamId(1);
    /// Both teams in turn order.
    pub const ALL: [TeamId; TEAM_COUNT] = [Self::FIRST, Self::SECOND];

    /// Creates a team identifier from its index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Retrieves the team index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the index names one of the two teams.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        (self.0 as usize) < TEAM_COUNT
    }

    /// Team that takes the turn after this one.
    #[must_use]
    pub const fn opponent(&self) -> TeamId {
        if self.0 == 0 {
            Self::SECOND
        } else {
            Self::FIRST
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.0)
    }
}

/// Hit points carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the health left after absorbing `damage`, saturating at zero.
    #[must_use]
    pub const fn after_damage(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Static statistics describing a unit's combat and movement capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Health the unit starts with.
    pub max_health: Health,
    /// Damage dealt by each strike.
    pub attack_damage: u32,
    /// Reach of the unit's attacks measured in graph hops.
    pub attack_range: u32,
    /// Movement budget spent on cost-weighted tiles each turn.
    pub move_allowance: f32,
}

impl UnitStats {
    /// Reports whether the statistics describe a unit the world can host.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.attack_range >= 1
            && self.move_allowance.is_finite()
            && self.move_allowance >= 0.0
            && !self.max_health.is_depleted()
    }
}

/// Turn-progress phase of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    /// The unit has not been touched this turn.
    Unselected,
    /// The unit is selected and may still choose a destination.
    Selected,
    /// The unit moved and must attack or wait.
    Moved,
    /// The unit committed its turn.
    Waiting,
}

/// Neighbour wiring of the path graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectivity {
    /// Orthogonal neighbours only.
    #[default]
    Four,
    /// Orthogonal and diagonal neighbours.
    Eight,
}

/// Cost bookkeeping used when flood-filling a movement range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeAccounting {
    /// Cost recorded along the route that first discovered each cell.
    #[default]
    FirstDiscovery,
    /// Cheapest cost to each cell, as computed by a bounded Dijkstra search.
    Cheapest,
}

/// Identifier of a terrain type inside a [`TerrainTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(u16);

impl TerrainId {
    /// Open ground.
    pub const PLAINS: TerrainId = TerrainId(0);
    /// Woodland that slows movement.
    pub const FOREST: TerrainId = TerrainId(1);
    /// Broken ground that slows movement further.
    pub const HILLS: TerrainId = TerrainId(2);
    /// Water that cannot be crossed on foot.
    pub const WATER: TerrainId = TerrainId(3);
    /// Solid obstacle.
    pub const WALL: TerrainId = TerrainId(4);

    /// Creates a terrain identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Movement properties of a terrain type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainProperties {
    /// Human readable name.
    pub name: String,
    /// Cost charged for entering a cell of this terrain. Infinite means impassable.
    pub movement_cost: f32,
    /// Whether units may stand on the terrain at all.
    pub walkable: bool,
}

impl TerrainProperties {
    /// Creates terrain properties.
    #[must_use]
    pub fn new(name: impl Into<String>, movement_cost: f32, walkable: bool) -> Self {
        Self {
            name: name.into(),
            movement_cost,
            walkable,
        }
    }

    /// Cost a unit pays to enter the terrain; infinite when it cannot.
    #[must_use]
    pub fn entry_cost(&self) -> f32 {
        if self.walkable && self.movement_cost >= 0.0 {
            self.movement_cost
        } else {
            f32::INFINITY
        }
    }
}

/// Lookup table from terrain identifiers to movement properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainTable {
    entries: BTreeMap<TerrainId, TerrainProperties>,
}

impl TerrainTable {
    /// Creates an empty table; every lookup reports impassable terrain.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers or replaces the properties of a terrain type.
    pub fn insert(&mut self, id: TerrainId, properties: TerrainProperties) {
        let _ = self.entries.insert(id, properties);
    }

    /// Properties registered for the terrain, if any.
    #[must_use]
    pub fn get(&self, id: TerrainId) -> Option<&TerrainProperties> {
        self.entries.get(&id)
    }

    /// Cost of entering a cell of the given terrain. Unknown terrain is impassable.
    #[must_use]
    pub fn entry_cost(&self, id: TerrainId) -> f32 {
        self.get(id)
            .map_or(f32::INFINITY, TerrainProperties::entry_cost)
    }

    /// Whether units may stand on the terrain.
    #[must_use]
    pub fn is_walkable(&self, id: TerrainId) -> bool {
        self.get(id).is_some_and(|properties| properties.walkable)
    }

    /// Iterator over registered terrain types in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &TerrainProperties)> {
        self.entries.iter().map(|(id, properties)| (*id, properties))
    }
}

impl Default for TerrainTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(TerrainId::PLAINS, TerrainProperties::new("plains", 1.0, true));
        table.insert(TerrainId::FOREST, TerrainProperties::new("forest", 2.0, true));
        table.insert(TerrainId::HILLS, TerrainProperties::new("hills", 3.0, true));
        table.insert(
            TerrainId::WATER,
            TerrainProperties::new("water", f32::INFINITY, false),
        );
        table.insert(
            TerrainId::WALL,
            TerrainProperties::new("wall", f32::INFINITY, false),
        );
        table
    }
}

/// Ordered route from a source cell to a destination cell, both inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    cells: Vec<CellCoord>,
    total_cost: f32,
}

impl Path {
    /// Creates a path from its cells and the cost accumulated along them.
    ///
    /// Returns `None` when `cells` is empty; a path always names its source.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>, total_cost: f32) -> Option<Self> {
        if cells.is_empty() {
            None
        } else {
            Some(Self { cells, total_cost })
        }
    }

    /// Creates the no-op path that starts and ends on `cell`.
    #[must_use]
    pub fn single(cell: CellCoord) -> Self {
        Self {
            cells: vec![cell],
            total_cost: 0.0,
        }
    }

    /// Cells visited by the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells on the path, including both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a path holds at least its source cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell of the path.
    #[must_use]
    pub fn source(&self) -> CellCoord {
        self.cells[0]
    }

    /// Last cell of the path.
    #[must_use]
    pub fn destination(&self) -> CellCoord {
        self.cells[self.cells.len() - 1]
    }

    /// Cells entered after leaving the source.
    pub fn steps(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().skip(1).copied()
    }

    /// Cost accumulated along the path's edges.
    #[must_use]
    pub const fn total_cost(&self) -> f32 {
        self.total_cost
    }
}

/// Survival of both participants after an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Whether the attacking unit is still alive.
    pub attacker_survived: bool,
    /// Whether the defending unit is still alive.
    pub defender_survived: bool,
}

/// Progress of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Both teams still field units.
    InProgress,
    /// The named team eliminated its opponent.
    Victory(TeamId),
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Team owning the unit.
    pub team: TeamId,
    /// Committed grid cell of the unit.
    pub cell: CellCoord,
    /// Static statistics of the unit.
    pub stats: UnitStats,
    /// Remaining health.
    pub health: Health,
    /// Turn-progress phase.
    pub state: MovementState,
    /// Number of queued movement steps.
    pub pending_steps: usize,
    /// Number of queued combat actions.
    pub pending_combat: usize,
}

impl UnitSnapshot {
    /// Reports whether either queue still holds work for the host to present.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending_steps > 0 || self.pending_combat > 0
    }
}

/// Read-only snapshot describing all living units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the unit with the provided identifier.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}
