//! TOML scenario documents: map, units and an optional scripted playthrough.

use std::{collections::BTreeMap, fs, io, path::Path as FsPath, path::PathBuf};

use serde::{Deserialize, Serialize};
use skirmish_core::{
    CellCoord, Command, CommandError, Connectivity, Health, RangeAccounting, TeamId, TerrainId,
    TerrainProperties, TerrainTable, UnitStats,
};
use thiserror::Error;
use tracing::info;

use crate::Session;

/// Errors raised while loading or instantiating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {path}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document is not valid scenario TOML.
    #[error("failed to parse scenario")]
    Toml(#[from] toml::de::Error),
    /// The document parsed but describes an impossible match.
    #[error("invalid scenario: {0}")]
    Invalid(String),
    /// The world refused one of the setup commands.
    #[error("scenario setup was rejected")]
    Rejected(#[from] CommandError),
}

/// Complete description of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Map dimensions and search settings.
    pub grid: GridSection,
    /// Replacement terrain table; the built-in table is used when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terrain: Vec<TerrainEntry>,
    /// Terrain layout drawn with legend characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapSection>,
    /// Units placed before the first turn, in identifier order.
    #[serde(default, rename = "unit", skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<UnitEntry>,
    /// Host actions replayed by `skirmish play`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<Action>,
}

/// Map dimensions and search settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Neighbour wiring.
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Movement range bookkeeping.
    #[serde(default)]
    pub accounting: RangeAccounting,
}

/// One row of a replacement terrain table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerrainEntry {
    /// Numeric terrain identifier referenced by the legend.
    pub id: u16,
    /// Human readable name.
    pub name: String,
    /// Entry cost; omitted for impassable terrain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f32>,
    /// Whether units may stand on the terrain.
    #[serde(default = "default_walkable")]
    pub walkable: bool,
}

/// Terrain layout, one string per row starting at `z = 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapSection {
    /// Rows of legend characters.
    pub rows: Vec<String>,
    /// Extra or overriding legend entries mapping a character to a terrain id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub legend: BTreeMap<String, u16>,
}

/// Unit placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    /// Owning team, 0 or 1.
    pub team: u8,
    /// Column of the starting cell.
    pub x: u32,
    /// Row of the starting cell.
    pub z: u32,
    /// Starting health.
    pub health: u32,
    /// Damage per strike.
    pub damage: u32,
    /// Attack reach in hops.
    pub range: u32,
    /// Movement allowance.
    pub movement: f32,
}

impl UnitEntry {
    /// Statistics handed to the world.
    #[must_use]
    pub fn stats(&self) -> UnitStats {
        UnitStats {
            max_health: Health::new(self.health),
            attack_damage: self.damage,
            attack_range: self.range,
            move_allowance: self.movement,
        }
    }
}

/// Scripted host action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Select the unit on a cell.
    Select {
        /// Column.
        x: u32,
        /// Row.
        z: u32,
    },
    /// Confirm a destination and walk the whole path.
    Move {
        /// Column.
        x: u32,
        /// Row.
        z: u32,
    },
    /// Attack the unit on a cell and finish presenting the exchange.
    Attack {
        /// Column.
        x: u32,
        /// Row.
        z: u32,
    },
    /// Commit the selected unit without attacking.
    Wait,
    /// Clear the selection.
    Deselect,
    /// Pass the turn.
    EndTurn,
}

impl Action {
    /// Performs the action against the session.
    pub fn perform(&self, session: &mut Session) -> Result<(), CommandError> {
        match *self {
            Self::Select { x, z } => session.select_unit(x, z).map(|_| ()),
            Self::Move { x, z } => {
                let _ = session.confirm_destination(x, z)?;
                while session.step().is_some() {}
                Ok(())
            }
            Self::Attack { x, z } => {
                let _ = session.confirm_attack(x, z)?;
                while session.finish_combat_action().is_some() {}
                Ok(())
            }
            Self::Wait => session.confirm_wait(),
            Self::Deselect => {
                session.deselect();
                Ok(())
            }
            Self::EndTurn => session.end_turn().map(|_| ()),
        }
    }
}

const DEFAULT_LEGEND: [(char, TerrainId); 5] = [
    ('.', TerrainId::PLAINS),
    ('f', TerrainId::FOREST),
    ('h', TerrainId::HILLS),
    ('~', TerrainId::WATER),
    ('#', TerrainId::WALL),
];

fn default_walkable() -> bool {
    true
}

impl Scenario {
    /// Parses a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a scenario file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_toml_str(&text)?;
        info!(path = %path.display(), units = scenario.units.len(), "scenario loaded");
        Ok(scenario)
    }

    /// Renders the scenario back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Terrain table the scenario plays with.
    #[must_use]
    pub fn terrain_table(&self) -> TerrainTable {
        if self.terrain.is_empty() {
            return TerrainTable::default();
        }
        let mut table = TerrainTable::empty();
        for entry in &self.terrain {
            table.insert(
                TerrainId::new(entry.id),
                TerrainProperties::new(
                    entry.name.clone(),
                    entry.cost.unwrap_or(f32::INFINITY),
                    entry.walkable,
                ),
            );
        }
        table
    }

    /// Translates the scenario into the world commands that set it up.
    pub fn setup_commands(&self) -> Result<Vec<Command>, ScenarioError> {
        let GridSection {
            width,
            height,
            connectivity,
            accounting,
        } = self.grid;
        if width == 0 || height == 0 {
            return Err(ScenarioError::Invalid(format!(
                "grid must not be empty, got {width}x{height}"
            )));
        }

        let mut commands = vec![
            Command::ConfigureGrid {
                columns: width,
                rows: height,
                connectivity,
                accounting,
            },
            Command::ConfigureTerrainTable {
                table: self.terrain_table(),
            },
        ];

        if let Some(map) = &self.map {
            let legend = Self::legend(map)?;
            if map.rows.len() != height as usize {
                return Err(ScenarioError::Invalid(format!(
                    "map has {} rows, grid has {height}",
                    map.rows.len()
                )));
            }
            for (z, row) in (0u32..).zip(&map.rows) {
                if row.chars().count() != width as usize {
                    return Err(ScenarioError::Invalid(format!(
                        "map row {z} is not {width} characters wide"
                    )));
                }
                for (x, symbol) in (0u32..).zip(row.chars()) {
                    let terrain = legend.get(&symbol).copied().ok_or_else(|| {
                        ScenarioError::Invalid(format!("unknown map symbol '{symbol}'"))
                    })?;
                    if terrain != TerrainId::PLAINS {
                        commands.push(Command::SetTerrain {
                            cell: CellCoord::new(x, z),
                            terrain,
                        });
                    }
                }
            }
        }

        for unit in &self.units {
            let team = TeamId::new(unit.team);
            if !team.is_valid() {
                return Err(ScenarioError::Invalid(format!(
                    "unit at ({}, {}) names unknown team {}",
                    unit.x, unit.z, unit.team
                )));
            }
            commands.push(Command::PlaceUnit {
                team,
                cell: CellCoord::new(unit.x, unit.z),
                stats: unit.stats(),
            });
        }

        Ok(commands)
    }

    /// Builds a session holding the scenario's initial state.
    ///
    /// Setup events stay queued in the session so hosts can present them.
    pub fn into_session(self) -> Result<Session, ScenarioError> {
        let mut session = Session::default();
        for command in self.setup_commands()? {
            session.submit(command)?;
        }
        Ok(session)
    }

    fn legend(map: &MapSection) -> Result<BTreeMap<char, TerrainId>, ScenarioError> {
        let mut legend: BTreeMap<char, TerrainId> = DEFAULT_LEGEND.into_iter().collect();
        for (key, id) in &map.legend {
            let mut chars = key.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(ScenarioError::Invalid(format!(
                    "legend key '{key}' must be a single character"
                )));
            };
            let _ = legend.insert(symbol, TerrainId::new(*id));
        }
        Ok(legend)
    }
}
