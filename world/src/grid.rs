//! Dense terrain and occupancy storage for the map.

use skirmish_core::{CellCoord, TerrainId, UnitId};

/// Single map cell: its terrain and the unit standing on it, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GridCell {
    pub(crate) terrain: TerrainId,
    pub(crate) occupant: Option<UnitId>,
}

/// Row-major arena of grid cells addressed by coordinate.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![
                GridCell {
                    terrain: TerrainId::PLAINS,
                    occupant: None,
                };
                capacity
            ],
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.columns && cell.z() < self.rows
    }

    pub(crate) fn cell(&self, cell: CellCoord) -> Option<&GridCell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.cell(cell).and_then(|cell| cell.occupant)
    }

    pub(crate) fn terrain(&self, cell: CellCoord) -> Option<TerrainId> {
        self.cell(cell).map(|cell| cell.terrain)
    }

    pub(crate) fn set_terrain(&mut self, cell: CellCoord, terrain: TerrainId) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.terrain = terrain;
        }
    }

    pub(crate) fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.occupant = Some(unit);
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.occupant = None;
        }
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut GridCell> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let z = usize::try_from(cell.z()).ok()?;
            let x = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(z * width + x)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_open_plains() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.terrain(CellCoord::new(2, 1)), Some(TerrainId::PLAINS));
        assert_eq!(grid.occupant(CellCoord::new(0, 0)), None);
        assert_eq!(grid.terrain(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn occupancy_tracks_single_unit_per_cell() {
        let mut grid = Grid::new(3, 3);
        let cell = CellCoord::new(1, 2);
        grid.occupy(UnitId::new(4), cell);
        assert_eq!(grid.occupant(cell), Some(UnitId::new(4)));
        grid.vacate(cell);
        assert_eq!(grid.occupant(cell), None);
    }

    #[test]
    fn writes_outside_grid_are_ignored() {
        let mut grid = Grid::new(2, 2);
        grid.occupy(UnitId::new(1), CellCoord::new(5, 5));
        grid.set_terrain(CellCoord::new(2, 0), TerrainId::WALL);
        assert!(grid.cell(CellCoord::new(5, 5)).is_none());
        assert!(!grid.contains(CellCoord::new(2, 0)));
    }
}
