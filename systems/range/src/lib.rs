#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives movement and attack ranges from the path graph.
//!
//! Movement ranges are cost-limited flood fills driven by the caller's cost
//! function. Attack ranges are hop-limited breadth-first shells over the raw
//! graph adjacency, so terrain never blocks line of attack.

use std::collections::BTreeSet;

use skirmish_core::{CellCoord, CommandError, RangeAccounting};
use skirmish_system_pathfinding::{distances_within, PathGraph};

/// Range calculator that reuses scratch buffers between queries.
#[derive(Debug, Default)]
pub struct RangeCalculator {
    recorded: Vec<Option<f32>>,
    visited: Vec<bool>,
    layer: Vec<usize>,
    next_layer: Vec<usize>,
}

impl RangeCalculator {
    /// Creates a new range calculator with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells a unit standing on `start` can reach with `move_allowance`.
    ///
    /// `start` is always part of the range. A neighbour is admitted when
    /// `move_allowance - accumulated_cost >= 0`. Under
    /// [`RangeAccounting::FirstDiscovery`] each cell keeps the cost of the
    /// route that first reached it, so a cheaper route discovered later is
    /// ignored; under [`RangeAccounting::Cheapest`] every cell carries its
    /// true minimum cost.
    pub fn movement_range<F>(
        &mut self,
        graph: &PathGraph,
        start: CellCoord,
        move_allowance: f32,
        accounting: RangeAccounting,
        cost_fn: F,
    ) -> Result<BTreeSet<CellCoord>, CommandError>
    where
        F: FnMut(CellCoord, CellCoord) -> f32,
    {
        match accounting {
            RangeAccounting::FirstDiscovery => {
                self.first_discovery(graph, start, move_allowance, cost_fn)
            }
            RangeAccounting::Cheapest => {
                let distances = distances_within(graph, start, move_allowance, cost_fn)?;
                Ok(distances.into_keys().collect())
            }
        }
    }

    /// Cells attackable from some position inside `movement_range`.
    ///
    /// Every movement cell contributes the cells lying between one and
    /// `attack_range` hops away; the union excludes `start`.
    pub fn attack_range_from_movement(
        &mut self,
        graph: &PathGraph,
        movement_range: &BTreeSet<CellCoord>,
        attack_range: u32,
        start: CellCoord,
    ) -> Result<BTreeSet<CellCoord>, CommandError> {
        let mut attackable = BTreeSet::new();
        for &origin in movement_range {
            self.shell(graph, origin, attack_range, &mut attackable)?;
        }
        let _ = attackable.remove(&start);
        Ok(attackable)
    }

    /// Cells attackable from a fixed `position`, excluding the position itself.
    pub fn attack_range_after_moving(
        &mut self,
        graph: &PathGraph,
        position: CellCoord,
        attack_range: u32,
    ) -> Result<BTreeSet<CellCoord>, CommandError> {
        let mut attackable = BTreeSet::new();
        self.shell(graph, position, attack_range, &mut attackable)?;
        Ok(attackable)
    }

    fn first_discovery<F>(
        &mut self,
        graph: &PathGraph,
        start: CellCoord,
        move_allowance: f32,
        mut cost_fn: F,
    ) -> Result<BTreeSet<CellCoord>, CommandError>
    where
        F: FnMut(CellCoord, CellCoord) -> f32,
    {
        let start_index = graph
            .index_of(start)
            .ok_or(CommandError::OutOfBounds { cell: start })?;

        self.recorded.clear();
        self.recorded.resize(graph.len(), None);
        self.recorded[start_index] = Some(0.0);
        self.layer.clear();
        self.layer.push(start_index);

        while !self.layer.is_empty() {
            self.next_layer.clear();

            for &index in &self.layer {
                let (Some(spent), Some(node)) = (self.recorded[index], graph.node(index)) else {
                    continue;
                };

                for &neighbor in node.neighbor_indices() {
                    if self.recorded[neighbor].is_some() {
                        continue;
                    }
                    let Some(next) = graph.node(neighbor) else {
                        continue;
                    };

                    let step = cost_fn(node.cell(), next.cell());
                    if step.is_nan() || step < 0.0 {
                        continue;
                    }

                    let accumulated = spent + step;
                    if move_allowance - accumulated >= 0.0 {
                        self.recorded[neighbor] = Some(accumulated);
                        self.next_layer.push(neighbor);
                    }
                }
            }

            std::mem::swap(&mut self.layer, &mut self.next_layer);
        }

        Ok(self
            .recorded
            .iter()
            .enumerate()
            .filter(|(_, recorded)| recorded.is_some())
            .filter_map(|(index, _)| graph.node(index).map(|node| node.cell()))
            .collect())
    }

    fn shell(
        &mut self,
        graph: &PathGraph,
        origin: CellCoord,
        hops: u32,
        out: &mut BTreeSet<CellCoord>,
    ) -> Result<(), CommandError> {
        let origin_index = graph
            .index_of(origin)
            .ok_or(CommandError::OutOfBounds { cell: origin })?;

        self.visited.clear();
        self.visited.resize(graph.len(), false);
        self.visited[origin_index] = true;
        self.layer.clear();
        self.layer.push(origin_index);

        for _ in 0..hops {
            self.next_layer.clear();
            for &index in &self.layer {
                let Some(node) = graph.node(index) else {
                    continue;
                };
                for &neighbor in node.neighbor_indices() {
                    if self.visited[neighbor] {
                        continue;
                    }
                    self.visited[neighbor] = true;
                    self.next_layer.push(neighbor);
                    if let Some(next) = graph.node(neighbor) {
                        let _ = out.insert(next.cell());
                    }
                }
            }
            if self.next_layer.is_empty() {
                break;
            }
            std::mem::swap(&mut self.layer, &mut self.next_layer);
        }

        Ok(())
    }
}
