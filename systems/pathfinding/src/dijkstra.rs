//! Dijkstra shortest-path and cost-bounded distance searches.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap},
};

use ordered_float::OrderedFloat;
use skirmish_core::{CellCoord, CommandError, Path};

use crate::graph::PathGraph;

/// Computes the cheapest path from `source` to `target`.
///
/// `cost_fn(from, to)` prices the edge between two neighbouring cells; an
/// infinite or NaN cost removes the edge from consideration. Equal-cost
/// routes are interchangeable, ties are broken by node index.
pub fn shortest_path<F>(
    graph: &PathGraph,
    source: CellCoord,
    target: CellCoord,
    cost_fn: F,
) -> Result<Path, CommandError>
where
    F: FnMut(CellCoord, CellCoord) -> f32,
{
    let source_index = graph
        .index_of(source)
        .ok_or(CommandError::OutOfBounds { cell: source })?;
    let target_index = graph
        .index_of(target)
        .ok_or(CommandError::OutOfBounds { cell: target })?;

    if source_index == target_index {
        return Ok(Path::single(source));
    }

    let search = Search::run(graph, source_index, Some(target_index), f32::INFINITY, cost_fn);
    let total_cost = search.distances[target_index];
    if !total_cost.is_finite() {
        return Err(CommandError::NoRoute);
    }

    let mut cells = vec![target];
    let mut current = target_index;
    while let Some(previous) = search.predecessors[current] {
        let node = graph.node(previous).ok_or(CommandError::NoRoute)?;
        cells.push(node.cell());
        current = previous;
    }
    if current != source_index {
        return Err(CommandError::NoRoute);
    }
    cells.reverse();

    Path::new(cells, total_cost).ok_or(CommandError::NoRoute)
}

/// Cheapest cost from `source` to every cell reachable within `budget`.
///
/// The source itself is reported with a cost of zero.
pub fn distances_within<F>(
    graph: &PathGraph,
    source: CellCoord,
    budget: f32,
    cost_fn: F,
) -> Result<BTreeMap<CellCoord, f32>, CommandError>
where
    F: FnMut(CellCoord, CellCoord) -> f32,
{
    let source_index = graph
        .index_of(source)
        .ok_or(CommandError::OutOfBounds { cell: source })?;

    let search = Search::run(graph, source_index, None, budget, cost_fn);
    Ok(search
        .distances
        .iter()
        .enumerate()
        .filter(|(_, distance)| distance.is_finite() && **distance <= budget)
        .filter_map(|(index, distance)| graph.node(index).map(|node| (node.cell(), *distance)))
        .collect())
}

/// Sums `cost_fn` over consecutive cells of the path.
pub fn path_cost<F>(path: &Path, mut cost_fn: F) -> f32
where
    F: FnMut(CellCoord, CellCoord) -> f32,
{
    path.cells()
        .windows(2)
        .map(|pair| cost_fn(pair[0], pair[1]))
        .sum()
}

struct Search {
    distances: Vec<f32>,
    predecessors: Vec<Option<usize>>,
}

impl Search {
    fn run<F>(
        graph: &PathGraph,
        source: usize,
        target: Option<usize>,
        budget: f32,
        mut cost_fn: F,
    ) -> Self
    where
        F: FnMut(CellCoord, CellCoord) -> f32,
    {
        let node_count = graph.len();
        let mut distances = vec![f32::INFINITY; node_count];
        let mut predecessors = vec![None; node_count];
        let mut settled = vec![false; node_count];
        let mut frontier = BinaryHeap::new();

        distances[source] = 0.0;
        frontier.push(Reverse((OrderedFloat(0.0_f32), source)));

        while let Some(Reverse((OrderedFloat(distance), index))) = frontier.pop() {
            if settled[index] {
                continue;
            }
            settled[index] = true;

            if Some(index) == target {
                break;
            }

            let Some(node) = graph.node(index) else {
                continue;
            };
            let from = node.cell();

            for &neighbor in node.neighbor_indices() {
                if settled[neighbor] {
                    continue;
                }
                let Some(next) = graph.node(neighbor) else {
                    continue;
                };

                let step = cost_fn(from, next.cell());
                if step.is_nan() || step.is_infinite() || step < 0.0 {
                    continue;
                }

                let candidate = distance + step;
                if candidate > budget || candidate >= distances[neighbor] {
                    continue;
                }

                distances[neighbor] = candidate;
                predecessors[neighbor] = Some(index);
                frontier.push(Reverse((OrderedFloat(candidate), neighbor)));
            }
        }

        Self {
            distances,
            predecessors,
        }
    }
}
