#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pathfinding system: the grid node graph and Dijkstra searches over it.
//!
//! The [`PathGraph`] is built once per map and never mutated afterwards.
//! Terrain and occupancy never live inside the graph; callers express them
//! through a cost function `cost_fn(from, to) -> f32` where an infinite cost
//! marks an edge that cannot be taken.

mod dijkstra;
mod graph;

pub use dijkstra::{distances_within, path_cost, shortest_path};
pub use graph::{Node, PathGraph};
