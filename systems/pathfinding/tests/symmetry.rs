use skirmish_core::{CellCoord, CommandError, Connectivity};
use skirmish_system_pathfinding::{path_cost, shortest_path, PathGraph};

const WALLS: [(u32, u32); 5] = [(2, 0), (2, 1), (2, 2), (4, 4), (5, 2)];

fn walled_cost(_: CellCoord, to: CellCoord) -> f32 {
    if WALLS.contains(&(to.x(), to.z())) {
        f32::INFINITY
    } else {
        1.0
    }
}

fn open_cells(graph: &PathGraph) -> Vec<CellCoord> {
    graph
        .nodes()
        .map(|node| node.cell())
        .filter(|cell| !WALLS.contains(&(cell.x(), cell.z())))
        .collect()
}

#[test]
fn path_lengths_are_symmetric_under_symmetric_costs() {
    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let graph = PathGraph::build(6, 5, connectivity);
        let cells = open_cells(&graph);

        for &from in &cells {
            for &to in &cells {
                let forward = shortest_path(&graph, from, to, walled_cost);
                let backward = shortest_path(&graph, to, from, walled_cost);
                match (forward, backward) {
                    (Ok(forward), Ok(backward)) => {
                        assert_eq!(
                            forward.len(),
                            backward.len(),
                            "{from} -> {to} differs from reverse under {connectivity:?}"
                        );
                        assert_eq!(forward.total_cost(), backward.total_cost());
                    }
                    (Err(forward), Err(backward)) => assert_eq!(forward, backward),
                    (forward, backward) => {
                        panic!("asymmetric reachability {from} -> {to}: {forward:?} vs {backward:?}")
                    }
                }
            }
        }
    }
}

#[test]
fn every_returned_path_is_contiguous_and_priced_consistently() {
    let graph = PathGraph::build(6, 5, Connectivity::Four);
    let cells = open_cells(&graph);
    let origin = CellCoord::new(0, 0);

    for &to in &cells {
        let path = shortest_path(&graph, origin, to, walled_cost).expect("open cells connect");
        assert_eq!(path.source(), origin);
        assert_eq!(path.destination(), to);
        for pair in path.cells().windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
        assert_eq!(path_cost(&path, walled_cost), path.total_cost());
        assert_eq!(path.total_cost(), (path.len() - 1) as f32);
    }
}

#[test]
fn path_into_wall_has_no_route() {
    let graph = PathGraph::build(6, 5, Connectivity::Four);
    assert_eq!(
        shortest_path(&graph, CellCoord::new(0, 0), CellCoord::new(2, 1), walled_cost),
        Err(CommandError::NoRoute)
    );
}
