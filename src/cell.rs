use crate::geometry::{Dir, Pos};

/// Sentinel for "unreachable" in a push-distance table. Distances are push
/// counts, bounded in practice by `cells * cells`; `u32` never overflows for
/// any level this crate is expected to see.
crate const INF: u32 = u32::max_value();

/// A single navigable square of a compiled `Level`.
///
/// Ids are dense: every goal id is `< Level::num_goals`, every alive id is
/// `< Level::num_alive`, every dead id is `>= Level::num_alive`. Neighbour
/// links are cell ids into the owning `Level`'s cell vector; a missing
/// neighbour (wall, outside the level, or simply off the edge of the
/// compiled region) is `None`.
#[derive(Debug, Clone)]
crate struct Cell {
    crate id: usize,
    crate pos: Pos,
    crate goal: bool,
    crate alive: bool,
    crate sink: bool,

    /// Indexed the same way as `crate::geometry::DIRECTIONS`.
    neighbors: [Option<usize>; 4],
    king_neighbors: [Option<usize>; 8],

    /// Walkable neighbours: (direction, neighbour cell id).
    crate moves: Vec<(Dir, usize)>,
    /// Legal push targets from this cell: (destination cell id, cell the
    /// agent must stand on to perform the push).
    crate pushes: Vec<(usize, usize)>,

    /// Minimum pushes to bring a box from here to goal `g`, ignoring all
    /// other boxes. `INF` if unreachable. Empty (not `alive`) cells don't
    /// have one.
    crate push_distance: Vec<u32>,
    crate min_push_distance: u32,
}

impl Cell {
    crate fn new(id: usize, pos: Pos, goal: bool, alive: bool, sink: bool) -> Self {
        Cell {
            id,
            pos,
            goal,
            alive,
            sink,
            neighbors: [None; 4],
            king_neighbors: [None; 8],
            moves: Vec::new(),
            pushes: Vec::new(),
            push_distance: Vec::new(),
            min_push_distance: INF,
        }
    }

    crate fn neighbor(&self, dir: Dir) -> Option<usize> {
        self.neighbors[dir_index(dir)]
    }

    crate fn set_neighbor(&mut self, dir: Dir, cell: Option<usize>) {
        self.neighbors[dir_index(dir)] = cell;
    }

    crate fn king_neighbor(&self, i: usize) -> Option<usize> {
        self.king_neighbors[i]
    }

    crate fn set_king_neighbor(&mut self, i: usize, cell: Option<usize>) {
        self.king_neighbors[i] = cell;
    }

    crate fn king_neighbors(&self) -> impl Iterator<Item = usize> + '_ {
        self.king_neighbors.iter().filter_map(|&c| c)
    }
}

crate fn dir_index(dir: Dir) -> usize {
    match dir {
        Dir::Left => 0,
        Dir::Down => 1,
        Dir::Right => 2,
        Dir::Up => 3,
    }
}
