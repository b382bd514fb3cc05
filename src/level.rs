use std::collections::VecDeque;

use fnv::FnvHashSet;
use log::debug;

use crate::boxes::Boxes;
use crate::cell::{Cell, INF};
use crate::error::SolveError;
use crate::geometry::{Dir, Pos, DIRECTIONS, KING_DELTAS};
use crate::level_env::LevelEnv;
use crate::state::{State, StateInfo};
use crate::vec2d::Vec2d;

/// A compiled, search-ready level: a cell graph plus the push-distance
/// table search needs for its heuristic.
///
/// Cell ids are ordered goals-first, then the rest of the alive cells,
/// then dead cells last - `id < num_goals` is "this cell is a goal" and
/// `id < num_alive` is "a box here isn't an instant dead end", without
/// needing to carry the flags around separately in hot loops.
#[derive(Clone)]
pub struct Level {
    crate cells: Vec<Cell>,
    crate num_goals: usize,
    crate num_alive: usize,
    crate rows: usize,
    crate cols: usize,
    crate initial_state: State,
    crate initial_info: StateInfo,
}

impl Level {
    pub fn compile(env: &LevelEnv) -> Result<Level, SolveError> {
        env.validate()?;

        let rows = env.rows();
        let cols = env.cols();

        // Cells the agent can ever set foot on. Regions the agent can't
        // reach are indistinguishable from walls for every purpose below,
        // so there's no separate "wall canonicalization" pass: `id_of`
        // being `None` already means "wall, outside, or unreachable".
        let id_of = reachable_ids(env);
        let n = id_of.iter().filter(|(_, id)| id.is_some()).count();
        let mut pos_of = vec![Pos::new(0, 0); n];
        for ((row, col), &id) in id_of.iter() {
            if let Some(id) = id {
                pos_of[id] = Pos::new(row, col);
            }
        }
        debug!("level.rs: {} reachable cells out of {}", n, rows * cols);

        let is_goal: Vec<bool> = (0..n).map(|id| env.goal[(pos_of[id].row, pos_of[id].col)]).collect();
        let is_sink: Vec<bool> = (0..n).map(|id| env.sink[(pos_of[id].row, pos_of[id].col)]).collect();

        let goal_temp_ids: Vec<usize> = (0..n).filter(|&id| is_goal[id]).collect();
        let sink_temp_ids: Vec<usize> = (0..n).filter(|&id| is_sink[id]).collect();

        // Dead-cell detection: a cell is alive iff some sequence of pulls,
        // starting with a box sitting on a goal (or sink), can bring a box
        // to rest there. `push_distance` falls out of the same search: the
        // pull-distance from goal `g` *is* the push-distance back to it.
        let mut push_distance = vec![vec![INF; goal_temp_ids.len()]; n];
        let mut alive = vec![false; n];
        for (g, &goal_id) in goal_temp_ids.iter().enumerate() {
            let dist = pull_bfs(&id_of, &pos_of, n, goal_id);
            for id in 0..n {
                push_distance[id][g] = dist[id];
                if dist[id] != INF {
                    alive[id] = true;
                }
            }
        }
        for &sink_id in &sink_temp_ids {
            let dist = pull_bfs(&id_of, &pos_of, n, sink_id);
            for id in 0..n {
                if dist[id] != INF {
                    alive[id] = true;
                }
            }
        }
        for &id in &goal_temp_ids {
            alive[id] = true;
        }

        let agent_temp_id = id_of[(env.agent.row, env.agent.col)].expect("validated agent cell is reachable");

        let boxes_temp: Vec<usize> = (0..n)
            .filter(|&id| env.box_[(pos_of[id].row, pos_of[id].col)])
            .collect();
        if boxes_temp.iter().any(|&id| !alive[id]) {
            debug!("level.rs: a box starts on a dead cell, level is unsolvable by construction");
        }

        // Final id order: goals, then the rest of the alive cells, then
        // dead cells. Keeps every hot-path "is this id a goal/alive" check
        // a single comparison instead of a flag lookup.
        let mut order: Vec<usize> = Vec::with_capacity(n);
        order.extend(goal_temp_ids.iter().copied());
        order.extend((0..n).filter(|&id| alive[id] && !is_goal[id]));
        order.extend((0..n).filter(|&id| !alive[id]));
        debug_assert_eq!(order.len(), n);

        let mut remap = vec![0usize; n];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id;
        }
        let num_goals = goal_temp_ids.len();
        let num_alive = order.iter().filter(|&&old_id| alive[old_id]).count();

        let mut cells: Vec<Cell> = order
            .iter()
            .map(|&old_id| Cell::new(remap[old_id], pos_of[old_id], is_goal[old_id], alive[old_id], is_sink[old_id]))
            .collect();

        for &old_id in &order {
            let new_id = remap[old_id];
            let pos = pos_of[old_id];

            for dir in DIRECTIONS.iter().copied() {
                let neighbor_old = (pos + dir).and_then(|p| id_of.get(p.row as isize, p.col as isize).copied().flatten());
                let neighbor_new = neighbor_old.map(|o| remap[o]);
                cells[new_id].set_neighbor(dir, neighbor_new);
                if let Some(neighbor_new) = neighbor_new {
                    cells[new_id].moves.push((dir, neighbor_new));
                }
            }
            for (i, &(dr, dc)) in KING_DELTAS.iter().enumerate() {
                let r = pos.row as isize + dr;
                let c = pos.col as isize + dc;
                let neighbor = if r >= 0 && c >= 0 {
                    id_of.get(r, c).copied().flatten().map(|o| remap[o])
                } else {
                    None
                };
                cells[new_id].set_king_neighbor(i, neighbor);
            }

            if alive[old_id] {
                for dir in DIRECTIONS.iter().copied() {
                    let dest_old = (pos + dir).and_then(|p| id_of.get(p.row as isize, p.col as isize).copied().flatten());
                    let stand_old = (pos + dir.opposite())
                        .and_then(|p| id_of.get(p.row as isize, p.col as isize).copied().flatten());
                    if let (Some(dest_old), Some(stand_old)) = (dest_old, stand_old) {
                        if alive[dest_old] {
                            cells[new_id].pushes.push((remap[dest_old], remap[stand_old]));
                        }
                    }
                }
            }
        }

        for &old_id in &order {
            if !alive[old_id] {
                continue;
            }
            let new_id = remap[old_id];
            let distances: Vec<u32> = push_distance[old_id].clone();
            cells[new_id].min_push_distance = distances.iter().copied().min().unwrap_or(INF);
            cells[new_id].push_distance = distances;
        }

        let agent = remap[agent_temp_id];
        // A box starting on a dead cell can never reach any goal by
        // construction (dead-cell detection is already the relaxed,
        // other-boxes-ignored case), so the level is unsolvable regardless
        // of where the other boxes sit. Dead cells remap past `num_alive`,
        // outside the bitset search ever uses for real box positions, so
        // skip the `set` rather than index out of range and force the
        // heuristic to `INF` directly instead of summing push distances
        // that don't fully describe the state.
        let any_box_dead = boxes_temp.iter().any(|&old_id| !alive[old_id]);
        let mut initial_boxes = Boxes::empty(num_alive);
        for &old_id in &boxes_temp {
            if alive[old_id] {
                initial_boxes.set(remap[old_id]);
            }
        }

        let normalized_agent = crate::state::normalize(&cells, agent, &initial_boxes);
        let heuristic = if any_box_dead { INF } else { initial_heuristic(&cells, &initial_boxes, num_goals) };
        let initial_state = State::new(normalized_agent, initial_boxes);
        // `pushed_from` replays as the agent's true starting cell, not its
        // normalized stand-in, so the first leg of a solution's move
        // sequence starts where the player actually begins.
        let initial_info = StateInfo::root(heuristic, agent);

        Ok(Level {
            cells,
            num_goals,
            num_alive,
            rows,
            cols,
            initial_state,
            initial_info,
        })
    }

    crate fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Sum of each box's cheapest push-distance to a goal. `INF` if any box has
/// no route to any goal at all - the level is unsolvable regardless of
/// deadlock reasoning, but that's `search`'s call to make, not this one's.
crate fn initial_heuristic(cells: &[Cell], boxes: &Boxes, num_goals: usize) -> u32 {
    if num_goals == 0 {
        return 0;
    }
    let mut total = 0u32;
    for box_id in boxes.iter() {
        let cell = &cells[box_id];
        if cell.min_push_distance == INF {
            return INF;
        }
        total = total.saturating_add(cell.min_push_distance);
    }
    total
}

/// Cells the agent can reach by walking from its start, ignoring boxes
/// (boxes come and go during search; only walls are permanent).
fn reachable_ids(env: &LevelEnv) -> Vec2d<Option<usize>> {
    let mut id_of: Vec2d<Option<usize>> = Vec2d::filled(env.rows(), env.cols(), None);
    let mut queue = VecDeque::new();
    let mut next_id = 0;

    id_of[(env.agent.row, env.agent.col)] = Some(next_id);
    next_id += 1;
    queue.push_back(env.agent);

    while let Some(pos) = queue.pop_front() {
        for dir in DIRECTIONS.iter().copied() {
            let next = match pos + dir {
                Some(p) => p,
                None => continue,
            };
            if !env.wall.in_bounds(next.row as isize, next.col as isize) {
                continue;
            }
            if env.wall[(next.row, next.col)] {
                continue;
            }
            if id_of[(next.row, next.col)].is_some() {
                continue;
            }
            id_of[(next.row, next.col)] = Some(next_id);
            next_id += 1;
            queue.push_back(next);
        }
    }
    id_of
}

/// Backward pair-BFS: simulates pulling a hypothetical box away from
/// `start` (a goal or sink), recording the minimum number of pulls needed
/// to have dragged it to each cell. A pull count is exactly a push count
/// in the opposite direction, so this doubles as both the dead-cell test
/// (reachable at all?) and the push-distance table (how far?).
fn pull_bfs(id_of: &Vec2d<Option<usize>>, pos_of: &[Pos], n: usize, start: usize) -> Vec<u32> {
    let mut dist = vec![INF; n];
    dist[start] = 0;

    let mut visited: FnvHashSet<(usize, usize)> = FnvHashSet::default();
    let mut queue: VecDeque<(usize, usize, u32)> = VecDeque::new();

    let at = |pos: Pos, dir: Dir| -> Option<usize> {
        let p = (pos + dir)?;
        id_of.get(p.row as isize, p.col as isize).copied().flatten()
    };

    for dir in DIRECTIONS.iter().copied() {
        if let Some(agent0) = at(pos_of[start], dir) {
            if visited.insert((agent0, start)) {
                queue.push_back((agent0, start, 0));
            }
        }
    }

    while let Some((agent, box_, d)) = queue.pop_front() {
        for dir in DIRECTIONS.iter().copied() {
            let stepped = at(pos_of[agent], dir);

            // walk: agent steps aside, box stays put.
            if let Some(a2) = stepped {
                if a2 != box_ && visited.insert((a2, box_)) {
                    queue.push_back((a2, box_, d));
                }
            }

            // pull: the box sits directly behind the agent on this axis,
            // so stepping further away drags it one cell closer to the
            // agent's old position.
            if at(pos_of[agent], dir.opposite()) == Some(box_) {
                if let Some(a2) = stepped {
                    let new_box = agent;
                    if dist[new_box] == INF {
                        dist[new_box] = d + 1;
                    }
                    if visited.insert((a2, new_box)) {
                        queue.push_back((a2, new_box, d + 1));
                    }
                }
            }
        }
    }

    dist
}
