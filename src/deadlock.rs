use fnv::FnvHashSet;

use crate::boxes::Boxes;
use crate::cell::{Cell, INF};
use crate::geometry::Dir;
use crate::matching;

/// Outcome of `contains_frozen_boxes`.
///
/// `BlockedGoal` and `PushBlockedGoal` are both dead ends for every caller
/// except pattern minimization, which stops trimming a pattern the moment
/// it would turn a plain `Frozen` result into `PushBlockedGoal` rather
/// than treating them as the same bucket - see `pattern_db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
crate enum FrozenResult {
    /// No box is stuck.
    NotFrozen,
    /// Some box is immovable and sitting off a goal: unconditionally dead.
    Frozen,
    /// Every immovable box sits on a goal, but the remaining boxes have no
    /// perfect matching onto the remaining goals: dead.
    BlockedGoal,
    /// Every immovable box sits on a goal and a matching still exists, but
    /// the push that froze one of them there can't be undone.
    PushBlockedGoal,
}

/// Whether `box_id` can ever move again, assuming every other box stays
/// exactly where it is unless it too is frozen. Mutually-supporting boxes
/// (A can't move because B is in the way, B can't move because A is) are
/// conservatively called frozen: the recursion hits a cycle and returns
/// `true` rather than chasing it forever.
crate fn is_frozen(cells: &[Cell], boxes: &Boxes, box_id: usize) -> bool {
    let mut visiting = FnvHashSet::default();
    is_frozen_rec(cells, boxes, box_id, &mut visiting)
}

fn is_frozen_rec(cells: &[Cell], boxes: &Boxes, box_id: usize, visiting: &mut FnvHashSet<usize>) -> bool {
    if !visiting.insert(box_id) {
        return true;
    }
    axis_blocked(cells, boxes, box_id, Dir::Left, Dir::Right, visiting)
        && axis_blocked(cells, boxes, box_id, Dir::Up, Dir::Down, visiting)
}

/// A box can be pushed along an axis only by standing on one side and
/// moving into the other, so a wall on *either* side already rules out
/// both directions - there's nowhere to stand to push away from it. With
/// both sides open, the axis is blocked only if a box sits on each side
/// and both of those are themselves frozen.
fn axis_blocked(cells: &[Cell], boxes: &Boxes, box_id: usize, neg: Dir, pos: Dir, visiting: &mut FnvHashSet<usize>) -> bool {
    let l = cells[box_id].neighbor(neg);
    let r = cells[box_id].neighbor(pos);
    let (l, r) = match (l, r) {
        (Some(l), Some(r)) => (l, r),
        _ => return true,
    };
    let l_blocks = boxes.get(l) && is_frozen_rec(cells, boxes, l, visiting);
    let r_blocks = boxes.get(r) && is_frozen_rec(cells, boxes, r, visiting);
    l_blocks && r_blocks
}

/// A box occupying one corner of a 2x2 square where the other three cells
/// are each wall-or-box, and not every box in the square sits on a goal.
/// Cheaper than the general frozen check and catches the overwhelming
/// majority of corner pushes immediately after they happen.
crate fn is_corner_deadlock(cells: &[Cell], boxes: &Boxes, box_id: usize) -> bool {
    let axes = [(Dir::Left, Dir::Up), (Dir::Up, Dir::Right), (Dir::Right, Dir::Down), (Dir::Down, Dir::Left)];
    axes.iter().any(|&(a, b)| square_blocked(cells, boxes, box_id, a, b))
}

fn square_blocked(cells: &[Cell], boxes: &Boxes, box_id: usize, a: Dir, b: Dir) -> bool {
    let side_a = cells[box_id].neighbor(a);
    let side_b = cells[box_id].neighbor(b);
    let corner = match side_a {
        Some(cell_a) => cells[cell_a].neighbor(b),
        None => side_b.and_then(|cell_b| cells[cell_b].neighbor(a)),
    };

    let blockers = [side_a, side_b, corner];
    let mut any_box_off_goal = !cells[box_id].goal;
    for blocker in blockers.iter() {
        match blocker {
            None => {}
            Some(cell_id) => {
                if !boxes.get(*cell_id) {
                    return false;
                }
                if !cells[*cell_id].goal {
                    any_box_off_goal = true;
                }
            }
        }
    }
    // a square entirely formed of walls and goal-boxes is already solved,
    // not a deadlock.
    any_box_off_goal
}

/// Two boxes side by side, each missing a cell on the *same* perpendicular
/// side (a wall or the edge of the level), with at least one of the pair
/// off-goal. Neither box can be pushed along that perpendicular axis (no
/// destination on the blocked side, and no standing room on the other side
/// either - see `axis_blocked`'s comment), and neither can be pushed along
/// their shared axis without first moving the other out of the way, which
/// needs exactly the same impossible perpendicular push. `is_frozen`'s
/// cycle detection doesn't catch this shape: it treats "box on the other
/// side" as a recursive dependency, never as "there's no cell left to stand
/// on to push this pair apart in the first place".
crate fn is_line_deadlock(cells: &[Cell], boxes: &Boxes, box_id: usize) -> bool {
    for &dir in &[Dir::Left, Dir::Right, Dir::Up, Dir::Down] {
        let neighbor = match cells[box_id].neighbor(dir) {
            Some(n) => n,
            None => continue,
        };
        if !boxes.get(neighbor) {
            continue;
        }
        if cells[box_id].goal && cells[neighbor].goal {
            continue;
        }
        let (p, q) = perpendicular(dir);
        let pinned = |side: Dir| cells[box_id].neighbor(side).is_none() && cells[neighbor].neighbor(side).is_none();
        if pinned(p) || pinned(q) {
            return true;
        }
    }
    false
}

fn perpendicular(dir: Dir) -> (Dir, Dir) {
    match dir {
        Dir::Left | Dir::Right => (Dir::Up, Dir::Down),
        Dir::Up | Dir::Down => (Dir::Left, Dir::Right),
    }
}

/// Either simple-deadlock shape: a single box wedged into a 2x2 corner, or
/// a pair of boxes pinned against a wall on the same perpendicular side
/// (the 2x3 pattern).
crate fn is_simple_deadlock(cells: &[Cell], boxes: &Boxes, box_id: usize) -> bool {
    is_corner_deadlock(cells, boxes, box_id) || is_line_deadlock(cells, boxes, box_id)
}

crate fn is_reversible_push(cells: &[Cell], boxes: &Boxes, box_id: usize, push_dir: Dir, agent_reach: &[bool]) -> bool {
    match cells[box_id].neighbor(push_dir) {
        Some(stand) => agent_reach[stand] && !boxes.get(stand),
        None => false,
    }
}

/// Classifies the whole board after a push. `last_push` is the push that
/// produced the current `boxes`, used only to test reversibility;
/// `agent_reach` is the agent's box-free-reachable set in the resulting
/// state.
crate fn contains_frozen_boxes(
    cells: &[Cell],
    boxes: &Boxes,
    agent_reach: &[bool],
    last_push: Option<(usize, Dir)>,
) -> FrozenResult {
    if let Some((box_id, _)) = last_push {
        if is_simple_deadlock(cells, boxes, box_id) {
            return FrozenResult::Frozen;
        }
    }

    let mut frozen_off_goal = false;
    let mut frozen_on_goal = Vec::new();
    for box_id in boxes.iter() {
        if is_frozen(cells, boxes, box_id) {
            if cells[box_id].goal {
                frozen_on_goal.push(box_id);
            } else {
                frozen_off_goal = true;
            }
        }
    }

    if frozen_off_goal {
        return FrozenResult::Frozen;
    }
    if frozen_on_goal.is_empty() {
        return FrozenResult::NotFrozen;
    }

    let remaining_boxes: Vec<usize> = boxes.iter().filter(|id| !frozen_on_goal.contains(id)).collect();
    let remaining_goals: Vec<usize> = (0..cells.len())
        .filter(|&id| cells[id].goal && !boxes.get(id))
        .collect();

    let adjacency: Vec<Vec<usize>> = remaining_boxes
        .iter()
        .map(|&b| {
            remaining_goals
                .iter()
                .enumerate()
                .filter(|&(_, &g)| cells[b].push_distance.get(g).copied().unwrap_or(INF) != INF)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    if !matching::is_perfect_matching(&adjacency, remaining_goals.len()) {
        return FrozenResult::BlockedGoal;
    }

    if let Some((box_id, dir)) = last_push {
        if frozen_on_goal.contains(&box_id) && !is_reversible_push(cells, boxes, box_id, dir, agent_reach) {
            return FrozenResult::PushBlockedGoal;
        }
    }

    FrozenResult::NotFrozen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::parser::parse_level;

    fn compile(text: &str) -> Level {
        Level::compile(&parse_level(text).unwrap()).unwrap()
    }

    #[test]
    fn box_against_one_wall_only_is_not_frozen() {
        // flush against the bottom wall but free to slide left or right:
        // one blocked axis isn't enough, both have to be.
        let level = compile("#####\n#@  #\n# $.#\n#####");
        let box_id = level.initial_state.boxes.iter().next().unwrap();
        assert!(!is_frozen(&level.cells, &level.initial_state.boxes, box_id));
    }

    #[test]
    fn box_wedged_in_wall_corner_is_frozen() {
        // pushing the box one step left would wedge it into the bottom
        // left corner, where neither axis has anywhere left to go.
        let level = compile("######\n#@   #\n# $ .#\n######");
        let mut boxes = level.initial_state.boxes.clone();
        let box_id = boxes.iter().next().unwrap();
        let corner = level.cells[box_id].neighbor(Dir::Left).unwrap();
        boxes.move_box(box_id, corner);
        assert!(is_frozen(&level.cells, &boxes, corner));
    }

    #[test]
    fn two_boxes_in_a_dead_end_corridor_are_mutually_frozen() {
        // a two-cell corridor, walled on every side except where the two
        // cells meet each other: two boxes filling it can't move either
        // way, even though neither is wedged into a corner alone.
        use crate::geometry::Pos;
        let mut cells = vec![
            Cell::new(0, Pos::new(0, 0), false, true, false),
            Cell::new(1, Pos::new(0, 1), false, true, false),
        ];
        cells[0].set_neighbor(Dir::Right, Some(1));
        cells[1].set_neighbor(Dir::Left, Some(0));

        let mut boxes = Boxes::empty(2);
        boxes.set(0);
        boxes.set(1);

        assert!(is_frozen(&cells, &boxes, 0));
        assert!(is_frozen(&cells, &boxes, 1));
    }

    #[test]
    fn two_boxes_pinned_against_a_wall_are_a_line_deadlock_even_when_not_frozen() {
        // A-B side by side, both walled above, both open below and clear on
        // their outer sides. Neither box is individually wedged and
        // `is_frozen`'s recursive check can't see it either: A's free left
        // side makes its horizontal axis look unblocked, even though
        // actually pushing A left needs the agent standing on B's cell,
        // and pushing B right needs the agent standing on A's cell - both
        // impossible since a box is already there. That's exactly the
        // shape `is_line_deadlock` exists to catch.
        use crate::geometry::Pos;
        let mut cells: Vec<Cell> = (0..6).map(|id| Cell::new(id, Pos::new(0, id), false, true, false)).collect();
        cells[0].set_neighbor(Dir::Left, Some(2));
        cells[0].set_neighbor(Dir::Right, Some(1));
        cells[0].set_neighbor(Dir::Down, Some(4));
        cells[1].set_neighbor(Dir::Left, Some(0));
        cells[1].set_neighbor(Dir::Right, Some(3));
        cells[1].set_neighbor(Dir::Down, Some(5));

        let mut boxes = Boxes::empty(6);
        boxes.set(0);
        boxes.set(1);

        assert!(!is_frozen(&cells, &boxes, 0), "the recursive freeze check doesn't see this shape");
        assert!(is_line_deadlock(&cells, &boxes, 0));
        assert!(is_line_deadlock(&cells, &boxes, 1));
        assert!(is_simple_deadlock(&cells, &boxes, 0));
    }

    #[test]
    fn two_boxes_on_goals_against_a_wall_are_not_a_line_deadlock() {
        // same shape as above, but both boxes already sit on their goals -
        // solved, not dead.
        use crate::geometry::Pos;
        let mut cells: Vec<Cell> = (0..6).map(|id| Cell::new(id, Pos::new(0, id), id < 2, true, false)).collect();
        cells[0].set_neighbor(Dir::Left, Some(2));
        cells[0].set_neighbor(Dir::Right, Some(1));
        cells[0].set_neighbor(Dir::Down, Some(4));
        cells[1].set_neighbor(Dir::Left, Some(0));
        cells[1].set_neighbor(Dir::Right, Some(3));
        cells[1].set_neighbor(Dir::Down, Some(5));

        let mut boxes = Boxes::empty(6);
        boxes.set(0);
        boxes.set(1);

        assert!(!is_line_deadlock(&cells, &boxes, 0));
    }

    #[test]
    fn a_single_free_standing_box_is_not_a_line_deadlock() {
        let level = compile("#####\n#@  #\n# $.#\n#####");
        let box_id = level.initial_state.boxes.iter().next().unwrap();
        assert!(!is_line_deadlock(&level.cells, &level.initial_state.boxes, box_id));
    }

    #[test]
    fn no_boxes_in_play_is_not_a_deadlock() {
        let level = compile("#####\n#@$.#\n#####");
        // ignore the level's own initial box, just exercise the empty path.
        let boxes = Boxes::empty(level.num_alive);
        let agent_reach = vec![true; level.len()];
        assert_eq!(
            contains_frozen_boxes(&level.cells, &boxes, &agent_reach, None),
            FrozenResult::NotFrozen
        );
    }

    #[test]
    fn box_already_on_its_goal_is_not_flagged_frozen_without_others_to_check() {
        let level = compile("#####\n#@$.#\n#####");
        let mut boxes = Boxes::empty(level.num_alive);
        let goal_id = level.cells.iter().find(|c| c.goal).unwrap().id;
        boxes.set(goal_id);
        let agent_reach = vec![true; level.len()];
        assert_eq!(
            contains_frozen_boxes(&level.cells, &boxes, &agent_reach, None),
            FrozenResult::NotFrozen
        );
    }
}
