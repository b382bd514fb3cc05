use std::collections::VecDeque;

use fnv::FnvHashSet;

use crate::boxes::Boxes;
use crate::cell::Cell;

/// A maximal region of alive cells the agent currently can't reach,
/// together with the boxes fencing it in. `cells` reuses the `Boxes`
/// bitset representation purely as "a set of cell ids" - it holds no
/// boxes itself.
#[derive(Debug, Clone)]
crate struct Corral {
    crate cells: Boxes,
    crate fence_boxes: Vec<usize>,
}

/// Box-free-reachable set from `agent`, as a bitset over every cell
/// (not just alive ones) - the same walk `state::normalize` does, but
/// keeping the whole set instead of collapsing it to a single id.
crate fn agent_reachable(cells: &[Cell], agent: usize, boxes: &Boxes) -> Vec<bool> {
    let mut seen = vec![false; cells.len()];
    let mut queue = VecDeque::new();
    seen[agent] = true;
    queue.push_back(agent);
    while let Some(cur) = queue.pop_front() {
        for &(_, next) in &cells[cur].moves {
            if seen[next] {
                continue;
            }
            if cells[next].alive && boxes.get(next) {
                continue;
            }
            seen[next] = true;
            queue.push_back(next);
        }
    }
    seen
}

/// Connected components of cells the agent can't reach, grown through
/// king moves so that two pockets separated only by a box corner are
/// treated as one corral - pushing either box can open either side.
crate fn find_corrals(cells: &[Cell], agent: usize, boxes: &Boxes, num_alive: usize) -> Vec<Corral> {
    let reachable = agent_reachable(cells, agent, boxes);
    let mut visited = vec![false; cells.len()];
    let mut corrals = Vec::new();

    for start in 0..cells.len() {
        if !cells[start].alive || reachable[start] || boxes.get(start) || visited[start] {
            continue;
        }

        let mut region = Boxes::empty(num_alive);
        let mut fence: FnvHashSet<usize> = FnvHashSet::default();
        let mut queue = VecDeque::new();
        visited[start] = true;
        region.set(start);
        queue.push_back(start);

        while let Some(cur) = queue.pop_front() {
            let neighbors = cells[cur]
                .moves
                .iter()
                .map(|&(_, n)| n)
                .chain(cells[cur].king_neighbors());
            for n in neighbors {
                if boxes.get(n) {
                    fence.insert(n);
                    continue;
                }
                if !cells[n].alive || reachable[n] || visited[n] {
                    continue;
                }
                visited[n] = true;
                region.set(n);
                queue.push_back(n);
            }
        }

        let mut fence_boxes: Vec<usize> = fence.into_iter().collect();
        fence_boxes.sort_unstable();
        corrals.push(Corral { cells: region, fence_boxes });
    }

    corrals
}

/// A corral still has work to do in it: an unclaimed goal inside it, or a
/// fence box standing off-goal that will eventually need to move through
/// (or into) it.
crate fn is_unsolved(corral: &Corral, cells: &[Cell], boxes: &Boxes) -> bool {
    corral
        .cells
        .iter()
        .any(|id| cells[id].goal && !boxes.get(id))
        || corral.fence_boxes.iter().any(|&id| !cells[id].goal)
}

/// Pushes of `box_id` that land inside `region`.
fn inward_pushes(cells: &[Cell], box_id: usize, region: &Boxes) -> Vec<(usize, usize)> {
    cells[box_id]
        .pushes
        .iter()
        .copied()
        .filter(|&(dest, _)| region.get(dest))
        .collect()
}

/// Whether every push available to `box_id` either moves it into `region`
/// or keeps it out of the agent's reach - i.e. nothing about pushing this
/// box right now could dodge the corral by escaping into open territory.
fn all_pushes_safe(cells: &[Cell], box_id: usize, region: &Boxes, reachable: &[bool]) -> bool {
    cells[box_id]
        .pushes
        .iter()
        .all(|&(dest, _)| region.get(dest) || !reachable[dest])
}

/// Candidate fence-box pushes to restrict the search to at this state, if
/// any combination of corrals forms a pruning ("PI") corral: every fence
/// box of the union only ever pushes inward or into otherwise-unreachable
/// territory, so resolving this region is unavoidable before anything
/// else matters. Tries singletons first, then pairs, then (for few
/// enough corrals) every remaining subset, else the full union - whichever
/// valid candidate yields the fewest inward pushes to branch on.
crate fn select_pi_corral(cells: &[Cell], agent: usize, boxes: &Boxes, num_alive: usize) -> Option<Vec<(usize, usize)>> {
    let corrals: Vec<Corral> = find_corrals(cells, agent, boxes, num_alive)
        .into_iter()
        .filter(|c| is_unsolved(c, cells, boxes))
        .collect();
    if corrals.is_empty() {
        return None;
    }

    let reachable = agent_reachable(cells, agent, boxes);
    let mut best: Option<Vec<(usize, usize)>> = None;

    let mut consider = |indices: &[usize]| {
        let mut region = Boxes::empty(num_alive);
        let mut fence_boxes: Vec<usize> = Vec::new();
        for &i in indices {
            for id in corrals[i].cells.iter() {
                region.set(id);
            }
            fence_boxes.extend(corrals[i].fence_boxes.iter().copied());
        }
        fence_boxes.sort_unstable();
        fence_boxes.dedup();

        if !fence_boxes.iter().all(|&b| all_pushes_safe(cells, b, &region, &reachable)) {
            return;
        }
        let pushes: Vec<(usize, usize)> = fence_boxes
            .iter()
            .flat_map(|&b| inward_pushes(cells, b, &region))
            .collect();
        if pushes.is_empty() {
            return;
        }
        if best.as_ref().map_or(true, |b| pushes.len() < b.len()) {
            best = Some(pushes);
        }
    };

    for i in 0..corrals.len() {
        consider(&[i]);
    }
    if corrals.len() < 8 {
        for mask in 1u32..(1 << corrals.len()) {
            let indices: Vec<usize> = (0..corrals.len()).filter(|&i| mask & (1 << i) != 0).collect();
            consider(&indices);
        }
    } else {
        for i in 0..corrals.len() {
            for j in (i + 1)..corrals.len() {
                consider(&[i, j]);
            }
        }
        let all: Vec<usize> = (0..corrals.len()).collect();
        consider(&all);
    }

    best
}
