use std::collections::VecDeque;

const INF: i32 = i32::max_value();

/// Maximum bipartite matching between boxes and goals, used by the
/// bipartite-deadlock check: if no perfect matching exists between the
/// current boxes and the goals reachable from them, some box can never be
/// placed and the state is dead regardless of how it's otherwise reached.
///
/// `adjacency[box_index]` lists the goal indices that box could ever reach
/// (typically "push-distance is finite"). Hopcroft-Karp over `left.len()`
/// boxes and `num_goals` goals; returns one matched goal index per box,
/// `None` where a box is left unmatched.
crate fn hopcroft_karp(adjacency: &[Vec<usize>], num_goals: usize) -> Vec<Option<usize>> {
    let num_boxes = adjacency.len();
    let mut match_box = vec![None; num_boxes];
    let mut match_goal = vec![None; num_goals];

    loop {
        let dist = bfs_layers(adjacency, &match_box, &match_goal);
        if dist.is_none() {
            break;
        }
        let dist = dist.unwrap();
        let mut augmented = false;
        for b in 0..num_boxes {
            if match_box[b].is_none() && dfs_augment(b, adjacency, &mut match_box, &mut match_goal, &dist) {
                augmented = true;
            }
        }
        if !augmented {
            break;
        }
    }

    match_box
}

crate fn is_perfect_matching(adjacency: &[Vec<usize>], num_goals: usize) -> bool {
    let matched = hopcroft_karp(adjacency, num_goals);
    matched.iter().all(Option::is_some)
}

fn bfs_layers(adjacency: &[Vec<usize>], match_box: &[Option<usize>], match_goal: &[Option<usize>]) -> Option<Vec<i32>> {
    let mut dist = vec![INF; match_box.len()];
    let mut queue = VecDeque::new();

    for (b, m) in match_box.iter().enumerate() {
        if m.is_none() {
            dist[b] = 0;
            queue.push_back(b);
        }
    }

    let mut found_free_goal = false;
    while let Some(b) = queue.pop_front() {
        for &g in &adjacency[b] {
            match match_goal[g] {
                None => found_free_goal = true,
                Some(next_b) => {
                    if dist[next_b] == INF {
                        dist[next_b] = dist[b] + 1;
                        queue.push_back(next_b);
                    }
                }
            }
        }
    }

    if found_free_goal {
        Some(dist)
    } else {
        None
    }
}

fn dfs_augment(
    b: usize,
    adjacency: &[Vec<usize>],
    match_box: &mut [Option<usize>],
    match_goal: &mut [Option<usize>],
    dist: &[i32],
) -> bool {
    for &g in &adjacency[b] {
        let ok = match match_goal[g] {
            None => true,
            Some(next_b) => dist[next_b] == dist[b] + 1 && dfs_augment(next_b, adjacency, match_box, match_goal, dist),
        };
        if ok {
            match_box[b] = Some(g);
            match_goal[g] = Some(b);
            return true;
        }
    }
    false
}
