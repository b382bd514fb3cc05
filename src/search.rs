use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::closed_map::{ClosedMap, Commit};
use crate::config::SolverOptions;
use crate::corral::{agent_reachable, select_pi_corral};
use crate::deadlock::{self, FrozenResult};
use crate::geometry::DIRECTIONS;
use crate::level::{initial_heuristic, Level};
use crate::moves::{standing_cell, synthesize, Moves, PushStep};
use crate::open_queue::OpenQueue;
use crate::pattern_db::PatternDb;
use crate::state::{self, State, StateInfo};
use crate::stats::Counters;

/// What a `solve` call found.
pub enum SolveOutcome {
    Solved { steps: Moves, pushes: u32, counters: Counters },
    NoSolution { counters: Counters },
    TimedOut { counters: Counters },
}

struct Shared {
    level: Level,
    closed: ClosedMap,
    open: OpenQueue,
    patterns: PatternDb,
    counters: Counters,
    options: SolverOptions,
    solution: Mutex<Option<State>>,
    timed_out: AtomicBool,
}

/// Runs a parallel, priority-ordered push-search over `level`'s state space.
/// Blocks the calling thread until the problem is solved, proven
/// unsolvable, or `options.max_time` elapses.
pub fn solve(level: Level, options: SolverOptions) -> SolveOutcome {
    let counters = Counters::new();

    if is_goal(&level, &level.initial_state) {
        debug!("search: initial state already solved");
        return SolveOutcome::Solved { steps: Moves::default(), pushes: 0, counters };
    }

    if level.initial_info.heuristic == crate::cell::INF {
        // a box starts somewhere no sequence of pushes can ever move it out
        // of, typically a dead cell - the open queue buckets by priority and
        // an `INF` priority would try to allocate billions of empty slots,
        // so this has to be rejected before it ever reaches the queue.
        debug!("search: initial state is heuristically dead, no search needed");
        return SolveOutcome::NoSolution { counters };
    }

    let num_workers = options.num_workers();
    debug!("search: starting {} worker(s)", num_workers);

    let shared = Arc::new(Shared {
        closed: ClosedMap::new(),
        open: OpenQueue::new(num_workers),
        patterns: PatternDb::new(),
        counters,
        options,
        solution: Mutex::new(None),
        timed_out: AtomicBool::new(false),
        level,
    });

    shared.closed.insert(shared.level.initial_state.clone(), shared.level.initial_info.clone());
    shared.counters.add_created(0);
    shared.counters.add_closed(0);
    shared.open.push(
        shared.level.initial_info.priority(shared.options.dist_w, shared.options.heur_w),
        shared.level.initial_state.clone(),
    );

    // polls rather than sleeping for the whole budget in one go, so a
    // solution found well before `max_time` doesn't leave this thread - and
    // therefore `solve`'s join below - blocked until the deadline anyway.
    let monitor = shared.options.max_time.map(|max_time| {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            let start = Instant::now();
            let poll = Duration::from_millis(20);
            while start.elapsed() < max_time {
                if shared.open.is_shutdown() {
                    return;
                }
                thread::sleep(poll.min(max_time - start.elapsed()));
            }
            shared.timed_out.store(true, Ordering::SeqCst);
            shared.open.shutdown();
        })
    });

    let workers: Vec<_> = (0..num_workers)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || worker_loop(&shared))
        })
        .collect();

    for worker in workers {
        worker.join().expect("search worker panicked");
    }
    if let Some(monitor) = monitor {
        let _ = monitor.join();
    }

    let shared = Arc::try_unwrap(shared).unwrap_or_else(|_| unreachable!("every worker/monitor has joined by now"));
    let solution = shared.solution.into_inner().unwrap();

    match solution {
        Some(final_state) => {
            let pushes = reconstruct(&shared.level, &shared.closed, &final_state);
            let steps = synthesize(&shared.level.cells, shared.level.initial_info.pushed_from, &shared.level.initial_state.boxes, &pushes);
            let push_count = pushes.len() as u32;
            debug!("search: solved in {} pushes ({} moves)", push_count, steps.move_cnt());
            SolveOutcome::Solved { steps, pushes: push_count, counters: shared.counters }
        }
        None if shared.timed_out.load(Ordering::SeqCst) => SolveOutcome::TimedOut { counters: shared.counters },
        None => SolveOutcome::NoSolution { counters: shared.counters },
    }
}

fn is_goal(level: &Level, state: &State) -> bool {
    (0..level.num_goals).all(|g| state.boxes.get(g))
}

fn worker_loop(shared: &Shared) {
    while let Some(state) = shared.open.pop() {
        let info = match shared.closed.query(&state) {
            Some(info) => info,
            None => continue, // closed-set entry evicted isn't possible; defensive only.
        };

        if shared.options.debug {
            debug!("search: popped state at distance {} (agent {})", info.distance, state.agent);
        }

        expand(shared, &state, &info);
    }
}

fn expand(shared: &Shared, state: &State, info: &StateInfo) {
    let level = &shared.level;
    let cells = &level.cells;

    if shared.options.debug {
        // unlike `debug_assert!`, this runs in release builds too, so a run
        // that hits a discrepancy can be reproduced without a debug rebuild.
        assert_eq!(
            state.boxes.count(),
            level.initial_state.boxes.count(),
            "search: a state with {} boxes reached the open queue, expected {}",
            state.boxes.count(),
            level.initial_state.boxes.count()
        );
        let renormalized = state::normalize(cells, state.agent, &state.boxes);
        assert_eq!(renormalized, state.agent, "search: closed-map state was not held in normalized form");
    }

    let corral = select_pi_corral(cells, state.agent, &state.boxes, level.num_alive);
    let agent_reach = agent_reachable(cells, state.agent, &state.boxes);

    for box_id in state.boxes.iter() {
        for &dir in &DIRECTIONS {
            let source = box_id;
            let dest = match cells[source].neighbor(dir) {
                Some(d) => d,
                None => continue,
            };
            let stand = match cells[source].neighbor(dir.opposite()) {
                Some(s) => s,
                None => continue,
            };
            if !agent_reach[stand] {
                continue;
            }
            if !cells[dest].alive || state.boxes.get(dest) {
                continue;
            }
            if let Some(pi_corral) = &corral {
                if !pi_corral.iter().any(|&(d, _)| d == dest) {
                    continue;
                }
            }

            try_push(shared, state, info, source, dest, dir, &agent_reach);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn try_push(shared: &Shared, state: &State, info: &StateInfo, source: usize, dest: usize, dir: crate::geometry::Dir, agent_reach: &[bool]) {
    let level = &shared.level;
    let cells = &level.cells;

    let mut new_boxes = state.boxes.clone();
    new_boxes.move_box(source, dest);

    if deadlock::is_simple_deadlock(cells, &new_boxes, dest) {
        return;
    }

    // the agent's true raw position after this push is `source`, the cell
    // the box just vacated - not `dest`, which now holds the box itself.
    if shared.patterns.matches(source, &new_boxes) {
        return;
    }

    let reversible = deadlock::is_reversible_push(cells, &new_boxes, dest, dir, agent_reach);
    if !reversible {
        let new_agent_reach = agent_reachable(cells, source, &new_boxes);
        match deadlock::contains_frozen_boxes(cells, &new_boxes, &new_agent_reach, Some((dest, dir))) {
            FrozenResult::NotFrozen => {}
            FrozenResult::Frozen => {
                shared.patterns.learn(cells, &new_boxes, source);
                return;
            }
            FrozenResult::BlockedGoal | FrozenResult::PushBlockedGoal => return,
        }
    }

    let adjacency_ok = bipartite_feasible(cells, &new_boxes);
    if !adjacency_ok {
        return;
    }

    let normalized_agent = state::normalize(cells, source, &new_boxes);
    let new_state = State::new(normalized_agent, new_boxes);
    let distance = info.distance + 1;
    shared.counters.add_created(distance);

    let heuristic = initial_heuristic(cells, &new_state.boxes, level.num_goals);
    if heuristic == crate::cell::INF {
        return;
    }

    let new_info = StateInfo::child(distance, heuristic, (dest, dir), source);
    let commit = shared.closed.commit(&new_state, new_info.clone());
    if commit == Commit::Stale {
        shared.counters.add_duplicate(distance);
        return;
    }
    if commit == Commit::New {
        shared.counters.add_closed(distance);
    }

    if is_goal(level, &new_state) {
        let mut solution = shared.solution.lock().unwrap();
        if solution.is_none() {
            *solution = Some(new_state.clone());
        }
        shared.open.shutdown();
        return;
    }
    let priority = new_info.priority(shared.options.dist_w, shared.options.heur_w);
    shared.open.push(priority, new_state);
}

/// Bipartite-matching deadlock check over the *whole* box set, independent
/// of whether any box happens to be frozen right now - a cheap early
/// rejection for states that can never be completed regardless of order.
fn bipartite_feasible(cells: &[crate::cell::Cell], boxes: &crate::boxes::Boxes) -> bool {
    let boxes_vec: Vec<usize> = boxes.iter().collect();
    let goals: Vec<usize> = (0..cells.len()).filter(|&id| cells[id].goal).collect();
    let adjacency: Vec<Vec<usize>> = boxes_vec
        .iter()
        .map(|&b| {
            goals
                .iter()
                .enumerate()
                .filter(|&(_, &g)| cells[b].push_distance.get(g).copied().unwrap_or(crate::cell::INF) != crate::cell::INF)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();
    crate::matching::is_perfect_matching(&adjacency, goals.len())
}

fn reconstruct(level: &Level, closed: &ClosedMap, final_state: &State) -> Vec<PushStep> {
    let mut pushes = Vec::new();
    let mut state = final_state.clone();
    loop {
        let info = closed.query(&state).expect("every state on the solution path was closed");
        if info.distance == 0 {
            break;
        }
        let (dest, dir) = info.last_push.expect("a non-root closed state always has a last push");
        let source = info.pushed_from;
        pushes.push(PushStep { source, dest, dir });

        let mut prev_boxes = state.boxes.clone();
        prev_boxes.move_box(dest, source);
        let stand = standing_cell(&level.cells, source, dir);
        let prev_agent = state::normalize(&level.cells, stand, &prev_boxes);
        state = State::new(prev_agent, prev_boxes);
    }
    pushes.reverse();
    trace!("search: reconstructed {} pushes", pushes.len());
    pushes
}
