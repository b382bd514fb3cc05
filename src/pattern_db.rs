use std::sync::{Mutex, RwLock};

use log::debug;

use crate::boxes::Boxes;
use crate::cell::Cell;
use crate::corral::agent_reachable;
use crate::deadlock::{self, FrozenResult};

/// A learned frozen-box arrangement: if the agent is anywhere in
/// `agent_region` and `frozen_boxes` is a subset of the current boxes,
/// the position is dead without re-running the full frozen-box analysis.
#[derive(Debug, Clone)]
crate struct Pattern {
    crate agent_region: Boxes,
    crate frozen_boxes: Boxes,
}

impl Pattern {
    crate fn matches(&self, agent: usize, boxes: &Boxes) -> bool {
        self.agent_region.get(agent) && self.frozen_boxes.is_subset_of(boxes)
    }
}

/// Per-search-instance store of minimized deadlock patterns.
///
/// Lookups take a read lock and scan linearly - patterns rarely number
/// more than a few thousand even on hard levels, and a read lock lets
/// every worker thread query concurrently. Insertion takes a writer
/// mutex first so only one thread at a time decides whether a new
/// pattern is worth keeping, then briefly takes the write lock just to
/// append it; the mutex, not the lock, is what prevents two workers from
/// racing to insert near-duplicate patterns for the same dead position.
crate struct PatternDb {
    patterns: RwLock<Vec<Pattern>>,
    writer: Mutex<()>,
}

impl PatternDb {
    crate fn new() -> Self {
        PatternDb {
            patterns: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    crate fn len(&self) -> usize {
        self.patterns.read().unwrap().len()
    }

    crate fn matches(&self, agent: usize, boxes: &Boxes) -> bool {
        self.patterns.read().unwrap().iter().any(|p| p.matches(agent, boxes))
    }

    /// Learns from a position `contains_frozen_boxes` just classified as
    /// `Frozen`: finds a minimal sub-arrangement of boxes that's still
    /// exactly `Frozen` on its own, and remembers it together with the
    /// agent's current reachable region.
    crate fn learn(&self, cells: &[Cell], boxes: &Boxes, agent: usize) {
        let _serialize = self.writer.lock().unwrap();

        if self.matches(agent, boxes) {
            // something already covers this position.
            return;
        }

        let minimal = match minimize(cells, boxes) {
            Some(m) => m,
            None => return,
        };

        let region = agent_reachable(cells, agent, boxes);
        let mut agent_region = Boxes::empty(cells.len());
        for (id, &reachable) in region.iter().enumerate() {
            if reachable {
                agent_region.set(id);
            }
        }

        debug!(
            "pattern_db: learned a {}-box pattern ({} patterns total)",
            minimal.count(),
            self.len() + 1
        );
        self.patterns.write().unwrap().push(Pattern {
            agent_region,
            frozen_boxes: minimal,
        });
    }
}

/// Drops boxes from `boxes` one at a time as long as the remainder is
/// still exactly `Frozen` (not merely `BlockedGoal`/`PushBlockedGoal` -
/// those depend on the exact goal assignment and don't generalize the
/// way a plain geometric freeze does). Rejects patterns with two or
/// fewer boxes: those are already as cheap to detect as the simple
/// corner/2x2 check, so a database entry buys nothing.
fn minimize(cells: &[Cell], boxes: &Boxes) -> Option<Boxes> {
    let agent_reach_everywhere = vec![true; cells.len()];
    if deadlock::contains_frozen_boxes(cells, boxes, &agent_reach_everywhere, None) != FrozenResult::Frozen {
        return None;
    }

    let mut current = boxes.clone();
    loop {
        let mut removed_one = false;
        for box_id in current.iter().collect::<Vec<_>>() {
            if current.count() <= 1 {
                break;
            }
            let mut candidate = current.clone();
            candidate.reset(box_id);
            if deadlock::contains_frozen_boxes(cells, &candidate, &agent_reach_everywhere, None) == FrozenResult::Frozen {
                current = candidate;
                removed_one = true;
            }
        }
        if !removed_one {
            break;
        }
    }

    if current.count() <= 2 {
        return None;
    }
    Some(current)
}
