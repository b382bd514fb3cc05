use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use separator::Separatable;

/// Per-depth counters, one `AtomicU64` triple per push distance, grown
/// lazily as the search reaches new depths. A `RwLock` rather than a
/// `Mutex` guards each `Vec`: every worker touches this on every push, and
/// the common case - the depth's slot already exists - only needs a read
/// lock, under which concurrent bumps are genuine atomic `fetch_add`s, not
/// serialized behind each other. The write lock only gets taken the first
/// time a push reaches a new depth, to grow the `Vec`.
pub struct Counters {
    created: RwLock<Vec<AtomicU64>>,
    duplicate: RwLock<Vec<AtomicU64>>,
    closed: RwLock<Vec<AtomicU64>>,
}

impl Counters {
    crate fn new() -> Self {
        Counters {
            created: RwLock::new(Vec::new()),
            duplicate: RwLock::new(Vec::new()),
            closed: RwLock::new(Vec::new()),
        }
    }

    crate fn add_created(&self, depth: u32) {
        bump(&self.created, depth);
    }

    crate fn add_duplicate(&self, depth: u32) {
        bump(&self.duplicate, depth);
    }

    crate fn add_closed(&self, depth: u32) {
        bump(&self.closed, depth);
    }

    crate fn total_created(&self) -> u64 {
        total(&self.created)
    }

    crate fn total_duplicate(&self) -> u64 {
        total(&self.duplicate)
    }

    crate fn total_closed(&self) -> u64 {
        total(&self.closed)
    }

    fn by_depth(counts: &RwLock<Vec<AtomicU64>>) -> Vec<u64> {
        counts.read().unwrap().iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

fn bump(counts: &RwLock<Vec<AtomicU64>>, depth: u32) {
    let depth = depth as usize;
    {
        let counts = counts.read().unwrap();
        if let Some(counter) = counts.get(depth) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
    }
    let mut counts = counts.write().unwrap();
    if depth >= counts.len() {
        counts.resize_with(depth + 1, || AtomicU64::new(0));
    }
    counts[depth].fetch_add(1, Ordering::Relaxed);
}

fn total(counts: &RwLock<Vec<AtomicU64>>) -> u64 {
    counts.read().unwrap().iter().map(|c| c.load(Ordering::Relaxed)).sum()
}

impl Debug for Counters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", Self::by_depth(&self.created))?;
        writeln!(f, "duplicates by depth: {:?}", Self::by_depth(&self.duplicate))?;
        writeln!(f, "closed by depth: {:?}", Self::by_depth(&self.closed))?;
        writeln!(f, "total created: {}", self.total_created().separated_string())?;
        writeln!(f, "total duplicate: {}", self.total_duplicate().separated_string())?;
        writeln!(f, "total closed: {}", self.total_closed().separated_string())
    }
}

impl Display for Counters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "States created: {}", self.total_created().separated_string())?;
        writeln!(f, "States closed: {}", self.total_closed().separated_string())?;
        writeln!(f, "Duplicates reached: {}", self.total_duplicate().separated_string())
    }
}
