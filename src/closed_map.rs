use std::sync::Mutex;

use fnv::FnvHashMap;

use crate::state::{State, StateInfo};

const NUM_SHARDS: usize = 64;

/// Result of `ClosedMap::commit`: what a worker should do with the state it
/// just tried to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
crate enum Commit {
    /// Not seen before; the given info is now the closed entry.
    New,
    /// Already closed, but at a worse or equal distance; replaced.
    Improved,
    /// Already closed at a distance <= the candidate's; nothing changed.
    Stale,
}

struct Shard {
    entries: Vec<(State, StateInfo)>,
    index: FnvHashMap<State, usize>,
}

impl Shard {
    fn new() -> Self {
        Shard { entries: Vec::new(), index: FnvHashMap::default() }
    }
}

/// Visited-state table, sharded so unrelated states never contend on the
/// same lock. A state's shard is fixed by its box layout alone, so every
/// worker agrees on where to look without any cross-shard coordination.
crate struct ClosedMap {
    shards: Vec<Mutex<Shard>>,
}

impl ClosedMap {
    crate fn new() -> Self {
        ClosedMap { shards: (0..NUM_SHARDS).map(|_| Mutex::new(Shard::new())).collect() }
    }

    fn shard_for(&self, state: &State) -> &Mutex<Shard> {
        &self.shards[shard_index(state)]
    }

    crate fn query(&self, state: &State) -> Option<StateInfo> {
        let shard = self.shard_for(state).lock().unwrap();
        shard.index.get(state).map(|&i| shard.entries[i].1.clone())
    }

    crate fn insert(&self, state: State, info: StateInfo) {
        let mut shard = self.shard_for(&state).lock().unwrap();
        insert_locked(&mut shard, state, info);
    }

    /// Lowers `state`'s distance in place if `distance` is an improvement;
    /// returns whether it was.
    crate fn update_distance(&self, state: &State, distance: u32, last_push: (usize, crate::geometry::Dir), pushed_from: usize) -> bool {
        let mut shard = self.shard_for(state).lock().unwrap();
        match shard.index.get(state).copied() {
            None => false,
            Some(i) => {
                if distance < shard.entries[i].1.distance {
                    shard.entries[i].1.distance = distance;
                    shard.entries[i].1.last_push = Some(last_push);
                    shard.entries[i].1.pushed_from = pushed_from;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Query-and-act under a single shard lock, so two workers racing to
    /// close the same state can't both decide it's new.
    crate fn commit(&self, state: &State, info: StateInfo) -> Commit {
        let mut shard = self.shard_for(state).lock().unwrap();
        match shard.index.get(state).copied() {
            None => {
                insert_locked(&mut shard, state.clone(), info);
                Commit::New
            }
            Some(i) => {
                if info.distance < shard.entries[i].1.distance {
                    shard.entries[i].1 = info;
                    Commit::Improved
                } else {
                    Commit::Stale
                }
            }
        }
    }

    #[cfg(test)]
    crate fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().unwrap().entries.len()).sum()
    }
}

fn insert_locked(shard: &mut Shard, state: State, info: StateInfo) {
    let i = shard.entries.len();
    shard.index.insert(state.clone(), i);
    shard.entries.push((state, info));
}

/// Splitmix64's finalizer, applied to `boxes.hash * 7` as the spec
/// prescribes - the multiply by a fixed odd constant breaks up the
/// runs of nearby hashes a near-solved board's boxes tend to produce.
fn shard_index(state: &State) -> usize {
    let mut x = state.boxes.hash64().wrapping_mul(7);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x as usize) % NUM_SHARDS
}
