use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::state::State;

struct Inner {
    /// `buckets[p]` holds every state pushed at priority `p`, FIFO within a
    /// bucket so ties break in discovery order.
    buckets: Vec<VecDeque<State>>,
    /// Lowest bucket index that might be non-empty; only ever moves up
    /// between pops, never reset down, so scanning for the next item never
    /// re-walks buckets already drained.
    min_bucket: usize,
    /// Workers currently parked waiting for work.
    blocked: usize,
    num_workers: usize,
    shutdown: bool,
}

/// Best-first frontier: a priority queue bucketed by integer priority
/// (`distance + W * heuristic`, always small and bounded, so buckets beat a
/// binary heap) shared by every search worker.
///
/// Termination is detected rather than signalled: when every worker is
/// simultaneously parked in `pop` with nothing left to hand out, the last
/// one to arrive declares the queue shut down and wakes the rest.
crate struct OpenQueue {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl OpenQueue {
    crate fn new(num_workers: usize) -> Self {
        OpenQueue {
            inner: Mutex::new(Inner {
                buckets: Vec::new(),
                min_bucket: 0,
                blocked: 0,
                num_workers,
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    crate fn push(&self, priority: u32, state: State) {
        let priority = priority as usize;
        let mut inner = self.inner.lock().unwrap();
        if inner.shutdown {
            return;
        }
        if priority >= inner.buckets.len() {
            inner.buckets.resize_with(priority + 1, VecDeque::new);
        }
        inner.buckets[priority].push_back(state);
        if priority < inner.min_bucket {
            inner.min_bucket = priority;
        }
        self.condvar.notify_one();
    }

    /// Blocks until a state is available, the queue is shut down externally
    /// (a solution was found), or every worker is parked here at once (the
    /// problem is exhausted). Returns `None` in the latter two cases.
    crate fn pop(&self) -> Option<State> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if inner.shutdown {
                return None;
            }
            while inner.min_bucket < inner.buckets.len() && inner.buckets[inner.min_bucket].is_empty() {
                inner.min_bucket += 1;
            }
            if inner.min_bucket < inner.buckets.len() {
                return inner.buckets[inner.min_bucket].pop_front();
            }

            inner.blocked += 1;
            if inner.blocked == inner.num_workers {
                inner.shutdown = true;
                self.condvar.notify_all();
                return None;
            }
            inner = self.condvar.wait(inner).unwrap();
            inner.blocked -= 1;
        }
    }

    /// Declares the queue done regardless of how many workers are still
    /// busy - used once a solution state is found.
    crate fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        self.condvar.notify_all();
    }

    crate fn is_shutdown(&self) -> bool {
        self.inner.lock().unwrap().shutdown
    }
}
