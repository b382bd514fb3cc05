use std::time::Duration;

/// Tunables for a single `solve` call.
///
/// `dist_w`/`heur_w` replace the original hardcoded `Overestimate = 2`
/// weighting; `dist_w = 1, heur_w = 2` reproduces it exactly and is the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    /// Force a single worker thread regardless of available parallelism -
    /// useful for reproducing a run deterministically.
    pub single_thread: bool,
    pub dist_w: u32,
    pub heur_w: u32,
    /// `None` means run until the problem is solved or proven unsolvable.
    pub max_time: Option<Duration>,
    /// Logs every state popped off the open queue and runs extra invariant
    /// checks (box-count conservation, closed-map normalization) in the
    /// search loop. Unlike `debug_assert!`, these run in release builds
    /// too, since `panic = "abort"` there makes a hit just as reproducible.
    pub debug: bool,
}

impl SolverOptions {
    crate fn num_workers(&self) -> usize {
        if self.single_thread {
            1
        } else {
            num_cpus::get()
        }
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            single_thread: false,
            dist_w: 1,
            heur_w: 2,
            max_time: None,
            debug: false,
        }
    }
}
