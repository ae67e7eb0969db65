//! Time-bounded, multi-threaded multi-start search.
//!
//! A run is a sequence of rounds. In every round each worker of a fixed-size
//! pool performs one construction trial and offers its tour to the shared
//! incumbent. The wall clock is polled between batches of rounds, so a run
//! may overshoot its budget by at most one batch; at least one batch always
//! runs, so a run always reports a tour.

use crate::error::{Result, SolverError};
use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use crate::heuristics::start::{select_start, StartStrategy};
use crate::incumbent::SharedIncumbent;
use crate::instance::TspInstance;
use crate::tour::Tour;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How trials differ from one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diversification {
    /// Every trial rebuilds the same deterministic tour from the anchor city
    Fixed,
    /// Trial `t` starts at city `(anchor + t) mod N`
    StartOffset,
    /// Anchor city, ties between equally near cities broken at random
    RandomTieBreak,
    /// Anchor city, next city drawn from the `top_k` nearest
    Perturbed { top_k: usize },
}

impl Default for Diversification {
    fn default() -> Self {
        Diversification::Fixed
    }
}

impl std::fmt::Display for Diversification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diversification::Fixed => write!(f, "fixed"),
            Diversification::StartOffset => write!(f, "start-offset"),
            Diversification::RandomTieBreak => write!(f, "random-tie-break"),
            Diversification::Perturbed { top_k } => write!(f, "perturbed-top{}", top_k),
        }
    }
}

/// Search configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of worker threads (one trial per worker per round)
    pub threads: usize,
    /// Wall-clock budget in seconds
    pub time_limit: f64,
    /// Rounds run between two clock checks
    pub rounds_per_check: usize,
    /// Optional hard cap on the number of rounds
    pub max_rounds: Option<usize>,
    /// Anchor city selection
    pub start: StartStrategy,
    /// Per-trial diversification
    pub diversification: Diversification,
    /// Base random seed
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            time_limit: 60.0,
            rounds_per_check: 1,
            max_rounds: None,
            start: StartStrategy::Densest,
            diversification: Diversification::Fixed,
            seed: 42,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(SolverError::invalid_config("thread count must be positive"));
        }
        if !(self.time_limit.is_finite() && self.time_limit >= 0.0) {
            return Err(SolverError::invalid_config(format!(
                "time limit must be a non-negative number of seconds, got {}",
                self.time_limit
            )));
        }
        if self.rounds_per_check == 0 {
            return Err(SolverError::invalid_config("rounds per check must be positive"));
        }
        if self.max_rounds == Some(0) {
            return Err(SolverError::invalid_config("max rounds must be positive"));
        }
        if let Diversification::Perturbed { top_k } = self.diversification {
            if top_k == 0 {
                return Err(SolverError::invalid_config("top-k must be positive"));
            }
        }
        Ok(())
    }
}

/// Result of a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best: Tour,
    /// Anchor city chosen before the first round
    pub start_city: usize,
    pub rounds: usize,
    pub trials: usize,
    pub improvements: usize,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Best cost: {}", self.best.cost)?;
        writeln!(f, "  Start city: {}", self.start_city)?;
        writeln!(f, "  Rounds: {}", self.rounds)?;
        writeln!(f, "  Trials: {}", self.trials)?;
        writeln!(f, "  Improvements: {}", self.improvements)?;
        writeln!(f, "  Time: {:.4}s", self.elapsed_secs)
    }
}

/// Multi-start nearest-neighbor search driver
pub struct MultiStartSearch {
    config: SearchConfig,
}

impl MultiStartSearch {
    pub fn new(config: SearchConfig) -> Self {
        MultiStartSearch { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Heuristic and start city for global trial number `trial`.
    fn trial_setup(
        &self,
        anchor: usize,
        dimension: usize,
        trial: usize,
    ) -> (NearestNeighborHeuristic, usize) {
        let seed = self.config.seed.wrapping_add(trial as u64);
        match self.config.diversification {
            Diversification::Fixed => (NearestNeighborHeuristic::new(), anchor),
            Diversification::StartOffset => {
                (NearestNeighborHeuristic::new(), (anchor + trial) % dimension)
            }
            Diversification::RandomTieBreak => {
                (NearestNeighborHeuristic::random_tie_break(seed), anchor)
            }
            Diversification::Perturbed { top_k } => {
                (NearestNeighborHeuristic::randomized(seed, top_k), anchor)
            }
        }
    }

    /// One complete construction trial
    pub fn run_trial(&self, instance: &TspInstance, anchor: usize, trial: usize) -> Tour {
        let (heuristic, start) = self.trial_setup(anchor, instance.dimension, trial);
        heuristic.construct(instance, start)
    }

    /// Run the search until the time budget (or round cap) is exhausted.
    pub fn run(&self, instance: &TspInstance) -> Result<SearchOutcome> {
        self.config.validate()?;
        let threads = self.config.threads;
        let anchor = select_start(instance, self.config.start)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tsp-worker-{}", i))
            .build()?;

        log::info!(
            "searching {} cities with {} workers for {:.2}s (anchor {}, {})",
            instance.dimension,
            threads,
            self.config.time_limit,
            anchor,
            self.config.diversification
        );

        let incumbent = SharedIncumbent::new();
        let start = Instant::now();
        let mut rounds = 0usize;

        'search: loop {
            for _ in 0..self.config.rounds_per_check {
                let first_trial = rounds * threads;
                pool.broadcast(|ctx| {
                    let trial = first_trial + ctx.index();
                    let tour = self.run_trial(instance, anchor, trial);
                    if incumbent.try_update(&tour) {
                        log::debug!(
                            "trial {} (worker {}) improved incumbent to {}",
                            trial,
                            ctx.index(),
                            tour.cost
                        );
                    }
                });
                rounds += 1;

                if self.config.max_rounds.map_or(false, |max| rounds >= max) {
                    break 'search;
                }
            }

            if start.elapsed().as_secs_f64() >= self.config.time_limit {
                break;
            }
        }

        let elapsed_secs = start.elapsed().as_secs_f64();
        let improvements = incumbent.improvements();
        let best = incumbent
            .into_best()
            .ok_or_else(|| SolverError::invalid_config("search finished without any trial"))?;

        log::info!(
            "search finished after {} rounds ({} trials) in {:.3}s, best cost {}",
            rounds,
            rounds * threads,
            elapsed_secs,
            best.cost
        );

        Ok(SearchOutcome {
            best,
            start_city: anchor,
            rounds,
            trials: rounds * threads,
            improvements,
            elapsed_secs,
        })
    }
}
