//! Multi-start nearest-neighbor TSP solver library
//!
//! A time-bounded, multi-threaded heuristic for the Traveling Salesman Problem.
//! A fixed pool of workers repeatedly builds greedy nearest-neighbor tours and
//! offers them to a single, lock-guarded incumbent until the wall-clock budget
//! runs out.
//!
//! # Features
//!
//! - CSV distance matrix and coordinate parsing with strict shape checks
//! - Densest-neighbourhood starting-city selection
//! - Greedy nearest-neighbor construction with optional randomized tie-breaking
//!   and top-k perturbation
//! - Shared incumbent with consistent compare-and-copy updates
//! - Thread-count benchmarking and SVG visualization tools
//!
//! # Example
//!
//! ```no_run
//! use nn_tsp_solver::instance::TspInstance;
//! use nn_tsp_solver::search::{Diversification, MultiStartSearch, SearchConfig};
//!
//! // Load instance
//! let instance = TspInstance::from_csv_file("DistanceMatrix1000_v2.csv").unwrap();
//!
//! // Search for ten seconds on four workers
//! let config = SearchConfig {
//!     threads: 4,
//!     time_limit: 10.0,
//!     diversification: Diversification::StartOffset,
//!     ..Default::default()
//! };
//! let outcome = MultiStartSearch::new(config).run(&instance).unwrap();
//!
//! println!("Tour cost: {}", outcome.best.cost);
//! ```

pub mod benchmark;
pub mod error;
pub mod heuristics;
pub mod incumbent;
pub mod instance;
pub mod search;
pub mod tour;
pub mod visualization;

pub use error::{Result, SolverError};
pub use instance::TspInstance;
pub use search::{MultiStartSearch, SearchConfig, SearchOutcome};
pub use tour::Tour;
