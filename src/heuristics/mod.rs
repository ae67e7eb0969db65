//! Heuristics module.
//!
//! Starting-city selection and greedy tour construction.

pub mod construction;
pub mod start;

pub use construction::*;
pub use start::*;
