//! # Shared Incumbent
//!
//! The single best tour found so far, shared by every worker of a search run.
//!
//! The authoritative state lives behind a `Mutex`: comparing a candidate's
//! cost against the incumbent and copying its tour in happen as one unit, so
//! no thread ever observes a cost paired with a torn or foreign tour. An
//! `AtomicU64` mirrors the incumbent cost so that clearly worse candidates
//! are rejected without taking the lock.
//!
//! `u64::MAX` is the "no incumbent yet" sentinel.

use crate::tour::Tour;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Incumbent storage guarded by the lock.
#[derive(Debug)]
struct Incumbent {
    cost: u64,
    tour: Vec<usize>,
}

#[derive(Debug)]
pub struct SharedIncumbent {
    /// Mirror of `Incumbent::cost`, only ever written while the lock is held.
    upper_bound: AtomicU64,
    best: Mutex<Incumbent>,
    improvements: AtomicUsize,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SharedIncumbent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best_cost() {
            Some(cost) => write!(f, "Incumbent(cost: {})", cost),
            None => write!(f, "Incumbent(none)"),
        }
    }
}

impl SharedIncumbent {
    pub fn new() -> Self {
        SharedIncumbent {
            upper_bound: AtomicU64::new(u64::MAX),
            best: Mutex::new(Incumbent {
                cost: u64::MAX,
                tour: Vec::new(),
            }),
            improvements: AtomicUsize::new(0),
        }
    }

    /// The only value inside the lock is written by a single copy, so a
    /// poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Incumbent> {
        self.best.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cost of the incumbent, if one has been installed.
    #[inline]
    pub fn best_cost(&self) -> Option<u64> {
        match self.upper_bound.load(Ordering::Acquire) {
            u64::MAX => None,
            cost => Some(cost),
        }
    }

    /// Number of successful updates so far.
    pub fn improvements(&self) -> usize {
        self.improvements.load(Ordering::Relaxed)
    }

    /// Install `candidate` if it is strictly cheaper than the incumbent.
    ///
    /// Returns whether the update was applied. Equal or worse candidates leave
    /// the incumbent untouched.
    pub fn try_update(&self, candidate: &Tour) -> bool {
        // Cheap pre-check; the decision is made again under the lock.
        if candidate.cost >= self.upper_bound.load(Ordering::Acquire) {
            return false;
        }

        let mut best = self.lock();
        if candidate.cost >= best.cost {
            return false;
        }

        best.cost = candidate.cost;
        best.tour.clear();
        best.tour.extend_from_slice(&candidate.cities);
        self.upper_bound.store(candidate.cost, Ordering::Release);
        self.improvements.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// A consistent copy of the incumbent tour.
    pub fn snapshot(&self) -> Option<Tour> {
        let best = self.lock();
        if best.cost == u64::MAX {
            return None;
        }
        Some(Tour::new(best.tour.clone(), best.cost))
    }

    /// Consume the tracker and return the incumbent tour.
    pub fn into_best(self) -> Option<Tour> {
        let best = self.best.into_inner().unwrap_or_else(PoisonError::into_inner);
        if best.cost == u64::MAX {
            return None;
        }
        Some(Tour::new(best.tour, best.cost))
    }
}
