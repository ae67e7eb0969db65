//! Starting-city selection.
//!
//! The anchor city for construction is the one sitting in the densest
//! neighbourhood: the city whose nearest other city is closest. This needs raw
//! coordinates; for a bare matrix the anchor falls back to city 0.

use crate::error::{Result, SolverError};
use crate::instance::{Point, TspInstance};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// How the anchor city is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartStrategy {
    /// Densest city when coordinates are known, city 0 otherwise
    Densest,
    /// A caller-chosen city
    Fixed(usize),
}

impl Default for StartStrategy {
    fn default() -> Self {
        StartStrategy::Densest
    }
}

/// Index of the city whose nearest neighbour is closest, using Euclidean distance.
///
/// Ties go to the lowest index. With fewer than two cities there is no
/// neighbour to measure, and city 0 is returned.
pub fn densest_city(points: &[Point]) -> usize {
    if points.len() < 2 {
        return 0;
    }

    let nearest_other = |i: usize| -> f64 {
        points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, p)| points[i].distance_to(p))
            .fold(f64::INFINITY, f64::min)
    };

    // min_by_key keeps the first of equal minima
    (0..points.len())
        .min_by_key(|&i| OrderedFloat(nearest_other(i)))
        .unwrap_or(0)
}

/// Resolve the anchor city for an instance.
pub fn select_start(instance: &TspInstance, strategy: StartStrategy) -> Result<usize> {
    match strategy {
        StartStrategy::Fixed(city) if city >= instance.dimension => {
            Err(SolverError::invalid_config(format!(
                "start city {} is out of range for {} cities",
                city, instance.dimension
            )))
        }
        StartStrategy::Fixed(city) => Ok(city),
        StartStrategy::Densest => match instance.coordinates() {
            Some(points) => {
                let city = densest_city(points);
                log::debug!("densest starting city is {}", city);
                Ok(city)
            }
            None => {
                log::debug!("no coordinates available, starting at city 0");
                Ok(0)
            }
        },
    }
}
