//! Tour representation and evaluation.

use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};

/// A closed tour: every city once, in visiting order, returning to `cities[0]`.
///
/// The return to the start is implicit: `cities` never repeats the start city,
/// but `cost` always includes the closing edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    /// Cities in visiting order, starting at the anchor city
    pub cities: Vec<usize>,
    /// Sum of all edges including the closing edge
    pub cost: u64,
}

impl Tour {
    pub fn new(cities: Vec<usize>, cost: u64) -> Self {
        Tour { cities, cost }
    }

    /// Build a tour from a visiting order, computing its cost.
    pub fn evaluate(instance: &TspInstance, cities: Vec<usize>) -> Self {
        let cost = Self::cost_of(instance, &cities);
        Tour { cities, cost }
    }

    /// Literal sum of consecutive edges plus the closing edge.
    pub fn cost_of(instance: &TspInstance, cities: &[usize]) -> u64 {
        match cities {
            [] => 0,
            [only] => instance.distance(*only, *only),
            [first, .., last] => {
                let path: u64 = cities
                    .windows(2)
                    .map(|w| instance.distance(w[0], w[1]))
                    .sum();
                path + instance.distance(*last, *first)
            }
        }
    }

    /// The anchor city
    pub fn start(&self) -> Option<usize> {
        self.cities.first().copied()
    }

    /// Number of cities in the tour
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Check that every city `0..n` appears exactly once
    pub fn is_permutation(&self, n: usize) -> bool {
        if self.cities.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &city in &self.cities {
            if city >= n || seen[city] {
                return false;
            }
            seen[city] = true;
        }
        true
    }

    /// Cities followed by the start again, i.e. the full cycle.
    pub fn closed_path(&self) -> impl Iterator<Item = usize> + '_ {
        self.cities.iter().copied().chain(self.start())
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, city) in self.closed_path().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{}", city)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_city_instance() -> TspInstance {
        TspInstance::from_matrix(
            "four",
            vec![
                vec![0, 10, 15, 20],
                vec![10, 0, 35, 25],
                vec![15, 35, 0, 30],
                vec![20, 25, 30, 0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cost_includes_closing_edge() {
        let instance = four_city_instance();
        let tour = Tour::evaluate(&instance, vec![0, 1, 3, 2]);
        assert_eq!(tour.cost, 10 + 25 + 30 + 15);
    }

    #[test]
    fn test_display_closes_the_cycle() {
        let tour = Tour::new(vec![0, 1, 3, 2], 80);
        assert_eq!(tour.to_string(), "0->1->3->2->0");
        assert_eq!(Tour::new(vec![5], 0).to_string(), "5->5");
        assert_eq!(Tour::new(Vec::new(), 0).to_string(), "");
    }

    #[test]
    fn test_is_permutation() {
        assert!(Tour::new(vec![2, 0, 1], 0).is_permutation(3));
        assert!(!Tour::new(vec![2, 2, 1], 0).is_permutation(3));
        assert!(!Tour::new(vec![0, 1], 0).is_permutation(3));
        assert!(!Tour::new(vec![0, 1, 3], 0).is_permutation(3));
    }

    #[test]
    fn test_single_city_tour() {
        let instance = TspInstance::from_matrix("one", vec![vec![0]]).unwrap();
        let tour = Tour::evaluate(&instance, vec![0]);
        assert_eq!(tour.cost, 0);
        assert_eq!(tour.start(), Some(0));
    }
}
