use crate::instance::TspInstance;
use crate::tour::Tour;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &TspInstance, start: usize) -> Tour;
    fn name(&self) -> &str;
}

/// Rule used when several unvisited cities are equally near
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Smallest city index wins
    LowestIndex,
    /// Uniform choice among the tied cities
    Random,
}

/// Nearest Neighbor Heuristic
///
/// Builds a tour by repeatedly moving to the nearest unvisited city, then
/// closes the cycle back to the start. The start city is never re-selected as
/// an intermediate stop; exactly one closing edge `last -> start` is counted.
///
/// With `top_k > 1` the next city is drawn uniformly from the `top_k` nearest
/// candidates instead, which perturbs restarts from the same anchor.
#[derive(Debug, Clone)]
pub struct NearestNeighborHeuristic {
    pub tie_break: TieBreak,
    pub top_k: usize,
    pub seed: u64,
}

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic {
            tie_break: TieBreak::LowestIndex,
            top_k: 1,
            seed: 42,
        }
    }

    pub fn random_tie_break(seed: u64) -> Self {
        NearestNeighborHeuristic {
            tie_break: TieBreak::Random,
            top_k: 1,
            seed,
        }
    }

    pub fn randomized(seed: u64, top_k: usize) -> Self {
        NearestNeighborHeuristic {
            tie_break: TieBreak::LowestIndex,
            top_k: top_k.max(1),
            seed,
        }
    }

    fn is_candidate(city: usize, start: usize, visited: &[bool]) -> bool {
        !visited[city] && city != start
    }

    fn find_nearest(
        &self,
        instance: &TspInstance,
        current: usize,
        start: usize,
        visited: &[bool],
        rng: &mut ChaCha8Rng,
    ) -> Option<usize> {
        if self.top_k > 1 {
            return self.pick_among_nearest(instance, current, start, visited, rng);
        }

        let mut best: Option<(usize, u64)> = None;
        let mut ties = 0u32;

        for (city, &d) in instance.row(current).iter().enumerate() {
            if !Self::is_candidate(city, start, visited) {
                continue;
            }
            match best {
                Some((_, best_d)) if d > best_d => {}
                Some((_, best_d)) if d == best_d => {
                    if self.tie_break == TieBreak::Random {
                        // reservoir sampling over the tied set
                        ties += 1;
                        if rng.gen_range(0..ties) == 0 {
                            best = Some((city, d));
                        }
                    }
                }
                _ => {
                    best = Some((city, d));
                    ties = 1;
                }
            }
        }

        best.map(|(city, _)| city)
    }

    fn pick_among_nearest(
        &self,
        instance: &TspInstance,
        current: usize,
        start: usize,
        visited: &[bool],
        rng: &mut ChaCha8Rng,
    ) -> Option<usize> {
        let mut candidates: Vec<(u64, usize)> = instance
            .row(current)
            .iter()
            .enumerate()
            .filter(|&(city, _)| Self::is_candidate(city, start, visited))
            .map(|(city, &d)| (d, city))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        if candidates.len() > self.top_k {
            candidates.select_nth_unstable(self.top_k - 1);
            candidates.truncate(self.top_k);
        }

        let idx = rng.gen_range(0..candidates.len());
        Some(candidates[idx].1)
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, instance: &TspInstance, start: usize) -> Tour {
        let n = instance.dimension;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut visited = vec![false; n];
        let mut cities = Vec::with_capacity(n);
        let mut cost = 0u64;

        let mut current = start;
        visited[start] = true;
        cities.push(start);

        for _ in 1..n {
            if let Some(next) = self.find_nearest(instance, current, start, &visited, &mut rng) {
                cost += instance.distance(current, next);
                visited[next] = true;
                cities.push(next);
                current = next;
            } else {
                break;
            }
        }

        cost += instance.distance(current, start);
        Tour::new(cities, cost)
    }

    fn name(&self) -> &str {
        match (self.tie_break, self.top_k) {
            (_, k) if k > 1 => "NearestNeighbor-Perturbed",
            (TieBreak::Random, _) => "NearestNeighbor-RandomTieBreak",
            (TieBreak::LowestIndex, _) => "NearestNeighbor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

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

    /// City 0 is equidistant from 1, 2 and 3.
    fn tied_instance() -> TspInstance {
        TspInstance::from_matrix(
            "tied",
            vec![
                vec![0, 5, 5, 5],
                vec![5, 0, 9, 9],
                vec![5, 9, 0, 9],
                vec![5, 9, 9, 0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_neighbor_reference_example() {
        let instance = four_city_instance();
        let tour = NearestNeighborHeuristic::new().construct(&instance, 0);

        assert_eq!(tour.cities, vec![0, 1, 3, 2]);
        assert_eq!(tour.cost, 80);
        assert_eq!(tour.to_string(), "0->1->3->2->0");
    }

    #[test]
    fn test_non_zero_start_closes_to_start() {
        let instance = four_city_instance();
        let tour = NearestNeighborHeuristic::new().construct(&instance, 2);

        // 2 -> 0 (15) -> 1 (10) -> 3 (25) -> 2 (30)
        assert_eq!(tour.cities, vec![2, 0, 1, 3]);
        assert_eq!(tour.cost, 80);
    }

    #[test]
    fn test_lowest_index_wins_ties() {
        let instance = tied_instance();
        let tour = NearestNeighborHeuristic::new().construct(&instance, 0);
        assert_eq!(tour.cities, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_random_tie_break_diversifies() {
        let instance = tied_instance();
        let seconds: HashSet<usize> = (0..64)
            .map(|seed| {
                NearestNeighborHeuristic::random_tie_break(seed)
                    .construct(&instance, 0)
                    .cities[1]
            })
            .collect();
        assert_eq!(seconds, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_same_seed_same_tour() {
        let instance = tied_instance();
        let a = NearestNeighborHeuristic::randomized(7, 3).construct(&instance, 0);
        let b = NearestNeighborHeuristic::randomized(7, 3).construct(&instance, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_city() {
        let instance = TspInstance::from_matrix("one", vec![vec![0]]).unwrap();
        let tour = NearestNeighborHeuristic::new().construct(&instance, 0);
        assert_eq!(tour.cities, vec![0]);
        assert_eq!(tour.cost, 0);
    }

    #[test]
    fn test_names() {
        assert_eq!(NearestNeighborHeuristic::new().name(), "NearestNeighbor");
        assert_eq!(
            NearestNeighborHeuristic::random_tie_break(1).name(),
            "NearestNeighbor-RandomTieBreak"
        );
        assert_eq!(
            NearestNeighborHeuristic::randomized(1, 3).name(),
            "NearestNeighbor-Perturbed"
        );
    }

    fn matrix_strategy() -> impl Strategy<Value = Vec<Vec<u64>>> {
        (1usize..12).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(0u64..100, n), n)
        })
    }

    proptest! {
        #[test]
        fn prop_tour_is_permutation_with_literal_cost(
            rows in matrix_strategy(),
            start_pick in any::<usize>(),
            seed in any::<u64>(),
        ) {
            let instance = TspInstance::from_matrix("prop", rows).unwrap();
            let start = start_pick % instance.dimension;

            let heuristics = [
                NearestNeighborHeuristic::new(),
                NearestNeighborHeuristic::random_tie_break(seed),
                NearestNeighborHeuristic::randomized(seed, 3),
            ];
            for heuristic in &heuristics {
                let tour = heuristic.construct(&instance, start);
                prop_assert!(tour.is_permutation(instance.dimension));
                prop_assert_eq!(tour.start(), Some(start));
                prop_assert_eq!(tour.cost, Tour::cost_of(&instance, &tour.cities));
            }
        }

        #[test]
        fn prop_each_step_is_nearest_remaining(rows in matrix_strategy()) {
            let instance = TspInstance::from_matrix("prop", rows).unwrap();
            let tour = NearestNeighborHeuristic::new().construct(&instance, 0);

            for i in 0..tour.len().saturating_sub(1) {
                let here = tour.cities[i];
                let chosen = tour.cities[i + 1];
                let d = instance.distance(here, chosen);
                for &later in &tour.cities[i + 2..] {
                    let other = instance.distance(here, later);
                    prop_assert!(d < other || (d == other && chosen < later));
                }
            }
        }
    }
}
