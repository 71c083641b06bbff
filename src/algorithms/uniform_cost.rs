use crate::algorithms::Endpoints;
use crate::algorithms::KeepAll;
use crate::algorithms::ReplaceCheaper;
use crate::algorithms::SearchConfig;
use crate::algorithms::SearchRun;
use crate::algorithms::Strategy;
use crate::algorithms::run;
use crate::data_structures::sorted_frontier::ByPathCost;
use crate::data_structures::sorted_frontier::SortedFrontier;
use crate::map::MapError;
use crate::map::StreetMap;

/// Expands nodes in increasing path cost, finding the cheapest route.
#[derive(Debug)]
pub struct UniformCostSearch<'m> {
    map: &'m StreetMap,
    endpoints: Endpoints<'m>,
    config: SearchConfig,
}

impl<'m> UniformCostSearch<'m> {
    pub fn new(
        map: &'m StreetMap,
        initial: &'m str,
        destination: &'m str,
        config: SearchConfig,
    ) -> Result<Self, MapError> {
        Ok(Self {
            map,
            endpoints: Endpoints::resolve(map, initial, destination)?,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs a fresh search.
    ///
    /// With `duplicate_checking`, a Location is queued at most once, and a
    /// cheaper way to a queued Location replaces the queued node.
    pub fn search(&self, duplicate_checking: bool) -> SearchRun {
        let map = self.map;
        let strategy = Strategy::UniformCost;
        let frontier = SortedFrontier::new(ByPathCost);
        if duplicate_checking {
            run::<_, ReplaceCheaper>(map, &self.endpoints, &self.config, strategy, frontier)
        } else {
            run::<_, KeepAll>(map, &self.endpoints, &self.config, strategy, frontier)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::algorithms::BreadthFirstSearch;
    use crate::algorithms::GreedySearch;
    use crate::algorithms::DuplicatePolicy;
    use crate::algorithms::SearchOutcome;
    use crate::algorithms::greedy::tests::detour;
    use crate::algorithms::tests::diamond;
    use crate::map::LocationId;
    use crate::maps::grid::GridMap;
    use crate::maps::grid::GridSpec;

    /// Cheapest cost from `start` to every Location, relaxing Roads until
    /// nothing improves. `unit` counts Roads instead of their cost.
    fn costs_from(map: &StreetMap, start: LocationId, unit: bool) -> Vec<f64> {
        let mut best = vec![f64::INFINITY; map.len()];
        best[start.as_usize()] = 0.0;
        loop {
            let mut changed = false;
            for (_, road) in map.roads() {
                let cost = if unit { 1.0 } else { road.cost().as_f64() };
                let through = best[road.from().as_usize()] + cost;
                if through < best[road.to().as_usize()] {
                    best[road.to().as_usize()] = through;
                    changed = true;
                }
            }
            if !changed {
                return best;
            }
        }
    }

    #[test]
    fn diamond_either_order() {
        for b_first in [true, false] {
            let map = diamond(b_first);
            let ucs = UniformCostSearch::new(&map, "A", "D", SearchConfig::default()).unwrap();
            for duplicate_checking in [true, false] {
                let route = ucs.search(duplicate_checking).route().unwrap();
                assert_eq!(route.names(&map), vec!["A", "B", "D"]);
                assert_eq!(route.cost.as_f64(), 4.0);
            }
        }
    }

    #[test]
    fn cheaper_duplicates_replace_queued_nodes() {
        let mut b = StreetMap::builder();
        for name in ["S", "X", "G"] {
            b.add_location(name, 0.0, 0.0).unwrap();
        }
        b.add_road("S", "G", 10.0).unwrap();
        b.add_road("S", "X", 1.0).unwrap();
        b.add_road("X", "G", 2.0).unwrap();
        let map = b.build();

        let run = UniformCostSearch::new(&map, "S", "G", SearchConfig::default())
            .unwrap()
            .search(true);
        assert_eq!(run.policy(), DuplicatePolicy::ReplaceCheaper);
        let route = run.route().unwrap();
        assert_eq!(route.names(&map), vec!["S", "X", "G"]);
        assert_eq!(route.cost.as_f64(), 3.0);
        assert_eq!(run.expansion_count(), 2);
        // The replaced node stays in the tree.
        assert_eq!(run.nodes_generated(), 4);
    }

    #[test]
    fn explored_duplicates_are_dropped() {
        let mut b = StreetMap::builder();
        for name in ["S", "X", "G"] {
            b.add_location(name, 0.0, 0.0).unwrap();
        }
        b.add_road("S", "X", 1.0).unwrap();
        b.add_road("X", "S", 1.0).unwrap();
        b.add_road("X", "G", 5.0).unwrap();
        let map = b.build();

        let run = UniformCostSearch::new(&map, "S", "G", SearchConfig::default())
            .unwrap()
            .search(true);
        assert!(run.is_solved());
        assert_eq!(run.peak_frontier(), 1);
    }

    #[test]
    fn cheaper_than_greedy() {
        let map = detour();
        let ucs = UniformCostSearch::new(&map, "S", "D", SearchConfig::default())
            .unwrap()
            .search(true);
        let route = ucs.route().unwrap();
        assert_eq!(route.names(&map), vec!["S", "M2", "D"]);
        assert_eq!(route.cost.as_f64(), 2.0);

        let greedy = GreedySearch::new(&map, "S", "D", SearchConfig::default())
            .unwrap()
            .search(true);
        assert!(greedy.route().unwrap().cost > route.cost);
    }

    #[test]
    fn repeated_searches_agree() {
        let map = detour();
        let ucs = UniformCostSearch::new(&map, "S", "D", SearchConfig::default()).unwrap();
        let first = ucs.search(true);
        let second = ucs.search(true);
        assert_eq!(first.outcome(), second.outcome());
        assert_eq!(first.expansion_count(), second.expansion_count());
        assert_eq!(first.route(), second.route());
    }

    #[test]
    fn depth_limit() {
        let map = detour();
        for (limit, outcome) in [
            (1, SearchOutcome::DepthBounded),
            (2, SearchOutcome::DepthBounded),
        ] {
            let config = SearchConfig::default().with_depth_limit(limit);
            let run = UniformCostSearch::new(&map, "S", "D", config)
                .unwrap()
                .search(true);
            assert_eq!(run.outcome(), outcome, "limit {limit}");
        }
        let config = SearchConfig::default().with_depth_limit(3);
        let run = UniformCostSearch::new(&map, "S", "D", config)
            .unwrap()
            .search(true);
        assert_eq!(run.route().unwrap().cost.as_f64(), 2.0);
    }

    #[test]
    fn write_stats() {
        let map = detour();
        let run = UniformCostSearch::new(&map, "S", "D", SearchConfig::default())
            .unwrap()
            .search(true);
        let mut out = Vec::new();
        run.write_stats(&mut out).unwrap();
        let stats = String::from_utf8(out).unwrap();
        assert!(stats.starts_with("uniform-cost search stats (replace-cheaper):"));
        assert!(stats.contains("Expansions:  2"));
    }

    #[test]
    fn random_grids() {
        for seed in 0..12u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let spec = GridSpec::new(6, 8);
            let map = GridMap::generate(&spec, &mut rng).unwrap();
            let initial = GridMap::location_name(0, 0);
            let destination = GridMap::location_name(
                rng.random_range(0..spec.rows),
                rng.random_range(0..spec.cols),
            );
            let start = map.find_location(&initial).unwrap();
            let end = map.find_location(&destination).unwrap();
            let cheapest = costs_from(&map, start, false)[end.as_usize()];
            let fewest = costs_from(&map, start, true)[end.as_usize()];

            let config = SearchConfig::default();
            let ucs = UniformCostSearch::new(&map, &initial, &destination, config)
                .unwrap()
                .search(true);
            let bfs = BreadthFirstSearch::new(&map, &initial, &destination, config)
                .unwrap()
                .search(true);
            let greedy = GreedySearch::new(&map, &initial, &destination, config)
                .unwrap()
                .search(true);

            if cheapest.is_infinite() {
                assert_eq!(ucs.outcome(), SearchOutcome::Exhausted, "seed {seed}");
                assert_eq!(bfs.outcome(), SearchOutcome::Exhausted, "seed {seed}");
                assert_eq!(greedy.outcome(), SearchOutcome::Exhausted, "seed {seed}");
                continue;
            }

            let ucs = ucs.route().unwrap();
            let bfs = bfs.route().unwrap();
            let greedy = greedy.route().unwrap();
            for route in [&ucs, &bfs, &greedy] {
                assert!(route.is_valid(&map), "seed {seed}");
                assert_eq!(route.start, start);
                assert_eq!(route.end, end);
            }
            assert!((ucs.cost.as_f64() - cheapest).abs() < 1e-9, "seed {seed}");
            assert_eq!(bfs.len() as f64, fewest, "seed {seed}");
            assert!(greedy.cost.as_f64() >= cheapest - 1e-9, "seed {seed}");
        }
    }
}
