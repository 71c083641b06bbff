use crate::algorithms::Endpoints;
use crate::algorithms::KeepAll;
use crate::algorithms::SearchConfig;
use crate::algorithms::SearchError;
use crate::algorithms::SearchRun;
use crate::algorithms::SkipExplored;
use crate::algorithms::Strategy;
use crate::algorithms::run;
use crate::data_structures::sorted_frontier::ByHeuristic;
use crate::data_structures::sorted_frontier::SortedFrontier;
use crate::heuristic::Heuristic;
use crate::heuristic::MaxVelocityHeuristic;
use crate::map::StreetMap;

/// Greedy best-first search.
///
/// Always expands the node that looks closest to the destination, ignoring
/// what it cost to get there. Fast, but the route found may be far from the
/// cheapest.
#[derive(Debug)]
pub struct GreedySearch<'m, H: Heuristic = MaxVelocityHeuristic<'m>> {
    map: &'m StreetMap,
    endpoints: Endpoints<'m>,
    heuristic: H,
    config: SearchConfig,
}

impl<'m> GreedySearch<'m> {
    /// Guided by the map's `MaxVelocityHeuristic`.
    ///
    /// The velocity bound is computed here, before any search runs. A map
    /// without usable roads fails with `HeuristicError` even when `initial`
    /// and `destination` coincide. Use `with_heuristic` and a
    /// `NullHeuristic` to search such maps.
    pub fn new(
        map: &'m StreetMap,
        initial: &'m str,
        destination: &'m str,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        let endpoints = Endpoints::resolve(map, initial, destination)?;
        let heuristic = MaxVelocityHeuristic::new(map, endpoints.destination)?;
        Ok(Self {
            map,
            endpoints,
            heuristic,
            config,
        })
    }
}

impl<'m, H: Heuristic> GreedySearch<'m, H> {
    pub fn with_heuristic(
        map: &'m StreetMap,
        initial: &'m str,
        destination: &'m str,
        heuristic: H,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        let endpoints = Endpoints::resolve(map, initial, destination)?;
        if heuristic.destination() != endpoints.destination {
            return Err(SearchError::HeuristicDestination {
                expected: destination.to_string(),
                found: map
                    .location(heuristic.destination())
                    .map_or_else(|| heuristic.destination().to_string(), |l| l.name().to_string()),
            });
        }
        Ok(Self {
            map,
            endpoints,
            heuristic,
            config,
        })
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs a fresh search.
    ///
    /// With `duplicate_checking`, a Location is queued at most once.
    pub fn search(&self, duplicate_checking: bool) -> SearchRun {
        let map = self.map;
        let strategy = Strategy::Greedy;
        let frontier = SortedFrontier::new(ByHeuristic(&self.heuristic));
        if duplicate_checking {
            run::<_, SkipExplored>(map, &self.endpoints, &self.config, strategy, frontier)
        } else {
            run::<_, KeepAll>(map, &self.endpoints, &self.config, strategy, frontier)
        }
    }
}
