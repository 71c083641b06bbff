use crate::algorithms::Endpoints;
use crate::algorithms::KeepAll;
use crate::algorithms::SearchConfig;
use crate::algorithms::SearchRun;
use crate::algorithms::SkipExplored;
use crate::algorithms::Strategy;
use crate::algorithms::run;
use crate::data_structures::frontier::Frontier;
use crate::map::MapError;
use crate::map::StreetMap;

/// Expands nodes in the order they were generated.
///
/// Finds a route with the fewest Roads, regardless of their cost.
#[derive(Debug)]
pub struct BreadthFirstSearch<'m> {
    map: &'m StreetMap,
    endpoints: Endpoints<'m>,
    config: SearchConfig,
}

impl<'m> BreadthFirstSearch<'m> {
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
    /// With `duplicate_checking`, a Location is queued at most once.
    pub fn search(&self, duplicate_checking: bool) -> SearchRun {
        let map = self.map;
        let strategy = Strategy::BreadthFirst;
        let frontier = Frontier::with_capacity(256);
        if duplicate_checking {
            run::<_, SkipExplored>(map, &self.endpoints, &self.config, strategy, frontier)
        } else {
            run::<_, KeepAll>(map, &self.endpoints, &self.config, strategy, frontier)
        }
    }
}
