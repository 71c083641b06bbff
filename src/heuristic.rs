//! Heuristics estimating the remaining travel time to a fixed destination.
use std::fmt::Debug;

use num_traits::Zero;
use thiserror::Error;

use crate::cost::TravelCost;
use crate::map::LocationId;
use crate::map::StreetMap;
use crate::search::SearchTreeNode;

/// An estimate of the remaining cost from a node to a fixed destination.
///
/// Admissible heuristics never overestimate the true remaining cost.
pub trait Heuristic: Debug {
    fn destination(&self) -> LocationId;

    fn estimate_at(&self, location: LocationId) -> TravelCost;

    fn heuristic_value(&self, node: &SearchTreeNode) -> TravelCost {
        self.estimate_at(node.location())
    }
}

impl<H: Heuristic + ?Sized> Heuristic for &H {
    fn destination(&self) -> LocationId {
        (**self).destination()
    }
    fn estimate_at(&self, location: LocationId) -> TravelCost {
        (**self).estimate_at(location)
    }
}

/// The blind heuristic, `h = 0` everywhere.
#[derive(Copy, Clone, Debug)]
pub struct NullHeuristic {
    destination: LocationId,
}

impl NullHeuristic {
    pub fn new(destination: LocationId) -> Self {
        Self { destination }
    }
}

impl Heuristic for NullHeuristic {
    fn destination(&self) -> LocationId {
        self.destination
    }
    fn estimate_at(&self, _location: LocationId) -> TravelCost {
        TravelCost::zero()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum HeuristicError {
    #[error("Can't bound velocity on a map without roads")]
    NoRoads,
    #[error("Every road has zero length, the velocity bound is zero")]
    ZeroVelocity,
    #[error("Unknown destination {0}")]
    UnknownDestination(LocationId),
}

/// Straight-line distance over the fastest speed found anywhere on the map.
///
/// No path can travel faster than the map's fastest road, so the travel time
/// along any path is at least `distance / velocity`, making this admissible.
#[derive(Clone)]
pub struct MaxVelocityHeuristic<'m> {
    map: &'m StreetMap,
    destination: LocationId,
    velocity: f64,
}

impl<'m> MaxVelocityHeuristic<'m> {
    pub fn new(map: &'m StreetMap, destination: LocationId) -> Result<Self, HeuristicError> {
        if map.location(destination).is_none() {
            return Err(HeuristicError::UnknownDestination(destination));
        }
        let velocity = Self::max_velocity(map)?;
        log::debug!("Velocity bound for {map}: {velocity}");
        Ok(Self {
            map,
            destination,
            velocity,
        })
    }

    /// The fastest speed over every Road, `distance / cost`.
    ///
    /// A free Road with positive length makes the bound infinite. Free Roads
    /// of zero length say nothing about speed and are skipped.
    pub fn max_velocity(map: &StreetMap) -> Result<f64, HeuristicError> {
        if map.num_roads() == 0 {
            return Err(HeuristicError::NoRoads);
        }

        let mut velocity = 0.0f64;
        for (_, road) in map.roads() {
            let distance = map[road.from()].euclidean_distance(&map[road.to()]);
            let cost = road.cost().as_f64();
            let v = if cost > 0.0 {
                distance / cost
            } else if distance > 0.0 {
                f64::INFINITY
            } else {
                continue;
            };
            velocity = velocity.max(v);
        }

        if velocity > 0.0 {
            Ok(velocity)
        } else {
            Err(HeuristicError::ZeroVelocity)
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

impl Heuristic for MaxVelocityHeuristic<'_> {
    fn destination(&self) -> LocationId {
        self.destination
    }

    fn estimate_at(&self, location: LocationId) -> TravelCost {
        let distance = self.map[location].euclidean_distance(&self.map[self.destination]);
        if distance == 0.0 {
            // Also covers an infinite velocity at the destination itself.
            return TravelCost::zero();
        }
        TravelCost::new(distance / self.velocity)
    }
}

impl std::fmt::Debug for MaxVelocityHeuristic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "MaxVelocityHeuristic({}, v={})",
            self.map[self.destination].name(),
            self.velocity
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::maps::grid::GridMap;
    use crate::maps::grid::GridSpec;

    /// Shortest travel times towards `destination` by relaxing every Road
    /// until nothing improves.
    fn costs_to(map: &StreetMap, destination: LocationId) -> Vec<f64> {
        let mut best = vec![f64::INFINITY; map.len()];
        best[destination.as_usize()] = 0.0;
        loop {
            let mut changed = false;
            for (_, road) in map.roads() {
                let through = road.cost().as_f64() + best[road.to().as_usize()];
                if through < best[road.from().as_usize()] {
                    best[road.from().as_usize()] = through;
                    changed = true;
                }
            }
            if !changed {
                return best;
            }
        }
    }

    fn line() -> StreetMap {
        let mut b = StreetMap::builder();
        b.add_location("A", 0.0, 0.0).unwrap();
        b.add_location("B", 0.0, 2.0).unwrap();
        b.add_location("C", 0.0, 3.0).unwrap();
        b.add_road("A", "B", 4.0).unwrap();
        b.add_road("B", "C", 0.5).unwrap();
        b.build()
    }

    #[test]
    fn velocity_is_the_fastest_road() {
        let map = line();
        assert_eq!(MaxVelocityHeuristic::max_velocity(&map), Ok(2.0));

        let c = map.find_location("C").unwrap();
        let h = MaxVelocityHeuristic::new(&map, c).unwrap();
        let a = map.find_location("A").unwrap();
        assert_eq!(h.estimate_at(a), TravelCost::new(1.5));
        assert_eq!(h.estimate_at(c), TravelCost::zero());
    }

    #[test]
    fn heuristic_value_reads_the_node_location() {
        use crate::search::SearchTree;

        let map = line();
        let c = map.find_location("C").unwrap();
        let h = MaxVelocityHeuristic::new(&map, c).unwrap();
        let mut tree = SearchTree::new();
        let root = tree.push_root(map.find_location("A").unwrap());
        let b = tree.expand(&map, root)[0];
        assert_eq!(h.heuristic_value(&tree[root]), TravelCost::new(1.5));
        assert_eq!(h.heuristic_value(&tree[b]), TravelCost::new(0.5));
    }

    #[test]
    fn no_roads_is_a_configuration_error() {
        let mut b = StreetMap::builder();
        let a = b.add_location("A", 0.0, 0.0).unwrap();
        let map = b.build();
        assert_eq!(
            MaxVelocityHeuristic::new(&map, a).unwrap_err(),
            HeuristicError::NoRoads
        );
    }

    #[test]
    fn zero_length_roads_are_a_configuration_error() {
        let mut b = StreetMap::builder();
        let a = b.add_location("A", 1.0, 1.0).unwrap();
        b.add_location("B", 1.0, 1.0).unwrap();
        b.add_road("A", "B", 3.0).unwrap();
        b.add_road("B", "A", 0.0).unwrap();
        let map = b.build();
        assert_eq!(
            MaxVelocityHeuristic::new(&map, a).unwrap_err(),
            HeuristicError::ZeroVelocity
        );
    }

    #[test]
    fn free_roads_make_the_estimate_zero() {
        let mut b = StreetMap::builder();
        b.add_location("A", 0.0, 0.0).unwrap();
        let z = b.add_location("Z", 5.0, 5.0).unwrap();
        b.add_road("A", "Z", 0.0).unwrap();
        let map = b.build();
        let h = MaxVelocityHeuristic::new(&map, z).unwrap();
        assert!(h.velocity().is_infinite());
        let a = map.find_location("A").unwrap();
        assert!(h.estimate_at(a).is_zero());
    }

    #[test]
    fn null_heuristic() {
        let map = line();
        let c = map.find_location("C").unwrap();
        let h = NullHeuristic::new(c);
        assert_eq!(h.destination(), c);
        for (id, _) in map.locations() {
            assert!(h.estimate_at(id).is_zero());
        }
    }

    #[test]
    fn admissible_on_random_grids() {
        for seed in 0..8u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = GridMap::generate(&GridSpec::new(6, 7), &mut rng).unwrap();
            let (destination, _) = map
                .locations()
                .nth(rng.random_range(0..map.len()))
                .unwrap();
            let h = MaxVelocityHeuristic::new(&map, destination).unwrap();
            let truth = costs_to(&map, destination);

            for (id, location) in map.locations() {
                let estimate = h.estimate_at(id).as_f64();
                let true_cost = truth[id.as_usize()];
                assert!(estimate >= 0.0);
                assert!(
                    estimate <= true_cost + 1e-9,
                    "seed {seed}: h({}) = {estimate} > {true_cost}",
                    location.name()
                );
            }
        }
    }
}
