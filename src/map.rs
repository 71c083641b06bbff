//! Street maps.
//!
//! A `StreetMap` is an immutable set of named `Location`s connected by
//! directed `Road`s with nonnegative travel-time costs. Maps are put together
//! with a `StreetMapBuilder` and are read-only afterwards, so any number of
//! searches may borrow the same map.
use derive_more::Display;
use rustc_hash::FxHashMap;
use thiserror::Error;
use thousands::Separable;

use crate::cost::TravelCost;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
#[display("LocationId({_0})")]
pub struct LocationId(u32);

impl LocationId {
    #[inline(always)]
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
#[display("RoadId({_0})")]
pub struct RoadId(u32);

impl RoadId {
    #[inline(always)]
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Display, PartialEq)]
#[display("{name}@({latitude},{longitude})")]
pub struct Location {
    name: String,
    latitude: f64,
    longitude: f64,
    /// Outgoing roads, in declaration order.
    roads: Vec<RoadId>,
}

impl Location {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
    pub fn roads(&self) -> &[RoadId] {
        &self.roads
    }

    /// Straight-line distance in coordinate space.
    ///
    /// ```
    /// use route_search::map::StreetMap;
    ///
    /// let mut builder = StreetMap::builder();
    /// let a = builder.add_location("a", 0.0, 0.0).unwrap();
    /// let b = builder.add_location("b", 3.0, 4.0).unwrap();
    /// let map = builder.build();
    /// assert_eq!(map[a].euclidean_distance(&map[b]), 5.0);
    /// ```
    pub fn euclidean_distance(&self, other: &Location) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq)]
#[display("Road({from}->{to}, {cost})")]
pub struct Road {
    from: LocationId,
    to: LocationId,
    cost: TravelCost,
}

impl Road {
    pub fn from(&self) -> LocationId {
        self.from
    }
    pub fn to(&self) -> LocationId {
        self.to
    }
    pub fn cost(&self) -> TravelCost {
        self.cost
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("Location '{0}' not found")]
    LocationNotFound(String),
    #[error("Unknown location {0}")]
    UnknownLocationId(LocationId),
    #[error("Location '{0}' is already defined")]
    DuplicateLocation(String),
    #[error("Location '{name}' has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        name: String,
        latitude: f64,
        longitude: f64,
    },
    #[error("Road '{from}' -> '{to}' has invalid cost {cost}")]
    InvalidRoadCost { from: String, to: String, cost: f64 },
}

#[derive(Clone)]
pub struct StreetMap {
    locations: Vec<Location>,
    roads: Vec<Road>,
    by_name: FxHashMap<String, LocationId>,
}

impl StreetMap {
    pub fn builder() -> StreetMapBuilder {
        StreetMapBuilder::default()
    }

    /// Finds a Location by its name.
    pub fn find_location(&self, name: &str) -> Result<LocationId, MapError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MapError::LocationNotFound(name.to_string()))
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.as_usize())
    }
    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.as_usize())
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(i, l)| (LocationId(i as u32), l))
    }
    pub fn roads(&self) -> impl Iterator<Item = (RoadId, &Road)> {
        self.roads
            .iter()
            .enumerate()
            .map(|(i, r)| (RoadId(i as u32), r))
    }
    /// Roads leaving `id`, in declaration order.
    pub fn outgoing(&self, id: LocationId) -> impl Iterator<Item = (RoadId, &Road)> {
        self[id].roads.iter().map(|&r| (r, &self[r]))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
    pub fn num_roads(&self) -> usize {
        self.roads.len()
    }
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl std::ops::Index<LocationId> for StreetMap {
    type Output = Location;

    #[inline(always)]
    fn index(&self, id: LocationId) -> &Self::Output {
        &self.locations[id.as_usize()]
    }
}

impl std::ops::Index<RoadId> for StreetMap {
    type Output = Road;

    #[inline(always)]
    fn index(&self, id: RoadId) -> &Self::Output {
        &self.roads[id.as_usize()]
    }
}

impl std::fmt::Display for StreetMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "StreetMap({} locations; {} roads)",
            self.len().separate_with_commas(),
            self.num_roads().separate_with_commas(),
        )
    }
}

impl std::fmt::Debug for StreetMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Puts together a `StreetMap`, validating every Location and Road.
#[derive(Debug, Default)]
pub struct StreetMapBuilder {
    locations: Vec<Location>,
    roads: Vec<Road>,
    by_name: FxHashMap<String, LocationId>,
}

impl StreetMapBuilder {
    pub fn with_capacity(locations: usize, roads: usize) -> Self {
        Self {
            locations: Vec::with_capacity(locations),
            roads: Vec::with_capacity(roads),
            by_name: FxHashMap::with_capacity_and_hasher(locations, Default::default()),
        }
    }

    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationId, MapError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(MapError::DuplicateLocation(name));
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(MapError::InvalidCoordinates {
                name,
                latitude,
                longitude,
            });
        }

        let id = LocationId(self.locations.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.locations.push(Location {
            name,
            latitude,
            longitude,
            roads: vec![],
        });
        Ok(id)
    }

    /// Adds a Road between two named Locations.
    pub fn add_road(&mut self, from: &str, to: &str, cost: f64) -> Result<RoadId, MapError> {
        let from = self.find_location(from)?;
        let to = self.find_location(to)?;
        self.connect(from, to, cost)
    }

    /// Adds a Road between two known Locations.
    pub fn connect(
        &mut self,
        from: LocationId,
        to: LocationId,
        cost: f64,
    ) -> Result<RoadId, MapError> {
        if from.as_usize() >= self.locations.len() {
            return Err(MapError::UnknownLocationId(from));
        }
        if to.as_usize() >= self.locations.len() {
            return Err(MapError::UnknownLocationId(to));
        }
        let cost = TravelCost::checked(cost).ok_or_else(|| MapError::InvalidRoadCost {
            from: self.locations[from.as_usize()].name.clone(),
            to: self.locations[to.as_usize()].name.clone(),
            cost,
        })?;

        let id = RoadId(self.roads.len() as u32);
        self.roads.push(Road { from, to, cost });
        self.locations[from.as_usize()].roads.push(id);
        Ok(id)
    }

    pub fn find_location(&self, name: &str) -> Result<LocationId, MapError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| MapError::LocationNotFound(name.to_string()))
    }

    pub fn build(self) -> StreetMap {
        StreetMap {
            locations: self.locations,
            roads: self.roads,
            by_name: self.by_name,
        }
    }
}
