use rand::Rng;

use crate::map::LocationId;
use crate::map::MapError;
use crate::map::StreetMap;
use crate::map::StreetMapBuilder;

/// The shape of a random grid of streets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Distance between neighbouring intersections.
    pub spacing: f64,
    /// Speeds are drawn uniformly from `min_speed..=max_speed`.
    pub min_speed: f64,
    pub max_speed: f64,
    /// Chance for a street to go only one way.
    pub one_way_probability: f64,
    /// `(latitude, longitude)` of `r0c0`.
    pub origin: (f64, f64),
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            spacing: 1.0,
            min_speed: 0.5,
            max_speed: 2.0,
            one_way_probability: 0.1,
            origin: (0.0, 0.0),
        }
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }
    #[must_use]
    pub fn with_speeds(mut self, min_speed: f64, max_speed: f64) -> Self {
        self.min_speed = min_speed;
        self.max_speed = max_speed;
        self
    }
    #[must_use]
    pub fn with_one_way_probability(mut self, p: f64) -> Self {
        self.one_way_probability = p;
        self
    }
    #[must_use]
    pub fn with_origin(mut self, latitude: f64, longitude: f64) -> Self {
        self.origin = (latitude, longitude);
        self
    }

    pub fn num_locations(&self) -> usize {
        self.rows * self.cols
    }
    /// Streets between orthogonal neighbours. Each is one or two Roads.
    pub fn num_streets(&self) -> usize {
        self.rows * self.cols.saturating_sub(1) + self.cols * self.rows.saturating_sub(1)
    }
}

/// Random street grids.
///
/// Intersection `(row, col)` is called `r{row}c{col}` and sits `spacing`
/// away from its neighbours. Every street costs `spacing / speed` for a
/// random speed, so the fastest street bounds the speed along any route.
pub struct GridMap;

impl GridMap {
    /// ```
    /// use route_search::maps::grid::GridMap;
    /// assert_eq!(GridMap::location_name(3, 14), "r3c14");
    /// ```
    pub fn location_name(row: usize, col: usize) -> String {
        format!("r{row}c{col}")
    }

    pub fn generate<R: Rng>(spec: &GridSpec, rng: &mut R) -> Result<StreetMap, MapError> {
        let mut b = StreetMapBuilder::with_capacity(spec.num_locations(), 2 * spec.num_streets());

        let mut ids: Vec<LocationId> = Vec::with_capacity(spec.num_locations());
        for row in 0..spec.rows {
            for col in 0..spec.cols {
                ids.push(b.add_location(
                    Self::location_name(row, col),
                    spec.origin.0 + row as f64 * spec.spacing,
                    spec.origin.1 + col as f64 * spec.spacing,
                )?);
            }
        }

        let (slow, fast) = if spec.min_speed <= spec.max_speed {
            (spec.min_speed, spec.max_speed)
        } else {
            (spec.max_speed, spec.min_speed)
        };
        let one_way = spec.one_way_probability.clamp(0.0, 1.0);
        let at = |row: usize, col: usize| ids[row * spec.cols + col];

        for row in 0..spec.rows {
            for col in 0..spec.cols {
                let here = at(row, col);
                let mut neighbours = Vec::with_capacity(2);
                if col + 1 < spec.cols {
                    neighbours.push(at(row, col + 1));
                }
                if row + 1 < spec.rows {
                    neighbours.push(at(row + 1, col));
                }

                for there in neighbours {
                    let speed = rng.random_range(slow..=fast);
                    let cost = spec.spacing / speed;
                    if rng.random_bool(one_way) {
                        if rng.random_bool(0.5) {
                            b.connect(here, there, cost)?;
                        } else {
                            b.connect(there, here, cost)?;
                        }
                    } else {
                        b.connect(here, there, cost)?;
                        b.connect(there, here, cost)?;
                    }
                }
            }
        }

        let map = b.build();
        log::debug!("Generated {map} from {spec:?}");
        Ok(map)
    }

    /// Picks two distinct intersections, `(initial, destination)`.
    pub fn random_endpoints<R: Rng>(spec: &GridSpec, rng: &mut R) -> Option<(String, String)> {
        let n = spec.num_locations();
        if n < 2 {
            return None;
        }
        let initial = rng.random_range(0..n);
        let destination = (initial + rng.random_range(1..n)) % n;
        Some((
            Self::location_name(initial / spec.cols, initial % spec.cols),
            Self::location_name(destination / spec.cols, destination % spec.cols),
        ))
    }
}
