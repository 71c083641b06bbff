//! Travel-time costs.
//!
//! Road costs, accumulated path costs (g), heuristic estimates (h) and their
//! sum (f) all share this scalar so they can be compared and ranked directly.

use derive_more::Display;
use num_traits::Zero;
use ordered_float::OrderedFloat;

/// A totally ordered, non-NaN travel time.
#[derive(Copy, Clone, Default, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[display("${_0}")]
pub struct TravelCost(pub OrderedFloat<f64>);

impl TravelCost {
    #[inline(always)]
    pub fn new(f: f64) -> Self {
        Self(OrderedFloat(f))
    }

    /// A cost usable on a road: finite and nonnegative.
    ///
    /// ```
    /// use route_search::cost::TravelCost;
    /// assert!(TravelCost::checked(1.5).is_some());
    /// assert!(TravelCost::checked(0.0).is_some());
    /// assert!(TravelCost::checked(-1.0).is_none());
    /// assert!(TravelCost::checked(f64::NAN).is_none());
    /// assert!(TravelCost::checked(f64::INFINITY).is_none());
    /// ```
    pub fn checked(f: f64) -> Option<Self> {
        (f.is_finite() && f >= 0.0).then(|| Self::new(f))
    }

    #[inline(always)]
    pub fn infinity() -> Self {
        Self(OrderedFloat(f64::INFINITY))
    }

    #[inline(always)]
    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }

    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl std::ops::Add for TravelCost {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl std::ops::Sub for TravelCost {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl std::ops::AddAssign for TravelCost {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl std::iter::Sum for TravelCost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, c| acc + c)
    }
}

impl Zero for TravelCost {
    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.0 == OrderedFloat(0.0)
    }
    #[inline(always)]
    fn zero() -> Self {
        Self(OrderedFloat(0.0))
    }
}

impl From<f64> for TravelCost {
    fn from(f: f64) -> Self {
        Self::new(f)
    }
}
