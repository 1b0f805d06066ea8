//! Cost domain and relationship cost evaluators.
//!
//! The weighted searches are generic over any `Cost`: a totally ordered
//! value with an additive identity and an associative `add`. Costs must be
//! non-negative; negative costs give undefined results.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::model::{Direction, Relationship};
use crate::{Error, Result};

/// Capability set the weighted searches need from a cost type.
pub trait Cost: Clone + Debug + 'static {
    /// Additive identity; the cost of the empty path.
    fn zero() -> Self;

    /// Accumulate two costs.
    fn add(&self, other: &Self) -> Self;

    /// Total order used by the priority queue.
    fn compare(&self, other: &Self) -> Ordering;

    /// Whether two costs count as the same total when collecting equally
    /// cheap paths. Exact equality unless the type's arithmetic rounds.
    fn ties(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

/// Relative difference below which two `f64` costs are a tie.
///
/// Float addition is not associative, so one total summed in two orders
/// can differ in the last bits.
pub const F64_TIE_TOLERANCE: f64 = 1e-9;

impl Cost for f64 {
    fn zero() -> Self { 0.0 }
    fn add(&self, other: &Self) -> Self { self + other }
    fn compare(&self, other: &Self) -> Ordering { self.total_cmp(other) }

    fn ties(&self, other: &Self) -> bool {
        self == other || (self - other).abs() <= F64_TIE_TOLERANCE * self.abs().max(other.abs())
    }
}

macro_rules! integer_cost {
    ($($t:ty),*) => {$(
        impl Cost for $t {
            fn zero() -> Self { 0 }
            fn add(&self, other: &Self) -> Self { self.saturating_add(*other) }
            fn compare(&self, other: &Self) -> Ordering { self.cmp(other) }
        }
    )*};
}

integer_cost!(u32, u64, i64);

/// Cost of traversing one relationship.
///
/// `direction` is the way the relationship is walked, relative to the node
/// being expanded (`Incoming` means walking it from `dst` to `src`).
pub trait CostEvaluator<C> {
    fn cost(&self, rel: &Relationship, direction: Direction) -> Result<C>;
}

impl<C, F> CostEvaluator<C> for F
where
    F: Fn(&Relationship, Direction) -> C,
{
    fn cost(&self, rel: &Relationship, direction: Direction) -> Result<C> {
        Ok(self(rel, direction))
    }
}

/// Reads a numeric relationship property as an `f64` cost.
#[derive(Debug, Clone)]
pub struct PropertyCost {
    key: String,
    default: Option<f64>,
}

impl PropertyCost {
    /// Cost from property `key`; a missing value is an error.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), default: None }
    }

    /// Cost from property `key`, or `default` when it is absent.
    pub fn with_default(key: impl Into<String>, default: f64) -> Self {
        Self { key: key.into(), default: Some(default) }
    }
}

impl CostEvaluator<f64> for PropertyCost {
    fn cost(&self, rel: &Relationship, _direction: Direction) -> Result<f64> {
        rel.properties
            .get(&self.key)
            .and_then(|v| v.as_float())
            .or(self.default)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "relationship {} has no numeric property '{}'",
                    rel.id, self.key
                ))
            })
    }
}

/// Every relationship costs one: weighted search degenerates to hop count.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCost;

impl<C: Cost + From<u8>> CostEvaluator<C> for UnitCost {
    fn cost(&self, _rel: &Relationship, _direction: Direction) -> Result<C> {
        Ok(C::from(1))
    }
}
