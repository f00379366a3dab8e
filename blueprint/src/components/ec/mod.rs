//! Elliptic curve point addition.
//!
//! [`incomplete_add`] adds points of a curve over a non-native base field,
//! with coordinates in chunked form. [`unified_addition`] adds points of a
//! curve over the native field in a single row, handling doubling and
//! opposite points.

pub mod incomplete_add;
pub mod unified_addition;

use crate::circuits::var::Var;

pub use incomplete_add::{IncompleteAdd, IncompleteAddInput};
pub use unified_addition::{UnifiedAddition, UnifiedAdditionInput, UnifiedAdditionOutput};

/// Affine point with chunked coordinates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointVars {
    pub x: Vec<Var>,
    pub y: Vec<Var>,
}
