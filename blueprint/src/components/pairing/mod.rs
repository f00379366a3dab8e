//! Final exponentiation of BLS12 pairings, over the curve's base field as
//! the native field.
//!
//! Elements of `F_p^12` are handled through their coordinates over `F_p`,
//! so the components are generic over any degree-12 extension type of the
//! native field.

pub mod exponentiation;
pub mod fp12;
pub mod power;

use crate::{
    circuits::var::Var,
    error::{ComponentError, Result},
};
use fp12::FP12_DEGREE;

pub use exponentiation::FinalExponentiation;
pub use fp12::{Fp12Op, Fp12Slots};
pub use power::FixedPower;

/// `|t|` for BLS12-381, whose curve parameter is `t = -0xD201000000010000`
pub const BLS12_381_X: u64 = 0xD201_0000_0001_0000;

/// The 12 coordinates of an `F_p^12` element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fp12Input {
    pub x: Vec<Var>,
}

impl Fp12Input {
    pub(crate) fn check(&self) -> Result<()> {
        if self.x.len() == FP12_DEGREE {
            Ok(())
        } else {
            Err(ComponentError::InvalidParameters(format!(
                "expected {FP12_DEGREE} coordinates, got {}",
                self.x.len()
            )))
        }
    }
}
