//! The component library.

pub mod bit_composition;
pub mod comparison;
pub mod ec;
pub mod non_native;
pub mod pairing;
pub mod range_check;
