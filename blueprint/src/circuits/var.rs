//! This module implements cell references.
//!
//! A [`Var`] names a single cell of the table. Absolute references carry the
//! row the cell lives on; relative references carry an offset from the row a
//! gate is activated on and may only appear inside gate constraints.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The kind of column a cell lives in
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[strum(serialize_all = "snake_case")]
pub enum ColumnKind {
    Witness,
    PublicInput,
    Constant,
    Selector,
    /// Lookup argument columns. These are never addressed by cells, they
    /// only bound how many lookups a row may perform.
    Lookup,
}

/// A reference to one cell of the table.
/// Many references may alias the same cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Var {
    pub kind: ColumnKind,
    pub index: usize,
    pub row: i64,
    pub relative: bool,
}

impl Var {
    /// Absolute reference to a witness cell
    pub fn witness(index: usize, row: usize) -> Self {
        Self::absolute(ColumnKind::Witness, index, row)
    }

    /// Absolute reference to a public input cell
    pub fn public_input(index: usize, row: usize) -> Self {
        Self::absolute(ColumnKind::PublicInput, index, row)
    }

    /// Absolute reference to a constant cell
    pub fn constant(index: usize, row: usize) -> Self {
        Self::absolute(ColumnKind::Constant, index, row)
    }

    pub fn absolute(kind: ColumnKind, index: usize, row: usize) -> Self {
        Self {
            kind,
            index,
            row: row as i64,
            relative: false,
        }
    }

    /// Reference to a witness cell `offset` rows away from the gate's row
    pub fn witness_rel(index: usize, offset: i64) -> Self {
        Self {
            kind: ColumnKind::Witness,
            index,
            row: offset,
            relative: true,
        }
    }

    /// Resolves a relative reference against the row a gate is active on.
    /// Absolute references are returned as they are.
    pub fn at(self, anchor: usize) -> Self {
        if self.relative {
            Self {
                row: anchor as i64 + self.row,
                relative: false,
                ..self
            }
        } else {
            self
        }
    }

    /// The row of an absolute reference, if it lies inside the table
    pub fn absolute_row(&self) -> Option<usize> {
        if self.relative || self.row < 0 {
            None
        } else {
            Some(self.row as usize)
        }
    }
}
