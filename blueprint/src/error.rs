//! This module implements the [`ComponentError`] and [`CircuitError`] types.

use crate::circuits::var::{ColumnKind, Var};
use thiserror::Error;

/// Errors that can arise when configuring or laying out a component
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("not enough {kind} columns (required: {required}, available: {available})")]
    InsufficientColumns {
        kind: ColumnKind,
        required: usize,
        available: usize,
    },

    #[error("the component cannot be laid out on {0} witness columns")]
    UnsupportedWitnessAmount(usize),

    #[error("{bits} bits do not fit below the native modulus ({capacity} bits)")]
    BitsExceedFieldCapacity { bits: usize, capacity: usize },

    #[error("unsupported mode: {0}")]
    UnsupportedMode(&'static str),

    #[error("invalid component parameters: {0}")]
    InvalidParameters(String),

    #[error("the value does not fit in {0} bits")]
    ValueOutOfRange(usize),

    #[error("the layout used {actual} rows but {expected} were reserved")]
    LayoutMismatch { expected: usize, actual: usize },

    #[error("{0} columns hold no cells")]
    UnwritableColumn(ColumnKind),

    #[error("expected an absolute cell reference, got {0:?}")]
    RelativeVariable(Var),

    #[error("no lookup table named {0}")]
    UnknownLookupTable(String),
}

/// Errors that can arise when checking an assignment against a circuit
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitError {
    #[error("constraint {index} of gate {gate} is not satisfied on row {row}")]
    Constraint {
        gate: usize,
        row: usize,
        index: usize,
    },

    #[error("lookup {index} of gate {gate} is not in its table on row {row}")]
    Lookup {
        gate: usize,
        row: usize,
        index: usize,
    },

    #[error("copy constraint between {0:?} and {1:?} is violated")]
    CopyConstraint(Var, Var),

    #[error("the cell {0:?} lies outside the table")]
    RowOutOfBounds(Var),
}

pub type Result<T> = std::result::Result<T, ComponentError>;
