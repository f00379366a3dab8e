//! This module implements selector-guarded gates.

use crate::{
    circuits::{assignment::Assignment, expr::Expr, lookup::LookupTables, var::Var},
    error::CircuitError,
};
use ark_ff::PrimeField;

/// A tuple of expressions that must appear as a row of a lookup table
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<F> {
    pub table: usize,
    pub inputs: Vec<Expr<F>>,
}

impl<F> Lookup<F> {
    pub fn new(table: usize, inputs: Vec<Expr<F>>) -> Self {
        Self { table, inputs }
    }
}

/// The constraints of a gate before it is bound to a selector
#[derive(Clone, Debug, PartialEq)]
pub struct GateDefinition<F> {
    pub constraints: Vec<Expr<F>>,
    pub lookups: Vec<Lookup<F>>,
}

impl<F> GateDefinition<F> {
    pub fn new(constraints: Vec<Expr<F>>) -> Self {
        Self {
            constraints,
            lookups: vec![],
        }
    }

    pub fn with_lookups(mut self, lookups: Vec<Lookup<F>>) -> Self {
        self.lookups = lookups;
        self
    }
}

/// A gate: polynomial constraints over cells relative to the rows on which
/// its selector is enabled
#[derive(Clone, Debug, PartialEq)]
pub struct Gate<F> {
    pub selector: usize,
    pub constraints: Vec<Expr<F>>,
    pub lookups: Vec<Lookup<F>>,
}

impl<F: PrimeField> Gate<F> {
    pub fn new(selector: usize, definition: GateDefinition<F>) -> Self {
        Self {
            selector,
            constraints: definition.constraints,
            lookups: definition.lookups,
        }
    }

    /// Checks every constraint and lookup of this gate on `row`.
    /// `index` is the position of the gate in its circuit, used for reporting.
    pub fn verify_row(
        &self,
        index: usize,
        row: usize,
        assignment: &Assignment<F>,
        tables: &LookupTables<F>,
    ) -> Result<(), CircuitError> {
        let value = |var: &Var| -> Result<F, CircuitError> {
            let cell = var.at(row);
            cell.absolute_row()
                .map(|r| assignment.read(cell.kind, cell.index, r))
                .ok_or(CircuitError::RowOutOfBounds(cell))
        };

        for (i, constraint) in self.constraints.iter().enumerate() {
            if !constraint.evaluate(&value)?.is_zero() {
                return Err(CircuitError::Constraint {
                    gate: index,
                    row,
                    index: i,
                });
            }
        }

        for (i, lookup) in self.lookups.iter().enumerate() {
            let tuple = lookup
                .inputs
                .iter()
                .map(|input| input.evaluate(&value))
                .collect::<Result<Vec<_>, _>>()?;
            if !tables.contains(lookup.table, &tuple) {
                return Err(CircuitError::Lookup {
                    gate: index,
                    row,
                    index: i,
                });
            }
        }

        Ok(())
    }
}
