//! This module implements the constraint system that components write into.

use crate::{
    circuits::{
        assignment::Assignment,
        gate::{Gate, GateDefinition},
        lookup::LookupTables,
        var::Var,
    },
    error::{CircuitError, ComponentError, Result},
};
use ark_ff::PrimeField;
use log::debug;
use rayon::prelude::*;

/// Gates, copy constraints and lookup tables of a circuit
#[derive(Clone, Debug, Default)]
pub struct Circuit<F> {
    gates: Vec<Gate<F>>,
    copy_constraints: Vec<(Var, Var)>,
    tables: LookupTables<F>,
}

impl<F: PrimeField> Circuit<F> {
    pub fn new() -> Self {
        Self {
            gates: vec![],
            copy_constraints: vec![],
            tables: LookupTables::default(),
        }
    }

    /// Adds a gate guarded by `selector` and returns its index
    pub fn add_gate(&mut self, selector: usize, definition: GateDefinition<F>) -> usize {
        self.gates.push(Gate::new(selector, definition));
        self.gates.len() - 1
    }

    /// Asserts two absolute cells hold the same value
    pub fn add_copy_constraint(&mut self, left: Var, right: Var) -> Result<()> {
        for var in [left, right] {
            if var.absolute_row().is_none() {
                return Err(ComponentError::RelativeVariable(var));
            }
        }
        if left != right {
            self.copy_constraints.push((left, right));
        }
        Ok(())
    }

    /// Id of the named lookup table, provisioning it on first use
    pub fn reserve_table(&mut self, name: &str) -> Result<usize> {
        self.tables.reserve(name)
    }

    pub fn gates(&self) -> &[Gate<F>] {
        &self.gates
    }

    pub fn copy_constraints(&self) -> &[(Var, Var)] {
        &self.copy_constraints
    }

    pub fn tables(&self) -> &LookupTables<F> {
        &self.tables
    }

    /// Checks that `assignment` satisfies every gate on every row its selector
    /// is enabled, every lookup and every copy constraint.
    /// The first failure, in gate then row order, is reported.
    pub fn verify_witness(&self, assignment: &Assignment<F>) -> std::result::Result<(), CircuitError> {
        debug!(
            "checking {} gates and {} copy constraints over {} rows",
            self.gates.len(),
            self.copy_constraints.len(),
            assignment.rows_amount()
        );

        for (index, gate) in self.gates.iter().enumerate() {
            let rows = assignment.enabled_rows(gate.selector);
            let failure = rows.par_iter().find_map_first(|&row| {
                gate.verify_row(index, row, assignment, &self.tables).err()
            });
            if let Some(err) = failure {
                return Err(err);
            }
        }

        let failure = self.copy_constraints.par_iter().find_map_first(|(left, right)| {
            let equal = match (assignment.value(left), assignment.value(right)) {
                (Ok(l), Ok(r)) => l == r,
                _ => false,
            };
            (!equal).then_some(CircuitError::CopyConstraint(*left, *right))
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
