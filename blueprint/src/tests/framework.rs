//! Test framework

use crate::{
    circuits::{
        assignment::Assignment, circuit::Circuit, component::Component, var::Var,
    },
    error::CircuitError,
};
use ark_ff::PrimeField;
use core::fmt::Debug;

/// An assignment and a circuit that components are placed into
pub(crate) struct TestFramework<F: PrimeField> {
    pub(crate) assignment: Assignment<F>,
    pub(crate) circuit: Circuit<F>,
}

impl<F: PrimeField> TestFramework<F> {
    pub(crate) fn new() -> Self {
        Self {
            assignment: Assignment::new(),
            circuit: Circuit::new(),
        }
    }

    /// Writes `values` down public input column `column`, starting at `row`
    pub(crate) fn public_inputs(&mut self, column: usize, row: usize, values: &[F]) -> Vec<Var> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let var = Var::public_input(column, row + i);
                self.assignment.assign(&var, *value).unwrap();
                var
            })
            .collect()
    }

    pub(crate) fn public_input(&mut self, column: usize, row: usize, value: F) -> Var {
        self.public_inputs(column, row, &[value])[0]
    }

    /// Runs both passes of `component` and checks they agree with each other
    /// and with the component's declared layout
    pub(crate) fn place<C>(&mut self, component: &C, input: &C::Input, start_row: usize) -> C::Output
    where
        C: Component<F>,
        C::Output: PartialEq + Debug,
    {
        let assigned = component
            .generate_assignments(&mut self.assignment, input, start_row)
            .unwrap();
        let constrained = component
            .generate_circuit(&mut self.circuit, &mut self.assignment, input, start_row)
            .unwrap();

        assert_eq!(assigned, constrained);
        assert_eq!(assigned, component.result(start_row));
        assert_eq!(
            self.assignment
                .last_witness_row(component.binding().witness_columns()),
            Some(start_row + component.rows_amount() - 1),
        );
        assigned
    }

    pub(crate) fn value(&self, var: &Var) -> F {
        self.assignment.value(var).unwrap()
    }

    pub(crate) fn values(&self, vars: &[Var]) -> Vec<F> {
        vars.iter().map(|var| self.value(var)).collect()
    }

    /// Overwrites a cell, to check the circuit notices
    pub(crate) fn tamper(&mut self, var: &Var, value: F) {
        self.assignment.assign(var, value).unwrap();
    }

    pub(crate) fn verify(&self) -> Result<(), CircuitError> {
        self.circuit.verify_witness(&self.assignment)
    }
}
