//! This module implements the component interface.
//!
//! A component is a stateless description of a sub-circuit bound to a set
//! of table columns. Its layout is written once, in
//! [`Component::synthesize`], against a [`ComponentEnv`]. Running that single
//! description against a [`WitnessEnv`] fills the assignment with values,
//! running it against a [`ConstraintEnv`] emits gates and copy constraints,
//! and running it against a [`LayoutEnv`] only computes coordinates. The
//! passes therefore agree on every cell by construction.

use crate::{
    circuits::{
        assignment::Assignment,
        circuit::Circuit,
        expr::Expr,
        gate::GateDefinition,
        layout,
        manifest::Manifest,
        var::Var,
    },
    error::Result,
};
use ark_ff::PrimeField;
use log::debug;
use serde::{Deserialize, Serialize};

/// The physical columns a component instance is laid out on.
/// Components address logical columns `0..witness_amount()` which the
/// binding maps to table columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    witness: Vec<usize>,
    constant: Vec<usize>,
    public_input: Vec<usize>,
    lookup_columns: usize,
}

impl ColumnBinding {
    pub fn new(witness: Vec<usize>) -> Self {
        Self {
            witness,
            constant: vec![],
            public_input: vec![],
            lookup_columns: 0,
        }
    }

    /// Binds witness columns `0..witness_amount`
    pub fn contiguous(witness_amount: usize) -> Self {
        Self::new((0..witness_amount).collect())
    }

    pub fn with_constants(mut self, constant: Vec<usize>) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_public_inputs(mut self, public_input: Vec<usize>) -> Self {
        self.public_input = public_input;
        self
    }

    /// Sets how many lookups a single row may perform
    pub fn with_lookup_columns(mut self, lookup_columns: usize) -> Self {
        self.lookup_columns = lookup_columns;
        self
    }

    pub fn witness_amount(&self) -> usize {
        self.witness.len()
    }

    pub fn constant_amount(&self) -> usize {
        self.constant.len()
    }

    pub fn public_input_amount(&self) -> usize {
        self.public_input.len()
    }

    pub fn lookup_columns(&self) -> usize {
        self.lookup_columns
    }

    /// Table indices of the bound witness columns
    pub fn witness_columns(&self) -> &[usize] {
        &self.witness
    }

    /// Absolute reference to logical witness column `column` on `row`
    pub fn witness(&self, column: usize, row: usize) -> Var {
        Var::witness(self.witness[column], row)
    }

    /// Relative reference to logical witness column `column`
    pub fn witness_rel(&self, column: usize, offset: i64) -> Var {
        Var::witness_rel(self.witness[column], offset)
    }

    /// Relative witness cell as an expression
    pub fn w<F: PrimeField>(&self, column: usize, offset: i64) -> Expr<F> {
        Expr::cell(self.witness_rel(column, offset))
    }

    /// Absolute reference to value `i` of a linear block starting at `start_row`
    pub fn block_cell(&self, start_row: usize, i: usize) -> Var {
        let (column, row) = layout::cell(start_row, i, self.witness_amount());
        self.witness(column, row)
    }

    /// Value `i` of a linear block, relative to the block's first row
    pub fn block_expr<F: PrimeField>(&self, i: usize) -> Expr<F> {
        let (column, row) = layout::cell(0, i, self.witness_amount());
        self.w(column, row as i64)
    }

    pub fn constant(&self, column: usize, row: usize) -> Var {
        Var::constant(self.constant[column], row)
    }

    pub fn public_input(&self, column: usize, row: usize) -> Var {
        Var::public_input(self.public_input[column], row)
    }

    /// Key identifying a gate on these columns, for selector reuse
    pub fn selector_key(&self, gate: &str) -> String {
        format!("{gate}@{:?}", self.witness)
    }
}

/// What a component needs from the pass it is synthesized in
pub trait ComponentEnv<F: PrimeField>: Sized {
    /// The assignment, when this pass produces concrete values
    fn witness(&mut self) -> Option<&mut Assignment<F>>;

    /// Makes `to` hold the value of `from`: the value is copied when
    /// assigning and a copy constraint is added when building the circuit
    fn copy(&mut self, from: Var, to: Var) -> Result<()>;

    /// Constrains two cells that are both already assigned to be equal.
    /// Nothing is written when assigning, a mismatch only shows at verification.
    fn equate(&mut self, left: Var, right: Var) -> Result<()>;

    /// Writes a fixed value into a constant cell
    fn fix(&mut self, var: Var, value: F) -> Result<()>;

    /// Enables the gate identified by `key` on `row`.
    /// The gate is defined through `define` the first time the key is seen.
    fn gate<D>(&mut self, key: &str, row: usize, define: D) -> Result<()>
    where
        D: FnOnce(&mut Circuit<F>) -> Result<GateDefinition<F>>;

    /// Synthesizes a sub-component starting at `start_row`
    fn apply<C: Component<F>>(
        &mut self,
        component: &C,
        input: &C::Input,
        start_row: usize,
    ) -> Result<C::Output> {
        debug!(
            "placing {} rows at row {start_row}",
            component.rows_amount()
        );
        component.synthesize(self, input, start_row)
    }
}

/// Pass producing concrete cell values
pub struct WitnessEnv<'a, F> {
    assignment: &'a mut Assignment<F>,
}

impl<'a, F> WitnessEnv<'a, F> {
    pub fn new(assignment: &'a mut Assignment<F>) -> Self {
        Self { assignment }
    }
}

impl<F: PrimeField> ComponentEnv<F> for WitnessEnv<'_, F> {
    fn witness(&mut self) -> Option<&mut Assignment<F>> {
        Some(&mut *self.assignment)
    }

    fn copy(&mut self, from: Var, to: Var) -> Result<()> {
        let value = self.assignment.value(&from)?;
        self.assignment.assign(&to, value)
    }

    fn equate(&mut self, _left: Var, _right: Var) -> Result<()> {
        Ok(())
    }

    fn fix(&mut self, var: Var, value: F) -> Result<()> {
        self.assignment.assign(&var, value)
    }

    fn gate<D>(&mut self, _key: &str, _row: usize, _define: D) -> Result<()>
    where
        D: FnOnce(&mut Circuit<F>) -> Result<GateDefinition<F>>,
    {
        Ok(())
    }
}

/// Pass emitting gates, selectors and copy constraints
pub struct ConstraintEnv<'a, F> {
    circuit: &'a mut Circuit<F>,
    assignment: &'a mut Assignment<F>,
}

impl<'a, F> ConstraintEnv<'a, F> {
    pub fn new(circuit: &'a mut Circuit<F>, assignment: &'a mut Assignment<F>) -> Self {
        Self {
            circuit,
            assignment,
        }
    }
}

impl<F: PrimeField> ComponentEnv<F> for ConstraintEnv<'_, F> {
    fn witness(&mut self) -> Option<&mut Assignment<F>> {
        None
    }

    fn copy(&mut self, from: Var, to: Var) -> Result<()> {
        self.circuit.add_copy_constraint(from, to)
    }

    fn equate(&mut self, left: Var, right: Var) -> Result<()> {
        self.circuit.add_copy_constraint(left, right)
    }

    fn fix(&mut self, var: Var, value: F) -> Result<()> {
        self.assignment.assign(&var, value)
    }

    fn gate<D>(&mut self, key: &str, row: usize, define: D) -> Result<()>
    where
        D: FnOnce(&mut Circuit<F>) -> Result<GateDefinition<F>>,
    {
        let selector = match self.assignment.find_selector(key) {
            Some(selector) => selector,
            None => {
                let definition = define(&mut *self.circuit)?;
                let selector = self.assignment.allocate_selector(key);
                self.circuit.add_gate(selector, definition);
                selector
            }
        };
        self.assignment.enable_selector(selector, row)
    }
}

/// Dry run that only follows the layout, touching no table
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEnv;

impl<F: PrimeField> ComponentEnv<F> for LayoutEnv {
    fn witness(&mut self) -> Option<&mut Assignment<F>> {
        None
    }

    fn copy(&mut self, _from: Var, _to: Var) -> Result<()> {
        Ok(())
    }

    fn equate(&mut self, _left: Var, _right: Var) -> Result<()> {
        Ok(())
    }

    fn fix(&mut self, _var: Var, _value: F) -> Result<()> {
        Ok(())
    }

    fn gate<D>(&mut self, _key: &str, _row: usize, _define: D) -> Result<()>
    where
        D: FnOnce(&mut Circuit<F>) -> Result<GateDefinition<F>>,
    {
        Ok(())
    }
}

/// A sub-circuit with a fixed layout
pub trait Component<F: PrimeField> {
    /// Cells the caller provides
    type Input;
    /// Cells holding the outputs
    type Output;

    fn binding(&self) -> &ColumnBinding;

    fn manifest(&self) -> Manifest;

    /// Rows used by one instance
    fn rows_amount(&self) -> usize;

    /// Where the outputs of an instance placed at `start_row` live.
    /// Both passes return exactly this value.
    fn result(&self, start_row: usize) -> Self::Output;

    /// Lays the component out in `env`
    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &Self::Input,
        start_row: usize,
    ) -> Result<Self::Output>;

    /// Fills the component's cells with values satisfying its gates
    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> Result<Self::Output> {
        self.synthesize(&mut WitnessEnv::new(assignment), input, start_row)
    }

    /// Emits the component's gates and copy constraints
    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> Result<Self::Output> {
        self.synthesize(&mut ConstraintEnv::new(circuit, assignment), input, start_row)
    }
}
