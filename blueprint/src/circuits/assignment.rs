//! This module implements the assignment table.
//!
//! The table stores one column of field elements per witness, public input,
//! constant and selector column. Columns grow on demand and cells that were
//! never written read as zero, which is what unused cells of a reserved
//! region are expected to hold.

use crate::{
    circuits::var::{ColumnKind, Var},
    error::{ComponentError, Result},
};
use ark_ff::Field;
use log::trace;
use std::collections::HashMap;

/// A growable column of field elements
#[derive(Clone, Debug, Default)]
struct Column<F> {
    cells: Vec<F>,
}

impl<F: Field> Column<F> {
    fn get(&self, row: usize) -> F {
        self.cells.get(row).copied().unwrap_or_else(F::zero)
    }

    fn set(&mut self, row: usize, value: F) {
        if self.cells.len() <= row {
            self.cells.resize(row + 1, F::zero());
        }
        self.cells[row] = value;
    }
}

/// The table of concrete values shared by every component of a circuit
#[derive(Clone, Debug)]
pub struct Assignment<F> {
    witness: Vec<Column<F>>,
    public_input: Vec<Column<F>>,
    constant: Vec<Column<F>>,
    selector: Vec<Column<F>>,
    selector_keys: HashMap<String, usize>,
    rows: usize,
}

impl<F: Field> Default for Assignment<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> Assignment<F> {
    pub fn new() -> Self {
        Self {
            witness: vec![],
            public_input: vec![],
            constant: vec![],
            selector: vec![],
            selector_keys: HashMap::new(),
            rows: 0,
        }
    }

    fn columns(&self, kind: ColumnKind) -> &[Column<F>] {
        match kind {
            ColumnKind::Witness => &self.witness,
            ColumnKind::PublicInput => &self.public_input,
            ColumnKind::Constant => &self.constant,
            ColumnKind::Selector => &self.selector,
            ColumnKind::Lookup => &[],
        }
    }

    fn columns_mut(&mut self, kind: ColumnKind) -> Option<&mut Vec<Column<F>>> {
        match kind {
            ColumnKind::Witness => Some(&mut self.witness),
            ColumnKind::PublicInput => Some(&mut self.public_input),
            ColumnKind::Constant => Some(&mut self.constant),
            ColumnKind::Selector => Some(&mut self.selector),
            ColumnKind::Lookup => None,
        }
    }

    /// Reads a cell. Cells that were never written hold zero.
    pub fn read(&self, kind: ColumnKind, index: usize, row: usize) -> F {
        self.columns(kind)
            .get(index)
            .map_or_else(F::zero, |column| column.get(row))
    }

    /// Writes a cell, growing the table when needed
    pub fn write(&mut self, kind: ColumnKind, index: usize, row: usize, value: F) -> Result<()> {
        let columns = self
            .columns_mut(kind)
            .ok_or(ComponentError::UnwritableColumn(kind))?;
        if columns.len() <= index {
            columns.resize_with(index + 1, Column::default);
        }
        columns[index].set(row, value);
        self.rows = self.rows.max(row + 1);
        Ok(())
    }

    pub fn witness(&self, index: usize, row: usize) -> F {
        self.read(ColumnKind::Witness, index, row)
    }

    pub fn public_input(&self, index: usize, row: usize) -> F {
        self.read(ColumnKind::PublicInput, index, row)
    }

    pub fn constant(&self, index: usize, row: usize) -> F {
        self.read(ColumnKind::Constant, index, row)
    }

    pub fn selector(&self, index: usize, row: usize) -> bool {
        !self.read(ColumnKind::Selector, index, row).is_zero()
    }

    pub fn set_witness(&mut self, index: usize, row: usize, value: F) -> Result<()> {
        self.write(ColumnKind::Witness, index, row, value)
    }

    pub fn set_public_input(&mut self, index: usize, row: usize, value: F) -> Result<()> {
        self.write(ColumnKind::PublicInput, index, row, value)
    }

    pub fn set_constant(&mut self, index: usize, row: usize, value: F) -> Result<()> {
        self.write(ColumnKind::Constant, index, row, value)
    }

    /// The value held by an absolute reference
    pub fn value(&self, var: &Var) -> Result<F> {
        let row = var
            .absolute_row()
            .ok_or(ComponentError::RelativeVariable(*var))?;
        Ok(self.read(var.kind, var.index, row))
    }

    /// Writes the cell named by an absolute reference
    pub fn assign(&mut self, var: &Var, value: F) -> Result<()> {
        let row = var
            .absolute_row()
            .ok_or(ComponentError::RelativeVariable(*var))?;
        self.write(var.kind, var.index, row, value)
    }

    /// Number of rows touched by any write so far
    pub fn rows_amount(&self) -> usize {
        self.rows
    }

    /// Last row written in a given witness column range, if any
    pub fn last_witness_row(&self, columns: &[usize]) -> Option<usize> {
        columns
            .iter()
            .filter_map(|&index| self.witness.get(index))
            .filter_map(|column| column.cells.len().checked_sub(1))
            .max()
    }

    /// Allocates a fresh selector column for the gate identified by `key`
    pub fn allocate_selector(&mut self, key: &str) -> usize {
        let index = self.selector.len();
        self.selector.push(Column::default());
        self.selector_keys.insert(key.to_string(), index);
        trace!("allocated selector {index} for {key}");
        index
    }

    /// Selector previously allocated for `key`
    pub fn find_selector(&self, key: &str) -> Option<usize> {
        self.selector_keys.get(key).copied()
    }

    /// One past the last allocated selector column
    pub fn selectors_end(&self) -> usize {
        self.selector.len()
    }

    /// Turns on a selector on the given row
    pub fn enable_selector(&mut self, index: usize, row: usize) -> Result<()> {
        self.write(ColumnKind::Selector, index, row, F::one())
    }

    /// Rows on which a selector is enabled
    pub fn enabled_rows(&self, index: usize) -> Vec<usize> {
        self.selector.get(index).map_or_else(Vec::new, |column| {
            column
                .cells
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_zero())
                .map(|(row, _)| row)
                .collect()
        })
    }
}
