//! Row/column arithmetic shared by every component.
//!
//! Linear blocks store `n` values one per cell, filling a row before moving
//! to the next one:
//!
//! ```text
//! rows    = ceil(n / witness_amount)
//! cell(i) = (column = i mod witness_amount, row = start_row + i div witness_amount)
//! ```
//!
//! Components that pack values differently (range-check groups, `F_p^12`
//! slots, bit-composition rows) document their block formula next to their
//! layout code.

use crate::error::{ComponentError, Result};
use num_integer::Integer;
use std::ops::Range;

/// Rows needed to store `n` values one per cell on `witness_amount` columns
pub fn rows_for(n: usize, witness_amount: usize) -> usize {
    Integer::div_ceil(&n, &witness_amount)
}

/// Logical `(column, row)` of the `i`-th value of a linear block
pub fn cell(start_row: usize, i: usize, witness_amount: usize) -> (usize, usize) {
    let (row, column) = i.div_rem(&witness_amount);
    (column, start_row + row)
}

/// Hands out consecutive row ranges to the parts of a composite component
#[derive(Clone, Debug)]
pub struct RowCursor {
    start: usize,
    current: usize,
}

impl RowCursor {
    pub fn new(start_row: usize) -> Self {
        Self {
            start: start_row,
            current: start_row,
        }
    }

    /// Reserves the next `rows` rows
    pub fn reserve(&mut self, rows: usize) -> Range<usize> {
        let range = self.current..self.current + rows;
        self.current = range.end;
        range
    }

    /// First row that has not been reserved yet
    pub fn current_row(&self) -> usize {
        self.current
    }

    /// Rows reserved since the cursor was created
    pub fn consumed(&self) -> usize {
        self.current - self.start
    }

    /// Checks the reserved rows add up to the component's row budget
    pub fn finish(&self, expected: usize) -> Result<()> {
        if self.consumed() == expected {
            Ok(())
        } else {
            Err(ComponentError::LayoutMismatch {
                expected,
                actual: self.consumed(),
            })
        }
    }
}
