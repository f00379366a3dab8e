//! Lookup tables
//!
//! Components name the tables they need and the circuit provisions each of
//! them once, handing out a table id that gate lookups refer to.

//~ The 16-bit range table is a single-column table containing the numbers
//~ from 0 to 2^16 (excluded). It is used to check that a limb fits in 16 bits.

use crate::error::{ComponentError, Result};
use ark_ff::PrimeField;
use std::collections::HashSet;

/// Name of the table holding `0..2^16`
pub const RANGE_16BIT: &str = "range_16bit/full";

/// Limbs looked up in [`RANGE_16BIT`] have this many bits
pub const RANGE_LIMB_BITS: usize = 16;

/// Upper bound (exclusive) of [`RANGE_16BIT`]
pub const RANGE_UPPERBOUND: u32 = 1 << RANGE_LIMB_BITS;

/// A lookup table, stored by columns
#[derive(Clone, Debug)]
pub struct LookupTable<F> {
    pub id: usize,
    pub name: String,
    pub data: Vec<Vec<F>>,
    rows: HashSet<Vec<F>>,
}

impl<F: PrimeField> LookupTable<F> {
    pub fn new(id: usize, name: &str, data: Vec<Vec<F>>) -> Self {
        let len = data.first().map_or(0, Vec::len);
        let rows = (0..len)
            .map(|row| data.iter().map(|column| column[row]).collect())
            .collect();
        Self {
            id,
            name: name.to_string(),
            data,
            rows,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.data.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, tuple: &[F]) -> bool {
        self.rows.contains(tuple)
    }
}

/// A single-column table containing the numbers from 0 to [`RANGE_UPPERBOUND`] (exclusive)
pub fn range_16bit_table<F: PrimeField>(id: usize) -> LookupTable<F> {
    let column = (0..RANGE_UPPERBOUND).map(|v| F::from(v as u64)).collect();
    LookupTable::new(id, RANGE_16BIT, vec![column])
}

/// The tables provisioned for a circuit
#[derive(Clone, Debug, Default)]
pub struct LookupTables<F> {
    tables: Vec<LookupTable<F>>,
}

impl<F: PrimeField> LookupTables<F> {
    /// Returns the id of the named table, building it on first use
    pub fn reserve(&mut self, name: &str) -> Result<usize> {
        if let Some(table) = self.tables.iter().find(|table| table.name == name) {
            return Ok(table.id);
        }
        let id = self.tables.len();
        let table = match name {
            RANGE_16BIT => range_16bit_table(id),
            _ => return Err(ComponentError::UnknownLookupTable(name.to_string())),
        };
        self.tables.push(table);
        Ok(id)
    }

    pub fn get(&self, id: usize) -> Option<&LookupTable<F>> {
        self.tables.get(id)
    }

    /// Whether `tuple` is a row of table `id`. Unknown ids contain nothing.
    pub fn contains(&self, id: usize, tuple: &[F]) -> bool {
        self.get(id).is_some_and(|table| table.contains(tuple))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LookupTable<F>> {
        self.tables.iter()
    }
}
