//! Component manifests.
//!
//! A manifest states the resources a component needs before any of it is
//! placed: how many witness columns it can be laid out on, which lookup
//! tables and how many lookup columns it uses, an upper bound on the gates it
//! emits and whether it needs a constant column. Manifests are pure
//! functions of a component's static parameters and merge conservatively, so
//! a composite's manifest is the merge of its own needs and its parts'.

use crate::{
    circuits::{component::ColumnBinding, var::ColumnKind},
    error::{ComponentError, Result},
};
use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Witness column amounts a component accepts:
/// `min, min + step, min + 2 step, ...` up to `max` when bounded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessRange {
    pub min: usize,
    pub max: Option<usize>,
    pub step: usize,
}

impl WitnessRange {
    /// Any amount of at least `min` columns
    pub fn at_least(min: usize) -> Self {
        Self {
            min,
            max: None,
            step: 1,
        }
    }

    pub fn stepped(min: usize, max: Option<usize>, step: usize) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, amount: usize) -> bool {
        amount >= self.min
            && self.max.map_or(true, |max| amount <= max)
            && (amount - self.min) % self.step.max(1) == 0
    }

    /// A range accepting no amount at all
    pub fn empty() -> Self {
        Self {
            min: 1,
            max: Some(0),
            step: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.map_or(false, |max| max < self.min)
    }

    /// The amounts accepted by both ranges.
    /// The first common amount is searched among `lcm / step` candidates of
    /// `self`, past those the residues repeat.
    pub fn intersect(&self, other: &Self) -> Self {
        let (step, other_step) = (self.step.max(1), other.step.max(1));
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let lcm = step.lcm(&other_step);

        // smallest amount of `self` at or above both minimums
        let lowest = self.min.max(other.min);
        let first = self.min + Integer::div_ceil(&(lowest - self.min), &step) * step;
        let min = (0..lcm / step)
            .map(|i| first + i * step)
            .find(|amount| (amount - other.min) % other_step == 0);

        match min {
            Some(min) if max.map_or(true, |max| min <= max) => Self {
                min,
                max,
                step: lcm,
            },
            _ => Self::empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub witness: WitnessRange,
    pub lookup_tables: BTreeSet<String>,
    pub lookup_columns: usize,
    pub gates: usize,
    pub constant_required: bool,
}

impl Manifest {
    pub fn new(witness: WitnessRange) -> Self {
        Self {
            witness,
            lookup_tables: BTreeSet::new(),
            lookup_columns: 0,
            gates: 0,
            constant_required: false,
        }
    }

    pub fn with_gates(mut self, gates: usize) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_lookup(mut self, table: &str, columns: usize) -> Self {
        self.lookup_tables.insert(table.to_string());
        self.lookup_columns = self.lookup_columns.max(columns);
        self
    }

    pub fn with_constant(mut self) -> Self {
        self.constant_required = true;
        self
    }

    /// The smallest manifest covering both `self` and `other`
    pub fn merge(mut self, other: &Manifest) -> Self {
        self.witness = self.witness.intersect(&other.witness);
        self.lookup_tables
            .extend(other.lookup_tables.iter().cloned());
        self.lookup_columns = self.lookup_columns.max(other.lookup_columns);
        self.gates += other.gates;
        self.constant_required |= other.constant_required;
        self
    }

    /// Checks that a column binding provides what the manifest asks for
    pub fn check(&self, binding: &ColumnBinding) -> Result<()> {
        let witness_amount = binding.witness_amount();
        if self.witness.is_empty() {
            return Err(ComponentError::UnsupportedWitnessAmount(witness_amount));
        }
        if witness_amount < self.witness.min {
            return Err(ComponentError::InsufficientColumns {
                kind: ColumnKind::Witness,
                required: self.witness.min,
                available: witness_amount,
            });
        }
        if !self.witness.contains(witness_amount) {
            return Err(ComponentError::UnsupportedWitnessAmount(witness_amount));
        }
        if binding.lookup_columns() < self.lookup_columns {
            return Err(ComponentError::InsufficientColumns {
                kind: ColumnKind::Lookup,
                required: self.lookup_columns,
                available: binding.lookup_columns(),
            });
        }
        if self.constant_required && binding.constant_amount() == 0 {
            return Err(ComponentError::InsufficientColumns {
                kind: ColumnKind::Constant,
                required: 1,
                available: 0,
            });
        }
        Ok(())
    }
}
