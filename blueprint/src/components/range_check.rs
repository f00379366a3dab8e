//! This module implements a range check over 16-bit lookup limbs.

//~ Each checked value occupies a group of consecutive cells
//~
//~ |   0   |    1   | ... |     L    |    L+1    |
//~ |:-----:|:------:|:---:|:--------:|:---------:|
//~ | value | limb_0 | ... | limb_L-1 | (shifted) |
//~
//~ where `L = ceil(bits / 16)` and every limb is looked up in the 16-bit range
//~ table. When `bits` is not a multiple of 16, the top limb must fit in
//~ `r = bits mod 16` bits, which is enforced by also looking up
//~ `shifted = limb_{L-1} * 2^(16 - r)`.
//~
//~ A row holds `groups_per_row = min(W / width, lookup_columns / (width - 1))`
//~ groups side by side, so `n` values take `ceil(n / groups_per_row)` rows and
//~ value `g` lives in row `start + g / groups_per_row`, starting at column
//~ `(g mod groups_per_row) * width`.
//~
//~ The gate enforces, for every group of the row,
//~
//~ * $value - \sum_i limb_i \cdot 2^{16 i} = 0$
//~ * $shifted - limb_{L-1} \cdot 2^{16 - r} = 0$

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::{GateDefinition, Lookup},
        layout,
        lookup::{RANGE_16BIT, RANGE_LIMB_BITS},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    error::{ComponentError, Result},
};
use ark_ff::PrimeField;
use core::marker::PhantomData;
use log::debug;
use num_bigint::BigUint;
use num_integer::Integer;

/// Cells to range check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeCheckInput {
    pub values: Vec<Var>,
}

/// Checks that each of `values_amount` cells fits in `bits` bits
#[derive(Clone, Debug)]
pub struct RangeCheck<F> {
    binding: ColumnBinding,
    values_amount: usize,
    bits: usize,
    groups_per_row: usize,
    _field: PhantomData<F>,
}

/// Number of 16-bit limbs for `bits` bits
fn limbs_for(bits: usize) -> usize {
    Integer::div_ceil(&bits, &RANGE_LIMB_BITS)
}

/// Cells per checked value
fn group_width(bits: usize) -> usize {
    1 + limbs_for(bits) + usize::from(bits % RANGE_LIMB_BITS != 0)
}

impl<F: PrimeField> RangeCheck<F> {
    pub fn new(binding: ColumnBinding, values_amount: usize, bits: usize) -> Result<Self> {
        if values_amount == 0 || bits == 0 {
            return Err(ComponentError::InvalidParameters(format!(
                "range check of {values_amount} values over {bits} bits"
            )));
        }
        let capacity = F::MODULUS_BIT_SIZE as usize - 1;
        if limbs_for(bits) * RANGE_LIMB_BITS > capacity {
            return Err(ComponentError::BitsExceedFieldCapacity { bits, capacity });
        }
        Self::manifest_for(bits).check(&binding)?;

        let width = group_width(bits);
        let groups_per_row =
            (binding.witness_amount() / width).min(binding.lookup_columns() / (width - 1));
        let component = Self {
            binding,
            values_amount,
            bits,
            groups_per_row,
            _field: PhantomData,
        };
        debug!(
            "range check of {values_amount} values over {bits} bits: {} per row, {} rows",
            groups_per_row,
            Component::<F>::rows_amount(&component)
        );
        Ok(component)
    }

    /// Resources needed to range check `bits`-bit values
    pub fn manifest_for(bits: usize) -> Manifest {
        let width = group_width(bits);
        Manifest::new(WitnessRange::at_least(width))
            .with_lookup(RANGE_16BIT, width - 1)
            .with_gates(1)
    }

    /// Rows needed for `values_amount` values, or `None` when a single group
    /// does not fit the columns
    pub fn rows_for(
        values_amount: usize,
        bits: usize,
        witness_amount: usize,
        lookup_columns: usize,
    ) -> Option<usize> {
        let width = group_width(bits);
        let groups_per_row = (witness_amount / width).min(lookup_columns / (width - 1));
        (groups_per_row > 0).then(|| layout::rows_for(values_amount, groups_per_row))
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Row and first logical column of the group of value `g`
    fn group(&self, start_row: usize, g: usize) -> (usize, usize) {
        let (row, slot) = g.div_rem(&self.groups_per_row);
        (start_row + row, slot * group_width(self.bits))
    }

    fn gate_definition(&self, table: usize) -> GateDefinition<F> {
        let limbs = limbs_for(self.bits);
        let remainder = self.bits % RANGE_LIMB_BITS;
        let width = group_width(self.bits);
        let two_to_16 = F::from(1u64 << RANGE_LIMB_BITS);

        let mut constraints = vec![];
        let mut lookups = vec![];
        for slot in 0..self.groups_per_row {
            let base = slot * width;
            let mut power = F::one();
            let mut composed = Expr::zero();
            for i in 0..limbs {
                composed = composed + self.binding.w(base + 1 + i, 0).scale(power);
                lookups.push(Lookup::new(table, vec![self.binding.w(base + 1 + i, 0)]));
                power *= two_to_16;
            }
            constraints.push(self.binding.w(base, 0) - composed);

            if remainder != 0 {
                let shift = F::from(1u64 << (RANGE_LIMB_BITS - remainder));
                let shifted = self.binding.w(base + 1 + limbs, 0);
                constraints.push(shifted.clone() - self.binding.w(base + limbs, 0).scale(shift));
                lookups.push(Lookup::new(table, vec![shifted]));
            }
        }
        GateDefinition::new(constraints).with_lookups(lookups)
    }
}

impl<F: PrimeField> Component<F> for RangeCheck<F> {
    type Input = RangeCheckInput;
    type Output = ();

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.bits)
    }

    fn rows_amount(&self) -> usize {
        layout::rows_for(self.values_amount, self.groups_per_row)
    }

    fn result(&self, _start_row: usize) {}

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &RangeCheckInput,
        start_row: usize,
    ) -> Result<()> {
        if input.values.len() != self.values_amount {
            return Err(ComponentError::InvalidParameters(format!(
                "range check expects {} values, got {}",
                self.values_amount,
                input.values.len()
            )));
        }

        let limbs = limbs_for(self.bits);
        let remainder = self.bits % RANGE_LIMB_BITS;
        for (g, value) in input.values.iter().enumerate() {
            let (row, base) = self.group(start_row, g);
            env.copy(*value, self.binding.witness(base, row))?;

            if let Some(assignment) = env.witness() {
                let v: BigUint = assignment.value(&self.binding.witness(base, row))?.into();
                let mask = BigUint::from((1u64 << RANGE_LIMB_BITS) - 1);
                let mut top = F::zero();
                for i in 0..limbs {
                    let limb = F::from((&v >> (RANGE_LIMB_BITS * i)) & &mask);
                    assignment.assign(&self.binding.witness(base + 1 + i, row), limb)?;
                    top = limb;
                }
                if remainder != 0 {
                    let shifted = top * F::from(1u64 << (RANGE_LIMB_BITS - remainder));
                    assignment.assign(&self.binding.witness(base + 1 + limbs, row), shifted)?;
                }
            }
        }

        let rows = Component::<F>::rows_amount(self);
        if rows > 0 {
            let key = self
                .binding
                .selector_key(&format!("range_check/{}/{}", self.bits, self.groups_per_row));
            for row in start_row..start_row + rows {
                env.gate(&key, row, |circuit| {
                    let table = circuit.reserve_table(RANGE_16BIT)?;
                    Ok(self.gate_definition(table))
                })?;
            }
        }
        Ok(())
    }
}
