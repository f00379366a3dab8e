//! Packing bits into a field element, and the reverse.

//~ `N` bits are spread over `ceil(N / m)` rows of `m = W - 2` bits each,
//~
//~ |   0    | 1 ... m |   m+1   |
//~ |:------:|:-------:|:-------:|
//~ | acc_in |  bits   | acc_out |
//~
//~ most significant bit first. When `m` does not divide `N`, the first row
//~ starts with zero padding bits, which are copied from a constant zero cell
//~ together with the first `acc_in`. Every other `acc_in` is copied from the
//~ previous row's `acc_out`, and the last `acc_out` holds the packed value.
//~
//~ The gate enforces on every row
//~
//~ * $acc\_out - (acc\_in \cdot 2^m + \sum_j bit_j \cdot 2^{m - 1 - j}) = 0$
//~ * $bit_j (bit_j - 1) = 0$ for every bit, when the bits are not already
//~   known to be boolean

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        layout,
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    error::{ComponentError, Result},
};
use ark_ff::PrimeField;
use core::marker::PhantomData;
use log::debug;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Order in which bits are given to, or returned by, the component
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum BitOrder {
    /// Most significant bit first
    Msb,
    /// Least significant bit first
    Lsb,
}

/// Row layout shared by composition and decomposition
#[derive(Clone, Debug)]
struct BitRows<F> {
    binding: ColumnBinding,
    bits_amount: usize,
    bits_per_row: usize,
    _field: PhantomData<F>,
}

impl<F: PrimeField> BitRows<F> {
    fn new(binding: ColumnBinding, bits_amount: usize) -> Result<Self> {
        if bits_amount == 0 {
            return Err(ComponentError::InvalidParameters(
                "bit composition of zero bits".into(),
            ));
        }
        let capacity = F::MODULUS_BIT_SIZE as usize - 1;
        if bits_amount > capacity {
            return Err(ComponentError::BitsExceedFieldCapacity {
                bits: bits_amount,
                capacity,
            });
        }
        Self::manifest_for().check(&binding)?;
        let bits_per_row = binding.witness_amount() - 2;
        Ok(Self {
            binding,
            bits_amount,
            bits_per_row,
            _field: PhantomData,
        })
    }

    fn manifest_for() -> Manifest {
        Manifest::new(WitnessRange::at_least(3))
            .with_gates(1)
            .with_constant()
    }

    fn rows_amount(&self) -> usize {
        layout::rows_for(self.bits_amount, self.bits_per_row)
    }

    fn padding(&self) -> usize {
        self.rows_amount() * self.bits_per_row - self.bits_amount
    }

    /// Cell of padded bit `position`, most significant first
    fn slot(&self, start_row: usize, position: usize) -> Var {
        let (column, row) = layout::cell(start_row, position, self.bits_per_row);
        self.binding.witness(1 + column, row)
    }

    /// Cell of bit `i` in most significant first order
    fn bit(&self, start_row: usize, i: usize) -> Var {
        self.slot(start_row, self.padding() + i)
    }

    fn acc_in(&self, row: usize) -> Var {
        self.binding.witness(0, row)
    }

    fn acc_out(&self, row: usize) -> Var {
        self.binding.witness(self.bits_per_row + 1, row)
    }

    fn zero(&self, start_row: usize) -> Var {
        self.binding.constant(0, start_row)
    }

    fn gate_definition(&self, check_bits: bool) -> GateDefinition<F> {
        let m = self.bits_per_row;
        let mut power = F::one();
        let mut packed = Expr::zero();
        let mut constraints = vec![];
        for j in (0..m).rev() {
            let bit = self.binding.w::<F>(1 + j, 0);
            packed = packed + bit.clone().scale(power);
            power.double_in_place();
            if check_bits {
                constraints.push(bit.clone() * (bit - Expr::one()));
            }
        }
        // power is now 2^m
        let acc_in = self.binding.w::<F>(0, 0);
        let acc_out = self.binding.w::<F>(m + 1, 0);
        constraints.insert(0, acc_out - (acc_in.scale(power) + packed));
        GateDefinition::new(constraints)
    }

    /// Zero cell, padding and first accumulator
    fn place_padding<E: ComponentEnv<F>>(&self, env: &mut E, start_row: usize) -> Result<()> {
        let zero = self.zero(start_row);
        env.fix(zero, F::zero())?;
        for position in 0..self.padding() {
            env.copy(zero, self.slot(start_row, position))?;
        }
        env.copy(zero, self.acc_in(start_row))
    }

    /// Accumulates every row once its bits are in place
    fn place_rows<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        start_row: usize,
        check_bits: bool,
    ) -> Result<Var> {
        let m = self.bits_per_row;
        let key = self
            .binding
            .selector_key(&format!("bit_composition/{m}/{check_bits}"));
        let rows = self.rows_amount();
        for row in start_row..start_row + rows {
            if let Some(assignment) = env.witness() {
                let mut acc = assignment.value(&self.acc_in(row))?;
                for j in 0..m {
                    acc.double_in_place();
                    acc += assignment.value(&self.binding.witness(1 + j, row))?;
                }
                assignment.assign(&self.acc_out(row), acc)?;
            }
            if row + 1 < start_row + rows {
                env.copy(self.acc_out(row), self.acc_in(row + 1))?;
            }
            env.gate(&key, row, |_| Ok(self.gate_definition(check_bits)))?;
        }
        Ok(self.acc_out(start_row + rows - 1))
    }
}

/// Input bits, in the component's [`BitOrder`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitCompositionInput {
    pub bits: Vec<Var>,
}

/// Packs `N` bits into one field element
#[derive(Clone, Debug)]
pub struct BitComposition<F> {
    rows: BitRows<F>,
    order: BitOrder,
    check_input: bool,
}

impl<F: PrimeField> BitComposition<F> {
    /// With `check_input` every bit is also constrained to be boolean
    pub fn new(
        binding: ColumnBinding,
        bits_amount: usize,
        order: BitOrder,
        check_input: bool,
    ) -> Result<Self> {
        let rows = BitRows::new(binding, bits_amount)?;
        debug!(
            "bit composition of {bits_amount} bits ({order}): {} rows",
            rows.rows_amount()
        );
        Ok(Self {
            rows,
            order,
            check_input,
        })
    }

    pub fn manifest_for() -> Manifest {
        BitRows::<F>::manifest_for()
    }
}

impl<F: PrimeField> Component<F> for BitComposition<F> {
    type Input = BitCompositionInput;
    type Output = Var;

    fn binding(&self) -> &ColumnBinding {
        &self.rows.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for()
    }

    fn rows_amount(&self) -> usize {
        self.rows.rows_amount()
    }

    fn result(&self, start_row: usize) -> Var {
        self.rows.acc_out(start_row + self.rows.rows_amount() - 1)
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &BitCompositionInput,
        start_row: usize,
    ) -> Result<Var> {
        let n = self.rows.bits_amount;
        if input.bits.len() != n {
            return Err(ComponentError::InvalidParameters(format!(
                "expected {n} bits, got {}",
                input.bits.len()
            )));
        }

        self.rows.place_padding(env, start_row)?;
        for i in 0..n {
            let source = match self.order {
                BitOrder::Msb => input.bits[i],
                BitOrder::Lsb => input.bits[n - 1 - i],
            };
            env.copy(source, self.rows.bit(start_row, i))?;
        }
        self.rows.place_rows(env, start_row, self.check_input)
    }
}

/// Value to split
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitDecompositionInput {
    pub value: Var,
}

/// Splits a field element into `N` boolean cells.
/// Values of `N` bits or more yield an assignment that fails verification.
#[derive(Clone, Debug)]
pub struct BitDecomposition<F> {
    rows: BitRows<F>,
    order: BitOrder,
}

impl<F: PrimeField> BitDecomposition<F> {
    pub fn new(binding: ColumnBinding, bits_amount: usize, order: BitOrder) -> Result<Self> {
        Ok(Self {
            rows: BitRows::new(binding, bits_amount)?,
            order,
        })
    }

    pub fn manifest_for() -> Manifest {
        BitRows::<F>::manifest_for()
    }
}

impl<F: PrimeField> Component<F> for BitDecomposition<F> {
    type Input = BitDecompositionInput;
    type Output = Vec<Var>;

    fn binding(&self) -> &ColumnBinding {
        &self.rows.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for()
    }

    fn rows_amount(&self) -> usize {
        self.rows.rows_amount()
    }

    fn result(&self, start_row: usize) -> Vec<Var> {
        let n = self.rows.bits_amount;
        let msb_first = (0..n).map(|i| self.rows.bit(start_row, i));
        match self.order {
            BitOrder::Msb => msb_first.collect(),
            BitOrder::Lsb => msb_first.rev().collect(),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &BitDecompositionInput,
        start_row: usize,
    ) -> Result<Vec<Var>> {
        let n = self.rows.bits_amount;
        self.rows.place_padding(env, start_row)?;

        if let Some(assignment) = env.witness() {
            let value: BigUint = assignment.value(&input.value)?.into();
            for i in 0..n {
                let bit = value.bit((n - 1 - i) as u64);
                assignment.assign(&self.rows.bit(start_row, i), F::from(u64::from(bit)))?;
            }
        }

        let packed = self.rows.place_rows(env, start_row, true)?;
        env.copy(input.value, packed)?;
        Ok(self.result(start_row))
    }
}
