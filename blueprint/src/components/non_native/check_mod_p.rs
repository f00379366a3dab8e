//! Canonical residue check: `x < p` for a chunked `x`.

//~ The component stores, as a linear block of `4k` cells,
//~
//~ | `0..k` | `k..2k` | `2k..3k` | `3k..4k` |
//~ |:------:|:-------:|:--------:|:--------:|
//~ |   x    |   pp    |    s     |    c     |
//~
//~ followed by a range check of `s` on `b` bits. With `B = 2^b` the gate enforces
//~
//~ * $x_i + pp_i + c_{i-1} - s_i - c_i B = 0$ for every chunk, with $c_{-1} = 0$
//~ * $c_i (c_i - 1) = 0$
//~ * $c_{k-1} = 0$
//~
//~ so that `x + pp = s < 2^(k b)`, which holds exactly when `x < p`.

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        layout::{self, RowCursor},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::{
        non_native::{
            chunks::{carries, compose, decompose, two_to},
            expect_chunks, read_chunks, write_chunks, ChunkParams,
        },
        range_check::{RangeCheck, RangeCheckInput},
    },
    error::Result,
};
use ark_ff::PrimeField;
use num_bigint::BigUint;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckModPInput {
    pub x: Vec<Var>,
    pub pp: Vec<Var>,
}

#[derive(Clone, Debug)]
pub struct CheckModP<F> {
    binding: ColumnBinding,
    params: ChunkParams,
    range_check: RangeCheck<F>,
}

impl<F: PrimeField> CheckModP<F> {
    pub fn new(binding: ColumnBinding, params: ChunkParams) -> Result<Self> {
        Self::manifest_for(params).check(&binding)?;
        let range_check = RangeCheck::new(binding.clone(), params.chunk_count, params.chunk_bits)?;
        Ok(Self {
            binding,
            params,
            range_check,
        })
    }

    pub fn manifest_for(params: ChunkParams) -> Manifest {
        Manifest::new(WitnessRange::at_least(1))
            .with_gates(1)
            .merge(&RangeCheck::<F>::manifest_for(params.chunk_bits))
    }

    fn block_rows(&self) -> usize {
        layout::rows_for(4 * self.params.chunk_count, self.binding.witness_amount())
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let k = self.params.chunk_count;
        let base = F::from(two_to(self.params.chunk_bits));
        let cell = |i| self.binding.block_expr::<F>(i);

        let mut constraints = vec![];
        for i in 0..k {
            let carry_in = if i == 0 { Expr::zero() } else { cell(3 * k + i - 1) };
            constraints.push(
                cell(i) + cell(k + i) + carry_in - cell(2 * k + i) - cell(3 * k + i).scale(base),
            );
            constraints.push(cell(3 * k + i) * (cell(3 * k + i) - Expr::one()));
        }
        constraints.push(cell(4 * k - 1));
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for CheckModP<F> {
    type Input = CheckModPInput;
    type Output = ();

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.params)
    }

    fn rows_amount(&self) -> usize {
        self.block_rows() + self.range_check.rows_amount()
    }

    fn result(&self, _start_row: usize) {}

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &CheckModPInput,
        start_row: usize,
    ) -> Result<()> {
        let k = self.params.chunk_count;
        expect_chunks("x", &input.x, k)?;
        expect_chunks("pp", &input.pp, k)?;

        let mut cursor = RowCursor::new(start_row);
        let block = cursor.reserve(self.block_rows()).start;
        let cells = |from: usize| -> Vec<Var> {
            (from..from + k)
                .map(|i| self.binding.block_cell(block, i))
                .collect()
        };
        let (x, pp, s, c) = (cells(0), cells(k), cells(2 * k), cells(3 * k));

        for i in 0..k {
            env.copy(input.x[i], x[i])?;
            env.copy(input.pp[i], pp[i])?;
        }

        if let Some(assignment) = env.witness() {
            let x_chunks = read_chunks(assignment, &x)?;
            let pp_chunks = read_chunks(assignment, &pp)?;
            let lhs: Vec<BigUint> = x_chunks.iter().zip(&pp_chunks).map(|(a, b)| a + b).collect();

            // keep the low k b bits, an overflow shows up as a final carry of 1
            let mask = two_to(self.params.total_bits()) - BigUint::from(1u32);
            let sum = (compose(&x_chunks, self.params.chunk_bits)
                + compose(&pp_chunks, self.params.chunk_bits))
                & mask;
            let s_chunks = decompose(&sum, k, self.params.chunk_bits)?;
            let c_chunks = carries(&lhs, &s_chunks, self.params.chunk_bits);

            write_chunks(assignment, &s, &s_chunks)?;
            write_chunks(assignment, &c, &c_chunks)?;
        }

        let key = self.binding.selector_key(&format!(
            "check_mod_p/{}/{}",
            self.params.chunk_count, self.params.chunk_bits
        ));
        env.gate(&key, block, |_| Ok(self.gate_definition()))?;

        let range = cursor.reserve(self.range_check.rows_amount());
        env.apply(&self.range_check, &RangeCheckInput { values: s }, range.start)?;

        cursor.finish(Component::<F>::rows_amount(self))
    }
}

