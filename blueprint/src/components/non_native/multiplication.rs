//! Non-native modular multiplication: `r = x y mod p`.

//~ The product is witnessed as `x y = q p + r`, rewritten without
//~ subtraction as `x y + q pp = r + q 2^(k b)`. The component stores, as a
//~ linear block of `7k - 1` cells,
//~
//~ | `0..k` | `k..2k` | `2k..3k` | `3k..4k` | `4k..5k` | `5k..7k-1` |
//~ |:------:|:-------:|:--------:|:--------:|:--------:|:----------:|
//~ |   x    |    y    |    pp    |    q     |    r     |     c      |
//~
//~ and checks the identity one schoolbook column at a time: for every
//~ position `n` in `0..2k`,
//~
//~ $$\sum_{i + j = n} (x_i y_j + q_i pp_j) + c_{n-1} - R_n - c_n B = 0$$
//~
//~ where `R_n = r_n` below `k`, `R_n = q_{n-k}` above, and $c_{2k-1} = 0$.
//~ It then range checks `q` and `r` on `b` bits, the carries on
//~ `b + ceil(log2(2k)) + 1` bits, and checks `r < p`.

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
            check_mod_p::{CheckModP, CheckModPInput},
            chunks::{carries, ceil_log2, compose, decompose, two_to},
            expect_chunks, read_chunks, write_chunks, ChunkParams, ModulusVars,
        },
        range_check::{RangeCheck, RangeCheckInput},
    },
    error::{ComponentError, Result},
};
use ark_ff::{PrimeField, Zero};
use itertools::Itertools;
use num_bigint::BigUint;
use num_integer::Integer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplicationInput {
    pub x: Vec<Var>,
    pub y: Vec<Var>,
    pub modulus: ModulusVars,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplicationOutput {
    pub r: Vec<Var>,
}

#[derive(Clone, Debug)]
pub struct Multiplication<F> {
    binding: ColumnBinding,
    params: ChunkParams,
    chunk_range: RangeCheck<F>,
    carry_range: RangeCheck<F>,
    check_mod_p: CheckModP<F>,
}

/// Bits needed by a carry of the schoolbook product
fn carry_bits(params: ChunkParams) -> usize {
    params.chunk_bits + ceil_log2(2 * params.chunk_count) + 1
}

impl<F: PrimeField> Multiplication<F> {
    pub fn new(binding: ColumnBinding, params: ChunkParams) -> Result<Self> {
        let bits = carry_bits(params) + params.chunk_bits + 2;
        let capacity = F::MODULUS_BIT_SIZE as usize;
        if bits > capacity {
            return Err(ComponentError::BitsExceedFieldCapacity { bits, capacity });
        }
        Self::manifest_for(params).check(&binding)?;

        let k = params.chunk_count;
        Ok(Self {
            chunk_range: RangeCheck::new(binding.clone(), 2 * k, params.chunk_bits)?,
            carry_range: RangeCheck::new(binding.clone(), 2 * k - 1, carry_bits(params))?,
            check_mod_p: CheckModP::new(binding.clone(), params)?,
            binding,
            params,
        })
    }

    pub fn manifest_for(params: ChunkParams) -> Manifest {
        Manifest::new(WitnessRange::at_least(1))
            .with_gates(1)
            .merge(&RangeCheck::<F>::manifest_for(params.chunk_bits))
            .merge(&RangeCheck::<F>::manifest_for(carry_bits(params)))
            .merge(&CheckModP::<F>::manifest_for(params))
    }

    fn block_rows(&self) -> usize {
        layout::rows_for(7 * self.params.chunk_count - 1, self.binding.witness_amount())
    }

    /// Index pairs `(i, j)` with `i + j = n`, grouped by `n`
    fn positions(k: usize) -> Vec<Vec<(usize, usize)>> {
        let mut positions = vec![vec![]; 2 * k];
        for (i, j) in (0..k).cartesian_product(0..k) {
            positions[i + j].push((i, j));
        }
        positions
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let k = self.params.chunk_count;
        let base = F::from(two_to(self.params.chunk_bits));
        let cell = |i| self.binding.block_expr::<F>(i);
        let (x, y, pp, q, r, c) = (0, k, 2 * k, 3 * k, 4 * k, 5 * k);

        let constraints = Self::positions(k)
            .into_iter()
            .enumerate()
            .map(|(n, pairs)| {
                let products: Expr<F> = pairs
                    .into_iter()
                    .map(|(i, j)| cell(x + i) * cell(y + j) + cell(q + i) * cell(pp + j))
                    .sum();
                let carry_in = if n == 0 { Expr::zero() } else { cell(c + n - 1) };
                let carry_out = if n == 2 * k - 1 {
                    Expr::zero()
                } else {
                    cell(c + n).scale(base)
                };
                let expected = if n < k { cell(r + n) } else { cell(q + n - k) };
                products + carry_in - expected - carry_out
            })
            .collect();
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for Multiplication<F> {
    type Input = MultiplicationInput;
    type Output = MultiplicationOutput;

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.params)
    }

    fn rows_amount(&self) -> usize {
        self.block_rows()
            + self.chunk_range.rows_amount()
            + self.carry_range.rows_amount()
            + self.check_mod_p.rows_amount()
    }

    fn result(&self, start_row: usize) -> MultiplicationOutput {
        let k = self.params.chunk_count;
        MultiplicationOutput {
            r: (4 * k..5 * k)
                .map(|i| self.binding.block_cell(start_row, i))
                .collect(),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &MultiplicationInput,
        start_row: usize,
    ) -> Result<MultiplicationOutput> {
        let k = self.params.chunk_count;
        let b = self.params.chunk_bits;
        for (name, vars) in [
            ("x", &input.x),
            ("y", &input.y),
            ("p", &input.modulus.p),
            ("pp", &input.modulus.pp),
        ] {
            expect_chunks(name, vars, k)?;
        }

        let mut cursor = RowCursor::new(start_row);
        let block = cursor.reserve(self.block_rows()).start;
        let cells = |from: usize, len: usize| -> Vec<Var> {
            (from..from + len)
                .map(|i| self.binding.block_cell(block, i))
                .collect()
        };
        let (x, y, pp, q) = (cells(0, k), cells(k, k), cells(2 * k, k), cells(3 * k, k));
        let c = cells(5 * k, 2 * k - 1);
        let output = self.result(block);

        for i in 0..k {
            env.copy(input.x[i], x[i])?;
            env.copy(input.y[i], y[i])?;
            env.copy(input.modulus.pp[i], pp[i])?;
        }

        if let Some(assignment) = env.witness() {
            let p = compose(&read_chunks(assignment, &input.modulus.p)?, b);
            let x_chunks = read_chunks(assignment, &x)?;
            let y_chunks = read_chunks(assignment, &y)?;
            let pp_chunks = read_chunks(assignment, &pp)?;

            if p.is_zero() {
                return Err(ComponentError::InvalidParameters("zero modulus".into()));
            }
            let product = compose(&x_chunks, b) * compose(&y_chunks, b);
            let (quotient, remainder) = product.div_rem(&p);
            let q_chunks = decompose(&quotient, k, b)?;
            let r_chunks = decompose(&remainder, k, b)?;

            let lhs: Vec<BigUint> = Self::positions(k)
                .into_iter()
                .map(|pairs| {
                    pairs
                        .into_iter()
                        .map(|(i, j)| &x_chunks[i] * &y_chunks[j] + &q_chunks[i] * &pp_chunks[j])
                        .sum()
                })
                .collect();
            let rhs: Vec<BigUint> = r_chunks.iter().chain(&q_chunks).cloned().collect();
            let c_chunks = carries(&lhs, &rhs, b);

            write_chunks(assignment, &q, &q_chunks)?;
            write_chunks(assignment, &output.r, &r_chunks)?;
            write_chunks(assignment, &c, &c_chunks[..2 * k - 1])?;
        }

        let key = self.binding.selector_key(&format!("mul_mod_p/{k}/{b}"));
        env.gate(&key, block, |_| Ok(self.gate_definition()))?;

        let rows = cursor.reserve(self.chunk_range.rows_amount());
        let values = q.iter().chain(&output.r).copied().collect();
        env.apply(&self.chunk_range, &RangeCheckInput { values }, rows.start)?;

        let rows = cursor.reserve(self.carry_range.rows_amount());
        env.apply(&self.carry_range, &RangeCheckInput { values: c }, rows.start)?;

        let rows = cursor.reserve(self.check_mod_p.rows_amount());
        let input = CheckModPInput {
            x: output.r.clone(),
            pp,
        };
        env.apply(&self.check_mod_p, &input, rows.start)?;

        cursor.finish(Component::<F>::rows_amount(self))?;
        Ok(output)
    }
}
