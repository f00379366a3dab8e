//! Non-native modular negation: `y = -x mod p`.

//~ The component stores, as a linear block of `4k + 1` cells,
//~
//~ | `0..k` | `k..2k` | `2k..3k` | `3k..4k` | `4k` |
//~ |:------:|:-------:|:--------:|:--------:|:----:|
//~ |   x    |    pp   |    y     |    c     |  q   |
//~
//~ then checks `y` is canonical. The gate enforces
//~
//~ * $x_i + y_i + q \cdot pp_i + c_{i-1} - c_i B = 0$ for every chunk
//~ * $c_i (c_i - 1)(c_i - 2) = 0$
//~ * $q (q - 1) = 0$
//~ * $c_{k-1} - q = 0$
//~
//~ so `x + y + q pp = q 2^(k b)`: either `x = y = 0`, or `q = 1` and `x + y = p`.

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        layout::{self, RowCursor},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::non_native::{
        chunks::{carries, compose, decompose, two_to},
        expect_chunks, read_chunks, write_chunks, CanonicalCheck, ChunkParams, ModulusVars,
    },
    error::Result,
};
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegationInput {
    pub x: Vec<Var>,
    pub modulus: ModulusVars,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegationOutput {
    pub y: Vec<Var>,
}

#[derive(Clone, Debug)]
pub struct Negation<F> {
    binding: ColumnBinding,
    params: ChunkParams,
    check: CanonicalCheck<F>,
}

impl<F: PrimeField> Negation<F> {
    pub fn new(binding: ColumnBinding, params: ChunkParams) -> Result<Self> {
        Self::manifest_for(params).check(&binding)?;
        let check = CanonicalCheck::new(&binding, params)?;
        Ok(Self {
            binding,
            params,
            check,
        })
    }

    pub fn manifest_for(params: ChunkParams) -> Manifest {
        Manifest::new(WitnessRange::at_least(1))
            .with_gates(1)
            .merge(&CanonicalCheck::<F>::manifest_for(params))
    }

    fn block_rows(&self) -> usize {
        layout::rows_for(4 * self.params.chunk_count + 1, self.binding.witness_amount())
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let k = self.params.chunk_count;
        let base = F::from(two_to(self.params.chunk_bits));
        let cell = |i| self.binding.block_expr::<F>(i);
        let q = cell(4 * k);

        let mut constraints = vec![];
        for i in 0..k {
            let carry = cell(3 * k + i);
            let carry_in = if i == 0 { Expr::zero() } else { cell(3 * k + i - 1) };
            constraints.push(
                cell(i) + cell(2 * k + i) + q.clone() * cell(k + i) + carry_in
                    - carry.clone().scale(base),
            );
            constraints.push(
                carry.clone()
                    * (carry.clone() - Expr::one())
                    * (carry - Expr::constant(F::from(2u64))),
            );
        }
        constraints.push(q.clone() * (q.clone() - Expr::one()));
        constraints.push(cell(4 * k - 1) - q);
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for Negation<F> {
    type Input = NegationInput;
    type Output = NegationOutput;

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.params)
    }

    fn rows_amount(&self) -> usize {
        self.block_rows() + self.check.rows_amount()
    }

    fn result(&self, start_row: usize) -> NegationOutput {
        let k = self.params.chunk_count;
        NegationOutput {
            y: (2 * k..3 * k)
                .map(|i| self.binding.block_cell(start_row, i))
                .collect(),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &NegationInput,
        start_row: usize,
    ) -> Result<NegationOutput> {
        let k = self.params.chunk_count;
        let b = self.params.chunk_bits;
        expect_chunks("x", &input.x, k)?;
        expect_chunks("p", &input.modulus.p, k)?;
        expect_chunks("pp", &input.modulus.pp, k)?;

        let mut cursor = RowCursor::new(start_row);
        let block = cursor.reserve(self.block_rows()).start;
        let cells = |from: usize, len: usize| -> Vec<Var> {
            (from..from + len)
                .map(|i| self.binding.block_cell(block, i))
                .collect()
        };
        let (x, pp, c, q) = (cells(0, k), cells(k, k), cells(3 * k, k), cells(4 * k, 1));
        let output = self.result(block);

        for i in 0..k {
            env.copy(input.x[i], x[i])?;
            env.copy(input.modulus.pp[i], pp[i])?;
        }

        if let Some(assignment) = env.witness() {
            let p = compose(&read_chunks(assignment, &input.modulus.p)?, b);
            let x_chunks = read_chunks(assignment, &x)?;
            let pp_chunks = read_chunks(assignment, &pp)?;

            let value = compose(&x_chunks, b);
            let (quotient, y) = if value.is_zero() {
                (BigUint::zero(), BigUint::zero())
            } else {
                // a non-canonical x is left for the downstream checks to reject
                (BigUint::one(), if p >= value { &p - &value } else { BigUint::zero() })
            };
            let y_chunks = decompose(&y, k, b)?;
            let lhs: Vec<BigUint> = (0..k)
                .map(|i| &x_chunks[i] + &y_chunks[i] + &quotient * &pp_chunks[i])
                .collect();
            let zeros = vec![BigUint::zero(); k];
            let c_chunks = carries(&lhs, &zeros, b);

            write_chunks(assignment, &output.y, &y_chunks)?;
            write_chunks(assignment, &c, &c_chunks)?;
            write_chunks(assignment, &q, &[quotient])?;
        }

        let key = self.binding.selector_key(&format!("neg_mod_p/{k}/{b}"));
        env.gate(&key, block, |_| Ok(self.gate_definition()))?;

        self.check.synthesize(env, &mut cursor, &output.y, &pp)?;

        cursor.finish(Component::<F>::rows_amount(self))?;
        Ok(output)
    }
}
