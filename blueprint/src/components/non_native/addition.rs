//! Non-native modular addition: `z = x + y mod p`.

//~ The component stores, as a linear block of `5k + 1` cells,
//~
//~ | `0..k` | `k..2k` | `2k..3k` | `3k..4k` | `4k..5k` | `5k` |
//~ |:------:|:-------:|:--------:|:--------:|:--------:|:----:|
//~ |   x    |    y    |    pp    |    z     |    c     |  q   |
//~
//~ then range checks `z` and checks it is below `p`. The gate enforces
//~
//~ * $x_i + y_i + q \cdot pp_i + c_{i-1} - z_i - c_i B = 0$ for every chunk
//~ * $c_i (c_i - 1)(c_i - 2) = 0$
//~ * $q (q - 1) = 0$
//~ * $c_{k-1} - q = 0$
//~
//~ that is `x + y + q pp = z + q 2^(k b)`, or `x + y = z + q p`.

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
pub struct AdditionInput {
    pub x: Vec<Var>,
    pub y: Vec<Var>,
    pub modulus: ModulusVars,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdditionOutput {
    pub z: Vec<Var>,
}

#[derive(Clone, Debug)]
pub struct Addition<F> {
    binding: ColumnBinding,
    params: ChunkParams,
    check: CanonicalCheck<F>,
}

impl<F: PrimeField> Addition<F> {
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
        layout::rows_for(5 * self.params.chunk_count + 1, self.binding.witness_amount())
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let k = self.params.chunk_count;
        let base = F::from(two_to(self.params.chunk_bits));
        let cell = |i| self.binding.block_expr::<F>(i);
        let q = cell(5 * k);

        let mut constraints = vec![];
        for i in 0..k {
            let carry = cell(4 * k + i);
            let carry_in = if i == 0 { Expr::zero() } else { cell(4 * k + i - 1) };
            constraints.push(
                cell(i) + cell(k + i) + q.clone() * cell(2 * k + i) + carry_in
                    - cell(3 * k + i)
                    - carry.clone().scale(base),
            );
            constraints.push(
                carry.clone()
                    * (carry.clone() - Expr::one())
                    * (carry - Expr::constant(F::from(2u64))),
            );
        }
        constraints.push(q.clone() * (q.clone() - Expr::one()));
        constraints.push(cell(5 * k - 1) - q);
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for Addition<F> {
    type Input = AdditionInput;
    type Output = AdditionOutput;

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.params)
    }

    fn rows_amount(&self) -> usize {
        self.block_rows() + self.check.rows_amount()
    }

    fn result(&self, start_row: usize) -> AdditionOutput {
        let k = self.params.chunk_count;
        AdditionOutput {
            z: (3 * k..4 * k)
                .map(|i| self.binding.block_cell(start_row, i))
                .collect(),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &AdditionInput,
        start_row: usize,
    ) -> Result<AdditionOutput> {
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
        let (x, y, pp) = (cells(0, k), cells(k, k), cells(2 * k, k));
        let (c, q) = (cells(4 * k, k), cells(5 * k, 1));
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

            let sum = compose(&x_chunks, b) + compose(&y_chunks, b);
            let (quotient, z) = if sum >= p {
                (BigUint::one(), sum - &p)
            } else {
                (BigUint::zero(), sum)
            };
            let z_chunks = decompose(&z, k, b)?;
            let lhs: Vec<BigUint> = (0..k)
                .map(|i| &x_chunks[i] + &y_chunks[i] + &quotient * &pp_chunks[i])
                .collect();
            let c_chunks = carries(&lhs, &z_chunks, b);

            write_chunks(assignment, &output.z, &z_chunks)?;
            write_chunks(assignment, &c, &c_chunks)?;
            write_chunks(assignment, &q, &[quotient])?;
        }

        let key = self
            .binding
            .selector_key(&format!("add_mod_p/{}/{}", k, b));
        env.gate(&key, block, |_| Ok(self.gate_definition()))?;

        self.check.synthesize(env, &mut cursor, &output.z, &pp)?;

        cursor.finish(Component::<F>::rows_amount(self))?;
        Ok(output)
    }
}
