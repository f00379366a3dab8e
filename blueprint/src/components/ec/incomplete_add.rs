//! Incomplete addition `R = P + Q` of non-native curve points, `P != ±Q`.

//~ The component witnesses the slope and the sum in its own first block of
//~ `3k` cells,
//~
//~ | `0..k` | `k..2k` | `2k..3k` |
//~ |:------:|:-------:|:--------:|
//~ | lambda |   x_R   |   y_R    |
//~
//~ checks each of them canonical, and then proves with the non-native
//~ primitives
//~
//~ * $\lambda (x_Q - x_P) = y_Q - y_P$
//~ * $\lambda^2 = x_R + x_P + x_Q$
//~ * $\lambda (x_P - x_R) = y_R + y_P$
//~
//~ as eleven chained steps whose results are tied back to the inputs and to
//~ each other by copy constraints. Callers must ensure $x_P \neq x_Q$: the
//~ slope is then zero, so $P = -Q$ fails verification while $P = Q$ yields a
//~ satisfying assignment of the meaningless point $(-2 x_P, -y_P)$.

use crate::{
    circuits::{
        assignment::Assignment,
        component::{ColumnBinding, Component, ComponentEnv},
        layout::{self, RowCursor},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::{
        ec::PointVars,
        non_native::{
            chunks::compose, expect_chunks, read_chunks, write_chunks, Addition, AdditionInput,
            CanonicalCheck, ChunkParams, ModulusVars, Multiplication, MultiplicationInput,
            Negation, NegationInput,
        },
    },
    error::{ComponentError, Result},
};
use ark_ff::{PrimeField, Zero};
use log::debug;
use num_bigint::BigUint;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncompleteAddInput {
    pub p: PointVars,
    pub q: PointVars,
    pub modulus: ModulusVars,
}

#[derive(Clone, Debug)]
pub struct IncompleteAdd<F> {
    binding: ColumnBinding,
    params: ChunkParams,
    check: CanonicalCheck<F>,
    add: Addition<F>,
    neg: Negation<F>,
    mul: Multiplication<F>,
}

/// `(a - b) mod p` for canonical `a`, `b`
fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a + p - b) % p
}

impl<F: PrimeField> IncompleteAdd<F> {
    pub fn new(binding: ColumnBinding, params: ChunkParams) -> Result<Self> {
        Self::manifest_for(params).check(&binding)?;
        let component = Self {
            check: CanonicalCheck::new(&binding, params)?,
            add: Addition::new(binding.clone(), params)?,
            neg: Negation::new(binding.clone(), params)?,
            mul: Multiplication::new(binding.clone(), params)?,
            binding,
            params,
        };
        debug!(
            "incomplete addition over {} chunks of {} bits: {} rows on {} columns",
            params.chunk_count,
            params.chunk_bits,
            Component::<F>::rows_amount(&component),
            component.binding.witness_amount()
        );
        Ok(component)
    }

    pub fn manifest_for(params: ChunkParams) -> Manifest {
        Manifest::new(WitnessRange::at_least(1))
            .merge(&CanonicalCheck::<F>::manifest_for(params))
            .merge(&Addition::<F>::manifest_for(params))
            .merge(&Negation::<F>::manifest_for(params))
            .merge(&Multiplication::<F>::manifest_for(params))
    }

    fn block_rows(&self) -> usize {
        layout::rows_for(3 * self.params.chunk_count, self.binding.witness_amount())
    }

    /// Slope and sum, all reduced mod `p`
    fn witness_sum(
        &self,
        assignment: &Assignment<F>,
        input: &IncompleteAddInput,
    ) -> Result<[Vec<BigUint>; 3]> {
        let b = self.params.chunk_bits;
        let p = compose(&read_chunks(assignment, &input.modulus.p)?, b);
        if p.is_zero() {
            return Err(ComponentError::InvalidParameters("zero modulus".into()));
        }
        let read = |vars: &[Var]| -> Result<BigUint> {
            Ok(compose(&read_chunks(assignment, vars)?, b) % &p)
        };
        let (xp, yp) = (read(&input.p.x)?, read(&input.p.y)?);
        let (xq, yq) = (read(&input.q.x)?, read(&input.q.y)?);

        // x_Q = x_P has no inverse, the slope falls back to zero
        let two = BigUint::from(2u32);
        let exponent = if p > two { &p - &two } else { BigUint::zero() };
        let inverse = sub_mod(&xq, &xp, &p).modpow(&exponent, &p);
        let lambda = sub_mod(&yq, &yp, &p) * inverse % &p;

        let xr = sub_mod(&sub_mod(&(&lambda * &lambda % &p), &xp, &p), &xq, &p);
        let yr = sub_mod(&(&lambda * sub_mod(&xp, &xr, &p) % &p), &yp, &p);

        Ok([
            self.params.decompose(&lambda)?,
            self.params.decompose(&xr)?,
            self.params.decompose(&yr)?,
        ])
    }
}

impl<F: PrimeField> Component<F> for IncompleteAdd<F> {
    type Input = IncompleteAddInput;
    type Output = PointVars;

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.params)
    }

    fn rows_amount(&self) -> usize {
        self.block_rows()
            + 3 * self.check.rows_amount()
            + 2 * self.neg.rows_amount()
            + 6 * self.add.rows_amount()
            + 3 * self.mul.rows_amount()
    }

    fn result(&self, start_row: usize) -> PointVars {
        let k = self.params.chunk_count;
        let cells = |from: usize| -> Vec<Var> {
            (from..from + k)
                .map(|i| self.binding.block_cell(start_row, i))
                .collect()
        };
        PointVars {
            x: cells(k),
            y: cells(2 * k),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &IncompleteAddInput,
        start_row: usize,
    ) -> Result<PointVars> {
        let k = self.params.chunk_count;
        for (name, vars) in [
            ("x_P", &input.p.x),
            ("y_P", &input.p.y),
            ("x_Q", &input.q.x),
            ("y_Q", &input.q.y),
            ("p", &input.modulus.p),
            ("pp", &input.modulus.pp),
        ] {
            expect_chunks(name, vars, k)?;
        }
        let modulus = &input.modulus;

        let mut cursor = RowCursor::new(start_row);
        let block = cursor.reserve(self.block_rows()).start;
        let lambda: Vec<Var> = (0..k).map(|i| self.binding.block_cell(block, i)).collect();
        let output = self.result(block);

        if let Some(assignment) = env.witness() {
            let [lambda_chunks, xr_chunks, yr_chunks] = self.witness_sum(assignment, input)?;
            write_chunks(assignment, &lambda, &lambda_chunks)?;
            write_chunks(assignment, &output.x, &xr_chunks)?;
            write_chunks(assignment, &output.y, &yr_chunks)?;
        }

        for value in [&lambda, &output.x, &output.y] {
            self.check.synthesize(env, &mut cursor, value, &modulus.pp)?;
        }

        let neg = |env: &mut E, cursor: &mut RowCursor, x: &[Var]| {
            let rows = cursor.reserve(self.neg.rows_amount());
            let input = NegationInput {
                x: x.to_vec(),
                modulus: modulus.clone(),
            };
            env.apply(&self.neg, &input, rows.start).map(|out| out.y)
        };
        let add = |env: &mut E, cursor: &mut RowCursor, x: &[Var], y: &[Var]| {
            let rows = cursor.reserve(self.add.rows_amount());
            let input = AdditionInput {
                x: x.to_vec(),
                y: y.to_vec(),
                modulus: modulus.clone(),
            };
            env.apply(&self.add, &input, rows.start).map(|out| out.z)
        };
        let mul = |env: &mut E, cursor: &mut RowCursor, x: &[Var], y: &[Var]| {
            let rows = cursor.reserve(self.mul.rows_amount());
            let input = MultiplicationInput {
                x: x.to_vec(),
                y: y.to_vec(),
                modulus: modulus.clone(),
            };
            env.apply(&self.mul, &input, rows.start).map(|out| out.r)
        };
        let equate = |env: &mut E, left: &[Var], right: &[Var]| -> Result<()> {
            left.iter()
                .zip(right)
                .try_for_each(|(l, r)| env.equate(*l, *r))
        };

        // lambda (x_Q - x_P) + y_P = y_Q
        let t1 = neg(env, &mut cursor, &input.p.x)?;
        let t2 = add(env, &mut cursor, &input.q.x, &t1)?;
        let t3 = mul(env, &mut cursor, &t2, &lambda)?;
        let t4 = add(env, &mut cursor, &t3, &input.p.y)?;
        equate(env, &t4, &input.q.y)?;

        // x_R + x_P + x_Q = lambda^2
        let t5 = add(env, &mut cursor, &output.x, &input.p.x)?;
        let t6 = add(env, &mut cursor, &t5, &input.q.x)?;
        let t7 = mul(env, &mut cursor, &lambda, &lambda)?;
        equate(env, &t6, &t7)?;

        // y_R + y_P = lambda (x_P - x_R)
        let t8 = add(env, &mut cursor, &output.y, &input.p.y)?;
        let t9 = neg(env, &mut cursor, &output.x)?;
        let t10 = add(env, &mut cursor, &input.p.x, &t9)?;
        let t11 = mul(env, &mut cursor, &lambda, &t10)?;
        equate(env, &t8, &t11)?;

        cursor.finish(Component::<F>::rows_amount(self))?;
        Ok(output)
    }
}
