//! Modular arithmetic over values of a non-native field.
//!
//! Values of a field with modulus `p` (possibly larger than the native one)
//! are stored as `k` chunks of `b` bits. Reductions modulo `p` are turned
//! into additions of `pp = 2^(k b) - p`, so every gate is an exact integer
//! identity checked position by position with small carries. The caller
//! provides `p` and `pp` as chunked cells, typically public inputs or
//! constants.

pub mod addition;
pub mod check_mod_p;
pub mod chunks;
pub mod multiplication;
pub mod negation;

use crate::{
    circuits::{
        assignment::Assignment,
        component::{ColumnBinding, Component, ComponentEnv},
        layout::RowCursor,
        manifest::Manifest,
        var::Var,
    },
    components::range_check::{RangeCheck, RangeCheckInput},
    error::{ComponentError, Result},
};
use ark_ec::AffineRepr;
use ark_ff::PrimeField;
use chunks::{complement, decompose, to_field_chunks};
use num_bigint::{BigUint, RandBigInt};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use addition::{Addition, AdditionInput, AdditionOutput};
pub use check_mod_p::{CheckModP, CheckModPInput};
pub use multiplication::{Multiplication, MultiplicationInput, MultiplicationOutput};
pub use negation::{Negation, NegationInput, NegationOutput};

/// Shape of the chunked representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkParams {
    pub chunk_count: usize,
    pub chunk_bits: usize,
}

impl ChunkParams {
    pub fn new(chunk_count: usize, chunk_bits: usize) -> Result<Self> {
        if chunk_count == 0 || chunk_bits == 0 {
            return Err(ComponentError::InvalidParameters(format!(
                "{chunk_count} chunks of {chunk_bits} bits"
            )));
        }
        Ok(Self {
            chunk_count,
            chunk_bits,
        })
    }

    /// Total number of bits, `k b`
    pub fn total_bits(&self) -> usize {
        self.chunk_count * self.chunk_bits
    }

    /// Chunks of `value`, as integers
    pub fn decompose(&self, value: &BigUint) -> Result<Vec<BigUint>> {
        decompose(value, self.chunk_count, self.chunk_bits)
    }

    /// Chunks of `value`, as native field elements
    pub fn to_field_chunks<F: PrimeField>(&self, value: &BigUint) -> Result<Vec<F>> {
        to_field_chunks(value, self.chunk_count, self.chunk_bits)
    }

    /// Chunks of `p` and of `pp = 2^(k b) - p`
    pub fn modulus_chunks<F: PrimeField>(&self, modulus: &BigUint) -> Result<(Vec<F>, Vec<F>)> {
        let pp = complement(modulus, self.chunk_count, self.chunk_bits)?;
        Ok((
            self.to_field_chunks(modulus)?,
            self.to_field_chunks(&pp)?,
        ))
    }

    /// Chunked affine coordinates of a point, `None` at infinity
    pub fn point_chunks<F, G>(&self, point: &G) -> Result<Option<(Vec<F>, Vec<F>)>>
    where
        F: PrimeField,
        G: AffineRepr,
        G::BaseField: PrimeField,
    {
        match point.xy() {
            Some((x, y)) => {
                let x: BigUint = (*x).into();
                let y: BigUint = (*y).into();
                Ok(Some((self.to_field_chunks(&x)?, self.to_field_chunks(&y)?)))
            }
            None => Ok(None),
        }
    }
}

/// Uniformly random integer below `modulus`
pub fn random_below<R: Rng + ?Sized>(rng: &mut R, modulus: &BigUint) -> BigUint {
    rng.gen_biguint_below(modulus)
}

/// Cells holding the modulus and its complement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModulusVars {
    pub p: Vec<Var>,
    pub pp: Vec<Var>,
}

/// Integer values of chunk cells
pub(crate) fn read_chunks<F: PrimeField>(
    assignment: &Assignment<F>,
    vars: &[Var],
) -> Result<Vec<BigUint>> {
    vars.iter()
        .map(|var| assignment.value(var).map(Into::into))
        .collect()
}

/// Writes integer values into chunk cells
pub(crate) fn write_chunks<F: PrimeField>(
    assignment: &mut Assignment<F>,
    vars: &[Var],
    values: &[BigUint],
) -> Result<()> {
    for (var, value) in vars.iter().zip(values) {
        assignment.assign(var, F::from(value.clone()))?;
    }
    Ok(())
}

/// Rejects inputs that do not have one cell per chunk
pub(crate) fn expect_chunks(name: &str, vars: &[Var], chunk_count: usize) -> Result<()> {
    if vars.len() == chunk_count {
        Ok(())
    } else {
        Err(ComponentError::InvalidParameters(format!(
            "{name} has {} chunks, expected {chunk_count}",
            vars.len()
        )))
    }
}

/// Range check of every chunk on `b` bits followed by [`CheckModP`]:
/// what every chunked value must go through before it is trusted downstream
#[derive(Clone, Debug)]
pub(crate) struct CanonicalCheck<F> {
    range_check: RangeCheck<F>,
    check_mod_p: CheckModP<F>,
}

impl<F: PrimeField> CanonicalCheck<F> {
    pub(crate) fn new(binding: &ColumnBinding, params: ChunkParams) -> Result<Self> {
        Ok(Self {
            range_check: RangeCheck::new(binding.clone(), params.chunk_count, params.chunk_bits)?,
            check_mod_p: CheckModP::new(binding.clone(), params)?,
        })
    }

    pub(crate) fn manifest_for(params: ChunkParams) -> Manifest {
        RangeCheck::<F>::manifest_for(params.chunk_bits).merge(&CheckModP::<F>::manifest_for(params))
    }

    pub(crate) fn rows_amount(&self) -> usize {
        self.range_check.rows_amount() + self.check_mod_p.rows_amount()
    }

    pub(crate) fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        cursor: &mut RowCursor,
        value: &[Var],
        pp: &[Var],
    ) -> Result<()> {
        let rows = cursor.reserve(self.range_check.rows_amount());
        let input = RangeCheckInput {
            values: value.to_vec(),
        };
        env.apply(&self.range_check, &input, rows.start)?;

        let rows = cursor.reserve(self.check_mod_p.rows_amount());
        let input = CheckModPInput {
            x: value.to_vec(),
            pp: pp.to_vec(),
        };
        env.apply(&self.check_mod_p, &input, rows.start)
    }
}
