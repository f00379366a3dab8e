//! Chunked representation of non-native values.
//!
//! A value below `2^(k b)` is stored as `k` chunks of `b` bits, least
//! significant chunk first.

use crate::error::{ComponentError, Result};
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;
use num_integer::Integer;

/// `2^bits`
pub fn two_to(bits: usize) -> BigUint {
    BigUint::one() << bits
}

/// Splits `value` into `chunk_count` chunks of `chunk_bits` bits:
/// `chunk[i] = floor(value / B^i) mod B` with `B = 2^chunk_bits`
pub fn decompose(value: &BigUint, chunk_count: usize, chunk_bits: usize) -> Result<Vec<BigUint>> {
    if value.bits() as usize > chunk_count * chunk_bits {
        return Err(ComponentError::ValueOutOfRange(chunk_count * chunk_bits));
    }
    let mask = two_to(chunk_bits) - BigUint::one();
    Ok((0..chunk_count)
        .map(|i| (value >> (i * chunk_bits)) & &mask)
        .collect())
}

/// Inverse of [`decompose`]: folds chunks most significant first,
/// `acc = acc * B + chunk[i]`
pub fn compose(chunks: &[BigUint], chunk_bits: usize) -> BigUint {
    chunks
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, chunk| (acc << chunk_bits) + chunk)
}

/// `2^(chunk_count chunk_bits) - modulus`, the complement that turns a
/// subtraction of `modulus` into an addition
pub fn complement(modulus: &BigUint, chunk_count: usize, chunk_bits: usize) -> Result<BigUint> {
    let binary_modulus = two_to(chunk_count * chunk_bits);
    if *modulus >= binary_modulus {
        return Err(ComponentError::ValueOutOfRange(chunk_count * chunk_bits));
    }
    Ok(binary_modulus - modulus)
}

/// Chunks as native field elements
pub fn to_field_chunks<F: PrimeField>(
    value: &BigUint,
    chunk_count: usize,
    chunk_bits: usize,
) -> Result<Vec<F>> {
    Ok(decompose(value, chunk_count, chunk_bits)?
        .into_iter()
        .map(F::from)
        .collect())
}

/// Composes native field chunks back into an integer
pub fn compose_field_chunks<F: PrimeField>(chunks: &[F], chunk_bits: usize) -> BigUint {
    let chunks: Vec<BigUint> = chunks.iter().map(|chunk| (*chunk).into()).collect();
    compose(&chunks, chunk_bits)
}

/// Smallest `n` with `2^n >= value`
pub fn ceil_log2(value: usize) -> usize {
    if value <= 1 {
        0
    } else {
        (usize::BITS - (value - 1).leading_zeros()) as usize
    }
}

/// Carries of the schoolbook sum `lhs = rhs`, position by position:
/// `lhs_n + c_{n-1} = rhs_n + c_n B`.
/// Both sides must agree as integers, which makes every carry a
/// non-negative integer.
pub fn carries(lhs: &[BigUint], rhs: &[BigUint], chunk_bits: usize) -> Vec<BigUint> {
    let mut carry = BigUint::zero();
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| {
            let total = l + &carry;
            // an inconsistent witness borrows nothing, its gate fails instead
            let diff = if total >= *r { total - r } else { BigUint::zero() };
            carry = diff.div_floor(&two_to(chunk_bits));
            carry.clone()
        })
        .collect()
}
