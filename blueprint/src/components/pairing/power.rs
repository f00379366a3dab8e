//! Exponentiation of an `F_p^12` element by a fixed exponent.

//~ Square-and-multiply over the bits of the exponent, most significant
//~ first. Slot 0 holds a copy of the input, then every bit after the
//~ leading one squares the accumulator, and every set bit also copies the
//~ input next to the accumulator and multiplies them. The last slot holds
//~ the result.

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::pairing::{
        fp12::{Fp12Op, Fp12Slots, SlotCursor, FP12_DEGREE},
        Fp12Input,
    },
    error::{ComponentError, Result},
};
use ark_ff::{Field, PrimeField, Zero};
use core::marker::PhantomData;
use log::debug;
use num_bigint::BigUint;

#[derive(Clone, Debug)]
pub struct FixedPower<F, F12> {
    slots: Fp12Slots<F>,
    exponent: BigUint,
    slots_amount: usize,
    _extension: PhantomData<F12>,
}

impl<F: PrimeField, F12: Field<BasePrimeField = F>> FixedPower<F, F12> {
    pub fn new(binding: ColumnBinding, exponent: BigUint) -> Result<Self> {
        if exponent.is_zero() {
            return Err(ComponentError::InvalidParameters(
                "fixed power with a zero exponent".into(),
            ));
        }
        Self::manifest_for(binding.witness_amount()).check(&binding)?;
        let slots = Fp12Slots::new::<F12>(binding)?;

        let bits = exponent.to_radix_be(2);
        let multiplications = bits.iter().skip(1).filter(|bit| **bit == 1).count();
        let slots_amount = bits.len() + 2 * multiplications;
        debug!(
            "fixed power of {} bits: {slots_amount} slots over {} rows",
            bits.len(),
            slots.rows_for(slots_amount)
        );
        Ok(Self {
            slots,
            exponent,
            slots_amount,
            _extension: PhantomData,
        })
    }

    /// Squaring and multiplication get one gate per slot phase
    pub fn manifest_for(witness_amount: usize) -> Manifest {
        let phases = (witness_amount / FP12_DEGREE).max(1);
        Manifest::new(WitnessRange::stepped(FP12_DEGREE, None, FP12_DEGREE))
            .with_gates(2 * phases)
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }
}

impl<F: PrimeField, F12: Field<BasePrimeField = F>> Component<F> for FixedPower<F, F12> {
    type Input = Fp12Input;
    type Output = Vec<Var>;

    fn binding(&self) -> &ColumnBinding {
        self.slots.binding()
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.slots.binding().witness_amount())
    }

    fn rows_amount(&self) -> usize {
        self.slots.rows_for(self.slots_amount)
    }

    fn result(&self, start_row: usize) -> Vec<Var> {
        self.slots.slot(start_row, self.slots_amount - 1)
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &Fp12Input,
        start_row: usize,
    ) -> Result<Vec<Var>> {
        input.check()?;
        let mut cursor = SlotCursor::<F, F12>::new(&self.slots, start_row);
        let base = cursor.copy_in(env, &input.x)?;

        for bit in self.exponent.to_radix_be(2).into_iter().skip(1) {
            cursor.op(env, Fp12Op::Square)?;
            if bit == 1 {
                cursor.copy(env, base)?;
                cursor.op(env, Fp12Op::Mul)?;
            }
        }

        if cursor.used() != self.slots_amount {
            return Err(ComponentError::LayoutMismatch {
                expected: self.slots_amount,
                actual: cursor.used(),
            });
        }
        Ok(self.result(start_row))
    }
}
