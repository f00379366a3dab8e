//! Final exponentiation `x^((p^12 - 1) / r)` of a BLS12 pairing.

//~ With `t` the (negative) curve parameter, the exponent splits into
//~
//~ * the easy part $(p^6 - 1)(p^2 + 1)$, computed with an inverse, a
//~   conjugation and a Frobenius map: $y = (\bar{x} x^{-1})^{p^2 + 1}$
//~ * the hard part $(p^4 - p^2 + 1) / r = \frac{(t - 1)^2}{3} (p + t)(p^2 + t^2 - 1) + 1$
//~
//~ The hard part is evaluated with $g = y^{(t-1)^2 / 3}$ as
//~
//~ $$y \cdot g^{t (t^2 - 1)} \cdot g^{p^3} \cdot (g^{t^2 - 1})^p \cdot (g^t)^{p^2}$$
//~
//~ where powers of `|t|` come from three runs of the fixed power component
//~ and negative powers from inverses. Sub-components start on a fresh row
//~ and every intermediate result they need is copied next to its operation.

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv, LayoutEnv},
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::pairing::{
        fp12::{Fp12Op, Fp12Slots, SlotCursor, FP12_DEGREE},
        power::FixedPower,
        Fp12Input, BLS12_381_X,
    },
    error::{ComponentError, Result},
};
use ark_ff::{Field, PrimeField};
use log::debug;
use num_bigint::BigUint;

#[derive(Clone, Debug)]
pub struct FinalExponentiation<F, F12> {
    slots: Fp12Slots<F>,
    /// `y -> y^|t|`
    power_t: FixedPower<F, F12>,
    /// `y -> y^((|t| + 1)^2 / 3)`
    power_g: FixedPower<F, F12>,
    result_slot: usize,
    rows: usize,
}

impl<F: PrimeField, F12: Field<BasePrimeField = F>> FinalExponentiation<F, F12> {
    /// Final exponentiation for BLS12-381
    pub fn new(binding: ColumnBinding) -> Result<Self> {
        Self::with_curve_parameter(binding, BLS12_381_X)
    }

    /// Final exponentiation for a BLS12 curve with parameter `t = -t_abs`
    pub fn with_curve_parameter(binding: ColumnBinding, t_abs: u64) -> Result<Self> {
        Self::manifest_for(binding.witness_amount()).check(&binding)?;
        let t = BigUint::from(t_abs);
        let g_exponent = (&t + 1u32).pow(2) / 3u32;

        let mut component = Self {
            slots: Fp12Slots::new::<F12>(binding.clone())?,
            power_t: FixedPower::new(binding.clone(), t)?,
            power_g: FixedPower::new(binding, g_exponent)?,
            result_slot: 0,
            rows: 0,
        };
        let placeholder = Fp12Input {
            x: vec![Var::witness(0, 0); FP12_DEGREE],
        };
        let (result_slot, rows) = component.place(&mut LayoutEnv, &placeholder, 0)?;
        component.result_slot = result_slot;
        component.rows = rows;
        debug!(
            "final exponentiation: {rows} rows, {} slots per row",
            component.slots.slots_per_row()
        );
        Ok(component)
    }

    /// Inverse, conjugation, multiplication and three Frobenius maps, one
    /// gate each per slot phase
    pub fn manifest_for(witness_amount: usize) -> Manifest {
        let phases = (witness_amount / FP12_DEGREE).max(1);
        Manifest::new(WitnessRange::stepped(FP12_DEGREE, None, FP12_DEGREE))
            .with_gates(6 * phases)
            .merge(&FixedPower::<F, F12>::manifest_for(witness_amount))
    }

    /// Lays the chain out, returning the result slot and the rows used
    fn place<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &Fp12Input,
        start_row: usize,
    ) -> Result<(usize, usize)> {
        let mut cursor = SlotCursor::<F, F12>::new(&self.slots, start_row);

        // easy part
        let x = cursor.copy_in(env, &input.x)?;
        let x_inv = cursor.op(env, Fp12Op::Inverse)?;
        cursor.copy(env, x)?;
        cursor.op(env, Fp12Op::Conjugate)?;
        cursor.copy(env, x_inv)?;
        let a = cursor.op(env, Fp12Op::Mul)?;
        cursor.op(env, Fp12Op::Frobenius2)?;
        cursor.copy(env, a)?;
        let y = cursor.op(env, Fp12Op::Mul)?;

        // g and its conjugates
        let y_vars = Fp12Input { x: cursor.vars(y) };
        let g = cursor.apply(env, &self.power_g, &y_vars)?;
        let g_slot = cursor.copy_in(env, &g)?;
        let g_inv = cursor.op(env, Fp12Op::Inverse)?;
        cursor.copy(env, g_slot)?;
        let g_p3 = cursor.op(env, Fp12Op::Frobenius3)?;

        // (g^t)^(p^2)
        let g_mt = cursor.apply(env, &self.power_t, &Fp12Input { x: g })?;
        cursor.copy_in(env, &g_mt)?;
        cursor.op(env, Fp12Op::Inverse)?;
        let g_t_p2 = cursor.op(env, Fp12Op::Frobenius2)?;

        // h = g^(t^2 - 1) and h^p
        let g_t2 = cursor.apply(env, &self.power_t, &Fp12Input { x: g_mt })?;
        cursor.copy_in(env, &g_t2)?;
        cursor.copy(env, g_inv)?;
        let h = cursor.op(env, Fp12Op::Mul)?;
        let h_p = cursor.op(env, Fp12Op::Frobenius1)?;

        // h^t
        let h_vars = Fp12Input { x: cursor.vars(h) };
        let h_mt = cursor.apply(env, &self.power_t, &h_vars)?;
        cursor.copy_in(env, &h_mt)?;
        let h_t = cursor.op(env, Fp12Op::Inverse)?;

        cursor.copy(env, y)?;
        cursor.copy(env, h_t)?;
        cursor.op(env, Fp12Op::Mul)?;
        for factor in [g_p3, h_p, g_t_p2] {
            cursor.copy(env, factor)?;
            cursor.op(env, Fp12Op::Mul)?;
        }
        Ok((cursor.used() - 1, cursor.rows_used()))
    }
}

impl<F: PrimeField, F12: Field<BasePrimeField = F>> Component<F> for FinalExponentiation<F, F12> {
    type Input = Fp12Input;
    type Output = Vec<Var>;

    fn binding(&self) -> &ColumnBinding {
        self.slots.binding()
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.slots.binding().witness_amount())
    }

    fn rows_amount(&self) -> usize {
        self.rows
    }

    fn result(&self, start_row: usize) -> Vec<Var> {
        self.slots.slot(start_row, self.result_slot)
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &Fp12Input,
        start_row: usize,
    ) -> Result<Vec<Var>> {
        input.check()?;
        let (result_slot, rows) = self.place(env, input, start_row)?;
        if rows != self.rows || result_slot != self.result_slot {
            return Err(ComponentError::LayoutMismatch {
                expected: self.rows,
                actual: rows,
            });
        }
        Ok(self.result(start_row))
    }
}
