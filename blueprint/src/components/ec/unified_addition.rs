//! Complete addition of native curve points in a single row.

//~ The layout is
//~
//~ |  0 |  1 |  2 |  3 |  4 |  5 |  6  |    7   | 8 |   9   |    10   |
//~ |:--:|:--:|:--:|:--:|:--:|:--:|:---:|:------:|:-:|:-----:|:-------:|
//~ | x1 | y1 | x2 | y2 | x3 | y3 | inf | same_x | s | inf_z | x21_inv |
//~
//~ where `(x1, y1), (x2, y2)` are the inputs, `(x3, y3)` the output, and
//~ `inf` is true iff the result is the point at infinity. `same_x` is true
//~ iff `x1 == x2` and selects between the addition and the doubling slope.
//~
//~ The gate enforces, on a curve `y^2 = x^3 + b`,
//~
//~ * $x_{21} \cdot x21\_inv - (1 - same\_x) = 0$ and $same\_x \cdot x_{21} = 0$
//~ * $same\_x (2 s y_1 - 3 x_1^2) + (1 - same\_x)(x_{21} s - y_{21}) = 0$
//~ * $x_1 + x_2 + x_3 - s^2 = 0$
//~ * $s (x_1 - x_3) - y_1 - y_3 = 0$
//~ * $y_{21} (same\_x - inf) = 0$
//~ * $y_{21} \cdot inf\_z - inf = 0$
//~
//~ with $x_{21} = x_2 - x_1$ and $y_{21} = y_2 - y_1$.

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    error::Result,
};
use ark_ff::{Field, PrimeField};
use core::marker::PhantomData;

const CELLS: usize = 11;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedAdditionInput {
    pub p: (Var, Var),
    pub q: (Var, Var),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedAdditionOutput {
    pub x: Var,
    pub y: Var,
    /// One when the sum is the point at infinity
    pub infinity: Var,
}

#[derive(Clone, Debug)]
pub struct UnifiedAddition<F> {
    binding: ColumnBinding,
    _field: PhantomData<F>,
}

/// `r = (z == 0)`, and `z_inv = 1 / z` when it is not
fn zero_check<F: PrimeField>(z: Expr<F>, z_inv: Expr<F>, r: Expr<F>) -> Vec<Expr<F>> {
    vec![z_inv * z.clone() - (Expr::one() - r.clone()), r * z]
}

impl<F: PrimeField> UnifiedAddition<F> {
    pub fn new(binding: ColumnBinding) -> Result<Self> {
        Self::manifest_for().check(&binding)?;
        Ok(Self {
            binding,
            _field: PhantomData,
        })
    }

    pub fn manifest_for() -> Manifest {
        Manifest::new(WitnessRange::at_least(CELLS)).with_gates(1)
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let w = |column| self.binding.w::<F>(column, 0);
        let (x1, y1, x2, y2, x3, y3) = (w(0), w(1), w(2), w(3), w(4), w(5));
        let (inf, same_x, s, inf_z, x21_inv) = (w(6), w(7), w(8), w(9), w(10));

        let x21 = x2.clone() - x1.clone();
        let y21 = y2 - y1.clone();

        let mut constraints = zero_check(x21.clone(), x21_inv, same_x.clone());

        let x1_squared = x1.clone().square();
        let double_case =
            s.clone().scale(F::from(2u64)) * y1.clone() - x1_squared.scale(F::from(3u64));
        let add_case = x21 * s.clone() - y21.clone();
        constraints.push(same_x.clone() * double_case + (Expr::one() - same_x.clone()) * add_case);

        constraints.push(x1.clone() + x2 + x3.clone() - s.clone().square());
        constraints.push(s * (x1 - x3) - y1 - y3);

        constraints.push(y21.clone() * (same_x - inf.clone()));
        constraints.push(y21 * inf_z - inf);
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for UnifiedAddition<F> {
    type Input = UnifiedAdditionInput;
    type Output = UnifiedAdditionOutput;

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for()
    }

    fn rows_amount(&self) -> usize {
        1
    }

    fn result(&self, start_row: usize) -> UnifiedAdditionOutput {
        UnifiedAdditionOutput {
            x: self.binding.witness(4, start_row),
            y: self.binding.witness(5, start_row),
            infinity: self.binding.witness(6, start_row),
        }
    }

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &UnifiedAdditionInput,
        start_row: usize,
    ) -> Result<UnifiedAdditionOutput> {
        let cell = |column| self.binding.witness(column, start_row);
        env.copy(input.p.0, cell(0))?;
        env.copy(input.p.1, cell(1))?;
        env.copy(input.q.0, cell(2))?;
        env.copy(input.q.1, cell(3))?;

        if let Some(assignment) = env.witness() {
            let x1 = assignment.value(&cell(0))?;
            let y1 = assignment.value(&cell(1))?;
            let x2 = assignment.value(&cell(2))?;
            let y2 = assignment.value(&cell(3))?;

            let same_x = x1 == x2;
            let inf = same_x && y1 != y2;
            let x21_inv = (x2 - x1).inverse().unwrap_or_else(F::zero);
            let inf_z = if same_x && y1 != y2 {
                (y2 - y1).inverse().unwrap_or_else(F::zero)
            } else {
                F::zero()
            };
            // a doubling of a point with y = 0 has no slope and fails the gate
            let s = if same_x {
                let x1_squared = x1.square();
                (x1_squared.double() + x1_squared) * y1.double().inverse().unwrap_or_else(F::zero)
            } else {
                (y2 - y1) * x21_inv
            };
            let x3 = s.square() - x1 - x2;
            let y3 = s * (x1 - x3) - y1;

            let values = [
                x3,
                y3,
                F::from(u64::from(inf)),
                F::from(u64::from(same_x)),
                s,
                inf_z,
                x21_inv,
            ];
            for (column, value) in (4..CELLS).zip(values) {
                assignment.assign(&cell(column), value)?;
            }
        }

        let key = self.binding.selector_key("unified_addition");
        env.gate(&key, start_row, |_| Ok(self.gate_definition()))?;

        Ok(self.result(start_row))
    }
}
