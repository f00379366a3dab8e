//! Comparison of two field elements known to fit in `bits` bits.

//~ The difference of the operands is range checked, which proves it is a
//~ small non-negative integer rather than a wrapped-around field element.
//~ The range check rows come first, followed by the main row
//~
//~ |  0  |  1  |   2  |  3  |
//~ |:---:|:---:|:----:|:---:|
//~ |  a  |  b  | diff | inv |
//~
//~ with `(a, b) = (x, y)` for the "less" modes and `(y, x)` for the "greater"
//~ ones, so that `diff = b - a` in every mode. Strict modes also prove
//~ `diff != 0` by witnessing its inverse; on three columns `inv` moves to
//~ column 0 of an extra row. The gate enforces
//~
//~ * $diff - b + a = 0$
//~ * $diff \cdot inv - 1 = 0$ in strict modes

use crate::{
    circuits::{
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        layout::RowCursor,
        manifest::{Manifest, WitnessRange},
        var::Var,
    },
    components::range_check::{RangeCheck, RangeCheckInput},
    error::{ComponentError, Result},
};
use ark_ff::{Field, PrimeField};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum ComparisonMode {
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    /// Outputs the comparison result as a cell instead of asserting it.
    /// Not supported.
    Flag,
}

impl ComparisonMode {
    pub fn is_strict(&self) -> bool {
        matches!(self, ComparisonMode::LessThan | ComparisonMode::GreaterThan)
    }

    fn is_greater(&self) -> bool {
        matches!(
            self,
            ComparisonMode::GreaterThan | ComparisonMode::GreaterEqual
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonInput {
    pub x: Var,
    pub y: Var,
}

/// Asserts `x <mode> y`
#[derive(Clone, Debug)]
pub struct Comparison<F> {
    binding: ColumnBinding,
    mode: ComparisonMode,
    bits: usize,
    range_check: RangeCheck<F>,
}

impl<F: PrimeField> Comparison<F> {
    pub fn new(binding: ColumnBinding, bits: usize, mode: ComparisonMode) -> Result<Self> {
        if mode == ComparisonMode::Flag {
            return Err(ComponentError::UnsupportedMode("flag comparison"));
        }
        let capacity = F::MODULUS_BIT_SIZE as usize - 2;
        if bits > capacity {
            return Err(ComponentError::BitsExceedFieldCapacity { bits, capacity });
        }
        Self::manifest_for(bits).check(&binding)?;
        Ok(Self {
            range_check: RangeCheck::new(binding.clone(), 1, bits)?,
            binding,
            mode,
            bits,
        })
    }

    pub fn manifest_for(bits: usize) -> Manifest {
        Manifest::new(WitnessRange::at_least(3))
            .with_gates(1)
            .merge(&RangeCheck::<F>::manifest_for(bits))
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Whether the inverse needs a row of its own
    fn bonus_row(&self) -> bool {
        self.mode.is_strict() && self.binding.witness_amount() <= 3
    }

    fn inverse_cell(&self, main_row: usize) -> Var {
        if self.bonus_row() {
            self.binding.witness(0, main_row + 1)
        } else {
            self.binding.witness(3, main_row)
        }
    }

    fn gate_definition(&self) -> GateDefinition<F> {
        let w = |column, offset| self.binding.w::<F>(column, offset);
        let mut constraints = vec![w(2, 0) - w(1, 0) + w(0, 0)];
        if self.mode.is_strict() {
            let inverse = if self.bonus_row() { w(0, 1) } else { w(3, 0) };
            constraints.push(w(2, 0) * inverse - Expr::one());
        }
        GateDefinition::new(constraints)
    }
}

impl<F: PrimeField> Component<F> for Comparison<F> {
    type Input = ComparisonInput;
    type Output = ();

    fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    fn manifest(&self) -> Manifest {
        Self::manifest_for(self.bits)
    }

    fn rows_amount(&self) -> usize {
        self.range_check.rows_amount() + 1 + usize::from(self.bonus_row())
    }

    fn result(&self, _start_row: usize) {}

    fn synthesize<E: ComponentEnv<F>>(
        &self,
        env: &mut E,
        input: &ComparisonInput,
        start_row: usize,
    ) -> Result<()> {
        let mut cursor = RowCursor::new(start_row);
        let range = cursor.reserve(self.range_check.rows_amount());
        let main_row = cursor.reserve(1 + usize::from(self.bonus_row())).start;

        let (a, b) = if self.mode.is_greater() {
            (input.y, input.x)
        } else {
            (input.x, input.y)
        };
        let diff = self.binding.witness(2, main_row);
        env.copy(a, self.binding.witness(0, main_row))?;
        env.copy(b, self.binding.witness(1, main_row))?;

        if let Some(assignment) = env.witness() {
            let value = assignment.value(&b)? - assignment.value(&a)?;
            assignment.assign(&diff, value)?;
            if self.mode.is_strict() {
                // equal operands get the 0 sentinel, which fails the gate
                let inverse = value.inverse().unwrap_or_else(F::zero);
                assignment.assign(&self.inverse_cell(main_row), inverse)?;
            }
        }

        let key = self
            .binding
            .selector_key(&format!("comparison/{}/{}", self.mode.is_strict(), self.bonus_row()));
        env.gate(&key, main_row, |_| Ok(self.gate_definition()))?;

        let input = RangeCheckInput { values: vec![diff] };
        env.apply(&self.range_check, &input, range.start)?;

        cursor.finish(Component::<F>::rows_amount(self))
    }
}
