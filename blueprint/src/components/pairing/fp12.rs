//! Degree-12 extension arithmetic laid out as slots of 12 cells.

//~ An element of `F_p^12` is stored as its 12 coordinates over the native
//~ field, in the basis used by the extension type. A row of `W` columns holds
//~ `spr = W / 12` slots side by side and slot `s` of a block starting at
//~ `start` lives at
//~
//~ ```text
//~ row     = start + s / spr
//~ columns = 12 (s mod spr) .. 12 (s mod spr) + 12
//~ ```
//~
//~ Operations read the slots right before their output: a unary operation
//~ maps slot `s` to `s + 1` and a multiplication maps `s, s + 1` to `s + 2`.
//~ Their gate is enabled on the row of slot `s`, so the relative position of
//~ the operands only depends on the phase `s mod spr`, and every
//~ `(operation, phase)` pair gets its own gate.
//~
//~ The coefficients are read off the extension type itself:
//~
//~ * products use the tensor $e_i e_j = \sum_k T_{ijk} e_k$
//~ * the Frobenius maps are linear, $\phi^n(e_i) = \sum_j M^{(n)}_{ij} e_j$,
//~   and conjugation is $\phi^6$

use crate::{
    circuits::{
        assignment::Assignment,
        component::{ColumnBinding, Component, ComponentEnv},
        expr::Expr,
        gate::GateDefinition,
        layout,
        var::Var,
    },
    error::{ComponentError, Result},
};
use ark_ff::{Field, PrimeField};
use core::marker::PhantomData;
use strum_macros::{Display, EnumIter};

pub const FP12_DEGREE: usize = 12;

/// A gate-backed operation between slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Fp12Op {
    Inverse,
    Conjugate,
    Frobenius1,
    Frobenius2,
    Frobenius3,
    Square,
    Mul,
}

impl Fp12Op {
    /// Number of operand slots
    pub fn arity(&self) -> usize {
        match self {
            Fp12Op::Mul => 2,
            _ => 1,
        }
    }

    /// The value of the output slot. The inverse of zero is zero,
    /// which the inverse gate then rejects.
    pub fn evaluate<F12: Field>(&self, operands: &[F12]) -> F12 {
        let frobenius = |power| {
            let mut value = operands[0];
            value.frobenius_map_in_place(power);
            value
        };
        match self {
            Fp12Op::Inverse => operands[0].inverse().unwrap_or_else(F12::zero),
            Fp12Op::Conjugate => frobenius(6),
            Fp12Op::Frobenius1 => frobenius(1),
            Fp12Op::Frobenius2 => frobenius(2),
            Fp12Op::Frobenius3 => frobenius(3),
            Fp12Op::Square => operands[0].square(),
            Fp12Op::Mul => operands[0] * operands[1],
        }
    }
}

/// Native-field coefficients of the extension arithmetic
#[derive(Clone, Debug)]
pub struct Fp12Coefficients<F> {
    /// Non-zero `(i, j, k, T_ijk)`
    tensor: Vec<(usize, usize, usize, F)>,
    /// Non-zero `(i, j, M_ij)` of each Frobenius power, indexed by power
    frobenius: Vec<(usize, Vec<(usize, usize, F)>)>,
    one: Vec<F>,
}

fn coordinates<F: PrimeField, F12: Field<BasePrimeField = F>>(value: &F12) -> Vec<F> {
    value.to_base_prime_field_elements().collect()
}

fn basis<F: PrimeField, F12: Field<BasePrimeField = F>>() -> Result<Vec<F12>> {
    (0..FP12_DEGREE)
        .map(|i| {
            let mut coordinates = vec![F::zero(); FP12_DEGREE];
            coordinates[i] = F::one();
            F12::from_base_prime_field_elems(&coordinates).ok_or_else(|| {
                ComponentError::InvalidParameters("extension basis element".into())
            })
        })
        .collect()
}

impl<F: PrimeField> Fp12Coefficients<F> {
    pub fn new<F12: Field<BasePrimeField = F>>() -> Result<Self> {
        if F12::extension_degree() != FP12_DEGREE as u64 {
            return Err(ComponentError::InvalidParameters(format!(
                "extension of degree {}, expected {FP12_DEGREE}",
                F12::extension_degree()
            )));
        }
        let basis = basis::<F, F12>()?;

        let mut tensor = vec![];
        for (i, a) in basis.iter().enumerate() {
            for (j, b) in basis.iter().enumerate() {
                for (k, coefficient) in coordinates(&(*a * b)).into_iter().enumerate() {
                    if !coefficient.is_zero() {
                        tensor.push((i, j, k, coefficient));
                    }
                }
            }
        }

        let frobenius = [1, 2, 3, 6]
            .into_iter()
            .map(|power| {
                let mut matrix = vec![];
                for (i, e) in basis.iter().enumerate() {
                    let mut image = *e;
                    image.frobenius_map_in_place(power);
                    for (j, coefficient) in coordinates(&image).into_iter().enumerate() {
                        if !coefficient.is_zero() {
                            matrix.push((i, j, coefficient));
                        }
                    }
                }
                (power, matrix)
            })
            .collect();

        Ok(Self {
            tensor,
            frobenius,
            one: coordinates(&F12::one()),
        })
    }

    /// Coordinates of `a b`, as expressions in the coordinates of `a` and `b`
    fn product(&self, a: &[Expr<F>], b: &[Expr<F>]) -> Vec<Expr<F>> {
        let mut out = vec![Expr::zero(); FP12_DEGREE];
        for (i, j, k, coefficient) in &self.tensor {
            let term = (a[*i].clone() * b[*j].clone()).scale(*coefficient);
            out[*k] = core::mem::replace(&mut out[*k], Expr::zero()) + term;
        }
        out
    }

    /// Coordinates of `a^(p^power)`
    fn frobenius(&self, power: usize, a: &[Expr<F>]) -> Vec<Expr<F>> {
        let mut out = vec![Expr::zero(); FP12_DEGREE];
        let matrix = self
            .frobenius
            .iter()
            .find(|(p, _)| *p == power)
            .map(|(_, matrix)| matrix.as_slice())
            .unwrap_or_default();
        for (i, j, coefficient) in matrix {
            let term = a[*i].clone().scale(*coefficient);
            out[*j] = core::mem::replace(&mut out[*j], Expr::zero()) + term;
        }
        out
    }

    /// Constraints of `op`, given the expressions of its operand and output slots
    pub fn constraints(
        &self,
        op: Fp12Op,
        operands: &[Vec<Expr<F>>],
        output: &[Expr<F>],
    ) -> Vec<Expr<F>> {
        let expected = match op {
            Fp12Op::Inverse => {
                // a * out = 1
                return self
                    .product(&operands[0], output)
                    .into_iter()
                    .zip(&self.one)
                    .map(|(product, one)| product - Expr::constant(*one))
                    .collect();
            }
            Fp12Op::Conjugate => self.frobenius(6, &operands[0]),
            Fp12Op::Frobenius1 => self.frobenius(1, &operands[0]),
            Fp12Op::Frobenius2 => self.frobenius(2, &operands[0]),
            Fp12Op::Frobenius3 => self.frobenius(3, &operands[0]),
            Fp12Op::Square => self.product(&operands[0], &operands[0]),
            Fp12Op::Mul => self.product(&operands[0], &operands[1]),
        };
        output
            .iter()
            .zip(expected)
            .map(|(out, expected)| out.clone() - expected)
            .collect()
    }
}

/// Slot addressing on a column binding
#[derive(Clone, Debug)]
pub struct Fp12Slots<F> {
    binding: ColumnBinding,
    slots_per_row: usize,
    coefficients: Fp12Coefficients<F>,
}

impl<F: PrimeField> Fp12Slots<F> {
    pub fn new<F12: Field<BasePrimeField = F>>(binding: ColumnBinding) -> Result<Self> {
        let slots_per_row = binding.witness_amount() / FP12_DEGREE;
        if slots_per_row == 0 || binding.witness_amount() % FP12_DEGREE != 0 {
            return Err(ComponentError::UnsupportedWitnessAmount(
                binding.witness_amount(),
            ));
        }
        Ok(Self {
            binding,
            slots_per_row,
            coefficients: Fp12Coefficients::new::<F12>()?,
        })
    }

    pub fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    pub fn slots_per_row(&self) -> usize {
        self.slots_per_row
    }

    /// Rows taken by `slots` slots
    pub fn rows_for(&self, slots: usize) -> usize {
        layout::rows_for(slots, self.slots_per_row)
    }

    /// Cells of slot `s` of a block starting at `start_row`
    pub fn slot(&self, start_row: usize, s: usize) -> Vec<Var> {
        let (position, row) = layout::cell(start_row, s, self.slots_per_row);
        (0..FP12_DEGREE)
            .map(|c| self.binding.witness(FP12_DEGREE * position + c, row))
            .collect()
    }

    /// Cells of the slot `d` places after a slot at `phase`, relative to
    /// that slot's row
    fn slot_expr(&self, phase: usize, d: usize) -> Vec<Expr<F>> {
        let (position, row) = layout::cell(0, phase + d, self.slots_per_row);
        (0..FP12_DEGREE)
            .map(|c| self.binding.w(FP12_DEGREE * position + c, row as i64))
            .collect()
    }

    fn gate_definition(&self, op: Fp12Op, phase: usize) -> GateDefinition<F> {
        let operands: Vec<_> = (0..op.arity()).map(|d| self.slot_expr(phase, d)).collect();
        let output = self.slot_expr(phase, op.arity());
        GateDefinition::new(self.coefficients.constraints(op, &operands, &output))
    }

    pub fn read<F12: Field<BasePrimeField = F>>(
        &self,
        assignment: &Assignment<F>,
        vars: &[Var],
    ) -> Result<F12> {
        let coordinates = vars
            .iter()
            .map(|var| assignment.value(var))
            .collect::<Result<Vec<F>>>()?;
        F12::from_base_prime_field_elems(&coordinates)
            .ok_or_else(|| ComponentError::InvalidParameters("extension element".into()))
    }

    pub fn write<F12: Field<BasePrimeField = F>>(
        &self,
        assignment: &mut Assignment<F>,
        vars: &[Var],
        value: &F12,
    ) -> Result<()> {
        for (var, coordinate) in vars.iter().zip(value.to_base_prime_field_elements()) {
            assignment.assign(var, coordinate)?;
        }
        Ok(())
    }
}

/// Appends slots to a block, one operation at a time
pub struct SlotCursor<'a, F, F12> {
    slots: &'a Fp12Slots<F>,
    start_row: usize,
    next: usize,
    _extension: PhantomData<F12>,
}

impl<'a, F: PrimeField, F12: Field<BasePrimeField = F>> SlotCursor<'a, F, F12> {
    pub fn new(slots: &'a Fp12Slots<F>, start_row: usize) -> Self {
        Self {
            slots,
            start_row,
            next: 0,
            _extension: PhantomData,
        }
    }

    /// Slots used so far, including alignment gaps
    pub fn used(&self) -> usize {
        self.next
    }

    pub fn rows_used(&self) -> usize {
        self.slots.rows_for(self.next)
    }

    pub fn vars(&self, s: usize) -> Vec<Var> {
        self.slots.slot(self.start_row, s)
    }

    /// Copies external cells into the next slot
    pub fn copy_in<E: ComponentEnv<F>>(&mut self, env: &mut E, from: &[Var]) -> Result<usize> {
        let s = self.next;
        for (from, to) in from.iter().zip(self.vars(s)) {
            env.copy(*from, to)?;
        }
        self.next += 1;
        Ok(s)
    }

    /// Copies an earlier slot into the next one
    pub fn copy<E: ComponentEnv<F>>(&mut self, env: &mut E, s: usize) -> Result<usize> {
        let from = self.vars(s);
        self.copy_in(env, &from)
    }

    /// Applies `op` to the last `op.arity()` slots
    pub fn op<E: ComponentEnv<F>>(&mut self, env: &mut E, op: Fp12Op) -> Result<usize> {
        let arity = op.arity();
        if self.next < arity {
            return Err(ComponentError::InvalidParameters(format!(
                "{op} needs {arity} operand slots"
            )));
        }
        let first = self.next - arity;
        let output = self.vars(self.next);

        if let Some(assignment) = env.witness() {
            let view: &Assignment<F> = assignment;
            let operands = (first..self.next)
                .map(|s| self.slots.read::<F12>(view, &self.vars(s)))
                .collect::<Result<Vec<_>>>()?;
            self.slots
                .write(assignment, &output, &op.evaluate(&operands))?;
        }

        let phase = first % self.slots.slots_per_row;
        let row = self.start_row + first / self.slots.slots_per_row;
        let key = self.slots.binding.selector_key(&format!("fp12/{op}/{phase}"));
        env.gate(&key, row, |_| Ok(self.slots.gate_definition(op, phase)))?;

        let s = self.next;
        self.next += 1;
        Ok(s)
    }

    /// Skips to the start of the next row, returning that row
    pub fn align(&mut self) -> usize {
        self.next = self.rows_used() * self.slots.slots_per_row;
        self.start_row + self.rows_used()
    }

    /// Places a sub-component on fresh rows and returns its output
    pub fn apply<E, C>(&mut self, env: &mut E, component: &C, input: &C::Input) -> Result<C::Output>
    where
        E: ComponentEnv<F>,
        C: Component<F>,
    {
        let row = self.align();
        let output = env.apply(component, input, row)?;
        self.next += component.rows_amount() * self.slots.slots_per_row;
        Ok(output)
    }
}
