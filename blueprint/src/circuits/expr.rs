//! This module implements polynomial expressions over table cells.
//!
//! Gate constraints are built with the usual arithmetic operators on
//! [`Expr`] and evaluated against an assignment once a gate's activation row
//! is known.

use crate::circuits::var::Var;
use ark_ff::Field;
use core::{
    iter::Sum,
    ops::{Add, Mul, Neg, Sub},
};

/// A polynomial expression over cell references
#[derive(Clone, Debug, PartialEq)]
pub enum Expr<F> {
    Constant(F),
    Cell(Var),
    Add(Box<Expr<F>>, Box<Expr<F>>),
    Sub(Box<Expr<F>>, Box<Expr<F>>),
    Mul(Box<Expr<F>>, Box<Expr<F>>),
    Neg(Box<Expr<F>>),
}

impl<F: Field> Expr<F> {
    pub fn constant(value: F) -> Self {
        Expr::Constant(value)
    }

    pub fn cell(var: Var) -> Self {
        Expr::Cell(var)
    }

    pub fn zero() -> Self {
        Expr::Constant(F::zero())
    }

    pub fn one() -> Self {
        Expr::Constant(F::one())
    }

    fn is_zero_constant(&self) -> bool {
        matches!(self, Expr::Constant(c) if c.is_zero())
    }

    pub fn square(self) -> Self {
        self.clone() * self
    }

    /// `self * scalar`, folding away multiplications by zero and one
    pub fn scale(self, scalar: F) -> Self {
        if scalar.is_zero() {
            Self::zero()
        } else if scalar.is_one() {
            self
        } else {
            Expr::Mul(Box::new(Expr::Constant(scalar)), Box::new(self))
        }
    }

    /// Evaluates the expression, resolving every cell through `value`
    pub fn evaluate<E>(&self, value: &impl Fn(&Var) -> Result<F, E>) -> Result<F, E> {
        Ok(match self {
            Expr::Constant(c) => *c,
            Expr::Cell(var) => value(var)?,
            Expr::Add(a, b) => a.evaluate(value)? + b.evaluate(value)?,
            Expr::Sub(a, b) => a.evaluate(value)? - b.evaluate(value)?,
            Expr::Mul(a, b) => a.evaluate(value)? * b.evaluate(value)?,
            Expr::Neg(a) => -a.evaluate(value)?,
        })
    }
}

impl<F> From<Var> for Expr<F> {
    fn from(var: Var) -> Self {
        Expr::Cell(var)
    }
}

impl<F: Field> From<u64> for Expr<F> {
    fn from(value: u64) -> Self {
        Expr::Constant(F::from(value))
    }
}

impl<F: Field> Add for Expr<F> {
    type Output = Expr<F>;

    fn add(self, other: Self) -> Self {
        if self.is_zero_constant() {
            other
        } else if other.is_zero_constant() {
            self
        } else {
            Expr::Add(Box::new(self), Box::new(other))
        }
    }
}

impl<F: Field> Sub for Expr<F> {
    type Output = Expr<F>;

    fn sub(self, other: Self) -> Self {
        if other.is_zero_constant() {
            self
        } else {
            Expr::Sub(Box::new(self), Box::new(other))
        }
    }
}

impl<F: Field> Mul for Expr<F> {
    type Output = Expr<F>;

    fn mul(self, other: Self) -> Self {
        Expr::Mul(Box::new(self), Box::new(other))
    }
}

impl<F: Field> Neg for Expr<F> {
    type Output = Expr<F>;

    fn neg(self) -> Self {
        Expr::Neg(Box::new(self))
    }
}

impl<F: Field> Sum for Expr<F> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Expr::zero(), |acc, term| acc + term)
    }
}

