//! Sparse linear expressions over opaque symbols.
//!
//! An [`Expr`] is a linear combination `c1*s1 + c2*s2 + ... + k` where the
//! `s` are [`Symbol`]s and `k` is a constant term. Coefficients with a
//! magnitude below [`TOLERANCE`] are dropped by every operation, so two
//! expressions compare equal exactly when their difference has no terms
//! left after pruning.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

/// Coefficients below this magnitude are treated as zero.
pub const TOLERANCE: f64 = 1e-8;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// An opaque unknown scalar, compared by identity.
///
/// Symbols are created fresh on demand and stay valid across system merges;
/// they are never mutated or destroyed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u64);

impl Symbol {
    /// Create a fresh symbol, distinct from every symbol created so far.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A sparse linear combination of symbols plus a constant term.
#[derive(Debug, Clone, Default)]
pub struct Expr {
    terms: BTreeMap<Symbol, f64>,
    constant: f64,
}

impl Expr {
    /// The zero expression.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// An expression holding only a constant term.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        let mut expr = Self::default();
        expr.add_constant(value);
        expr
    }

    /// An expression consisting of a single symbol with coefficient one.
    #[must_use]
    pub fn symbol(symbol: Symbol) -> Self {
        let mut expr = Self::default();
        expr.set(symbol, 1.0);
        expr
    }

    /// A fresh symbol wrapped in an expression.
    #[must_use]
    pub fn fresh() -> Self {
        Self::symbol(Symbol::fresh())
    }

    /// The coefficient of `symbol`, or zero when absent.
    #[must_use]
    pub fn coefficient(&self, symbol: Symbol) -> f64 {
        self.terms.get(&symbol).copied().unwrap_or(0.0)
    }

    /// The constant term.
    #[must_use]
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Iterate over the symbolic terms in symbol order.
    pub fn terms(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.terms.iter().map(|(s, c)| (*s, *c))
    }

    /// Number of symbolic terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the expression has no symbolic terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when the expression has no terms at all (tolerance-pruned).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.constant.abs() < TOLERANCE
    }

    /// True when only the constant term remains.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// The numeric value, when no symbolic terms remain.
    #[must_use]
    pub fn as_constant(&self) -> Option<f64> {
        if self.terms.is_empty() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// Replace every occurrence of `symbol` with `replacement`.
    #[must_use]
    pub fn substitute(&self, symbol: Symbol, replacement: &Self) -> Self {
        let mut result = self.clone();
        result.substitute_in_place(symbol, replacement);
        result
    }

    /// Multiply every term by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        let mut result = Self {
            terms: BTreeMap::new(),
            constant: 0.0,
        };
        for (&symbol, &coef) in &self.terms {
            result.set(symbol, coef * factor);
        }
        result.add_constant(self.constant * factor);
        result
    }

    pub(crate) fn substitute_in_place(&mut self, symbol: Symbol, replacement: &Self) {
        if let Some(coef) = self.terms.remove(&symbol) {
            self.add_scaled(replacement, coef);
        }
    }

    pub(crate) fn add_scaled(&mut self, other: &Self, factor: f64) {
        for (&symbol, &coef) in &other.terms {
            self.set(symbol, self.coefficient(symbol) + coef * factor);
        }
        self.add_constant(other.constant * factor);
    }

    fn set(&mut self, symbol: Symbol, value: f64) {
        if value.abs() < TOLERANCE {
            self.terms.remove(&symbol);
        } else {
            self.terms.insert(symbol, value);
        }
    }

    fn add_constant(&mut self, value: f64) {
        self.constant += value;
        if self.constant.abs() < TOLERANCE {
            self.constant = 0.0;
        }
    }

    pub(crate) fn remove(&mut self, symbol: Symbol) -> f64 {
        self.terms.remove(&symbol).unwrap_or(0.0)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::symbol(symbol)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        (self.clone() - other.clone()).is_zero()
    }
}

impl Add for Expr {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.add_scaled(&rhs, 1.0);
        self
    }
}

impl Add<f64> for Expr {
    type Output = Self;

    fn add(mut self, rhs: f64) -> Self::Output {
        self.add_constant(rhs);
        self
    }
}

impl Sub for Expr {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self.add_scaled(&rhs, -1.0);
        self
    }
}

impl Sub<f64> for Expr {
    type Output = Self;

    fn sub(mut self, rhs: f64) -> Self::Output {
        self.add_constant(-rhs);
        self
    }
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}

impl Mul<f64> for Expr {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Div<f64> for Expr {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self.scale(1.0 / rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<(Option<Symbol>, f64)> =
            self.terms.iter().map(|(s, c)| (Some(*s), *c)).collect();
        if self.constant.abs() >= TOLERANCE || parts.is_empty() {
            parts.push((None, self.constant));
        }
        let mut first = true;
        for (symbol, value) in parts {
            if first {
                if value < 0.0 {
                    write!(f, "-")?;
                }
            } else if value < 0.0 {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;
            let magnitude = value.abs();
            match symbol {
                Some(s) => {
                    if (magnitude - 1.0).abs() >= TOLERANCE {
                        write!(f, "{magnitude} ")?;
                    }
                    write!(f, "{s}")?;
                }
                None => write!(f, "{magnitude}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fresh_symbols_are_distinct() {
        assert_ne!(Symbol::fresh(), Symbol::fresh());
    }

    #[test]
    fn test_zero_is_zero() {
        assert!(Expr::zero().is_zero());
        assert!(!Expr::constant(1.0).is_zero());
        assert!(!Expr::fresh().is_zero());
    }

    #[test]
    fn test_add_and_sub() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        let e = Expr::symbol(x) * 2.0 + Expr::symbol(y) + 1.0;
        assert_eq!(e.coefficient(x), 2.0);
        assert_eq!(e.coefficient(y), 1.0);
        assert_eq!(e.constant_term(), 1.0);

        let d = e.clone() - e;
        assert!(d.is_zero());
    }

    #[test]
    fn test_tolerance_prunes_terms() {
        let x = Symbol::fresh();
        let e = Expr::symbol(x) - Expr::symbol(x) * (1.0 - 1e-12);
        assert!(e.is_zero());
    }

    #[test]
    fn test_substitute() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        let z = Symbol::fresh();
        // 2x + y + 1, with x := y + z, becomes 3y + 2z + 1
        let e = Expr::symbol(x) * 2.0 + Expr::symbol(y) + 1.0;
        let r = e.substitute(x, &(Expr::symbol(y) + Expr::symbol(z)));
        assert_eq!(r.coefficient(y), 3.0);
        assert_eq!(r.coefficient(z), 2.0);
        assert_eq!(r.constant_term(), 1.0);
        assert_eq!(r.coefficient(x), 0.0);
    }

    #[test]
    fn test_scale_and_div() {
        let x = Symbol::fresh();
        let e = (Expr::symbol(x) + 3.0) * 2.0;
        assert_eq!(e.coefficient(x), 2.0);
        assert_eq!(e.constant_term(), 6.0);
        let h = e / 2.0;
        assert_eq!(h.coefficient(x), 1.0);
        assert_eq!(h.constant_term(), 3.0);
    }

    #[test]
    fn test_equality_is_tolerance_pruned() {
        let x = Symbol::fresh();
        let a = Expr::symbol(x) + 1.0;
        let b = Expr::symbol(x) + 1.0 + 1e-12;
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let e = Expr::zero();
        assert_eq!(e.to_string(), "0");
        assert_eq!(Expr::constant(-1.5).to_string(), "-1.5");
        let x = Symbol::fresh();
        let shown = (Expr::symbol(x) * 2.0 + 1.0).to_string();
        assert!(shown.starts_with("2 s"));
        assert!(shown.ends_with(" + 1"));
    }

    fn arb_expr() -> impl Strategy<Value = Expr> {
        (
            prop::collection::vec((0u64..8, -100.0f64..100.0), 0..6),
            -100.0f64..100.0,
        )
            .prop_map(|(terms, k)| {
                let mut e = Expr::constant(k);
                for (id, coef) in terms {
                    e = e + Expr::symbol(Symbol(id)) * coef;
                }
                e
            })
    }

    proptest! {
        #[test]
        fn prop_expr_plus_negation_is_zero(e in arb_expr()) {
            prop_assert!((e.clone() + (-e)).is_zero());
        }

        #[test]
        fn prop_addition_commutes(a in arb_expr(), b in arb_expr()) {
            prop_assert_eq!(a.clone() + b.clone(), b + a);
        }

        #[test]
        fn prop_scale_distributes(a in arb_expr(), b in arb_expr(), k in -10.0f64..10.0) {
            prop_assert_eq!((a.clone() + b.clone()) * k, a * k + b * k);
        }
    }
}
