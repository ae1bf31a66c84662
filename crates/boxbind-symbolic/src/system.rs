//! Equation accumulation with online elimination.
//!
//! A [`System`] owns two views of the same constraint set: the raw list of
//! accumulated residuals (`a - b` per [`System::equate`] call), consumed by
//! the batch least-squares solver, and a triangularized `facts` table built
//! by incremental elimination, which powers [`System::simplify`] and the
//! exact solve path.

use std::collections::{BTreeMap, BTreeSet};

use crate::expr::{Expr, Symbol, TOLERANCE};
use crate::merge::Mergeable;
use crate::solve::{self, Solution};
use crate::SolveError;

/// An incremental symbolic linear-equation system.
#[derive(Debug, Clone, Default)]
pub struct System {
    /// Triangularized table: eliminated symbol -> expression in strictly
    /// remaining symbols. No value references a key of this map.
    facts: BTreeMap<Symbol, Expr>,
    /// Raw accumulated residuals, one per recorded equation.
    equations: Vec<Expr>,
}

impl System {
    /// Create an empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the equation `a == b`, failing hard on contradiction.
    ///
    /// The difference is reduced through the current facts. A reduction to
    /// a nonzero constant means the new equation contradicts the recorded
    /// ones and fails with [`SolveError::Inconsistent`]; a reduction to
    /// zero adds no information and is dropped. Otherwise one symbol is
    /// eliminated: the term with the largest-magnitude coefficient becomes
    /// the pivot (smallest round-off later) and the new fact is
    /// back-substituted into every existing fact. The raw residual `a - b`
    /// joins the accumulated equation set, so the batch solver later sees
    /// the equation as stated rather than its reduced form.
    pub fn equate(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) -> Result<(), SolveError> {
        self.record(a.into() - b.into(), true)
    }

    /// Add the equation `a == b`, tolerating contradictions.
    ///
    /// A contradictory equation is still recorded so that
    /// [`System::batch_solve`] can settle it by least squares (surfacing an
    /// `Overconstrained` warning) instead of raising here.
    pub fn equate_lenient(&mut self, a: impl Into<Expr>, b: impl Into<Expr>) {
        // The lenient path never reports an error.
        let _ = self.record(a.into() - b.into(), false);
    }

    fn record(&mut self, raw: Expr, strict: bool) -> Result<(), SolveError> {
        let reduced = self.simplify(&raw);
        if reduced.is_constant() {
            let leftover = reduced.constant_term();
            if leftover.abs() < TOLERANCE {
                // Redundant restatement of known facts.
                return Ok(());
            }
            if strict {
                return Err(SolveError::Inconsistent { residual: leftover });
            }
            log::warn!("recording contradictory equation (residual {leftover})");
            self.equations.push(raw);
            return Ok(());
        }
        self.equations.push(raw);
        self.eliminate(reduced);
        Ok(())
    }

    /// One elimination step: 0 = c1 x1 + c2 x2 + ... + k, solved for the
    /// max-|c| pivot.
    fn eliminate(&mut self, mut residual: Expr) {
        let Some(pivot) = residual
            .terms()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(symbol, _)| symbol)
        else {
            return;
        };
        let coef = residual.remove(pivot);
        let fact = residual.scale(-1.0 / coef);
        for existing in self.facts.values_mut() {
            existing.substitute_in_place(pivot, &fact);
        }
        self.facts.insert(pivot, fact);
    }

    /// Substitute all known facts into `expr` in place.
    pub fn rewrite(&self, expr: &mut Expr) {
        // Fact values never reference fact keys, so one pass over the
        // original symbol set is complete.
        let symbols: Vec<Symbol> = expr.terms().map(|(s, _)| s).collect();
        for symbol in symbols {
            if let Some(fact) = self.facts.get(&symbol) {
                expr.substitute_in_place(symbol, fact);
            }
        }
    }

    /// Like [`System::rewrite`], returning the simplified copy.
    #[must_use]
    pub fn simplify(&self, expr: &Expr) -> Expr {
        let mut expr = expr.clone();
        self.rewrite(&mut expr);
        expr
    }

    /// Simplify `expr` and require a concrete number.
    pub fn eval(&self, expr: &Expr) -> Result<f64, SolveError> {
        self.simplify(expr)
            .as_constant()
            .ok_or(SolveError::UnderConstrained)
    }

    /// The accumulated equation residuals.
    #[must_use]
    pub fn equations(&self) -> &[Expr] {
        &self.equations
    }

    /// Iterate over the triangularized facts table.
    pub fn facts(&self) -> impl Iterator<Item = (Symbol, &Expr)> {
        self.facts.iter().map(|(s, e)| (*s, e))
    }

    /// Distinct symbols referenced by the accumulated equations.
    #[must_use]
    pub fn unknowns(&self) -> BTreeSet<Symbol> {
        self.equations
            .iter()
            .flat_map(|eq| eq.terms().map(|(s, _)| s))
            .collect()
    }

    /// Check the triangularity invariant: no fact's expression references
    /// a key of the facts table.
    #[must_use]
    pub fn is_triangular(&self) -> bool {
        self.facts
            .values()
            .all(|expr| expr.terms().all(|(s, _)| !self.facts.contains_key(&s)))
    }

    /// Solve the accumulated equations exactly.
    ///
    /// Requires the equation count to match the unknown count and a
    /// non-singular coefficient matrix. Prefer [`System::batch_solve`]
    /// unless a hard failure on any mismatch is wanted.
    pub fn exact_solve(&self) -> Result<Solution, SolveError> {
        solve::exact(&self.equations)
    }

    /// Tolerant least-squares solve over the full accumulated equation set.
    ///
    /// This is the recommended path: it succeeds on over- and
    /// under-determined systems alike, attaching [`SolveWarning`]s instead
    /// of failing. Under-determined systems get the minimum-norm solution.
    ///
    /// [`SolveWarning`]: crate::SolveWarning
    #[must_use]
    pub fn batch_solve(&self) -> Solution {
        solve::least_squares(&self.equations)
    }

    /// Drop all accumulated equations and facts.
    pub fn clear(&mut self) {
        self.equations.clear();
        self.facts.clear();
    }
}

impl Mergeable for System {
    fn absorb(&mut self, other: Self) {
        self.equations.extend(other.equations);
        // The two fact tables may reference each other's symbols, so a
        // plain union could break triangularity. Re-reduce each incoming
        // fact through the growing table instead.
        for (symbol, expr) in other.facts {
            let residual = self.simplify(&(Expr::symbol(symbol) - expr));
            if residual.is_constant() {
                let leftover = residual.constant_term();
                if leftover.abs() >= TOLERANCE {
                    log::warn!("merged systems disagree (residual {leftover})");
                }
                continue;
            }
            self.eliminate(residual);
        }
    }
}
