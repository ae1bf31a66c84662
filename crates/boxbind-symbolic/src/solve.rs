//! Numeric solve back end.
//!
//! Equations are assembled into a dense row-major matrix (symbols in `Ord`
//! order, so results are deterministic for a given equation set). The exact
//! path runs Gaussian elimination with partial pivoting; the batch path
//! computes the pseudo-inverse solution through a one-sided Jacobi SVD,
//! which yields the numerical rank, the squared residual, and the
//! minimum-norm choice for under-determined systems.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{SolveError, SolveWarning};
use crate::expr::{Expr, Symbol};

/// Squared-residual threshold for the `Overconstrained` warning.
const RESIDUAL_EPSILON: f64 = 1e-15;
/// Pivots below this magnitude mean a singular matrix.
const PIVOT_EPSILON: f64 = 1e-12;
/// Convergence threshold for Jacobi column rotations.
const JACOBI_EPSILON: f64 = 1e-12;
/// Singular values below `sigma_max` times this count as zero.
const RANK_EPSILON: f64 = 1e-10;
const MAX_SWEEPS: usize = 60;

/// Concrete values for every symbol that appeared in a solved system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    values: BTreeMap<Symbol, f64>,
    warnings: Vec<SolveWarning>,
}

impl Solution {
    fn new(values: BTreeMap<Symbol, f64>, warnings: Vec<SolveWarning>) -> Self {
        Self { values, warnings }
    }

    /// The solved value of `symbol`, if it took part in the solve.
    #[must_use]
    pub fn value(&self, symbol: Symbol) -> Option<f64> {
        self.values.get(&symbol).copied()
    }

    /// Non-fatal diagnostics collected while solving.
    #[must_use]
    pub fn warnings(&self) -> &[SolveWarning] {
        &self.warnings
    }

    /// Number of solved symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no symbol was solved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(symbol, value)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.values.iter().map(|(s, v)| (*s, *v))
    }

    /// Evaluate `expr` to a number.
    ///
    /// Fails with [`SolveError::UnderConstrained`] when the expression
    /// references a symbol this solution knows nothing about.
    pub fn eval(&self, expr: &Expr) -> Result<f64, SolveError> {
        let mut acc = expr.constant_term();
        for (symbol, coef) in expr.terms() {
            let value = self
                .values
                .get(&symbol)
                .ok_or(SolveError::UnderConstrained)?;
            acc += value * coef;
        }
        Ok(acc)
    }

    /// Substitute known symbols into `expr`, leaving unknown ones in place.
    #[must_use]
    pub fn substitute(&self, expr: &Expr) -> Expr {
        let mut out = Expr::constant(expr.constant_term());
        for (symbol, coef) in expr.terms() {
            out = match self.values.get(&symbol) {
                Some(value) => out + value * coef,
                None => out + Expr::symbol(symbol) * coef,
            };
        }
        out
    }

    /// Evaluate a structure of expressions (see [`Resolve`]).
    pub fn resolve<T: Resolve>(&self, value: &T) -> Result<T::Output, SolveError> {
        value.resolve(self)
    }
}

/// Structures of expressions that evaluate to structures of numbers.
///
/// External consumers (renderers, figure embedders) implement or use this
/// to extract concrete geometry after a solve.
pub trait Resolve {
    /// The fully numeric counterpart of the implementing type.
    type Output;

    /// Evaluate every expression in `self` against `solution`.
    fn resolve(&self, solution: &Solution) -> Result<Self::Output, SolveError>;
}

impl Resolve for Expr {
    type Output = f64;

    fn resolve(&self, solution: &Solution) -> Result<f64, SolveError> {
        solution.eval(self)
    }
}

impl<T: Resolve> Resolve for [T] {
    type Output = Vec<T::Output>;

    fn resolve(&self, solution: &Solution) -> Result<Self::Output, SolveError> {
        self.iter().map(|item| item.resolve(solution)).collect()
    }
}

/// Solve requiring equation count == unknown count.
pub(crate) fn exact(equations: &[Expr]) -> Result<Solution, SolveError> {
    let (symbols, a, b) = assemble(equations);
    if equations.len() != symbols.len() {
        return Err(SolveError::DegreeMismatch {
            equations: equations.len(),
            unknowns: symbols.len(),
        });
    }
    if symbols.is_empty() {
        return Ok(Solution::default());
    }
    let x = gaussian_solve(a, b)?;
    Ok(Solution::new(symbols.into_iter().zip(x).collect(), Vec::new()))
}

/// Tolerant least-squares solve; never fails, warns instead.
pub(crate) fn least_squares(equations: &[Expr]) -> Solution {
    let (symbols, a, b) = assemble(equations);
    let unknowns = symbols.len();
    if unknowns == 0 {
        return Solution::default();
    }
    let (x, rank) = pseudo_inverse_solve(&a, &b);

    let mut residual = 0.0;
    for row in 0..a.rows {
        let mut acc = -b[row];
        for col in 0..a.cols {
            acc += a.at(row, col) * x[col];
        }
        residual += acc * acc;
    }

    let mut warnings = Vec::new();
    if rank < unknowns {
        log::warn!("rank of system ({rank}) does not match number of unknowns ({unknowns})");
        warnings.push(SolveWarning::RankDeficient { rank, unknowns });
    }
    if residual > RESIDUAL_EPSILON {
        log::warn!("system is over-constrained (squared residual {residual:e})");
        warnings.push(SolveWarning::Overconstrained { residual });
    }
    Solution::new(symbols.into_iter().zip(x).collect(), warnings)
}

/// Collect symbols and lay the equations out as `A x = b`.
fn assemble(equations: &[Expr]) -> (Vec<Symbol>, Matrix, Vec<f64>) {
    let symbols: Vec<Symbol> = equations
        .iter()
        .flat_map(|eq| eq.terms().map(|(s, _)| s))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<Symbol, usize> = symbols
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i))
        .collect();

    let mut a = Matrix::zeros(equations.len(), symbols.len());
    let mut b = vec![0.0; equations.len()];
    for (row, eq) in equations.iter().enumerate() {
        for (symbol, coef) in eq.terms() {
            *a.at_mut(row, index[&symbol]) = coef;
        }
        b[row] = -eq.constant_term();
    }
    (symbols, a, b)
}

/// Dense row-major matrix; small systems only, no blocking.
#[derive(Debug, Clone)]
struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            *m.at_mut(i, i) = 1.0;
        }
        m
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }

    fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                *out.at_mut(col, row) = self.at(row, col);
            }
        }
        out
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data
                .swap(a * self.cols + col, b * self.cols + col);
        }
    }

    fn col_dot(&self, i: usize, j: usize) -> f64 {
        (0..self.rows).map(|r| self.at(r, i) * self.at(r, j)).sum()
    }

    /// Apply a Givens-style rotation to columns `i` and `j`.
    fn rotate_cols(&mut self, i: usize, j: usize, c: f64, s: f64) {
        for row in 0..self.rows {
            let x = self.at(row, i);
            let y = self.at(row, j);
            *self.at_mut(row, i) = c * x - s * y;
            *self.at_mut(row, j) = s * x + c * y;
        }
    }

    fn scale_col(&mut self, col: usize, factor: f64) {
        for row in 0..self.rows {
            *self.at_mut(row, col) *= factor;
        }
    }

    /// `M v`.
    fn apply(&self, v: &[f64]) -> Vec<f64> {
        (0..self.rows)
            .map(|row| (0..self.cols).map(|col| self.at(row, col) * v[col]).sum())
            .collect()
    }

    /// `M^T v`.
    fn apply_transposed(&self, v: &[f64]) -> Vec<f64> {
        (0..self.cols)
            .map(|col| (0..self.rows).map(|row| self.at(row, col) * v[row]).sum())
            .collect()
    }
}

fn gaussian_solve(mut a: Matrix, mut b: Vec<f64>) -> Result<Vec<f64>, SolveError> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| a.at(r1, col).abs().total_cmp(&a.at(r2, col).abs()))
            .unwrap_or(col);
        if a.at(pivot_row, col).abs() < PIVOT_EPSILON {
            return Err(SolveError::Singular);
        }
        a.swap_rows(col, pivot_row);
        b.swap(col, pivot_row);
        for row in col + 1..n {
            let factor = a.at(row, col) / a.at(col, col);
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                *a.at_mut(row, k) -= factor * a.at(col, k);
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut acc = b[col];
        for k in col + 1..n {
            acc -= a.at(col, k) * x[k];
        }
        x[col] = acc / a.at(col, col);
    }
    Ok(x)
}

/// Minimum-norm least-squares solution of `A x = b` plus the numerical
/// rank of `A`.
fn pseudo_inverse_solve(a: &Matrix, b: &[f64]) -> (Vec<f64>, usize) {
    if a.rows >= a.cols {
        // A = U S V^T  =>  x = V S+ U^T b
        let (u, sigma, v) = jacobi_svd(a.clone());
        let (scaled, rank) = scale_by_sigma(&u.apply_transposed(b), &sigma);
        (v.apply(&scaled), rank)
    } else {
        // A^T = U S V^T  =>  A+ = U S+ V^T  =>  x = U S+ V^T b
        let (u, sigma, v) = jacobi_svd(a.transpose());
        let (scaled, rank) = scale_by_sigma(&v.apply_transposed(b), &sigma);
        (u.apply(&scaled), rank)
    }
}

/// One-sided Jacobi SVD of an `m x n` matrix with `m >= n`.
///
/// Returns `(U, sigma, V)` with orthonormal `U` columns (where the
/// corresponding singular value is nonzero) such that `A = U diag(sigma)
/// V^T`.
fn jacobi_svd(mut u: Matrix) -> (Matrix, Vec<f64>, Matrix) {
    let n = u.cols;
    let mut v = Matrix::identity(n);
    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for i in 0..n {
            for j in i + 1..n {
                let alpha = u.col_dot(i, i);
                let beta = u.col_dot(j, j);
                let gamma = u.col_dot(i, j);
                if gamma.abs() <= JACOBI_EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + zeta.mul_add(zeta, 1.0).sqrt());
                let c = 1.0 / t.mul_add(t, 1.0).sqrt();
                let s = c * t;
                u.rotate_cols(i, j, c, s);
                v.rotate_cols(i, j, c, s);
            }
        }
        if !rotated {
            break;
        }
    }
    let mut sigma = vec![0.0; n];
    for i in 0..n {
        let norm = u.col_dot(i, i).sqrt();
        sigma[i] = norm;
        if norm > 0.0 {
            u.scale_col(i, 1.0 / norm);
        }
    }
    (u, sigma, v)
}

/// Divide componentwise by the singular values, zeroing negligible ones;
/// also reports the rank.
fn scale_by_sigma(v: &[f64], sigma: &[f64]) -> (Vec<f64>, usize) {
    let sigma_max = sigma.iter().fold(0.0f64, |acc, s| acc.max(*s));
    let cutoff = if sigma_max > 0.0 {
        sigma_max * RANK_EPSILON
    } else {
        f64::INFINITY
    };
    let mut rank = 0;
    let scaled = v
        .iter()
        .zip(sigma)
        .map(|(value, s)| {
            if *s > cutoff {
                rank += 1;
                value / s
            } else {
                0.0
            }
        })
        .collect();
    (scaled, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-7
    }

    fn eq(terms: &[(Symbol, f64)], k: f64) -> Expr {
        let mut e = Expr::constant(k);
        for (s, c) in terms {
            e = e + Expr::symbol(*s) * *c;
        }
        e
    }

    #[test]
    fn test_exact_two_by_two() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        // x + y = 3, x - y = 1
        let eqs = vec![eq(&[(x, 1.0), (y, 1.0)], -3.0), eq(&[(x, 1.0), (y, -1.0)], -1.0)];
        let sol = exact(&eqs).expect("solvable");
        assert!(near(sol.value(x).expect("x solved"), 2.0));
        assert!(near(sol.value(y).expect("y solved"), 1.0));
    }

    #[test]
    fn test_exact_degree_mismatch() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        let eqs = vec![eq(&[(x, 1.0), (y, 1.0)], -3.0)];
        assert_eq!(
            exact(&eqs),
            Err(SolveError::DegreeMismatch {
                equations: 1,
                unknowns: 2
            })
        );
    }

    #[test]
    fn test_exact_singular() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        // Parallel equations: x + y = 1, 2x + 2y = 4.
        let eqs = vec![
            eq(&[(x, 1.0), (y, 1.0)], -1.0),
            eq(&[(x, 2.0), (y, 2.0)], -4.0),
        ];
        assert_eq!(exact(&eqs), Err(SolveError::Singular));
    }

    #[test]
    fn test_least_squares_exactly_determined() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        let eqs = vec![eq(&[(x, 1.0), (y, 1.0)], -3.0), eq(&[(x, 1.0), (y, -1.0)], -1.0)];
        let sol = least_squares(&eqs);
        assert!(sol.warnings().is_empty());
        assert!(near(sol.value(x).expect("x solved"), 2.0));
        assert!(near(sol.value(y).expect("y solved"), 1.0));
    }

    #[test]
    fn test_least_squares_overconstrained_best_fit() {
        let x = Symbol::fresh();
        // x = 1 and x = 2: best fit is 1.5 with squared residual 0.5.
        let eqs = vec![eq(&[(x, 1.0)], -1.0), eq(&[(x, 1.0)], -2.0)];
        let sol = least_squares(&eqs);
        assert!(near(sol.value(x).expect("x solved"), 1.5));
        assert!(sol
            .warnings()
            .iter()
            .any(|w| matches!(w, SolveWarning::Overconstrained { residual } if near(*residual, 0.5))));
    }

    #[test]
    fn test_least_squares_minimum_norm() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        // x + y = 2 alone: the minimum-norm solution is x = y = 1.
        let eqs = vec![eq(&[(x, 1.0), (y, 1.0)], -2.0)];
        let sol = least_squares(&eqs);
        assert!(near(sol.value(x).expect("x solved"), 1.0));
        assert!(near(sol.value(y).expect("y solved"), 1.0));
        assert!(sol
            .warnings()
            .iter()
            .any(|w| matches!(w, SolveWarning::RankDeficient { rank: 1, unknowns: 2 })));
    }

    #[test]
    fn test_least_squares_empty() {
        let sol = least_squares(&[]);
        assert!(sol.is_empty());
        assert!(sol.warnings().is_empty());
    }

    #[test]
    fn test_solution_eval_and_substitute() {
        let x = Symbol::fresh();
        let y = Symbol::fresh();
        let eqs = vec![eq(&[(x, 1.0)], -2.0)];
        let sol = least_squares(&eqs);
        let expr = Expr::symbol(x) * 3.0 + 1.0;
        assert!(near(sol.eval(&expr).expect("fully known"), 7.0));

        let partial = Expr::symbol(x) + Expr::symbol(y);
        assert_eq!(sol.eval(&partial), Err(SolveError::UnderConstrained));
        let substituted = sol.substitute(&partial);
        assert_eq!(substituted.coefficient(y), 1.0);
        assert!(near(substituted.constant_term(), 2.0));
    }

    #[test]
    fn test_svd_reconstructs_rank() {
        // 3x2 rank-1 matrix.
        let mut a = Matrix::zeros(3, 2);
        for row in 0..3 {
            *a.at_mut(row, 0) = (row + 1) as f64;
            *a.at_mut(row, 1) = 2.0 * (row + 1) as f64;
        }
        let (_, sigma, _) = jacobi_svd(a);
        let (_, rank) = scale_by_sigma(&[0.0, 0.0], &sigma);
        assert_eq!(rank, 1);
    }
}
