//! Incremental symbolic linear solver for the boxbind layout engine.
//!
//! The building blocks, leaves first:
//!
//! - [`Symbol`]: an opaque, identity-unique unknown scalar.
//! - [`Expr`]: a sparse linear combination of symbols plus a constant.
//! - [`System`]: equation accumulation with online elimination, plus exact
//!   and least-squares solve entry points.
//! - [`MergeCell`]: a rank-balanced union-find cell that joins
//!   independently built collections without copying, so existing handles
//!   keep working after a merge.
//! - [`Solution`]: the numeric result of a solve, with [`Resolve`] for
//!   evaluating whole structures of expressions.
//!
//! ```
//! use boxbind_symbolic::{Expr, System};
//!
//! let mut system = System::new();
//! let (x, y) = (Expr::fresh(), Expr::fresh());
//! system.equate(x.clone() + y.clone(), 3.0)?;
//! system.equate(x.clone() - y.clone(), 1.0)?;
//! assert!((system.eval(&x)? - 2.0).abs() < 1e-9);
//! # Ok::<(), boxbind_symbolic::SolveError>(())
//! ```

mod error;
mod expr;
mod merge;
mod solve;
mod system;

pub use error::{SolveError, SolveWarning};
pub use expr::{Expr, Symbol, TOLERANCE};
pub use merge::{MergeCell, Mergeable};
pub use solve::{Resolve, Solution};
pub use system::System;
