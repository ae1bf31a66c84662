//! Error and warning types for the symbolic solver.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by equation accumulation and solving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// An equation reduced to a nonzero constant: the constraints
    /// contradict each other.
    #[error("inconsistent system: equation reduced to {residual} = 0")]
    Inconsistent {
        /// The leftover constant of the contradictory equation.
        residual: f64,
    },

    /// The exact solver requires as many equations as unknowns.
    #[error("degree mismatch: {equations} equation(s) for {unknowns} unknown(s)")]
    DegreeMismatch {
        /// Accumulated equation count.
        equations: usize,
        /// Distinct symbols referenced by the equations.
        unknowns: usize,
    },

    /// The exact solver hit a numerically singular coefficient matrix.
    #[error("singular coefficient matrix")]
    Singular,

    /// Evaluation was requested on an expression that still contains free
    /// symbols after simplification.
    #[error("under-constrained: expression still contains free symbols")]
    UnderConstrained,
}

/// Non-fatal diagnostics from the least-squares batch solve.
///
/// Warnings never block the returned solution; they are carried on the
/// [`Solution`](crate::Solution) and also emitted through `log::warn!`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolveWarning {
    /// The system's rank is below the number of unknowns; the returned
    /// values are the minimum-norm choice among infinitely many solutions.
    RankDeficient {
        /// Numerical rank of the coefficient matrix.
        rank: usize,
        /// Distinct symbols referenced by the equations.
        unknowns: usize,
    },
    /// The residual error exceeds the solver epsilon; the returned values
    /// are the least-squares best fit.
    Overconstrained {
        /// Squared residual of the best-fit solution.
        residual: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolveError::DegreeMismatch {
            equations: 3,
            unknowns: 2,
        };
        assert!(err.to_string().contains("3 equation(s)"));
        assert!(err.to_string().contains("2 unknown(s)"));

        let err = SolveError::Inconsistent { residual: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_warning_roundtrips_through_serde() {
        let warning = SolveWarning::RankDeficient {
            rank: 1,
            unknowns: 2,
        };
        let json = serde_json::to_string(&warning).expect("serializes");
        let back: SolveWarning = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, warning);
    }
}
