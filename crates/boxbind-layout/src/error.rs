//! Error types for the layout crate.

use boxbind_symbolic::SolveError;
use thiserror::Error;

/// Errors raised while authoring or solving a layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A grid index fell outside `[-n, n)` for an axis with `n` tracks.
    #[error("grid index {index} out of range for {len} track(s)")]
    IndexOutOfRange {
        /// The offending index as given.
        index: isize,
        /// Track count on the addressed axis.
        len: usize,
    },

    /// A grid range used a step other than one.
    #[error("grid ranges must be contiguous (got step {0})")]
    UnsupportedStride(usize),

    /// `pad`/`surround` accept at most four offsets.
    #[error("pad/surround take at most 4 offsets ({0} given)")]
    TooManyOffsets(usize),

    /// `pad`/`surround` need at least one offset.
    #[error("pad/surround need at least one offset")]
    NoOffsets,

    /// A flow combinator was handed an empty list of regions.
    #[error("flow combinators need at least one region")]
    NoRegions,

    /// An alignment string contained a letter other than t, r, b, or l.
    #[error("unknown edge letter {0:?} (expected one of t, r, b, l)")]
    UnknownEdge(char),

    /// The underlying equation system rejected a constraint or solve.
    #[error(transparent)]
    Solve(#[from] SolveError),
}
