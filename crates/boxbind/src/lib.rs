//! Boxbind: declarative constraint-based 2D layout.
//!
//! Describe rectangles by the relations between them instead of
//! computing coordinates by hand, then solve the whole arrangement in
//! one shot. Geometry lives in [`layout`]; the symbolic solver
//! underneath is re-exported at the root.
//!
//! ```
//! use boxbind::layout::{row, Region};
//!
//! let figure = Region::builder().width(6.0).build();
//! let content = figure.pad(&[0.3])?;
//!
//! let left = Region::builder().aspect(1.0).build();
//! let right = Region::builder().aspect(1.0).build();
//! content.fix(&row(&[&left, &right], 0.3)?);
//!
//! let solution = figure.solve()?;
//! let height = solution.eval(&figure.height())?;
//! assert!((height - 3.15).abs() < 1e-9);
//! # Ok::<(), boxbind::layout::LayoutError>(())
//! ```

pub use boxbind_layout as layout;
pub use boxbind_symbolic::{
    Expr, MergeCell, Mergeable, Resolve, Solution, SolveError, SolveWarning, Symbol, System,
    TOLERANCE,
};
