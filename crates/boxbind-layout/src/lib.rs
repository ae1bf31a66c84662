//! Declarative 2D layout on top of the boxbind symbolic solver.
//!
//! Geometry is described, not computed: a [`Region`] is four unknown
//! edges, a [`Grid`] carves a region into tracks and gutters, and the
//! flow combinators ([`row`], [`column`], [`align`], ...) relate whole
//! groups at once. Regions built independently are joined by
//! [`Region::fix`] or a combinator, which merges their constraint
//! graphs; a single [`solve`](Region::solve) then settles every
//! rectangle at once, by least squares when the description is over- or
//! under-determined.
//!
//! ```
//! use boxbind_layout::{Grid, Region};
//! use boxbind_symbolic::Resolve;
//!
//! let grid = Grid::builder(1, 2).width(6.0).height(2.0).build();
//! grid.spacing(0.4);
//! let left = Region::builder().width(2.0).build();
//! grid.cell(0, 0)?.fix(&left);
//!
//! let solution = grid.solve()?;
//! let rect = left.resolve(&solution)?;
//! assert!((rect.width - 2.0).abs() < 1e-9);
//! assert!((rect.x - 0.0).abs() < 1e-9);
//! # Ok::<(), boxbind_layout::LayoutError>(())
//! ```

mod error;
mod flow;
mod geometry;
mod grid;
mod layout;
mod region;

pub use error::LayoutError;
pub use flow::{align, aspect, column, hcat, row, set_height, set_size, set_width, vcat};
pub use geometry::{Frame, Point, Rect, Size, Vect};
pub use grid::{Axis, Grid, GridBuilder, GridSlice, TrackSel};
pub use layout::Layout;
pub use region::{Region, RegionBuilder};
