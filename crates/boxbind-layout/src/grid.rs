//! Grids: regions subdivided into tracks separated by gutters.
//!
//! Along each axis a grid with `n` tracks interleaves `n + 1` gutters:
//!
//! ```text
//! gap[0] track[0] gap[1] track[1] ... gap[n-1] track[n-1] gap[n]
//! ```
//!
//! Track breadths and gutters are plain unknowns; the equations tying
//! them to the grid's frame (the per-axis sum, and each gutter's pinned
//! spacing) are generated once, lazily, when the layout is solved. That
//! lets spacing and margins be adjusted at any point between grid
//! construction and the solve.

use std::cell::RefCell;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::rc::Rc;

use boxbind_symbolic::{Expr, Resolve, Solution, SolveError};

use crate::geometry::{Frame, Rect};
use crate::region::Region;
use crate::LayoutError;

/// One of the grid's two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The vertical axis: tracks are rows, the extent is the height.
    Row,
    /// The horizontal axis: tracks are columns, the extent is the width.
    Col,
}

impl Axis {
    const fn index(self) -> usize {
        match self {
            Self::Row => 0,
            Self::Col => 1,
        }
    }
}

/// Per-axis symbols and spacing targets, `[rows, cols]`.
#[derive(Debug)]
struct GridState {
    tracks: [Vec<Expr>; 2],
    gaps: [Vec<Expr>; 2],
    spacing: [Vec<Expr>; 2],
}

impl GridState {
    fn new(rows: usize, cols: usize) -> Self {
        let fresh = |n: usize| (0..n).map(|_| Expr::fresh()).collect::<Vec<_>>();
        let zeros = |n: usize| vec![Expr::zero(); n];
        Self {
            tracks: [fresh(rows), fresh(cols)],
            gaps: [fresh(rows + 1), fresh(cols + 1)],
            spacing: [zeros(rows + 1), zeros(cols + 1)],
        }
    }
}

/// A region carved into rows and columns.
///
/// Cloning a grid clones the handle; all clones address the same tracks.
#[derive(Debug, Clone)]
pub struct Grid {
    region: Region,
    state: Rc<RefCell<GridState>>,
}

impl Grid {
    /// A grid with `rows x cols` cells in its own fresh layout.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_region(Region::new(), rows, cols)
    }

    /// Start describing a grid whose outer frame carries constraints.
    #[must_use]
    pub fn builder(rows: usize, cols: usize) -> GridBuilder {
        GridBuilder {
            rows,
            cols,
            region: Region::builder(),
        }
    }

    /// Subdivide an existing region.
    #[must_use]
    pub fn with_region(region: Region, rows: usize, cols: usize) -> Self {
        let state = Rc::new(RefCell::new(GridState::new(rows, cols)));
        let grid = Self { region, state };
        grid.register_equations();
        grid
    }

    /// The region holding the grid's outer frame.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.state.borrow().tracks[Axis::Row.index()].len()
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.state.borrow().tracks[Axis::Col.index()].len()
    }

    /// Distance from the grid's leading edge to the start of track
    /// `index` on `axis`.
    ///
    /// With `include_last_gap` the gutter preceding track `index` is
    /// counted, giving the position where the track's content begins;
    /// without it the sum stops at the previous track's trailing edge.
    /// `index` may equal the track count to address the far edge; larger
    /// indices clamp to it.
    ///
    /// This is the one primitive every slice edge is built from.
    #[must_use]
    pub fn offset(&self, axis: Axis, index: usize, include_last_gap: bool) -> Expr {
        let state = self.state.borrow();
        let a = axis.index();
        let index = index.min(state.tracks[a].len());
        let gap_end = if include_last_gap { index + 1 } else { index };
        let gap_end = gap_end.min(state.gaps[a].len());
        let mut sum = Expr::zero();
        for track in &state.tracks[a][..index] {
            sum = sum + track.clone();
        }
        for gap in &state.gaps[a][..gap_end] {
            sum = sum + gap.clone();
        }
        sum
    }

    /// The single cell at `(row, col)`. Negative indices count from the
    /// end.
    pub fn cell(&self, row: isize, col: isize) -> Result<GridSlice, LayoutError> {
        self.slice(row, col)
    }

    /// A rectangular span of cells.
    ///
    /// Each selector may be an index (possibly negative), a range, or
    /// `..` for the whole axis.
    pub fn slice(
        &self,
        rows: impl Into<TrackSel>,
        cols: impl Into<TrackSel>,
    ) -> Result<GridSlice, LayoutError> {
        let rows = rows.into().normalize(self.rows())?;
        let cols = cols.into().normalize(self.cols())?;
        let outer = self.region.frame();
        let frame = Frame::new(
            outer.top.clone() + self.offset(Axis::Row, rows.0, true),
            outer.left.clone() + self.offset(Axis::Col, cols.1, false),
            outer.top.clone() + self.offset(Axis::Row, rows.1, false),
            outer.left.clone() + self.offset(Axis::Col, cols.0, true),
        );
        Ok(GridSlice {
            grid: self.clone(),
            rows,
            cols,
            frame,
        })
    }

    /// Pin the four outermost gutters to `value`.
    pub fn margins(&self, value: impl Into<Expr>) {
        let value = value.into();
        let mut state = self.state.borrow_mut();
        for axis in [Axis::Row.index(), Axis::Col.index()] {
            let last = state.spacing[axis].len() - 1;
            state.spacing[axis][0] = value.clone();
            state.spacing[axis][last] = value.clone();
        }
    }

    /// Pin every interior gutter on both axes to `value`.
    pub fn spacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.set_spacing(Axis::Row, 1, self.rows(), &value);
        self.set_spacing(Axis::Col, 1, self.cols(), &value);
    }

    /// Pin the interior gutters separating rows to `value`.
    pub fn hspacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.set_spacing(Axis::Row, 1, self.rows(), &value);
    }

    /// Pin the interior gutters separating columns to `value`.
    pub fn vspacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.set_spacing(Axis::Col, 1, self.cols(), &value);
    }

    /// Pin a single gutter on `axis` to `value`.
    ///
    /// Gutter `index` runs `0..=tracks`: index 0 is the leading margin,
    /// index `tracks` the trailing one.
    pub fn set_gap(
        &self,
        axis: Axis,
        index: usize,
        value: impl Into<Expr>,
    ) -> Result<(), LayoutError> {
        let mut state = self.state.borrow_mut();
        let slots = &mut state.spacing[axis.index()];
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(LayoutError::IndexOutOfRange {
                index: index.try_into().unwrap_or(isize::MAX),
                len,
            })?;
        *slot = value.into();
        Ok(())
    }

    /// Solve with the grid's upper-left corner pinned to the origin.
    pub fn solve(&self) -> Result<Solution, LayoutError> {
        self.region.solve()
    }

    /// Solve, optionally pinning the grid's corner to the origin.
    pub fn solve_with(&self, fix_origin: bool) -> Result<Solution, LayoutError> {
        self.region.solve_with(fix_origin)
    }

    fn set_spacing(&self, axis: Axis, start: usize, end: usize, value: &Expr) {
        // An axis with fewer than two tracks has no interior gutters.
        if start >= end {
            return;
        }
        let mut state = self.state.borrow_mut();
        for slot in &mut state.spacing[axis.index()][start..end] {
            *slot = value.clone();
        }
    }

    /// Queue the track equations, generated once at solve time from
    /// whatever spacing targets are in effect by then.
    fn register_equations(&self) {
        let state = Rc::clone(&self.state);
        let frame = self.region.frame_handle();
        self.region.layout().defer(Box::new(move |sys| {
            let state = state.borrow();
            let frame = frame.borrow();
            let extents = [frame.height(), frame.width()];
            for (axis, extent) in extents.into_iter().enumerate() {
                let mut total = Expr::zero();
                for track in &state.tracks[axis] {
                    total = total + track.clone();
                }
                for gap in &state.gaps[axis] {
                    total = total + gap.clone();
                }
                sys.equate_lenient(total, extent);
                for (gap, spacing) in state.gaps[axis].iter().zip(&state.spacing[axis]) {
                    sys.equate_lenient(gap.clone(), spacing.clone());
                }
            }
            Ok(())
        }));
    }
}

/// Selects tracks along one grid axis.
///
/// Built implicitly from indices and ranges; negative indices count from
/// the end. [`step`](TrackSel::step) exists for symmetry with strided
/// slicing elsewhere but any step other than one is rejected at use.
#[derive(Debug, Clone)]
pub struct TrackSel {
    kind: SelKind,
    step: usize,
}

#[derive(Debug, Clone)]
enum SelKind {
    Index(isize),
    Span { start: usize, end: usize },
    From(usize),
    To(usize),
    Full,
}

impl TrackSel {
    /// Request a stride. Only `1` is solvable.
    #[must_use]
    pub const fn step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// Resolve to a contiguous `start..end` span within `len` tracks.
    pub(crate) fn normalize(&self, len: usize) -> Result<(usize, usize), LayoutError> {
        if self.step != 1 {
            return Err(LayoutError::UnsupportedStride(self.step));
        }
        match self.kind {
            SelKind::Index(index) => {
                let span = isize::try_from(len)
                    .map_err(|_| LayoutError::IndexOutOfRange { index, len })?;
                let wrapped = if index < 0 { index + span } else { index };
                if (0..span).contains(&wrapped) {
                    let start = wrapped.unsigned_abs();
                    Ok((start, start + 1))
                } else {
                    Err(LayoutError::IndexOutOfRange { index, len })
                }
            }
            SelKind::Span { start, end } => {
                let start = start.min(len);
                Ok((start, end.min(len).max(start)))
            }
            SelKind::From(start) => Ok((start.min(len), len)),
            SelKind::To(end) => Ok((0, end.min(len))),
            SelKind::Full => Ok((0, len)),
        }
    }

    const fn of(kind: SelKind) -> Self {
        Self { kind, step: 1 }
    }
}

impl From<usize> for TrackSel {
    fn from(index: usize) -> Self {
        // Single indices go through the checked path so an out-of-range
        // one fails instead of clamping to an empty span.
        Self::of(SelKind::Index(isize::try_from(index).unwrap_or(isize::MAX)))
    }
}

impl From<isize> for TrackSel {
    fn from(index: isize) -> Self {
        Self::of(SelKind::Index(index))
    }
}

impl From<i32> for TrackSel {
    fn from(index: i32) -> Self {
        Self::of(SelKind::Index(index as isize))
    }
}

impl From<Range<usize>> for TrackSel {
    fn from(range: Range<usize>) -> Self {
        Self::of(SelKind::Span {
            start: range.start,
            end: range.end,
        })
    }
}

impl From<RangeFrom<usize>> for TrackSel {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::of(SelKind::From(range.start))
    }
}

impl From<RangeTo<usize>> for TrackSel {
    fn from(range: RangeTo<usize>) -> Self {
        Self::of(SelKind::To(range.end))
    }
}

impl From<RangeFull> for TrackSel {
    fn from(_: RangeFull) -> Self {
        Self::of(SelKind::Full)
    }
}

/// A rectangular span of grid cells.
///
/// A slice is a transient view: it carries the frame spanned by its
/// tracks (content edges, interior gutters included) but is not itself
/// registered anywhere. Use [`fix`](GridSlice::fix) to pin a region into
/// it, or [`Resolve`] to read its rectangle after a solve.
#[derive(Debug, Clone)]
pub struct GridSlice {
    grid: Grid,
    rows: (usize, usize),
    cols: (usize, usize),
    frame: Frame,
}

impl GridSlice {
    /// The edges spanned by this slice.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Pin `child` to occupy exactly this span.
    pub fn fix(&self, child: &Region) {
        let layout = self.grid.region().layout();
        layout.merge(child.layout());
        layout.equate_frame(&self.frame, &child.frame());
    }

    /// Pin the gutters interior to this slice, both axes, to `value`.
    pub fn spacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.grid
            .set_spacing(Axis::Row, self.rows.0 + 1, self.rows.1, &value);
        self.grid
            .set_spacing(Axis::Col, self.cols.0 + 1, self.cols.1, &value);
    }

    /// Pin the gutters between this slice's rows to `value`.
    pub fn hspacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.grid
            .set_spacing(Axis::Row, self.rows.0 + 1, self.rows.1, &value);
    }

    /// Pin the gutters between this slice's columns to `value`.
    pub fn vspacing(&self, value: impl Into<Expr>) {
        let value = value.into();
        self.grid
            .set_spacing(Axis::Col, self.cols.0 + 1, self.cols.1, &value);
    }
}

impl Resolve for GridSlice {
    type Output = Rect;

    fn resolve(&self, solution: &Solution) -> Result<Rect, SolveError> {
        self.frame.resolve(solution)
    }
}

/// Accumulates outer-frame constraints for a new [`Grid`].
#[derive(Debug, Clone)]
pub struct GridBuilder {
    rows: usize,
    cols: usize,
    region: crate::region::RegionBuilder,
}

impl GridBuilder {
    /// Constrain the outer width.
    #[must_use]
    pub fn width(mut self, value: impl Into<Expr>) -> Self {
        self.region = self.region.width(value);
        self
    }

    /// Constrain the outer height.
    #[must_use]
    pub fn height(mut self, value: impl Into<Expr>) -> Self {
        self.region = self.region.height(value);
        self
    }

    /// Constrain outer width and height together.
    #[must_use]
    pub fn size(mut self, width: impl Into<Expr>, height: impl Into<Expr>) -> Self {
        self.region = self.region.size(width, height);
        self
    }

    /// Constrain the upper-left corner.
    #[must_use]
    pub fn loc(mut self, x: impl Into<Expr>, y: impl Into<Expr>) -> Self {
        self.region = self.region.loc(x, y);
        self
    }

    /// Constrain the outer aspect ratio.
    #[must_use]
    pub fn aspect(mut self, ratio: f64) -> Self {
        self.region = self.region.aspect(ratio);
        self
    }

    /// Create the grid.
    #[must_use]
    pub fn build(self) -> Grid {
        Grid::with_region(self.region.build(), self.rows, self.cols)
    }
}
