//! Rectangular regions bound to a constraint graph.

use std::cell::RefCell;
use std::rc::Rc;

use boxbind_symbolic::{Expr, Resolve, Solution, SolveError};

use crate::geometry::{Frame, Rect, Vect};
use crate::layout::{Layout, SharedFrame};
use crate::LayoutError;

/// A rectangle whose four edges are unknowns in a shared [`Layout`].
///
/// A freshly created region knows nothing about its position or size;
/// every constructor argument and every later call adds equations to the
/// underlying graph. Cloning a region clones the handle, not the
/// rectangle: both clones describe the same four edges.
#[derive(Debug, Clone)]
pub struct Region {
    layout: Layout,
    frame: SharedFrame,
}

impl Region {
    /// A region with four fresh edges in its own fresh layout.
    #[must_use]
    pub fn new() -> Self {
        Self::from_frame(Layout::new(), Frame::fresh())
    }

    /// Start describing a region with edge and size constraints.
    #[must_use]
    pub fn builder() -> RegionBuilder {
        RegionBuilder::default()
    }

    /// Wrap `frame` in a region handle and register it for numeric
    /// write-back after a solve.
    pub(crate) fn from_frame(layout: Layout, frame: Frame) -> Self {
        let frame = Rc::new(RefCell::new(frame));
        layout.register(Rc::clone(&frame));
        Self { layout, frame }
    }

    /// The constraint graph this region lives in.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// A snapshot of the four edges.
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.frame.borrow().clone()
    }

    pub(crate) fn frame_handle(&self) -> SharedFrame {
        Rc::clone(&self.frame)
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub fn top(&self) -> Expr {
        self.frame.borrow().top.clone()
    }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> Expr {
        self.frame.borrow().right.clone()
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Expr {
        self.frame.borrow().bottom.clone()
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub fn left(&self) -> Expr {
        self.frame.borrow().left.clone()
    }

    /// Derived width, `right - left`.
    #[must_use]
    pub fn width(&self) -> Expr {
        self.frame.borrow().width()
    }

    /// Derived height, `bottom - top`.
    #[must_use]
    pub fn height(&self) -> Expr {
        self.frame.borrow().height()
    }

    /// The upper-left corner.
    #[must_use]
    pub fn loc(&self) -> Vect {
        self.frame.borrow().loc()
    }

    /// Width and height as a pair.
    #[must_use]
    pub fn size(&self) -> Vect {
        self.frame.borrow().size()
    }

    /// An inner region inset from this one, CSS-shorthand style.
    ///
    /// One offset insets all four edges; two give `(vertical, horizontal)`;
    /// three give `(top, horizontal, bottom)`; four give
    /// `(top, right, bottom, left)`. The inner region shares this region's
    /// layout, so no `fix` is needed afterwards.
    pub fn pad<E>(&self, offsets: &[E]) -> Result<Self, LayoutError>
    where
        E: Clone + Into<Expr>,
    {
        let offsets: Vec<Expr> = offsets.iter().cloned().map(Into::into).collect();
        self.pad_exprs(offsets)
    }

    /// An outer region extended beyond this one; the inverse of [`pad`].
    ///
    /// `inner.surround(o)` and `outer.pad(o)` describe the same edge
    /// relationship from opposite sides.
    ///
    /// [`pad`]: Region::pad
    pub fn surround<E>(&self, offsets: &[E]) -> Result<Self, LayoutError>
    where
        E: Clone + Into<Expr>,
    {
        let offsets: Vec<Expr> = offsets.iter().cloned().map(|e| -e.into()).collect();
        self.pad_exprs(offsets)
    }

    fn pad_exprs(&self, offsets: Vec<Expr>) -> Result<Self, LayoutError> {
        let (t, r, b, l) = match offsets.as_slice() {
            [] => return Err(LayoutError::NoOffsets),
            [all] => (all.clone(), all.clone(), all.clone(), all.clone()),
            [v, h] => (v.clone(), h.clone(), v.clone(), h.clone()),
            [t, h, b] => (t.clone(), h.clone(), b.clone(), h.clone()),
            [t, r, b, l] => (t.clone(), r.clone(), b.clone(), l.clone()),
            more => return Err(LayoutError::TooManyOffsets(more.len())),
        };
        let outer = self.frame.borrow();
        let inner = Frame::new(
            outer.top.clone() + t,
            outer.right.clone() - r,
            outer.bottom.clone() - b,
            outer.left.clone() + l,
        );
        drop(outer);
        Ok(Self::from_frame(self.layout.clone(), inner))
    }

    /// Pin `other` to occupy exactly this rectangle.
    ///
    /// Merges the two constraint graphs first, then equates the frames
    /// edge by edge, so constraints written on either side beforehand
    /// survive into the combined graph.
    pub fn fix(&self, other: &Self) {
        self.layout.merge(&other.layout);
        let ours = self.frame();
        let theirs = other.frame();
        self.layout.equate_frame(&ours, &theirs);
    }

    /// Solve with this region's upper-left corner pinned to the origin.
    pub fn solve(&self) -> Result<Solution, LayoutError> {
        self.solve_with(true)
    }

    /// Solve the merged graph, optionally pinning this region's
    /// upper-left corner to `(0, 0)` to remove the trivial translation
    /// freedom.
    pub fn solve_with(&self, fix_origin: bool) -> Result<Solution, LayoutError> {
        if fix_origin {
            self.layout.equate_vect(&self.loc(), &Vect::new(0.0, 0.0));
        }
        self.layout.solve()
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for Region {
    type Output = Rect;

    fn resolve(&self, solution: &Solution) -> Result<Rect, SolveError> {
        self.frame().resolve(solution)
    }
}

/// Accumulates edge and size constraints for a new [`Region`].
#[derive(Debug, Clone, Default)]
pub struct RegionBuilder {
    top: Option<Expr>,
    right: Option<Expr>,
    bottom: Option<Expr>,
    left: Option<Expr>,
    width: Option<Expr>,
    height: Option<Expr>,
    loc: Option<Vect>,
    aspect: Option<f64>,
    rect: Option<Rect>,
}

impl RegionBuilder {
    /// Constrain the top edge.
    #[must_use]
    pub fn top(mut self, value: impl Into<Expr>) -> Self {
        self.top = Some(value.into());
        self
    }

    /// Constrain the right edge.
    #[must_use]
    pub fn right(mut self, value: impl Into<Expr>) -> Self {
        self.right = Some(value.into());
        self
    }

    /// Constrain the bottom edge.
    #[must_use]
    pub fn bottom(mut self, value: impl Into<Expr>) -> Self {
        self.bottom = Some(value.into());
        self
    }

    /// Constrain the left edge.
    #[must_use]
    pub fn left(mut self, value: impl Into<Expr>) -> Self {
        self.left = Some(value.into());
        self
    }

    /// Constrain the width.
    #[must_use]
    pub fn width(mut self, value: impl Into<Expr>) -> Self {
        self.width = Some(value.into());
        self
    }

    /// Constrain the height.
    #[must_use]
    pub fn height(mut self, value: impl Into<Expr>) -> Self {
        self.height = Some(value.into());
        self
    }

    /// Constrain the upper-left corner.
    #[must_use]
    pub fn loc(mut self, x: impl Into<Expr>, y: impl Into<Expr>) -> Self {
        self.loc = Some(Vect::new(x, y));
        self
    }

    /// Constrain width and height together.
    #[must_use]
    pub fn size(mut self, width: impl Into<Expr>, height: impl Into<Expr>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    /// Constrain the aspect ratio, `width == ratio * height`.
    #[must_use]
    pub const fn aspect(mut self, ratio: f64) -> Self {
        self.aspect = Some(ratio);
        self
    }

    /// Constrain all four edges to a concrete rectangle.
    #[must_use]
    pub const fn rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Create the region and record every accumulated constraint.
    #[must_use]
    pub fn build(self) -> Region {
        let region = Region::new();
        let layout = region.layout().clone();
        if let Some(rect) = self.rect {
            layout.equate(region.top(), rect.y);
            layout.equate(region.right(), rect.x + rect.width);
            layout.equate(region.bottom(), rect.y + rect.height);
            layout.equate(region.left(), rect.x);
        }
        if let Some(top) = self.top {
            layout.equate(region.top(), top);
        }
        if let Some(right) = self.right {
            layout.equate(region.right(), right);
        }
        if let Some(bottom) = self.bottom {
            layout.equate(region.bottom(), bottom);
        }
        if let Some(left) = self.left {
            layout.equate(region.left(), left);
        }
        if let Some(width) = self.width {
            layout.equate(region.width(), width);
        }
        if let Some(height) = self.height {
            layout.equate(region.height(), height);
        }
        if let Some(loc) = self.loc {
            layout.equate_vect(&region.loc(), &loc);
        }
        if let Some(ratio) = self.aspect {
            layout.equate(region.width(), region.height() * ratio);
        }
        region
    }
}
