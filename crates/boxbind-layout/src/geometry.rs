//! Geometric values, symbolic and numeric.
//!
//! [`Vect`] and [`Frame`] hold expressions and describe geometry *before*
//! a solve; [`Point`], [`Size`], and [`Rect`] are their plain-number
//! counterparts, produced by evaluating against a
//! [`Solution`](boxbind_symbolic::Solution).
//!
//! A frame stores exactly its four edges. Width, height, location, and
//! size are always derived from the edges, never stored independently.

use boxbind_symbolic::{Expr, Resolve, Solution, SolveError};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A pair of expressions, `x` across and `y` down.
#[derive(Debug, Clone, PartialEq)]
pub struct Vect {
    /// Horizontal component.
    pub x: Expr,
    /// Vertical component.
    pub y: Expr,
}

impl Vect {
    /// Create a new symbolic pair.
    #[must_use]
    pub fn new(x: impl Into<Expr>, y: impl Into<Expr>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl Add for Vect {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vect {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The four edges of a rectangle, as expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Y coordinate of the top edge.
    pub top: Expr,
    /// X coordinate of the right edge.
    pub right: Expr,
    /// Y coordinate of the bottom edge.
    pub bottom: Expr,
    /// X coordinate of the left edge.
    pub left: Expr,
}

impl Frame {
    /// Create a frame from explicit edges.
    #[must_use]
    pub fn new(
        top: impl Into<Expr>,
        right: impl Into<Expr>,
        bottom: impl Into<Expr>,
        left: impl Into<Expr>,
    ) -> Self {
        Self {
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            left: left.into(),
        }
    }

    /// A frame with four fresh edge symbols.
    #[must_use]
    pub fn fresh() -> Self {
        Self::new(Expr::fresh(), Expr::fresh(), Expr::fresh(), Expr::fresh())
    }

    /// Derived width: `right - left`.
    #[must_use]
    pub fn width(&self) -> Expr {
        self.right.clone() - self.left.clone()
    }

    /// Derived height: `bottom - top`.
    #[must_use]
    pub fn height(&self) -> Expr {
        self.bottom.clone() - self.top.clone()
    }

    /// Derived location: the upper-left corner `(left, top)`.
    #[must_use]
    pub fn loc(&self) -> Vect {
        Vect::new(self.left.clone(), self.top.clone())
    }

    /// Derived size: `(width, height)`.
    #[must_use]
    pub fn size(&self) -> Vect {
        Vect::new(self.width(), self.height())
    }
}

/// A 2D point with concrete coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0)
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A concrete 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Size {
    /// Zero size
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Aspect ratio (width / height).
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }
}

/// A concrete rectangle: position of the upper-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position of the upper-left corner
    pub x: f64,
    /// Y position of the upper-left corner
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Resolve for Vect {
    type Output = Point;

    fn resolve(&self, solution: &Solution) -> Result<Point, SolveError> {
        Ok(Point::new(solution.eval(&self.x)?, solution.eval(&self.y)?))
    }
}

impl Resolve for Frame {
    type Output = Rect;

    fn resolve(&self, solution: &Solution) -> Result<Rect, SolveError> {
        let left = solution.eval(&self.left)?;
        let top = solution.eval(&self.top)?;
        let right = solution.eval(&self.right)?;
        let bottom = solution.eval(&self.bottom)?;
        Ok(Rect::new(left, top, right - left, bottom - top))
    }
}
