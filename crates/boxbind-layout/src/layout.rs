//! The shared constraint graph behind entangled regions.
//!
//! A [`Layout`] is a cloneable handle over three union-find cells merged in
//! lockstep: the equation [`System`], the registry of region frames to
//! substitute into after solving, and the list of deferred equation
//! generators. Cloning a handle is cheap; merging two layouts unifies all
//! three cells so every handle on either side observes the combined graph.

use std::cell::RefCell;
use std::rc::Rc;

use boxbind_symbolic::{Expr, MergeCell, Solution, SolveError, System};

use crate::geometry::{Frame, Vect};
use crate::LayoutError;

/// A frame shared between a region handle and the layout's registry.
pub(crate) type SharedFrame = Rc<RefCell<Frame>>;

/// A constraint generator postponed until solve time.
///
/// Run exactly once, in registration order, against the merged system.
pub(crate) type DeferredEq = Box<dyn FnOnce(&mut System) -> Result<(), SolveError>>;

/// A handle to one (possibly merged) constraint graph.
#[derive(Clone, Default)]
pub struct Layout {
    system: MergeCell<System>,
    regions: MergeCell<Vec<SharedFrame>>,
    deferred: MergeCell<Vec<DeferredEq>>,
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout")
            .field("equations", &self.system.with(|sys| sys.equations().len()))
            .field("regions", &self.regions.with(|list| list.len()))
            .field("deferred", &self.deferred.with(|list| list.len()))
            .finish()
    }
}

impl Layout {
    /// Create an empty constraint graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the constraint `a == b`.
    ///
    /// Constraints accumulate freely; contradictions are kept for the
    /// batch solver to settle by least squares rather than rejected here.
    pub fn equate(&self, a: impl Into<Expr>, b: impl Into<Expr>) {
        let (a, b) = (a.into(), b.into());
        self.system.with(|sys| sys.equate_lenient(a, b));
    }

    /// Equate two pairs componentwise.
    pub fn equate_vect(&self, a: &Vect, b: &Vect) {
        self.equate(a.x.clone(), b.x.clone());
        self.equate(a.y.clone(), b.y.clone());
    }

    /// Equate two frames edge by edge.
    pub fn equate_frame(&self, a: &Frame, b: &Frame) {
        self.equate(a.top.clone(), b.top.clone());
        self.equate(a.right.clone(), b.right.clone());
        self.equate(a.bottom.clone(), b.bottom.clone());
        self.equate(a.left.clone(), b.left.clone());
    }

    /// Unify this graph with `other`.
    ///
    /// Cheap (amortized-constant union-find link) and idempotent. Must
    /// happen before an equation spanning both graphs is added, which is
    /// why [`Region::fix`](crate::Region::fix) merges first and equates
    /// second.
    pub fn merge(&self, other: &Self) {
        self.system.merge(&other.system);
        self.regions.merge(&other.regions);
        self.deferred.merge(&other.deferred);
    }

    /// True when both handles drive the same merged graph.
    #[must_use]
    pub fn is_entangled_with(&self, other: &Self) -> bool {
        self.system.is_merged_with(&other.system)
    }

    /// Evaluate `expr` against the facts recorded so far.
    pub fn eval(&self, expr: &Expr) -> Result<f64, SolveError> {
        self.system.with(|sys| sys.eval(expr))
    }

    /// Simplify `expr` through the facts recorded so far.
    #[must_use]
    pub fn simplify(&self, expr: &Expr) -> Expr {
        self.system.with(|sys| sys.simplify(expr))
    }

    /// Register a deferred equation generator.
    pub(crate) fn defer(&self, thunk: DeferredEq) {
        self.deferred.with(|list| list.push(thunk));
    }

    /// Track a frame so the solve driver can write numbers back into it.
    pub(crate) fn register(&self, frame: SharedFrame) {
        self.regions.with(|list| list.push(frame));
    }

    /// Solve the merged graph.
    ///
    /// Runs every pending deferred generator exactly once (consuming the
    /// list), performs the batch least-squares solve, clears the consumed
    /// equation set, and substitutes the numeric solution into every
    /// registered frame. A second call without new constraints finds an
    /// empty equation set and no-ops harmlessly; deferred generators do
    /// not regenerate.
    pub fn solve(&self) -> Result<Solution, LayoutError> {
        let thunks: Vec<DeferredEq> = self.deferred.with(std::mem::take);
        let solution = self.system.with(|sys| {
            for thunk in thunks {
                thunk(sys)?;
            }
            log::debug!(
                "solving {} equation(s) over {} unknown(s)",
                sys.equations().len(),
                sys.unknowns().len()
            );
            let solution = sys.batch_solve();
            sys.clear();
            Ok::<_, SolveError>(solution)
        })?;
        self.regions.with(|frames| {
            for frame in frames {
                let mut frame = frame.borrow_mut();
                frame.top = solution.substitute(&frame.top);
                frame.right = solution.substitute(&frame.right);
                frame.bottom = solution.substitute(&frame.bottom);
                frame.left = solution.substitute(&frame.left);
            }
        });
        Ok(solution)
    }
}
