//! A generic mergeable cell backed by a rank-balanced union-find.
//!
//! Independently built collections (equation systems, region registries,
//! deferred-equation lists) are joined without copying old data into a new
//! object: after `a.merge(&b)`, every handle previously pointing at either
//! cell observes the same unified content. Merging is idempotent on
//! already-unified pairs and the resulting relation is an equivalence.

use std::cell::RefCell;
use std::rc::Rc;

/// How a cell's content combines with another cell's content on merge.
pub trait Mergeable {
    /// Fold `other` into `self`.
    fn absorb(&mut self, other: Self);
}

impl<T> Mergeable for Vec<T> {
    fn absorb(&mut self, mut other: Self) {
        self.append(&mut other);
    }
}

enum Slot<T> {
    Root { rank: u32, content: T },
    Link(Rc<RefCell<Slot<T>>>),
}

/// A cloneable handle to union-find-merged content.
///
/// Every cell starts as its own root. [`MergeCell::merge`] links the
/// lower-rank root under the higher-rank one (ties bump the winner's rank)
/// and combines content via [`Mergeable::absorb`]. Content access resolves
/// to the current root, compressing the path walked.
#[derive(Debug)]
pub struct MergeCell<T> {
    node: Rc<RefCell<Slot<T>>>,
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root { rank, .. } => f.debug_struct("Root").field("rank", rank).finish(),
            Self::Link(_) => f.write_str("Link"),
        }
    }
}

impl<T> Clone for MergeCell<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T> MergeCell<T> {
    /// Create a new root cell holding `content`.
    #[must_use]
    pub fn new(content: T) -> Self {
        Self {
            node: Rc::new(RefCell::new(Slot::Root { rank: 0, content })),
        }
    }

    /// Run `f` against the unified content.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let root = self.root();
        let mut slot = root.borrow_mut();
        match &mut *slot {
            Slot::Root { content, .. } => f(content),
            // root() only ever returns a Root slot.
            Slot::Link(_) => unreachable!("root() returned a link"),
        }
    }

    /// True when both handles resolve to the same root.
    #[must_use]
    pub fn is_merged_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root(), &other.root())
    }

    fn root(&self) -> Rc<RefCell<Slot<T>>> {
        let mut current = Rc::clone(&self.node);
        loop {
            let next = match &*current.borrow() {
                Slot::Root { .. } => None,
                Slot::Link(parent) => Some(Rc::clone(parent)),
            };
            match next {
                None => break,
                Some(parent) => current = parent,
            }
        }
        // Path compression: point every link on the walked chain at the root.
        let root = current;
        let mut walk = Rc::clone(&self.node);
        loop {
            if Rc::ptr_eq(&walk, &root) {
                break;
            }
            let next = match &*walk.borrow() {
                Slot::Root { .. } => None,
                Slot::Link(parent) => Some(Rc::clone(parent)),
            };
            match next {
                None => break,
                Some(parent) => {
                    *walk.borrow_mut() = Slot::Link(Rc::clone(&root));
                    walk = parent;
                }
            }
        }
        root
    }
}

impl<T: Mergeable> MergeCell<T> {
    /// Unify this cell with `other`.
    ///
    /// A no-op when the two handles already share a root.
    pub fn merge(&self, other: &Self) {
        let x = self.root();
        let y = other.root();
        if Rc::ptr_eq(&x, &y) {
            return;
        }
        let rank_of = |node: &Rc<RefCell<Slot<T>>>| match &*node.borrow() {
            Slot::Root { rank, .. } => *rank,
            Slot::Link(_) => 0,
        };
        let (rx, ry) = (rank_of(&x), rank_of(&y));
        let (winner, loser) = if rx < ry { (y, x) } else { (x, y) };
        let detached = std::mem::replace(
            &mut *loser.borrow_mut(),
            Slot::Link(Rc::clone(&winner)),
        );
        if let Slot::Root { content, .. } = detached {
            if let Slot::Root { rank, content: kept } = &mut *winner.borrow_mut() {
                kept.absorb(content);
                if rx == ry {
                    *rank += 1;
                }
            }
        }
    }
}

impl<T: Mergeable + Default> Default for MergeCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_merge_concatenates_vec_content() {
        let a = MergeCell::new(vec![1, 2]);
        let b = MergeCell::new(vec![3]);
        a.merge(&b);
        let seen = a.with(|v| v.clone());
        assert_eq!(seen, vec![1, 2, 3]);
        // Both handles observe the unified content.
        assert_eq!(b.with(|v| v.len()), 3);
    }

    #[test]
    fn test_mutation_through_either_handle_is_shared() {
        let a = MergeCell::new(vec![1]);
        let b = MergeCell::new(vec![2]);
        a.merge(&b);
        b.with(|v| v.push(3));
        assert_eq!(a.with(|v| v.clone()), vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = MergeCell::new(vec![1]);
        let b = MergeCell::new(vec![2]);
        a.merge(&b);
        a.merge(&b);
        b.merge(&a);
        assert_eq!(a.with(|v| v.clone()), vec![1, 2]);
    }

    #[test]
    fn test_cloned_handle_tracks_merges() {
        let a = MergeCell::new(vec![1]);
        let a2 = a.clone();
        let b = MergeCell::new(vec![2]);
        a.merge(&b);
        assert!(a2.is_merged_with(&b));
        assert_eq!(a2.with(|v| v.len()), 2);
    }

    #[test]
    fn test_transitive_merges_share_one_root() {
        let a = MergeCell::new(vec![1]);
        let b = MergeCell::new(vec![2]);
        let c = MergeCell::new(vec![3]);
        a.merge(&b);
        b.merge(&c);
        assert!(a.is_merged_with(&c));
        let mut seen = a.with(|v| v.clone());
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    proptest! {
        // Merging in any pairing order yields the same unified multiset.
        #[test]
        fn prop_merge_order_is_immaterial(order in prop::sample::select(vec![
            [(0, 1), (1, 2), (2, 3)],
            [(2, 3), (0, 1), (1, 2)],
            [(1, 2), (2, 3), (0, 1)],
            [(0, 3), (1, 2), (0, 1)],
        ])) {
            let cells: Vec<MergeCell<Vec<u32>>> =
                (0..4u32).map(|i| MergeCell::new(vec![i])).collect();
            for (i, j) in order {
                cells[i].merge(&cells[j]);
            }
            for cell in &cells {
                prop_assert!(cell.is_merged_with(&cells[0]));
                let mut seen = cell.with(|v| v.clone());
                seen.sort_unstable();
                prop_assert_eq!(seen, vec![0, 1, 2, 3]);
            }
        }
    }
}
