//! Traversal state and the descent/ascent machinery shared by the tries.

use crate::{
    collection::Collection,
    digitizer::Digitizer,
    error::TrieError,
    node::{NodeArena, NodeId},
};

/// The structural relationship a search established between the queried
/// element and the content of the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The descent stalled at a leaf before the queried digit sequence was
    /// exhausted; the queried element properly extends a stored element.
    Extension,
    /// The queried element diverged from a compressed leaf by sorting after
    /// it. Produced only by the radix-tree descent.
    Greater,
    /// The queried element diverged from a compressed leaf by sorting
    /// before it. Produced only by the radix-tree descent.
    Less,
    /// The digit sequence was fully consumed and terminates at a leaf.
    Matched,
    /// The digit sequence was fully consumed but a strict subtree remains
    /// below; the queried element is a proper prefix of stored elements.
    Prefix,
    /// A required child slot is absent; no structural relationship.
    Unmatched,
}

/// Per-operation traversal state: the current node, the digit position
/// reached so far, and the digit-by-digit match count used by the
/// radix-tree descent. Plain stack values; every operation starts from a
/// fresh one.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SearchContext {
    pub(crate) pointer: Option<NodeId>,
    pub(crate) branch_position: usize,
    pub(crate) num_matches: usize,
}

impl SearchContext {
    pub(crate) fn reset(&mut self, root: Option<NodeId>) {
        self.pointer = root;
        self.branch_position = 0;
        self.num_matches = 0;
    }

    pub(crate) fn at_leaf<E>(&self, arena: &NodeArena<E>) -> bool {
        self.pointer.is_some_and(|pointer| arena.is_leaf(pointer))
    }

    pub(crate) fn at_root<E>(&self, arena: &NodeArena<E>) -> bool {
        self.pointer
            .is_some_and(|pointer| arena.parent(pointer).is_none())
    }

    /// Follows the child slot selected by the element's digit at the
    /// current branch position. Returns the digit used, or `None` without
    /// moving when the slot is empty.
    pub(crate) fn descend_to<D>(
        &mut self,
        arena: &NodeArena<D::Element>,
        digitizer: &D,
        element: &D::Element,
    ) -> Option<usize>
    where
        D: Digitizer,
    {
        let index = digitizer.digit_at(element, self.branch_position);
        self.descend_to_index(arena, index)
    }

    pub(crate) fn descend_to_index<E>(
        &mut self,
        arena: &NodeArena<E>,
        index: usize,
    ) -> Option<usize> {
        let pointer = self.pointer?;
        let child = arena.child_at(pointer, index).ok().flatten()?;
        self.pointer = Some(child);
        self.branch_position += 1;
        Some(index)
    }

    pub(crate) fn ascend<E>(&mut self, arena: &NodeArena<E>) {
        if let Some(pointer) = self.pointer {
            self.pointer = arena.parent(pointer);
            self.branch_position = self.branch_position.saturating_sub(1);
        }
    }

    /// Attaches `node` under the current node at the slot selected by the
    /// element's digit, then descends into it.
    pub(crate) fn extend_path<D>(
        &mut self,
        arena: &mut NodeArena<D::Element>,
        digitizer: &D,
        element: &D::Element,
        node: NodeId,
    ) -> Result<(), TrieError>
    where
        D: Digitizer,
    {
        let index = digitizer.digit_at(element, self.branch_position);
        let pointer = self
            .pointer
            .expect("[bug] extend_path called without a current node");
        arena.add_child(pointer, index, node)?;
        if self.descend_to_index(arena, index).is_none() {
            unreachable!("[bug] freshly added child must be reachable");
        }
        Ok(())
    }

    /// Descends through the highest-indexed occupied slots until a leaf is
    /// reached. The leaf is the lexicographically-last element under the
    /// current node.
    pub(crate) fn move_to_max_descendant<E>(&mut self, arena: &NodeArena<E>, base: usize) {
        while !self.at_leaf(arena) {
            let descended = (0..base)
                .rev()
                .any(|index| self.descend_to_index(arena, index).is_some());
            if !descended {
                unreachable!("[bug] internal node without children");
            }
        }
    }

    /// Walks upward until an ancestor has an occupied slot strictly below
    /// the digit the element would take at that level, and descends into
    /// the first such slot. Stops at the root when no such fork exists.
    pub(crate) fn retrace_to_last_left_fork<D>(
        &mut self,
        arena: &NodeArena<D::Element>,
        digitizer: &D,
        element: &D::Element,
    ) where
        D: Digitizer,
    {
        loop {
            if !self.at_leaf(arena) {
                let index = digitizer.digit_at(element, self.branch_position);
                if (0..index)
                    .rev()
                    .any(|sibling| self.descend_to_index(arena, sibling).is_some())
                {
                    return;
                }
            }
            if self.at_root(arena) {
                return;
            }
            self.ascend(arena);
        }
    }

    /// Whether the search stopped on the terminator slot: the current node
    /// is its parent's child at slot 0. Node identity is arena-index
    /// identity.
    pub(crate) fn processed_end_of_string<E>(
        &self,
        arena: &NodeArena<E>,
        prefix_free: bool,
    ) -> bool {
        let Some(pointer) = self.pointer else {
            return false;
        };
        if !prefix_free || arena.is_root(pointer) {
            return false;
        }
        let Some(parent) = arena.parent(pointer) else {
            return false;
        };
        arena.child_at(parent, 0).ok().flatten() == Some(pointer)
    }

    /// Appends the value of every leaf under the current node to `out`,
    /// lowest slot first. The context is restored to its starting position
    /// before returning.
    pub(crate) fn elements_in_subtree<E, C>(
        &mut self,
        arena: &NodeArena<E>,
        base: usize,
        out: &mut C,
    ) -> Result<(), TrieError>
    where
        E: Clone,
        C: Collection<E>,
    {
        if self.at_leaf(arena) {
            let pointer = self.pointer.expect("[bug] at_leaf implies a current node");
            if let Some(value) = arena.value(pointer) {
                out.add(value.clone())?;
            }
            return Ok(());
        }
        for index in 0..base {
            if self.descend_to_index(arena, index).is_some() {
                self.elements_in_subtree(arena, base, out)?;
                self.ascend(arena);
            }
        }
        Ok(())
    }
}
