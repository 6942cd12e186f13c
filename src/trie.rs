//! # Ordered prefix-search trie.

use std::fmt;

use crate::{
    collection::{Collection, OrderedCollection, PrefixSearch},
    digitizer::{Digitizer, StringDigitizer},
    error::TrieError,
    node::{NodeArena, NodeId},
    search::{SearchContext, SearchOutcome},
};

/// An ordered trie over the digit sequences produced by a [`Digitizer`].
///
/// Every node has one child slot per digit value. Leaves are additionally
/// threaded through a doubly-linked list bounded by two permanent
/// sentinels, which yields the elements in ascending digit-sequence order
/// without re-walking the tree. This structure serves as the entrypoint for
/// all tree operations.
pub struct Trie<D: Digitizer> {
    pub(crate) arena: NodeArena<D::Element>,
    pub(crate) root: Option<NodeId>,
    pub(crate) head: NodeId,
    pub(crate) tail: NodeId,
    pub(crate) digitizer: D,
    pub(crate) capacity: usize,
    pub(crate) size: usize,
}

impl Trie<StringDigitizer> {
    /// Creates a trie over strings drawn from an alphabet of the given
    /// size.
    #[must_use]
    pub fn new(alphabet_size: usize) -> Self {
        Self::with_digitizer(StringDigitizer::new(alphabet_size))
    }
}

impl<D: Digitizer> Trie<D> {
    /// Creates a trie that extracts digits with the given digitizer. The
    /// digitizer's base determines the number of child slots per node.
    pub fn with_digitizer(digitizer: D) -> Self {
        let capacity = digitizer.base();
        let mut arena = NodeArena::new();
        let head = arena.alloc_head();
        let tail = arena.alloc_tail();
        arena.set_next(head, Some(tail));
        arena.set_next(tail, Some(head));
        Self {
            arena,
            root: None,
            head,
            tail,
            digitizer,
            capacity,
            size: 0,
        }
    }

    /// The number of elements in the trie.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether the trie contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether an element with the same digit sequence is present.
    #[must_use]
    pub fn contains(&self, element: &D::Element) -> bool {
        self.search(element) == SearchOutcome::Matched
    }

    /// Classifies the relationship between the given element and the trie
    /// content.
    #[must_use]
    pub fn search(&self, element: &D::Element) -> SearchOutcome {
        let mut sctx = SearchContext::default();
        self.find(element, &mut sctx)
    }

    /// The element with the lowest position in iteration order.
    #[must_use]
    pub fn min(&self) -> Option<&D::Element> {
        if self.is_empty() {
            return None;
        }
        self.arena
            .next(self.head)
            .and_then(|first| self.arena.value(first))
    }

    /// The element with the highest position in iteration order.
    #[must_use]
    pub fn max(&self) -> Option<&D::Element> {
        if self.is_empty() {
            return None;
        }
        self.arena
            .previous(self.tail)
            .and_then(|last| self.arena.value(last))
    }

    /// The stored element immediately before the given element in
    /// iteration order, if any. The element itself need not be present.
    #[must_use]
    pub fn predecessor(&self, element: &D::Element) -> Option<&D::Element> {
        if self.is_empty() {
            return None;
        }
        let mut sctx = SearchContext::default();
        let outcome = self.find(element, &mut sctx);
        self.predecessor_from(element, &mut sctx, outcome)
    }

    /// The stored element immediately after the given element in iteration
    /// order, if any.
    #[must_use]
    pub fn successor(&self, element: &D::Element) -> Option<&D::Element> {
        if self.is_empty() {
            return None;
        }
        let mut sctx = SearchContext::default();
        let outcome = self.find(element, &mut sctx);
        let successor = if outcome == SearchOutcome::Matched {
            self.arena.next(sctx.pointer?)
        } else {
            let outcome = self.find(element, &mut sctx);
            if self.move_to_predecessor(element, &mut sctx, outcome) {
                self.arena.next(sctx.pointer?)
            } else {
                None
            }
        }?;
        self.successor_value(successor)
    }

    /// The element at the given iteration position.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::IndexOutOfRange`] when `index >= size()`.
    pub fn value_at(&self, index: usize) -> Result<&D::Element, TrieError> {
        self.iter().nth(index).ok_or(TrieError::IndexOutOfRange {
            index,
            bound: self.size,
        })
    }

    /// An iterator over the stored elements in ascending order.
    pub fn iter(&self) -> Iter<'_, D> {
        Iter {
            trie: self,
            pointer: self.head,
        }
    }

    /// A cursor positioned before the first element, supporting removal of
    /// the element under it.
    pub fn cursor(&mut self) -> Cursor<'_, D> {
        let pointer = self.head;
        Cursor {
            trie: self,
            pointer,
        }
    }

    /// Removes all elements, dropping every node.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = self.arena.alloc_head();
        self.tail = self.arena.alloc_tail();
        self.arena.set_next(self.head, Some(self.tail));
        self.arena.set_next(self.tail, Some(self.head));
        self.root = None;
        self.size = 0;
    }

    /// Descends one digit at a time from the root, leaving the context at
    /// the deepest node reached.
    pub(crate) fn find(&self, element: &D::Element, sctx: &mut SearchContext) -> SearchOutcome {
        sctx.reset(self.root);
        if self.is_empty() {
            return SearchOutcome::Unmatched;
        }
        let num_digits = self.digitizer.digit_count(element);
        while sctx.pointer.is_some() && !sctx.at_leaf(&self.arena) {
            if sctx.branch_position == num_digits {
                return SearchOutcome::Prefix;
            }
            if sctx
                .descend_to(&self.arena, &self.digitizer, element)
                .is_none()
            {
                return SearchOutcome::Unmatched;
            }
        }
        if sctx.pointer.is_some() && sctx.branch_position != num_digits {
            SearchOutcome::Extension
        } else {
            SearchOutcome::Matched
        }
    }

    /// Moves the context to the in-order predecessor of the element,
    /// returning `false` when none exists.
    pub(crate) fn move_to_predecessor(
        &self,
        element: &D::Element,
        sctx: &mut SearchContext,
        outcome: SearchOutcome,
    ) -> bool {
        if sctx.at_leaf(&self.arena)
            && matches!(outcome, SearchOutcome::Greater | SearchOutcome::Extension)
        {
            return true;
        }
        if outcome != SearchOutcome::Greater {
            sctx.retrace_to_last_left_fork(&self.arena, &self.digitizer, element);
        }
        if sctx.at_root(&self.arena) {
            return false;
        }
        if !sctx.at_leaf(&self.arena) {
            sctx.move_to_max_descendant(&self.arena, self.capacity);
        }
        true
    }

    pub(crate) fn predecessor_from(
        &self,
        element: &D::Element,
        sctx: &mut SearchContext,
        outcome: SearchOutcome,
    ) -> Option<&D::Element> {
        if self.move_to_predecessor(element, sctx, outcome) {
            sctx.pointer.and_then(|pointer| self.arena.value(pointer))
        } else {
            None
        }
    }

    /// Resolves a list successor candidate, treating the tail sentinel as
    /// absence.
    pub(crate) fn successor_value(&self, successor: NodeId) -> Option<&D::Element> {
        if self.arena.is_tail(successor) {
            None
        } else {
            self.arena.value(successor)
        }
    }

    /// Verifies that every digit of the element fits the child arrays,
    /// before any node is attached on its behalf.
    pub(crate) fn check_digits(&self, element: &D::Element) -> Result<(), TrieError> {
        for place in 0..self.digitizer.digit_count(element) {
            let index = self.digitizer.digit_at(element, place);
            if index >= self.capacity {
                return Err(TrieError::IndexOutOfRange {
                    index,
                    bound: self.capacity,
                });
            }
        }
        Ok(())
    }

    /// Renders an element digit by digit for error messages.
    pub(crate) fn format_element(&self, element: &D::Element) -> String {
        (0..self.digitizer.digit_count(element))
            .map(|place| self.digitizer.format_digit(element, place))
            .collect()
    }
}

impl<D: Digitizer> Trie<D>
where
    D::Element: Clone,
{
    /// Inserts the element into the trie.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::PrefixViolation`] when the element is already
    /// present, or when the digitizer is not prefix-free and the element is
    /// a prefix or an extension of a stored element. Returns
    /// [`TrieError::IndexOutOfRange`] when one of the element's digits does
    /// not fit the digitizer's base; the trie is left unchanged.
    pub fn add(&mut self, element: D::Element) -> Result<(), TrieError> {
        self.insert(element).map(|_| ())
    }

    /// Removes the element with the same digit sequence, returning whether
    /// one was removed. Ancestors left childless are pruned immediately.
    pub fn remove(&mut self, element: &D::Element) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut sctx = SearchContext::default();
        if self.find(element, &mut sctx) != SearchOutcome::Matched {
            return false;
        }
        let Some(leaf) = sctx.pointer else {
            return false;
        };
        self.remove_node(leaf);
        true
    }

    /// A snapshot of the stored elements in ascending order.
    #[must_use]
    pub fn values(&self) -> Vec<D::Element> {
        self.iter().cloned().collect()
    }

    /// Appends every stored element starting with the given prefix to
    /// `out`, in ascending order.
    ///
    /// # Errors
    ///
    /// Propagates the sink's failure to accept an element.
    pub fn completions<C>(&self, prefix: &D::Element, out: &mut C) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        if self.is_empty() {
            return Ok(());
        }
        let mut sctx = SearchContext::default();
        let outcome = self.find(prefix, &mut sctx);
        self.completions_from(prefix, &mut sctx, outcome, out)
    }

    /// Appends every stored element sharing the deepest existing branch
    /// point with the given element to `out`, in ascending order.
    ///
    /// # Errors
    ///
    /// Propagates the sink's failure to accept an element.
    pub fn longest_common_prefix<C>(
        &self,
        element: &D::Element,
        out: &mut C,
    ) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        if self.is_empty() {
            return Ok(());
        }
        let mut sctx = SearchContext::default();
        self.find(element, &mut sctx);
        self.longest_common_prefix_from(&mut sctx, out)
    }

    pub(crate) fn insert(&mut self, element: D::Element) -> Result<NodeId, TrieError> {
        self.check_digits(&element)?;
        let mut sctx = SearchContext::default();
        let outcome = self.find(&element, &mut sctx);
        if outcome == SearchOutcome::Matched
            || (!self.digitizer.is_prefix_free()
                && matches!(outcome, SearchOutcome::Prefix | SearchOutcome::Extension))
        {
            return Err(TrieError::PrefixViolation {
                element: self.format_element(&element),
            });
        }
        let leaf = self.arena.alloc_leaf(element.clone());
        self.add_node(leaf, &element, &mut sctx)?;
        self.link_ordered(leaf, &element, &mut sctx);
        Ok(leaf)
    }

    /// Materializes the chain of internal nodes needed to host `node` at
    /// the element's digit position, creating the root on first insertion.
    pub(crate) fn add_node(
        &mut self,
        node: NodeId,
        element: &D::Element,
        sctx: &mut SearchContext,
    ) -> Result<(), TrieError> {
        if sctx.pointer.is_none() {
            let root = self.arena.alloc_root(self.capacity);
            self.root = Some(root);
            sctx.pointer = Some(root);
        }
        let num_digits = self.digitizer.digit_count(element);
        while sctx.branch_position + 1 < num_digits {
            let child = self.arena.alloc_internal(self.capacity);
            sctx.extend_path(&mut self.arena, &self.digitizer, element, child)?;
        }
        sctx.extend_path(&mut self.arena, &self.digitizer, element, node)
    }

    /// Splices a freshly attached leaf into the ordered list right after
    /// its in-order predecessor, or after the head sentinel when it is the
    /// new minimum.
    pub(crate) fn link_ordered(
        &mut self,
        leaf: NodeId,
        element: &D::Element,
        sctx: &mut SearchContext,
    ) {
        if self.move_to_predecessor(element, sctx, SearchOutcome::Matched) {
            let predecessor = sctx
                .pointer
                .expect("[bug] predecessor position must be a node");
            self.arena.add_after(leaf, predecessor);
        } else {
            self.arena.add_after(leaf, self.head);
        }
        self.size += 1;
    }

    /// Unlinks a leaf from the ordered list and prunes its ancestor chain
    /// while ancestors have no remaining children. Pruned internal nodes
    /// return to the arena's free list; the leaf itself stays as a
    /// tombstone so cursors positioned at it can still advance.
    pub(crate) fn remove_node(&mut self, node: NodeId) {
        if self.arena.is_leaf(node) {
            self.arena.unlink(node);
        }
        let Some(element) = self.arena.value(node).cloned() else {
            return;
        };
        let mut level = self.digitizer.digit_count(&element);
        let mut current = node;
        while !self.arena.is_root(current) && !self.arena.has_children(current) {
            let Some(parent) = self.arena.parent(current) else {
                break;
            };
            level -= 1;
            self.arena
                .remove_child_at(parent, self.digitizer.digit_at(&element, level));
            if !self.arena.is_leaf(current) {
                self.arena.release(current);
            }
            current = parent;
        }
        self.size -= 1;
    }

    pub(crate) fn completions_from<C>(
        &self,
        prefix: &D::Element,
        sctx: &mut SearchContext,
        outcome: SearchOutcome,
        out: &mut C,
    ) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        let mut num_digits = self.digitizer.digit_count(prefix);
        if self.digitizer.is_prefix_free() {
            // The terminator digit should not force an exact-length match.
            num_digits -= 1;
            if sctx.processed_end_of_string(&self.arena, true) {
                sctx.ascend(&self.arena);
            }
        }
        if matches!(outcome, SearchOutcome::Prefix | SearchOutcome::Matched)
            || sctx.branch_position == num_digits
        {
            sctx.elements_in_subtree(&self.arena, self.capacity, out)?;
        }
        Ok(())
    }

    pub(crate) fn longest_common_prefix_from<C>(
        &self,
        sctx: &mut SearchContext,
        out: &mut C,
    ) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        if sctx.processed_end_of_string(&self.arena, self.digitizer.is_prefix_free()) {
            sctx.ascend(&self.arena);
        }
        sctx.elements_in_subtree(&self.arena, self.capacity, out)
    }
}

impl<D: Digitizer> fmt::Debug for Trie<D>
where
    D::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.debug_print_node(f, root, 0, 0),
            None => writeln!(f, "empty"),
        }
    }
}

impl<D: Digitizer> Trie<D>
where
    D::Element: fmt::Debug,
{
    fn debug_print_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: NodeId,
        slot: usize,
        level: usize,
    ) -> fmt::Result {
        for _ in 0..level {
            write!(f, "  ")?;
        }
        if self.arena.is_leaf(node) {
            writeln!(f, "[{slot:03}] leaf: {:?}", self.arena.value(node))
        } else {
            writeln!(f, "[{slot:03}] node")?;
            for index in 0..self.capacity {
                if let Ok(Some(child)) = self.arena.child_at(node, index) {
                    self.debug_print_node(f, child, index, level + 1)?;
                }
            }
            Ok(())
        }
    }
}

impl<D: Digitizer> fmt::Display for Trie<D>
where
    D::Element: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (position, element) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{element}")?;
        }
        write!(f, "]")
    }
}

impl<D: Digitizer> Collection<D::Element> for Trie<D>
where
    D::Element: Clone,
{
    fn add(&mut self, element: D::Element) -> Result<(), TrieError> {
        self.insert(element).map(|_| ())
    }

    fn remove(&mut self, element: &D::Element) -> bool {
        Self::remove(self, element)
    }

    fn size(&self) -> usize {
        Self::size(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn contains(&self, element: &D::Element) -> bool {
        Self::contains(self, element)
    }

    fn values(&self) -> Vec<D::Element> {
        Self::values(self)
    }
}

impl<D: Digitizer> OrderedCollection<D::Element> for Trie<D>
where
    D::Element: Clone,
{
    fn min(&self) -> Option<&D::Element> {
        Self::min(self)
    }

    fn max(&self) -> Option<&D::Element> {
        Self::max(self)
    }

    fn predecessor(&self, element: &D::Element) -> Option<&D::Element> {
        Self::predecessor(self, element)
    }

    fn successor(&self, element: &D::Element) -> Option<&D::Element> {
        Self::successor(self, element)
    }
}

impl<D: Digitizer> PrefixSearch<D::Element> for Trie<D>
where
    D::Element: Clone,
{
    fn completions<C>(&self, prefix: &D::Element, out: &mut C) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        Self::completions(self, prefix, out)
    }

    fn longest_common_prefix<C>(&self, element: &D::Element, out: &mut C) -> Result<(), TrieError>
    where
        C: Collection<D::Element>,
    {
        Self::longest_common_prefix(self, element, out)
    }
}

/// A forward iterator over the stored elements in ascending order.
pub struct Iter<'t, D: Digitizer> {
    trie: &'t Trie<D>,
    pointer: NodeId,
}

impl<D: Digitizer> fmt::Debug for Iter<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl<'t, D: Digitizer> Iterator for Iter<'t, D> {
    type Item = &'t D::Element;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        loop {
            if trie.arena.is_tail(self.pointer) {
                return None;
            }
            self.pointer = trie.arena.next(self.pointer)?;
            if trie.arena.is_tail(self.pointer) {
                return None;
            }
            if !trie.arena.is_deleted(self.pointer) {
                return trie.arena.value(self.pointer);
            }
        }
    }
}

impl<'t, D: Digitizer> IntoIterator for &'t Trie<D> {
    type Item = &'t D::Element;
    type IntoIter = Iter<'t, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A bidirectional cursor over the ordered list, able to remove the
/// element currently under it. Tombstoned leaves encountered while moving
/// are skipped lazily, re-pointing their forward links past further
/// tombstones as they are traversed.
pub struct Cursor<'t, D: Digitizer> {
    trie: &'t mut Trie<D>,
    pointer: NodeId,
}

impl<D: Digitizer> fmt::Debug for Cursor<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl<D: Digitizer> Cursor<'_, D> {
    /// Whether the cursor currently rests on a live element.
    #[must_use]
    pub fn in_collection(&self) -> bool {
        let arena = &self.trie.arena;
        !arena.is_head(self.pointer)
            && !arena.is_tail(self.pointer)
            && !arena.is_deleted(self.pointer)
    }

    /// The element under the cursor, if it rests on a live element.
    #[must_use]
    pub fn get(&self) -> Option<&D::Element> {
        if self.in_collection() {
            self.trie.arena.value(self.pointer)
        } else {
            None
        }
    }

    /// Steps forward, returning `false` once the end is reached.
    pub fn advance(&mut self) -> bool {
        if self.trie.arena.is_tail(self.pointer) {
            return false;
        }
        if !self.trie.arena.is_head(self.pointer) && self.trie.arena.is_deleted(self.pointer) {
            self.pointer = self.skip_removed(self.pointer);
        } else {
            let next = self
                .trie
                .arena
                .next(self.pointer)
                .expect("[bug] a non-tail list node always has a successor");
            self.pointer = next;
        }
        !self.trie.arena.is_tail(self.pointer)
    }

    /// Steps backward, returning `false` once the start is reached.
    pub fn retreat(&mut self) -> bool {
        if !self.trie.arena.is_tail(self.pointer)
            && !self.trie.arena.is_head(self.pointer)
            && self.trie.arena.is_deleted(self.pointer)
        {
            self.pointer = self.skip_removed(self.pointer);
        }
        let Some(previous) = self.trie.arena.previous(self.pointer) else {
            return false;
        };
        self.pointer = previous;
        !self.trie.arena.is_head(self.pointer)
    }

    /// Re-points the forward links of a run of tombstones at the first
    /// live node after it, then returns that node.
    fn skip_removed(&mut self, node: NodeId) -> NodeId {
        let arena = &self.trie.arena;
        if arena.is_head(node) || arena.is_tail(node) || !arena.is_deleted(node) {
            return node;
        }
        let next = self
            .trie
            .arena
            .next(node)
            .expect("[bug] a tombstone keeps its forward link");
        let live = self.skip_removed(next);
        self.trie.arena.set_next(node, Some(live));
        live
    }
}

impl<D: Digitizer> Cursor<'_, D>
where
    D::Element: Clone,
{
    /// Removes the element currently under the cursor from the trie, if
    /// the cursor rests on a live element.
    pub fn remove(&mut self) {
        if self.in_collection() {
            self.trie.remove_node(self.pointer);
        }
    }
}
