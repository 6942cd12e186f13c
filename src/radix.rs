//! # Path-compressed variant of the trie.

use std::fmt;

use crate::{
    collection::{Collection, OrderedCollection, PrefixSearch},
    digitizer::{Digitizer, StringDigitizer},
    error::TrieError,
    node::NodeId,
    search::{SearchContext, SearchOutcome},
    trie::{Iter, Trie},
};

/// A trie that keeps each leaf at the shallowest depth where its digit
/// sequence becomes unique, instead of materializing one internal node per
/// digit. The node at depth `k` always branches on digit `k`, so internal
/// chains exist only where stored elements actually share a prefix.
///
/// Removal is not supported; path compression makes un-splitting ambiguous
/// without reference counting the shared prefixes.
pub struct RadixTree<D: Digitizer> {
    trie: Trie<D>,
}

impl RadixTree<StringDigitizer> {
    /// Creates a radix tree over strings drawn from an alphabet of the
    /// given size.
    #[must_use]
    pub fn new(alphabet_size: usize) -> Self {
        Self::with_digitizer(StringDigitizer::new(alphabet_size))
    }
}

impl<D: Digitizer> RadixTree<D> {
    /// Creates a radix tree that extracts digits with the given digitizer.
    pub fn with_digitizer(digitizer: D) -> Self {
        Self {
            trie: Trie::with_digitizer(digitizer),
        }
    }

    /// The number of elements in the tree.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.trie.size()
    }

    /// Whether the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Whether an element with the same digit sequence is present.
    #[must_use]
    pub fn contains(&self, element: &D::Element) -> bool {
        self.search(element) == SearchOutcome::Matched
    }

    /// Classifies the relationship between the given element and the tree
    /// content.
    #[must_use]
    pub fn search(&self, element: &D::Element) -> SearchOutcome {
        let mut sctx = SearchContext::default();
        self.find(element, &mut sctx)
    }

    /// The element with the lowest position in iteration order.
    #[must_use]
    pub fn min(&self) -> Option<&D::Element> {
        self.trie.min()
    }

    /// The element with the highest position in iteration order.
    #[must_use]
    pub fn max(&self) -> Option<&D::Element> {
        self.trie.max()
    }

    /// The stored element immediately before the given element in
    /// iteration order, if any.
    #[must_use]
    pub fn predecessor(&self, element: &D::Element) -> Option<&D::Element> {
        if self.is_empty() {
            return None;
        }
        let mut sctx = SearchContext::default();
        let outcome = self.find(element, &mut sctx);
        self.trie.predecessor_from(element, &mut sctx, outcome)
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
            sctx.pointer.and_then(|pointer| self.trie.arena.next(pointer))
        } else {
            let outcome = self.find(element, &mut sctx);
            if self.trie.move_to_predecessor(element, &mut sctx, outcome) {
                sctx.pointer.and_then(|pointer| self.trie.arena.next(pointer))
            } else {
                None
            }
        }?;
        self.trie.successor_value(successor)
    }

    /// The element at the given iteration position.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::IndexOutOfRange`] when `index >= size()`.
    pub fn value_at(&self, index: usize) -> Result<&D::Element, TrieError> {
        self.trie.value_at(index)
    }

    /// An iterator over the stored elements in ascending order.
    pub fn iter(&self) -> Iter<'_, D> {
        self.trie.iter()
    }

    /// Removes all elements, dropping every node.
    pub fn clear(&mut self) {
        self.trie.clear();
    }

    /// Removal is not implemented for the path-compressed representation.
    ///
    /// # Panics
    ///
    /// Always.
    pub fn remove(&mut self, _element: &D::Element) -> bool {
        panic!("removal is not supported by RadixTree");
    }

    /// Descends through the chain of shared-prefix nodes, then resolves the
    /// relationship by comparing the remaining digits against the
    /// compressed leaf's value.
    fn find(&self, element: &D::Element, sctx: &mut SearchContext) -> SearchOutcome {
        sctx.reset(self.trie.root);
        if self.is_empty() {
            return SearchOutcome::Unmatched;
        }
        let num_digits = self.trie.digitizer.digit_count(element);
        while sctx.branch_position < num_digits && !sctx.at_leaf(&self.trie.arena) {
            if sctx
                .descend_to(&self.trie.arena, &self.trie.digitizer, element)
                .is_none()
            {
                return SearchOutcome::Unmatched;
            }
        }
        if !sctx.at_leaf(&self.trie.arena) {
            return SearchOutcome::Prefix;
        }
        sctx.num_matches = sctx.branch_position;
        self.check_match_from_leaf(element, sctx)
    }

    /// Compares the element against the leaf under the context, digit by
    /// digit from the first position the descent did not cover.
    fn check_match_from_leaf(
        &self,
        element: &D::Element,
        sctx: &mut SearchContext,
    ) -> SearchOutcome {
        let pointer = sctx.pointer.expect("[bug] comparison requires a leaf");
        let Some(leaf_value) = self.trie.arena.value(pointer) else {
            return SearchOutcome::Unmatched;
        };
        let digitizer = &self.trie.digitizer;
        let element_digits = digitizer.digit_count(element);
        let leaf_digits = digitizer.digit_count(leaf_value);
        let stop = element_digits.min(leaf_digits);
        while sctx.num_matches < stop {
            let target_digit = digitizer.digit_at(element, sctx.num_matches);
            let leaf_digit = digitizer.digit_at(leaf_value, sctx.num_matches);
            if target_digit < leaf_digit {
                if digitizer.is_prefix_free() && target_digit == 0 {
                    return SearchOutcome::Prefix;
                }
                return SearchOutcome::Less;
            }
            if target_digit > leaf_digit {
                return SearchOutcome::Greater;
            }
            sctx.num_matches += 1;
        }
        if sctx.num_matches == element_digits {
            if sctx.num_matches == leaf_digits {
                return SearchOutcome::Matched;
            }
            return SearchOutcome::Prefix;
        }
        SearchOutcome::Extension
    }
}

impl<D: Digitizer> RadixTree<D>
where
    D::Element: Clone,
{
    /// Inserts the element into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::PrefixViolation`] when the element is already
    /// present, or when the digitizer is not prefix-free and the element is
    /// a prefix or an extension of a stored element. Returns
    /// [`TrieError::IndexOutOfRange`] when one of the element's digits does
    /// not fit the digitizer's base; the tree is left unchanged.
    pub fn add(&mut self, element: D::Element) -> Result<(), TrieError> {
        self.trie.check_digits(&element)?;
        let mut sctx = SearchContext::default();
        let outcome = self.find(&element, &mut sctx);
        if outcome == SearchOutcome::Matched
            || (!self.trie.digitizer.is_prefix_free()
                && matches!(outcome, SearchOutcome::Prefix | SearchOutcome::Extension))
        {
            return Err(TrieError::PrefixViolation {
                element: self.trie.format_element(&element),
            });
        }
        let leaf = self.trie.arena.alloc_leaf(element.clone());
        self.add_node(leaf, &element, &mut sctx)?;
        self.trie.link_ordered(leaf, &element, &mut sctx);
        Ok(())
    }

    /// A snapshot of the stored elements in ascending order.
    #[must_use]
    pub fn values(&self) -> Vec<D::Element> {
        self.trie.values()
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
        self.trie.completions_from(prefix, &mut sctx, outcome, out)
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
        self.trie.longest_common_prefix_from(&mut sctx, out)
    }

    /// Attaches a new leaf at the divergence point, splitting the edge to
    /// an existing compressed leaf when the descent stalled on one: the
    /// stalled leaf is detached, the shared digits grow a chain of internal
    /// nodes, and both leaves re-attach at the first digit where they
    /// differ.
    fn add_node(
        &mut self,
        node: NodeId,
        element: &D::Element,
        sctx: &mut SearchContext,
    ) -> Result<(), TrieError> {
        let capacity = self.trie.capacity;
        if sctx.pointer.is_none() {
            let root = self.trie.arena.alloc_root(capacity);
            self.trie.root = Some(root);
            sctx.pointer = Some(root);
        }
        if sctx.at_leaf(&self.trie.arena) {
            let stalled = sctx.pointer.expect("[bug] at_leaf implies a current node");
            let leaf_value = self
                .trie
                .arena
                .value(stalled)
                .expect("[bug] a stored leaf holds a value")
                .clone();
            sctx.ascend(&self.trie.arena);
            let parent = sctx
                .pointer
                .expect("[bug] a stored leaf hangs below some node");
            self.trie.arena.remove_child_at(
                parent,
                self.trie.digitizer.digit_at(&leaf_value, sctx.branch_position),
            );
            while self.trie.digitizer.digit_at(element, sctx.branch_position)
                == self.trie.digitizer.digit_at(&leaf_value, sctx.branch_position)
            {
                let chain = self.trie.arena.alloc_internal(capacity);
                sctx.extend_path(&mut self.trie.arena, &self.trie.digitizer, element, chain)?;
            }
            sctx.extend_path(&mut self.trie.arena, &self.trie.digitizer, &leaf_value, stalled)?;
            sctx.ascend(&self.trie.arena);
        }
        sctx.extend_path(&mut self.trie.arena, &self.trie.digitizer, element, node)
    }
}

impl<D: Digitizer> fmt::Debug for RadixTree<D>
where
    D::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.trie.fmt(f)
    }
}

impl<D: Digitizer> fmt::Display for RadixTree<D>
where
    D::Element: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.trie.fmt(f)
    }
}

impl<D: Digitizer> Collection<D::Element> for RadixTree<D>
where
    D::Element: Clone,
{
    fn add(&mut self, element: D::Element) -> Result<(), TrieError> {
        Self::add(self, element)
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

impl<D: Digitizer> OrderedCollection<D::Element> for RadixTree<D>
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

impl<D: Digitizer> PrefixSearch<D::Element> for RadixTree<D>
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

impl<'t, D: Digitizer> IntoIterator for &'t RadixTree<D> {
    type Item = &'t D::Element;
    type IntoIter = Iter<'t, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Collection, RadixTree, SearchOutcome, StringDigitizer, TrieError};

    fn radix_of(alphabet_size: usize, elements: &[&str]) -> RadixTree<StringDigitizer> {
        let mut tree = RadixTree::new(alphabet_size);
        tree.add_all(elements.iter().map(|element| (*element).to_string()))
            .unwrap();
        tree
    }

    fn strings(elements: &[&str]) -> Vec<String> {
        elements.iter().map(|element| (*element).to_string()).collect()
    }

    #[test]
    fn test_add_and_contains() {
        let tree = radix_of(4, &["acb", "dabc", "daca", "da", "ab"]);
        assert_eq!(tree.size(), 5);
        for element in ["acb", "dabc", "daca", "da", "ab"] {
            assert!(tree.contains(&element.to_string()), "missing {element}");
        }
        assert!(!tree.contains(&"dab".to_string()));
        assert!(!tree.contains(&"d".to_string()));
        assert!(!tree.contains(&"dacab".to_string()));
    }

    #[test]
    fn test_values_are_sorted() {
        let tree = radix_of(4, &["acb", "dabc", "daca", "da", "ab"]);
        assert_eq!(tree.values(), strings(&["ab", "acb", "da", "dabc", "daca"]));
        assert_eq!(tree.to_string(), "[ab, acb, da, dabc, daca]");
    }

    #[test]
    fn test_edge_split_keeps_both_leaves() {
        let mut tree = radix_of(4, &["dabc"]);
        // Splitting the compressed edge must re-attach the stalled leaf at
        // the divergence digit before attaching the new one.
        tree.add("da".to_string()).unwrap();
        assert!(tree.contains(&"dabc".to_string()));
        assert!(tree.contains(&"da".to_string()));

        tree.add("daca".to_string()).unwrap();
        assert_eq!(tree.values(), strings(&["da", "dabc", "daca"]));
    }

    #[test]
    fn test_add_rejects_digits_outside_alphabet() {
        let mut tree = radix_of(4, &["dabc"]);
        let err = tree.add("dz".to_string()).unwrap_err();
        assert_eq!(err, TrieError::IndexOutOfRange { index: 26, bound: 5 });
        assert_eq!(tree.size(), 1);

        // The rejected insertion must not have split the compressed edge.
        assert_eq!(
            tree.predecessor(&"dz".to_string()).map(String::as_str),
            Some("dabc")
        );
        tree.add("da".to_string()).unwrap();
        assert_eq!(tree.values(), strings(&["da", "dabc"]));
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let mut tree = radix_of(4, &["dabc", "da"]);
        let err = tree.add("da".to_string()).unwrap_err();
        assert!(matches!(err, TrieError::PrefixViolation { .. }));
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn test_search_outcomes() {
        let tree = radix_of(4, &["acb", "dabc", "daca", "da", "ab"]);
        assert_eq!(tree.search(&"da".to_string()), SearchOutcome::Matched);
        assert_eq!(tree.search(&"dab".to_string()), SearchOutcome::Prefix);
        // An extension diverges at the stored leaf's terminator digit.
        assert_eq!(tree.search(&"dabca".to_string()), SearchOutcome::Greater);
        assert_eq!(tree.search(&"daba".to_string()), SearchOutcome::Less);
        assert_eq!(tree.search(&"dabd".to_string()), SearchOutcome::Greater);
        assert_eq!(tree.search(&"c".to_string()), SearchOutcome::Unmatched);
    }

    #[test]
    fn test_min_max() {
        let tree = radix_of(5, &["cba", "ab", "bce", "abcd"]);
        assert_eq!(tree.min().map(String::as_str), Some("ab"));
        assert_eq!(tree.max().map(String::as_str), Some("cba"));

        let empty = RadixTree::new(5);
        assert_eq!(empty.min(), None);
        assert_eq!(empty.max(), None);
    }

    #[test]
    fn test_predecessor() {
        let tree = radix_of(4, &["bac", "dab", "dabb", "dac", "daca", "dabba", "ab"]);
        assert_eq!(
            tree.values(),
            strings(&["ab", "bac", "dab", "dabb", "dabba", "dac", "daca"])
        );
        assert_eq!(
            tree.predecessor(&"dabba".to_string()).map(String::as_str),
            Some("dabb")
        );
        assert_eq!(
            tree.predecessor(&"bac".to_string()).map(String::as_str),
            Some("ab")
        );
        // The descent stalls on a compressed leaf that sorts before the
        // queried element, making the leaf itself the predecessor.
        assert_eq!(
            tree.predecessor(&"dabbaa".to_string()).map(String::as_str),
            Some("dabba")
        );
        assert_eq!(
            tree.predecessor(&"dacaa".to_string()).map(String::as_str),
            Some("daca")
        );
        assert_eq!(
            tree.predecessor(&"daa".to_string()).map(String::as_str),
            Some("bac")
        );
        assert_eq!(tree.predecessor(&"ab".to_string()), None);
    }

    #[test]
    fn test_successor() {
        let tree = radix_of(4, &["bac", "dab", "dabb", "dac", "daca", "dabba", "ab"]);
        assert_eq!(
            tree.successor(&"dabba".to_string()).map(String::as_str),
            Some("dac")
        );
        assert_eq!(
            tree.successor(&"bac".to_string()).map(String::as_str),
            Some("dab")
        );
        assert_eq!(tree.successor(&"daca".to_string()), None);
    }

    #[test]
    fn test_completions() {
        let tree = radix_of(4, &["acb", "dabc", "daca", "da", "ab"]);

        let mut out = Vec::new();
        tree.completions(&"a".to_string(), &mut out).unwrap();
        assert_eq!(out, strings(&["ab", "acb"]));

        out.clear();
        tree.completions(&"da".to_string(), &mut out).unwrap();
        assert_eq!(out, strings(&["da", "dabc", "daca"]));

        out.clear();
        tree.completions(&"dab".to_string(), &mut out).unwrap();
        assert_eq!(out, strings(&["dabc"]));

        out.clear();
        tree.completions(&"d".to_string(), &mut out).unwrap();
        assert_eq!(out, strings(&["da", "dabc", "daca"]));

        out.clear();
        tree.completions(&"b".to_string(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_longest_common_prefix() {
        let tree = radix_of(4, &["acb", "dadc", "dada", "da", "ab"]);

        let mut out = Vec::new();
        tree.longest_common_prefix(&"dadda".to_string(), &mut out)
            .unwrap();
        assert_eq!(out, strings(&["dada", "dadc"]));

        out.clear();
        tree.longest_common_prefix(&"a".to_string(), &mut out)
            .unwrap();
        assert_eq!(out, strings(&["ab", "acb"]));
    }

    #[test]
    fn test_value_at() {
        let tree = radix_of(4, &["acb", "dabc", "daca", "da", "ab"]);
        assert_eq!(tree.value_at(2).map(String::as_str), Ok("da"));
        assert_eq!(
            tree.value_at(5),
            Err(TrieError::IndexOutOfRange { index: 5, bound: 5 })
        );
    }

    #[test]
    #[should_panic(expected = "removal is not supported")]
    fn test_remove_panics() {
        let mut tree = radix_of(4, &["ab"]);
        tree.remove(&"ab".to_string());
    }

    #[test]
    fn test_clear() {
        let mut tree = radix_of(4, &["acb", "dabc", "da"]);
        tree.clear();
        assert!(tree.is_empty());
        assert!(!tree.contains(&"da".to_string()));

        tree.add("da".to_string()).unwrap();
        assert_eq!(tree.values(), strings(&["da"]));
    }
}
