//! Capability contracts implemented by the tries and by output sinks.

use crate::error::TrieError;

/// A mutable collection of elements.
///
/// Prefix queries append their results to any type implementing this
/// contract; `Vec<E>` is the plain resizable sink.
pub trait Collection<E> {
    /// Inserts the element. Returns an error when the collection cannot
    /// accept it, e.g. a trie rejecting a prefix-violating element.
    fn add(&mut self, element: E) -> Result<(), TrieError>;

    /// Inserts every element from the source, stopping at the first
    /// failure.
    fn add_all<I>(&mut self, elements: I) -> Result<(), TrieError>
    where
        I: IntoIterator<Item = E>,
        Self: Sized,
    {
        for element in elements {
            self.add(element)?;
        }
        Ok(())
    }

    /// Removes the first occurrence of an equivalent element, returning
    /// whether one was removed.
    fn remove(&mut self, element: &E) -> bool;

    /// The number of elements currently held.
    fn size(&self) -> usize;

    /// Whether the collection holds no elements.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Removes every element.
    fn clear(&mut self);

    /// Whether an equivalent element is present.
    fn contains(&self, element: &E) -> bool;

    /// A snapshot of the elements in iteration order.
    fn values(&self) -> Vec<E>;
}

/// A collection whose elements are algorithmically positioned.
pub trait OrderedCollection<E>: Collection<E> {
    /// The first element in iteration order, if any.
    fn min(&self) -> Option<&E>;

    /// The last element in iteration order, if any.
    fn max(&self) -> Option<&E>;

    /// The stored element immediately before the given element in
    /// iteration order, if any.
    fn predecessor(&self, element: &E) -> Option<&E>;

    /// The stored element immediately after the given element in iteration
    /// order, if any.
    fn successor(&self, element: &E) -> Option<&E>;
}

/// An ordered collection supporting prefix queries.
pub trait PrefixSearch<E>: OrderedCollection<E> {
    /// Appends every stored element that starts with the given prefix to
    /// `out`, in iteration order. The sink's own error semantics apply.
    fn completions<C>(&self, prefix: &E, out: &mut C) -> Result<(), TrieError>
    where
        C: Collection<E>;

    /// Appends every stored element sharing the deepest existing branch
    /// point with the given element to `out`, in iteration order.
    fn longest_common_prefix<C>(&self, element: &E, out: &mut C) -> Result<(), TrieError>
    where
        C: Collection<E>;
}

impl<E> Collection<E> for Vec<E>
where
    E: Clone + PartialEq,
{
    fn add(&mut self, element: E) -> Result<(), TrieError> {
        self.push(element);
        Ok(())
    }

    fn remove(&mut self, element: &E) -> bool {
        if let Some(index) = self.iter().position(|held| held == element) {
            Vec::remove(self, index);
            return true;
        }
        false
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn contains(&self, element: &E) -> bool {
        self.iter().any(|held| held == element)
    }

    fn values(&self) -> Vec<E> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;

    #[test]
    fn test_vec_collection_contract() {
        let mut sink: Vec<String> = Vec::new();
        assert!(Collection::is_empty(&sink));

        sink.add_all(["b", "a", "b"].map(str::to_string)).unwrap();
        assert_eq!(Collection::size(&sink), 3);
        assert!(Collection::contains(&sink, &"a".to_string()));

        // Removes only the first occurrence.
        assert!(Collection::remove(&mut sink, &"b".to_string()));
        assert_eq!(sink.values(), vec!["a".to_string(), "b".to_string()]);
        assert!(!Collection::remove(&mut sink, &"c".to_string()));

        Collection::clear(&mut sink);
        assert!(Collection::is_empty(&sink));
    }
}
