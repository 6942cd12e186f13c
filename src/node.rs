//! Arena-backed trie nodes and the intrusive ordered leaf list.
//!
//! All nodes of a trie live in a single [`NodeArena`] and refer to each
//! other through stable [`NodeId`] indices, so the parent/child graph and
//! the doubly-linked leaf list carry no ownership cycles. A removed leaf is
//! tombstoned by clearing its `previous` link; its `next` link is left
//! intact so cursors positioned at it can still advance past it.

use crate::error::TrieError;

/// A stable handle to a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

/// Marks the two permanent bounds of the ordered leaf list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sentinel {
    None,
    Head,
    Tail,
}

#[derive(Debug)]
struct Internal {
    children: Box<[Option<NodeId>]>,
    occupied: usize,
}

#[derive(Debug)]
struct Leaf<E> {
    /// `None` only for the head and tail sentinels.
    value: Option<E>,
    next: Option<NodeId>,
    previous: Option<NodeId>,
    sentinel: Sentinel,
}

#[derive(Debug)]
enum NodeKind<E> {
    Internal(Internal),
    Leaf(Leaf<E>),
}

#[derive(Debug)]
struct Node<E> {
    parent: Option<NodeId>,
    is_root: bool,
    kind: NodeKind<E>,
}

/// Owner of every node reachable from a trie's root and sentinels.
///
/// Slots of released nodes are recycled through a free list, so pruning
/// and re-growing branches does not grow the arena.
#[derive(Debug)]
pub(crate) struct NodeArena<E> {
    nodes: Vec<Node<E>>,
    free: Vec<NodeId>,
}

impl<E> NodeArena<E> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Drops every node. Handles issued before the call must not be used
    /// afterwards.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    fn alloc(&mut self, node: Node<E>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Returns a detached node's slot to the allocator for reuse. The
    /// caller must guarantee nothing refers to `id` anymore; tombstoned
    /// leaves stay addressable by cursors and must not be released.
    pub(crate) fn release(&mut self, id: NodeId) {
        self.nodes[id.0] = Node {
            parent: None,
            is_root: false,
            kind: NodeKind::Leaf(Leaf {
                value: None,
                next: None,
                previous: None,
                sentinel: Sentinel::None,
            }),
        };
        self.free.push(id);
    }

    pub(crate) fn alloc_internal(&mut self, radix: usize) -> NodeId {
        self.alloc(Node {
            parent: None,
            is_root: false,
            kind: NodeKind::Internal(Internal {
                children: vec![None; radix].into_boxed_slice(),
                occupied: 0,
            }),
        })
    }

    pub(crate) fn alloc_root(&mut self, radix: usize) -> NodeId {
        let id = self.alloc_internal(radix);
        self.nodes[id.0].is_root = true;
        id
    }

    pub(crate) fn alloc_leaf(&mut self, value: E) -> NodeId {
        self.alloc_sentinel(Some(value), Sentinel::None)
    }

    pub(crate) fn alloc_head(&mut self) -> NodeId {
        self.alloc_sentinel(None, Sentinel::Head)
    }

    pub(crate) fn alloc_tail(&mut self) -> NodeId {
        self.alloc_sentinel(None, Sentinel::Tail)
    }

    fn alloc_sentinel(&mut self, value: Option<E>, sentinel: Sentinel) -> NodeId {
        self.alloc(Node {
            parent: None,
            is_root: false,
            kind: NodeKind::Leaf(Leaf {
                value,
                next: None,
                previous: None,
                sentinel,
            }),
        })
    }

    fn leaf(&self, id: NodeId) -> &Leaf<E> {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Internal(_) => unreachable!("[bug] expected a leaf node"),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<E> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Internal(_) => unreachable!("[bug] expected a leaf node"),
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub(crate) fn is_root(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_root
    }

    pub(crate) fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Leaf(_))
    }

    pub(crate) fn value(&self, id: NodeId) -> Option<&E> {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(leaf) => leaf.value.as_ref(),
            NodeKind::Internal(_) => None,
        }
    }

    pub(crate) fn has_children(&self, id: NodeId) -> bool {
        match &self.nodes[id.0].kind {
            NodeKind::Internal(internal) => internal.occupied > 0,
            NodeKind::Leaf(_) => false,
        }
    }

    /// Places `child` in the slot at `index` under `parent` and sets the
    /// child's parent back-reference.
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TrieError> {
        match &mut self.nodes[parent.0].kind {
            NodeKind::Internal(internal) => {
                let bound = internal.children.len();
                if index >= bound {
                    return Err(TrieError::IndexOutOfRange { index, bound });
                }
                if internal.children[index].is_some() {
                    return Err(TrieError::SlotOccupied { index });
                }
                internal.children[index] = Some(child);
                internal.occupied += 1;
            }
            NodeKind::Leaf(_) => unreachable!("[bug] can't add child to leaf"),
        }
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Returns the occupant of the slot at `index`, or `Ok(None)` for an
    /// empty slot. Leaves have no slots.
    pub(crate) fn child_at(
        &self,
        parent: NodeId,
        index: usize,
    ) -> Result<Option<NodeId>, TrieError> {
        match &self.nodes[parent.0].kind {
            NodeKind::Internal(internal) => {
                let bound = internal.children.len();
                if index >= bound {
                    return Err(TrieError::IndexOutOfRange { index, bound });
                }
                Ok(internal.children[index])
            }
            NodeKind::Leaf(_) => Ok(None),
        }
    }

    /// Empties the slot at `index`. Returns `false` when the index is
    /// invalid or the slot was already empty.
    pub(crate) fn remove_child_at(&mut self, parent: NodeId, index: usize) -> bool {
        match &mut self.nodes[parent.0].kind {
            NodeKind::Internal(internal) => {
                if index >= internal.children.len() {
                    return false;
                }
                if internal.children[index].take().is_some() {
                    internal.occupied -= 1;
                    return true;
                }
                false
            }
            NodeKind::Leaf(_) => false,
        }
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.leaf(id).next
    }

    pub(crate) fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.leaf(id).previous
    }

    pub(crate) fn set_next(&mut self, id: NodeId, next: Option<NodeId>) {
        self.leaf_mut(id).next = next;
    }

    pub(crate) fn is_head(&self, id: NodeId) -> bool {
        self.leaf(id).sentinel == Sentinel::Head
    }

    pub(crate) fn is_tail(&self, id: NodeId) -> bool {
        self.leaf(id).sentinel == Sentinel::Tail
    }

    /// A leaf is tombstoned exactly when its `previous` link is cleared.
    pub(crate) fn is_deleted(&self, id: NodeId) -> bool {
        let leaf = self.leaf(id);
        leaf.sentinel == Sentinel::None && leaf.previous.is_none()
    }

    /// Splices the leaf `id` into the ordered list immediately after
    /// `other`.
    pub(crate) fn add_after(&mut self, id: NodeId, other: NodeId) {
        let old_next = self.leaf(other).next;
        self.leaf_mut(id).next = old_next;
        self.leaf_mut(other).next = Some(id);
        self.leaf_mut(id).previous = Some(other);
        if let Some(next) = old_next {
            self.leaf_mut(next).previous = Some(id);
        }
    }

    /// Unlinks the leaf from the ordered list and tombstones it. The
    /// forward link stays valid so in-flight cursors can skip past it.
    pub(crate) fn unlink(&mut self, id: NodeId) {
        let (previous, next) = {
            let leaf = self.leaf(id);
            (leaf.previous, leaf.next)
        };
        if let Some(previous) = previous {
            self.leaf_mut(previous).next = next;
        }
        if let Some(next) = next {
            self.leaf_mut(next).previous = previous;
        }
        self.leaf_mut(id).previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::NodeArena;
    use crate::error::TrieError;

    #[test]
    fn test_add_child_out_of_range() {
        let mut arena = NodeArena::<String>::new();
        let parent = arena.alloc_root(4);
        let child = arena.alloc_internal(4);
        let result = arena.add_child(parent, 4, child);
        assert_eq!(result, Err(TrieError::IndexOutOfRange { index: 4, bound: 4 }));
    }

    #[test]
    fn test_add_child_occupied() {
        let mut arena = NodeArena::<String>::new();
        let parent = arena.alloc_root(4);
        let first = arena.alloc_internal(4);
        let second = arena.alloc_internal(4);
        assert_eq!(arena.add_child(parent, 1, first), Ok(()));
        assert_eq!(
            arena.add_child(parent, 1, second),
            Err(TrieError::SlotOccupied { index: 1 })
        );
        assert_eq!(arena.child_at(parent, 1), Ok(Some(first)));
        assert_eq!(arena.parent(first), Some(parent));
    }

    #[test]
    fn test_remove_child_at() {
        let mut arena = NodeArena::<String>::new();
        let parent = arena.alloc_root(4);
        let child = arena.alloc_internal(4);
        arena.add_child(parent, 2, child).unwrap();
        assert!(arena.has_children(parent));

        assert!(!arena.remove_child_at(parent, 0));
        assert!(!arena.remove_child_at(parent, 9));
        assert!(arena.remove_child_at(parent, 2));
        assert!(!arena.remove_child_at(parent, 2));
        assert!(!arena.has_children(parent));
    }

    #[test]
    fn test_release_recycles_slots() {
        let mut arena = NodeArena::<String>::new();
        let first = arena.alloc_internal(4);
        arena.release(first);

        let second = arena.alloc_internal(4);
        assert_eq!(second, first);
        let third = arena.alloc_internal(4);
        assert_ne!(third, first);
    }

    #[test]
    fn test_ordered_list_splice() {
        let mut arena = NodeArena::new();
        let head = arena.alloc_head();
        let tail = arena.alloc_tail();
        arena.set_next(head, Some(tail));
        arena.set_next(tail, Some(head));

        let first = arena.alloc_leaf("a".to_string());
        let second = arena.alloc_leaf("b".to_string());
        arena.add_after(first, head);
        arena.add_after(second, first);

        assert_eq!(arena.next(head), Some(first));
        assert_eq!(arena.next(first), Some(second));
        assert_eq!(arena.next(second), Some(tail));
        assert_eq!(arena.previous(tail), Some(second));
        assert_eq!(arena.previous(second), Some(first));
        assert_eq!(arena.previous(first), Some(head));
    }

    #[test]
    fn test_unlink_tombstones_but_keeps_forward_link() {
        let mut arena = NodeArena::new();
        let head = arena.alloc_head();
        let tail = arena.alloc_tail();
        arena.set_next(head, Some(tail));
        arena.set_next(tail, Some(head));

        let first = arena.alloc_leaf("a".to_string());
        let second = arena.alloc_leaf("b".to_string());
        arena.add_after(first, head);
        arena.add_after(second, first);

        arena.unlink(first);
        assert!(arena.is_deleted(first));
        assert!(!arena.is_deleted(second));
        // Live list bypasses the tombstone in both directions.
        assert_eq!(arena.next(head), Some(second));
        assert_eq!(arena.previous(second), Some(head));
        // The tombstone still points forward at its old successor.
        assert_eq!(arena.next(first), Some(second));
    }

    #[test]
    fn test_sentinels_are_never_deleted() {
        let mut arena = NodeArena::<String>::new();
        let head = arena.alloc_head();
        let tail = arena.alloc_tail();
        arena.set_next(head, Some(tail));
        arena.set_next(tail, Some(head));
        assert!(arena.is_head(head));
        assert!(arena.is_tail(tail));
        assert!(!arena.is_deleted(head));
        assert!(!arena.is_deleted(tail));
    }
}
