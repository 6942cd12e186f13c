use thiserror::Error;

/// Errors surfaced by trie operations.
///
/// `PrefixViolation` is the one condition a normal caller should expect and
/// handle; the other two indicate a child-slot operation that broke an
/// insertion invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    /// A child-slot or list-position index fell outside its valid bounds.
    #[error("index out of bounds [bound = {bound}, requested index = {index}]")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The exclusive upper bound that was violated.
        bound: usize,
    },

    /// An insertion targeted a child slot that is already occupied.
    #[error("child exists at index {index}")]
    SlotOccupied {
        /// The occupied slot index.
        index: usize,
    },

    /// The insertion would duplicate an element, or relate two elements by
    /// prefix when the digitizer cannot keep them on separate branches.
    #[error("element violates prefix-free requirement: {element}")]
    PrefixViolation {
        /// The offending element, rendered digit by digit.
        element: String,
    },
}
