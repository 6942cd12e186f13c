//! A library containing an ordered prefix-search trie over digit sequences.

#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::all,
    missing_debug_implementations
)]
#![deny(clippy::all, missing_docs, rust_2018_idioms, rust_2021_compatibility)]

mod collection;
mod digitizer;
mod error;
mod node;
mod radix;
mod search;
mod trie;

pub use collection::{Collection, OrderedCollection, PrefixSearch};
pub use digitizer::{Digitizer, StringDigitizer};
pub use error::TrieError;
pub use radix::RadixTree;
pub use search::SearchOutcome;
pub use trie::{Cursor, Iter, Trie};
