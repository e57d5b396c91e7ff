pub mod frequency;
pub mod tree;
pub mod table;
pub mod encoder;
pub mod decoder;
pub mod codec;

use std::{fmt::Debug, hash::Hash};

use crate::error::Result;

pub use frequency::FrequencyTable;
pub use tree::{CodeTree, Node, NodeId};
pub use table::CodeTable;
pub use encoder::{encode, HuffmanEncoder};
pub use decoder::{decode, HuffmanDecoder};
pub use codec::{CompressionStats, HuffmanCodec};

/// Anything that can be counted, ordered and used as a map key can be coded.
pub trait Symbol: Copy + Eq + Hash + Ord + Debug {}

impl<T: Copy + Eq + Hash + Ord + Debug> Symbol for T {}

pub fn build_frequency_table<S: Symbol, I: IntoIterator<Item = S>>(symbols: I) -> FrequencyTable<S> {
    FrequencyTable::from_symbols(symbols)
}

/// Fails with `EmptyAlphabet` if `table` has no symbols.
pub fn build_code_tree<S: Symbol>(table: &FrequencyTable<S>) -> Result<CodeTree<S>> {
    CodeTree::from_frequencies(table)
}

pub fn build_code_table<S: Symbol>(tree: &CodeTree<S>) -> Result<CodeTable<S>> {
    CodeTable::from_tree(tree)
}

#[cfg(test)]
mod tests;
