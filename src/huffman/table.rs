use std::collections::BTreeMap;

use tracing::debug;

use crate::{bitstreams::BitSequence, error::Result};

use super::{CodeTree, FrequencyTable, Symbol};

/// Maps every symbol of a tree to its root-to-leaf path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable<S> {
    codes: BTreeMap<S, BitSequence>,
}

impl<S> Default for CodeTable<S> {
    fn default() -> Self {
        Self { codes: BTreeMap::new() }
    }
}

impl<S: Symbol> CodeTable<S> {
    pub fn from_tree(tree: &CodeTree<S>) -> Result<Self> {
        let mut codes = BTreeMap::new();
        tree.walk(|symbol, path| {
            codes.insert(symbol, path.clone());
        })?;

        debug!(symbols = codes.len(), "built code table");

        Ok(Self { codes })
    }

    #[inline(always)]
    pub fn get(&self, symbol: &S) -> Option<&BitSequence> {
        self.codes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates the codes ordered by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &BitSequence)> {
        self.codes.iter()
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(BitSequence::len).max().unwrap_or(0)
    }

    /// True if no code is a prefix of another.
    ///
    /// After sorting the codes as strings, any code that has a prefix in the
    /// set sits right after a code carrying that prefix, so adjacent pairs suffice.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<String> = self.codes.values().map(ToString::to_string).collect();
        codes.sort();
        !codes.windows(2).any(|w| w[1].starts_with(&w[0]))
    }

    /// Number of bits needed to encode a message with the given counts.
    pub fn encoded_len(&self, frequencies: &FrequencyTable<S>) -> u64 {
        frequencies.iter()
            .filter_map(|(symbol, count)| self.get(&symbol).map(|code| count * code.len() as u64))
            .sum()
    }
}
