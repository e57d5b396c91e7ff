use serde::Serialize;
use tracing::debug;

use crate::{bitstreams::BitSequence, error::{HuffmanError, Result}};

use super::{decoder, encoder, CodeTable, CodeTree, FrequencyTable, Symbol};

/// Sizes of one message before and after encoding. The original size counts
/// eight bits per symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CompressionStats {
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub original_bits: u64,
    pub encoded_bits: u64,
}

impl CompressionStats {
    /// Encoded size over original size, 0 for an empty message.
    pub fn ratio(&self) -> f64 {
        if self.original_bits == 0 {
            return 0.0;
        }
        self.encoded_bits as f64 / self.original_bits as f64
    }
}

/// One encode/decode session: the frequencies, tree and table of a single
/// message. The tree is absent when the message is empty.
#[derive(Clone, Debug)]
pub struct HuffmanCodec<S> {
    frequencies: FrequencyTable<S>,
    tree: Option<CodeTree<S>>,
    table: CodeTable<S>,
}

impl<S: Symbol> HuffmanCodec<S> {
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Result<Self> {
        let frequencies = FrequencyTable::from_symbols(symbols);

        debug!(symbols = frequencies.total(), distinct = frequencies.len(), "preparing codec");

        if frequencies.is_empty() {
            return Ok(Self { frequencies, tree: None, table: CodeTable::default() });
        }

        let tree = CodeTree::from_frequencies(&frequencies)?;
        let table = CodeTable::from_tree(&tree)?;

        Ok(Self { frequencies, tree: Some(tree), table })
    }

    pub fn frequencies(&self) -> &FrequencyTable<S> {
        &self.frequencies
    }

    pub fn tree(&self) -> Option<&CodeTree<S>> {
        self.tree.as_ref()
    }

    pub fn table(&self) -> &CodeTable<S> {
        &self.table
    }

    pub fn into_tree(self) -> Option<CodeTree<S>> {
        self.tree
    }

    pub fn encode<I: IntoIterator<Item = S>>(&self, symbols: I) -> Result<BitSequence> {
        encoder::encode(symbols, &self.table)
    }

    pub fn decode(&self, bits: &BitSequence) -> Result<Vec<S>> {
        match &self.tree {
            Some(tree) => decoder::decode(bits, tree),
            None if bits.is_empty() => Ok(Vec::new()),
            None => Err(HuffmanError::malformed(0, "no code tree to decode a non-empty stream")),
        }
    }

    pub fn stats(&self) -> CompressionStats {
        let symbols = self.frequencies.total();
        CompressionStats {
            symbols,
            distinct_symbols: self.frequencies.len(),
            original_bits: symbols.saturating_mul(8),
            encoded_bits: self.table.encoded_len(&self.frequencies),
        }
    }
}

impl HuffmanCodec<char> {
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(text.chars())
    }

    pub fn encode_text(&self, text: &str) -> Result<BitSequence> {
        self.encode(text.chars())
    }

    pub fn decode_to_string(&self, bits: &BitSequence) -> Result<String> {
        Ok(self.decode(bits)?.into_iter().collect())
    }
}
