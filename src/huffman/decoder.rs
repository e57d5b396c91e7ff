use crate::{bitstreams::{BitReader, BitSequence}, error::{HuffmanError, Result}};

use super::{tree::NodeId, CodeTree, Symbol};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    AtRoot,
    Descending(NodeId),
}

/// Walks a `CodeTree` bit by bit to recover symbols.
pub struct HuffmanDecoder<'a, S> {
    tree: &'a CodeTree<S>,
}

impl<'a, S: Symbol> HuffmanDecoder<'a, S> {
    pub fn new(tree: &'a CodeTree<S>) -> Self {
        Self { tree }
    }

    /// Reads one code from `reader` and returns its symbol.
    ///
    /// Fails with `MalformedStream` if the bits run out before a leaf is
    /// reached or a bit selects a branch the tree does not have.
    pub fn read_next(&self, reader: &mut BitReader) -> Result<S> {
        let start = reader.position;
        let mut state = DecodeState::AtRoot;

        loop {
            let current = match state {
                DecodeState::AtRoot => self.tree.root(),
                DecodeState::Descending(id) => id,
            };

            let Some(bit) = reader.read_bit() else {
                return Err(HuffmanError::malformed(
                    reader.position,
                    format!("stream ends inside the code starting at bit {}", start),
                ));
            };

            let node = self.tree.node(current)
                .ok_or_else(|| HuffmanError::InvalidTreeStructure(format!("node {} is out of bounds", current)))?;

            let next = if bit { node.right } else { node.left };
            let next = next.ok_or_else(|| HuffmanError::malformed(
                reader.position - 1,
                format!("bit {} selects a branch missing from the tree", bit as u8),
            ))?;

            let child = self.tree.node(next)
                .ok_or_else(|| HuffmanError::InvalidTreeStructure(format!("node {} is out of bounds", next)))?;

            match child.symbol {
                Some(symbol) => return Ok(symbol),
                None => state = DecodeState::Descending(next),
            }
        }
    }
}

/// Decodes a whole stream produced with the code table of `tree`.
///
/// An empty stream gives an empty sequence without touching the tree. The
/// last bit of the stream has to complete a code.
pub fn decode<S: Symbol>(bits: &BitSequence, tree: &CodeTree<S>) -> Result<Vec<S>> {
    if bits.is_empty() {
        return Ok(Vec::new());
    }

    let decoder = HuffmanDecoder::new(tree);
    let mut reader = BitReader::new(bits);
    let mut symbols = Vec::new();

    while !reader.is_exhausted() {
        symbols.push(decoder.read_next(&mut reader)?);
    }

    Ok(symbols)
}
