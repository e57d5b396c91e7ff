use crate::{bitstreams::{BitSequence, BitWriter}, error::{HuffmanError, Result}};

use super::{CodeTable, Symbol};

/// Appends the codes of successive symbols to a bit stream.
pub struct HuffmanEncoder<'a, S> {
    table: &'a CodeTable<S>,
    writer: BitWriter,
}

impl<'a, S: Symbol> HuffmanEncoder<'a, S> {
    pub fn new(table: &'a CodeTable<S>) -> Self {
        Self { table, writer: BitWriter::new() }
    }

    /// Writes the code of `symbol`, returning the number of bits written.
    #[inline(always)]
    pub fn write_next(&mut self, symbol: S) -> Result<usize> {
        let code = self.table.get(&symbol)
            .ok_or_else(|| HuffmanError::UnknownSymbol(format!("{:?}", symbol)))?;
        Ok(self.writer.push_sequence(code))
    }

    pub fn written_bits(&self) -> usize {
        self.writer.written_bits
    }

    pub fn finish(self) -> BitSequence {
        self.writer.build()
    }
}

/// Concatenates the codes of `symbols` in order.
///
/// Fails with `UnknownSymbol` on the first symbol the table has no code for,
/// which only happens when the table was built from a different message.
pub fn encode<S, I>(symbols: I, table: &CodeTable<S>) -> Result<BitSequence>
where
    S: Symbol,
    I: IntoIterator<Item = S>,
{
    let mut encoder = HuffmanEncoder::new(table);
    for symbol in symbols {
        encoder.write_next(symbol)?;
    }
    Ok(encoder.finish())
}
