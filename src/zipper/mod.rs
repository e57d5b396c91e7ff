use std::{fs::{self, File}, io::{self, BufRead, BufReader}, path::Path};

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::{
    bitstreams::BitSequence,
    error::{HuffmanError, Result},
    huffman::{decode, CodeTree, HuffmanCodec},
    properties::Properties,
};

pub const ARCHIVE_EXTENSION: &str = "huff";
pub const PROPERTIES_EXTENSION: &str = "properties";

/// Reads a text file line by line, ending every line with `\n`.
///
/// Windows line endings are normalized and a non-empty result always ends
/// with a newline, even if the file itself does not.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut content = String::new();
    for line in reader.lines() {
        content.push_str(&line?);
        content.push('\n');
    }
    Ok(content)
}

/// A compressed text together with the tree needed to expand it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedFile {
    tree: Option<CodeTree<char>>,
    stream: BitSequence,
    symbols: u64,
}

impl CompressedFile {
    pub fn compress(text: &str) -> Result<Self> {
        let codec = HuffmanCodec::from_text(text)?;
        let stream = codec.encode_text(text)?;
        let symbols = codec.stats().symbols;

        Ok(Self { tree: codec.into_tree(), stream, symbols })
    }

    pub fn decompress(&self) -> Result<String> {
        let decoded = match &self.tree {
            Some(tree) => decode(&self.stream, tree)?,
            None if self.stream.is_empty() => Vec::new(),
            None => return Err(HuffmanError::malformed(0, "archive holds bits but no code tree")),
        };

        if decoded.len() as u64 != self.symbols {
            return Err(HuffmanError::malformed(
                self.stream.len(),
                format!("decoded {} symbols, the archive declares {}", decoded.len(), self.symbols),
            ));
        }

        Ok(decoded.into_iter().collect())
    }

    pub fn tree(&self) -> Option<&CodeTree<char>> {
        self.tree.as_ref()
    }

    pub fn stream(&self) -> &BitSequence {
        &self.stream
    }

    pub fn symbols(&self) -> u64 {
        self.symbols
    }

    /// Metadata describing this archive. Fails if the symbol count is too
    /// large to express in bits.
    pub fn properties(&self) -> Result<Properties> {
        Ok(Properties {
            symbols: self.symbols,
            distinct_symbols: self.tree.as_ref().map_or(0, |t| t.num_leaves()),
            original_bits: original_bits(self.symbols)?,
            encoded_bits: self.stream.len() as u64,
            ..Default::default()
        })
    }

    /// Writes `<basename>.huff` and `<basename>.properties`.
    pub fn store(&self, basename: &str) -> Result<()> {
        if basename.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "The basename cannot be empty").into());
        }

        let props = self.properties()?;
        let archive = format!("{}.{}", basename, ARCHIVE_EXTENSION);
        fs::write(&archive, bincode::serialize(self)?)?;
        props.write(format!("{}.{}", basename, PROPERTIES_EXTENSION))?;

        info!(archive = %archive, symbols = self.symbols, bits = self.stream.len(), "stored archive");

        Ok(())
    }

    /// Reads `<basename>.huff`, rejecting trees and streams that could not
    /// have been produced by `compress`.
    pub fn load(basename: &str) -> Result<Self> {
        let archive = format!("{}.{}", basename, ARCHIVE_EXTENSION);
        let file: CompressedFile = bincode::deserialize(&fs::read(&archive)?)?;

        file.stream.check_packing()?;
        original_bits(file.symbols)?;
        match &file.tree {
            Some(tree) => {
                tree.validate()?;
                if tree.weight() != file.symbols {
                    return Err(HuffmanError::InvalidTreeStructure(format!(
                        "tree weighs {} but the archive declares {} symbols", tree.weight(), file.symbols
                    )));
                }
            },
            None if file.symbols != 0 => {
                return Err(HuffmanError::malformed(0, "archive declares symbols but no code tree"));
            },
            None => {},
        }

        info!(archive = %archive, symbols = file.symbols, bits = file.stream.len(), "loaded archive");

        Ok(file)
    }
}

fn original_bits(symbols: u64) -> Result<u64> {
    symbols.checked_mul(8).ok_or_else(|| {
        HuffmanError::malformed(0, format!("{} symbols overflow the original size in bits", symbols))
    })
}
