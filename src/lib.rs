pub mod bitstreams;
pub mod error;
pub mod huffman;
pub mod properties;
pub mod utils;
pub mod zipper;

pub use error::{HuffmanError, Result};
pub use huffman::{
    build_code_table, build_code_tree, build_frequency_table, decode, encode,
    CodeTable, CodeTree, CompressionStats, FrequencyTable, HuffmanCodec, Symbol,
};
pub use properties::Properties;
pub use zipper::CompressedFile;
