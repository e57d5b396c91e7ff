use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("Cannot build a code tree from an empty frequency table")]
    EmptyAlphabet,

    #[error("Symbol {0} is not in the code table")]
    UnknownSymbol(String),

    #[error("Malformed stream at bit {position}: {reason}")]
    MalformedStream { position: usize, reason: String },

    #[error("Invalid tree structure: {0}")]
    InvalidTreeStructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Properties error: {0}")]
    Properties(String),
}

impl HuffmanError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        HuffmanError::MalformedStream { position, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
