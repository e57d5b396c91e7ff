use std::{collections::HashMap, fmt::Display, fs::{self, File}, io::BufReader, path::Path};

use crate::error::{HuffmanError, Result};

/// How equal weights are ordered while building the code tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Symbols that appear earlier in the message, then older merged nodes, go first.
    #[default]
    FirstAppearance,
}

impl Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::FirstAppearance => write!(f, "first-appearance"),
        }
    }
}

impl TryFrom<&str> for TieBreak {
    type Error = HuffmanError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "first-appearance" => Ok(TieBreak::FirstAppearance),
            other => Err(HuffmanError::Properties(format!("Unknown tie-break rule {}", other))),
        }
    }
}

/// Metadata written next to every archive as `<basename>.properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    pub version: u32,
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub original_bits: u64,
    pub encoded_bits: u64,
    pub tie_break: TieBreak,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            version: 0,
            symbols: 0,
            distinct_symbols: 0,
            original_bits: 0,
            encoded_bits: 0,
            tie_break: TieBreak::default(),
        }
    }
}

impl Properties {
    /// Encoded size over original size, 0 for an empty archive.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_bits == 0 {
            return 0.0;
        }
        self.encoded_bits as f64 / self.original_bits as f64
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let map = java_properties::read(BufReader::new(file))
            .map_err(|e| HuffmanError::Properties(format!("Failed parsing the properties file: {}", e)))?;
        Properties::try_from(map)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, String::from(self.clone()))?;
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str) -> Result<T> {
    let value = map.get(key)
        .ok_or_else(|| HuffmanError::Properties(format!("Failed in reading {} from properties", key)))?;
    value.trim().parse()
        .map_err(|_| HuffmanError::Properties(format!("Invalid value {:?} for {}", value, key)))
}

impl TryFrom<HashMap<String, String>> for Properties {
    type Error = HuffmanError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = Properties {
            version: parse_field(&value, "version")?,
            symbols: parse_field(&value, "symbols")?,
            distinct_symbols: parse_field(&value, "distinctsymbols")?,
            original_bits: parse_field(&value, "originalbits")?,
            encoded_bits: parse_field(&value, "encodedbits")?,
            ..Default::default()
        };

        if let Some(tie_break) = value.get("tiebreak") {
            props.tie_break = TieBreak::try_from(tie_break.as_str())?;
        }

        if props.symbols.checked_mul(8) != Some(props.original_bits) {
            return Err(HuffmanError::Properties(format!(
                "{} original bits do not match {} symbols", props.original_bits, props.symbols
            )));
        }

        Ok(props)
    }
}

impl From<Properties> for String {
    fn from(val: Properties) -> Self {
        let mut s = String::new();

        s.push_str("#Huffman archive properties\n");
        s.push_str(&format!("version={}\n", val.version));
        s.push_str(&format!("symbols={}\n", val.symbols));
        s.push_str(&format!("distinctsymbols={}\n", val.distinct_symbols));
        s.push_str(&format!("originalbits={}\n", val.original_bits));
        s.push_str(&format!("encodedbits={}\n", val.encoded_bits));
        s.push_str(&format!("compressionratio={:.4}\n", val.compression_ratio()));
        s.push_str(&format!("tiebreak={}\n", val.tie_break));

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Properties {
        Properties {
            version: 0,
            symbols: 13,
            distinct_symbols: 10,
            original_bits: 104,
            encoded_bits: 42,
            tie_break: TieBreak::FirstAppearance,
        }
    }

    #[test]
    fn test_properties_round_trip() {
        let text = String::from(sample());
        assert!(text.contains("compressionratio=0.4038\n"));

        let map = java_properties::read(text.as_bytes()).unwrap();
        assert_eq!(Properties::try_from(map).unwrap(), sample());
    }

    #[test]
    fn test_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.properties");

        sample().write(&path).unwrap();
        assert_eq!(Properties::read(&path).unwrap(), sample());
    }

    #[test]
    fn test_missing_tie_break_defaults() {
        let text = "version=0\nsymbols=2\ndistinctsymbols=1\noriginalbits=16\nencodedbits=2\n";
        let props = Properties::try_from(java_properties::read(text.as_bytes()).unwrap()).unwrap();
        assert_eq!(props.tie_break, TieBreak::FirstAppearance);
        assert_eq!(props.compression_ratio(), 0.125);
    }

    #[test]
    fn test_malformed_properties() {
        let missing = "version=0\nsymbols=2\n";
        let err = Properties::try_from(java_properties::read(missing.as_bytes()).unwrap());
        assert!(matches!(err, Err(HuffmanError::Properties(_))));

        let garbage = "version=0\nsymbols=two\ndistinctsymbols=1\noriginalbits=16\nencodedbits=2\n";
        let err = Properties::try_from(java_properties::read(garbage.as_bytes()).unwrap());
        assert!(matches!(err, Err(HuffmanError::Properties(_))));

        let inconsistent = "version=0\nsymbols=3\ndistinctsymbols=1\noriginalbits=16\nencodedbits=2\n";
        let err = Properties::try_from(java_properties::read(inconsistent.as_bytes()).unwrap());
        assert!(matches!(err, Err(HuffmanError::Properties(_))));

        // 2^61 symbols would wrap to zero bits.
        let overflow = "version=0\nsymbols=2305843009213693952\ndistinctsymbols=1\noriginalbits=0\nencodedbits=2\n";
        let err = Properties::try_from(java_properties::read(overflow.as_bytes()).unwrap());
        assert!(matches!(err, Err(HuffmanError::Properties(_))));

        let rule = "version=0\nsymbols=2\ndistinctsymbols=1\noriginalbits=16\nencodedbits=2\ntiebreak=random\n";
        let err = Properties::try_from(java_properties::read(rule.as_bytes()).unwrap());
        assert!(matches!(err, Err(HuffmanError::Properties(_))));
    }
}
