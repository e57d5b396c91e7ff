use std::{fmt, str::FromStr};

use serde::{Serialize, Deserialize};

use crate::error::{HuffmanError, Result};

/// An owned sequence of bits packed eight per byte, most significant bit first.
///
/// Used both for a single symbol code and for a whole encoded stream. The
/// unused low bits of the last byte are always zero, so two sequences holding
/// the same bits compare equal.
#[derive(Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitSequence")]
pub struct BitSequence {
    bytes: Vec<u8>,
    len: usize,
}

/// Wire form of `BitSequence`, checked before it becomes one.
#[derive(Deserialize)]
struct RawBitSequence {
    bytes: Vec<u8>,
    len: usize,
}

impl TryFrom<RawBitSequence> for BitSequence {
    type Error = HuffmanError;

    fn try_from(raw: RawBitSequence) -> Result<Self> {
        let seq = BitSequence { bytes: raw.bytes, len: raw.len };
        seq.check_packing()?;
        Ok(seq)
    }
}

impl BitSequence {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checks that the byte buffer holds exactly `len` bits and that the
    /// padding of the last byte is zero.
    pub fn check_packing(&self) -> Result<()> {
        if self.bytes.len() != self.len.div_ceil(8) {
            return Err(HuffmanError::malformed(
                0,
                format!("{} bytes cannot hold exactly {} bits", self.bytes.len(), self.len),
            ));
        }
        let used = self.len & 7;
        if let (Some(&last), true) = (self.bytes.last(), used != 0) {
            if last & (0xff >> used) != 0 {
                return Err(HuffmanError::malformed(self.len, "padding bits are not zero"));
            }
        }
        Ok(())
    }

    /// Returns the bit at position `i`, or `None` past the end.
    #[inline(always)]
    pub fn get(&self, i: usize) -> Option<bool> {
        if i >= self.len {
            return None;
        }
        Some(self.bytes[i >> 3] >> (7 - (i & 7)) & 1 == 1)
    }

    #[inline(always)]
    pub fn push(&mut self, bit: bool) {
        let offset = self.len & 7;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - offset);
        }
        self.len += 1;
    }

    /// Removes and returns the last bit.
    pub fn pop(&mut self) -> Option<bool> {
        let bit = self.get(self.len.checked_sub(1)?)?;
        self.len -= 1;
        let offset = self.len & 7;
        if offset == 0 {
            self.bytes.pop();
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] &= !(1 << (7 - offset));
        }
        Some(bit)
    }

    pub fn extend_from(&mut self, other: &BitSequence) {
        for bit in other.iter() {
            self.push(bit);
        }
    }

    /// True if every bit of `self` matches the beginning of `other`.
    pub fn is_prefix_of(&self, other: &BitSequence) -> bool {
        self.len <= other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bytes[i >> 3] >> (7 - (i & 7)) & 1 == 1)
    }
}

impl FromIterator<bool> for BitSequence {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut seq = BitSequence::new();
        for bit in iter {
            seq.push(bit);
        }
        seq
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSequence({}: \"{}\")", self.len, self)
    }
}

/// Parses the textual form, e.g. `"0110"`. Whitespace is ignored so that
/// grouped output such as `"10 011 00"` parses as well.
impl FromStr for BitSequence {
    type Err = HuffmanError;

    fn from_str(s: &str) -> Result<Self> {
        let mut seq = BitSequence::new();
        for c in s.chars() {
            match c {
                '0' => seq.push(false),
                '1' => seq.push(true),
                c if c.is_whitespace() => {},
                c => return Err(HuffmanError::malformed(seq.len(), format!("unexpected character {c:?}"))),
            }
        }
        Ok(seq)
    }
}

/// Accumulates bits into whole bytes before committing them.
pub struct BitWriter {
    os: Vec<u8>,
    pub written_bits: usize,
    current: u64,
    free: usize,
}

impl Default for BitWriter {
    fn default() -> Self {
        BitWriter {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self) -> BitSequence {
        if self.free != 8 {
            self.os.push(self.current as u8);
        }

        BitSequence {
            bytes: self.os,
            len: self.written_bits,
        }
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) {
        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.os.push(self.current as u8);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len as usize;
    }

    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        self.write_in_current(bit as u64, 1);
    }

    /// Appends a whole code, returning its length.
    #[inline(always)]
    pub fn push_sequence(&mut self, seq: &BitSequence) -> usize {
        for bit in seq.iter() {
            self.push_bit(bit);
        }
        seq.len()
    }
}

/// Reads a `BitSequence` one bit at a time.
pub struct BitReader<'a> {
    is: &'a BitSequence,
    pub position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(input_stream: &'a BitSequence) -> Self {
        BitReader { is: input_stream, position: 0 }
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = self.is.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.is.len() - self.position
    }

    #[inline(always)]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
