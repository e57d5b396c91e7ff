use std::collections::{hash_map::Entry, HashMap};

use super::Symbol;

/// Occurrence counts of the distinct symbols of one message.
///
/// Entries keep the order in which each symbol first appeared; the tree
/// builder relies on that order to break ties between equal counts.
#[derive(Clone, Debug)]
pub struct FrequencyTable<S> {
    entries: Vec<(S, u64)>,
    index: HashMap<S, usize>,
}

impl<S> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<S: Symbol> FrequencyTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every symbol in a single pass.
    pub fn from_symbols<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        let mut table = Self::new();
        for symbol in symbols {
            table.record(symbol);
        }
        table
    }

    fn record(&mut self, symbol: S) {
        match self.index.entry(symbol) {
            Entry::Occupied(e) => self.entries[*e.get()].1 += 1,
            Entry::Vacant(e) => {
                e.insert(self.entries.len());
                self.entries.push((symbol, 1));
            }
        }
    }

    /// Count of `symbol`, zero if it never occurs.
    pub fn get(&self, symbol: &S) -> u64 {
        self.index.get(symbol).map_or(0, |&i| self.entries[i].1)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| count).sum()
    }

    /// Iterates `(symbol, count)` in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (S, u64)> + '_ {
        self.entries.iter().copied()
    }
}
