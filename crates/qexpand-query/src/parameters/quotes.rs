//! Double-quote tracking
//!
//! An offset is inside a literal when an odd number of unescaped `"` precede
//! it. A quote is unescaped when the byte before it is not `\`. Single quotes
//! are not tracked.

/// Returns true if `offset` lies inside a double-quoted region of `query`.
pub fn offset_inside_quotes(query: &str, offset: usize) -> bool {
    QuoteTracker::new(query).is_inside(offset)
}

/// Positions of every unescaped `"` in a query, computed once.
#[derive(Debug, Clone)]
pub struct QuoteTracker {
    quotes: Vec<usize>,
}

impl QuoteTracker {
    pub fn new(query: &str) -> Self {
        let bytes = query.as_bytes();
        let quotes = bytes
            .iter()
            .enumerate()
            .filter(|&(i, &b)| b == b'"' && (i == 0 || bytes[i - 1] != b'\\'))
            .map(|(i, _)| i)
            .collect();
        Self { quotes }
    }

    /// Number of unescaped quotes strictly before `offset`.
    pub fn quotes_before(&self, offset: usize) -> usize {
        self.quotes.partition_point(|&q| q < offset)
    }

    pub fn is_inside(&self, offset: usize) -> bool {
        self.quotes_before(offset) % 2 == 1
    }
}
