//! Placeholder tokenizer
//!
//! A single forward scan over the query bytes. Every token in both grammars
//! is ASCII, so byte offsets are always valid char boundaries.

use qexpand_core::ParamMode;

/// One placeholder found in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Literal token text, e.g. `?`, `[?]`, `:id`, `[:ids]`.
    pub text: &'a str,
    /// Byte offset of the token start in the original query.
    pub offset: usize,
    /// Whether the token is wrapped in `[` `]`.
    pub bracketed: bool,
}

impl<'a> Occurrence<'a> {
    fn new(query: &'a str, start: usize, end: usize, bracketed: bool) -> Self {
        Self {
            text: &query[start..end],
            offset: start,
            bracketed,
        }
    }

    /// Byte offset one past the token end.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Parameter name of a named token, without brackets or `:`.
    pub fn name(&self) -> Option<&'a str> {
        let inner = if self.bracketed {
            self.text.strip_prefix('[')?.strip_suffix(']')?
        } else {
            self.text
        };
        inner.strip_prefix(':')
    }
}

/// Scan with the grammar for the given mode.
pub fn scan(query: &str, mode: ParamMode) -> Vec<Occurrence<'_>> {
    match mode {
        ParamMode::Positional => scan_positional(query),
        ParamMode::Named => scan_named(query),
    }
}

/// Find `?` and `[?]` tokens in offset order.
pub fn scan_positional(query: &str) -> Vec<Occurrence<'_>> {
    let bytes = query.as_bytes();
    let mut occurrences = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' if bytes[i + 1..].starts_with(b"?]") => {
                occurrences.push(Occurrence::new(query, i, i + 3, true));
                i += 3;
            }
            b'?' => {
                occurrences.push(Occurrence::new(query, i, i + 1, false));
                i += 1;
            }
            _ => i += 1,
        }
    }

    occurrences
}

/// Find `:name` and `[:name]` tokens in offset order.
///
/// A `[` that does not open a complete `[:name]` is plain text, so `[:a`
/// yields the plain token `:a`.
pub fn scan_named(query: &str) -> Vec<Occurrence<'_>> {
    let bytes = query.as_bytes();
    let mut occurrences = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => match name_end(bytes, i + 1) {
                Some(end) if bytes.get(end) == Some(&b']') => {
                    occurrences.push(Occurrence::new(query, i, end + 1, true));
                    i = end + 1;
                }
                _ => i += 1,
            },
            b':' => match name_end(bytes, i) {
                Some(end) => {
                    occurrences.push(Occurrence::new(query, i, end, false));
                    i = end;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    occurrences
}

/// If `bytes[colon..]` starts with `:` and at least one word byte, return the
/// index just past the last word byte.
fn name_end(bytes: &[u8], colon: usize) -> Option<usize> {
    if bytes.get(colon) != Some(&b':') {
        return None;
    }
    let len = bytes[colon + 1..]
        .iter()
        .take_while(|b| is_word_byte(**b))
        .count();
    (len > 0).then_some(colon + 1 + len)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
