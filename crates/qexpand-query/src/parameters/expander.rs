//! Array placeholder expansion
//!
//! Occurrences are walked from the highest offset to the lowest. Each rewrite
//! is recorded as an edit against the original query, and the output is
//! assembled afterwards by copying the untouched spans between edits.

use std::collections::HashSet;

use indexmap::IndexMap;
use qexpand_core::{FlatParams, ParamMode, ParamSet, ParamValue, ShapeError, Value};

use super::keys::{KeySource, RandomKeys};
use super::quotes::QuoteTracker;
use super::tokenizer::{Occurrence, scan};

/// A rewritten query and the parameters that match it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub query: String,
    pub params: FlatParams,
}

/// A replacement of `len` bytes at `offset` in the original query.
#[derive(Debug)]
struct Edit {
    offset: usize,
    len: usize,
    replacement: String,
}

/// Expand bracketed placeholders, using random synthetic key suffixes.
///
/// # Errors
///
/// Returns [`ShapeError`] when a bracketed placeholder is not bound to a
/// sequence.
pub fn expand(query: &str, params: ParamSet) -> Result<Expansion, ShapeError> {
    expand_with(query, params, &mut RandomKeys)
}

/// Expand bracketed placeholders, drawing synthetic key suffixes from `keys`.
pub fn expand_with(
    query: &str,
    params: ParamSet,
    keys: &mut dyn KeySource,
) -> Result<Expansion, ShapeError> {
    let mode = params.mode();
    let quotes = QuoteTracker::new(query);
    let occurrences: Vec<Occurrence<'_>> = scan(query, mode)
        .into_iter()
        .filter(|occurrence| !quotes.is_inside(occurrence.offset))
        .collect();

    let expansion = match params {
        ParamSet::Positional(values) => expand_positional(query, &occurrences, values)?,
        ParamSet::Named(map) => expand_named(query, &occurrences, map, keys)?,
    };

    tracing::debug!(
        mode = ?mode,
        occurrences = occurrences.len(),
        bracketed = occurrences.iter().filter(|o| o.bracketed).count(),
        params = expansion.params.len(),
        "expanded query placeholders"
    );
    Ok(expansion)
}

fn expand_positional(
    query: &str,
    occurrences: &[Occurrence<'_>],
    values: Vec<ParamValue>,
) -> Result<Expansion, ShapeError> {
    let mut edits = Vec::new();
    let mut spread = vec![false; values.len()];

    // The k-th occurrence from the end pairs with the k-th value from the end.
    for (from_end, occurrence) in occurrences.iter().rev().enumerate() {
        if !occurrence.bracketed {
            continue;
        }

        let slot = values.len().checked_sub(from_end + 1);
        let Some((slot, ParamValue::Sequence(items))) = slot.map(|s| (s, &values[s])) else {
            return Err(ShapeError::new(occurrence.text));
        };

        edits.push(Edit {
            offset: occurrence.offset,
            len: occurrence.text.len(),
            replacement: placeholder_list(std::iter::repeat_n("?", items.len())),
        });
        spread[slot] = true;
    }

    let mut flat = Vec::with_capacity(values.len());
    for (value, spread) in values.into_iter().zip(spread) {
        match value {
            ParamValue::Sequence(items) if spread => flat.extend(items),
            other => flat.push(other.into_value()),
        }
    }

    Ok(Expansion {
        query: apply_edits(query, edits),
        params: FlatParams::Positional(flat),
    })
}

fn expand_named(
    query: &str,
    occurrences: &[Occurrence<'_>],
    params: IndexMap<String, ParamValue>,
    keys: &mut dyn KeySource,
) -> Result<Expansion, ShapeError> {
    let mut taken: HashSet<String> = params.keys().cloned().collect();
    let mut edits = Vec::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut synthetic: Vec<Vec<(String, Value)>> = Vec::new();

    for occurrence in occurrences.iter().rev().filter(|o| o.bracketed) {
        let name = occurrence.name().unwrap_or_default();
        let Some(ParamValue::Sequence(items)) = params.get(name) else {
            return Err(ShapeError::new(occurrence.text));
        };

        let mut group = Vec::with_capacity(items.len());
        for item in items {
            let key = loop {
                let candidate = format!("{}_{}", name, keys.next_suffix());
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            group.push((key, item.clone()));
        }

        edits.push(Edit {
            offset: occurrence.offset,
            len: occurrence.text.len(),
            replacement: placeholder_list(group.iter().map(|(key, _)| format!(":{}", key))),
        });
        expanded.insert(name);
        synthetic.push(group);
    }

    let mut flat: IndexMap<String, Value> = params
        .into_iter()
        .filter(|(key, _)| !expanded.contains(key.as_str()))
        .map(|(key, value)| (key, value.into_value()))
        .collect();
    // Groups were built last occurrence first; emit them in query order.
    flat.extend(synthetic.into_iter().rev().flatten());

    Ok(Expansion {
        query: apply_edits(query, edits),
        params: FlatParams::Named(flat),
    })
}

/// `" a, b, c "`, padded so the run never fuses with adjacent text.
fn placeholder_list<I, S>(placeholders: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = placeholders
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(" {} ", joined)
}

/// Apply edits recorded in descending offset order.
fn apply_edits(query: &str, edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return query.to_string();
    }

    let extra: usize = edits.iter().map(|e| e.replacement.len()).sum();
    let mut result = String::with_capacity(query.len() + extra);
    let mut last_end = 0;

    for edit in edits.into_iter().rev() {
        result.push_str(&query[last_end..edit.offset]);
        result.push_str(&edit.replacement);
        last_end = edit.offset + edit.len;
    }

    result.push_str(&query[last_end..]);
    result
}

impl Expansion {
    /// The binding mode of the expanded parameters.
    pub fn mode(&self) -> ParamMode {
        match self.params {
            FlatParams::Positional(_) => ParamMode::Positional,
            FlatParams::Named(_) => ParamMode::Named,
        }
    }
}
