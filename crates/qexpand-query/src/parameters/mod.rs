//! Placeholder scanning and array expansion
//!
//! Two placeholder grammars are recognised, chosen by the shape of the
//! parameter set:
//!
//! - Positional: `?` and the bracketed `[?]`
//! - Named: `:name` and the bracketed `[:name]`
//!
//! A bracketed placeholder must be bound to a sequence and is rewritten into
//! one singular placeholder per element. Placeholders inside double-quoted
//! literals are left alone.
//!
//! # Example
//!
//! ```
//! use qexpand_core::{FlatParams, ParamSet, ParamValue, Value};
//! use qexpand_query::parameters::expand;
//!
//! let params = ParamSet::positional(vec![
//!     ParamValue::from(1i64),
//!     ParamValue::from(vec![2i64, 3, 4]),
//! ]);
//! let expansion = expand("select * from t where a = ? or b in ([?])", params).unwrap();
//!
//! assert_eq!(expansion.query, "select * from t where a = ? or b in ( ?, ?, ? )");
//! assert_eq!(
//!     expansion.params,
//!     FlatParams::Positional(vec![
//!         Value::Int64(1),
//!         Value::Int64(2),
//!         Value::Int64(3),
//!         Value::Int64(4),
//!     ])
//! );
//! ```

mod expander;
mod keys;
mod quotes;
mod tokenizer;

pub use expander::{Expansion, expand, expand_with};
pub use keys::{KeySource, RandomKeys, SequentialKeys};
pub use quotes::{QuoteTracker, offset_inside_quotes};
pub use tokenizer::{Occurrence, scan, scan_named, scan_positional};
