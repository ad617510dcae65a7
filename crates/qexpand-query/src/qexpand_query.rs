//! qexpand Query - Placeholder expansion and query execution
//!
//! This crate rewrites queries whose bracketed placeholders (`[?]`,
//! `[:name]`) are bound to sequences, and runs the rewritten query through a
//! [`qexpand_core::Connection`].

pub mod parameters;
mod service;

pub use parameters::{Expansion, KeySource, RandomKeys, SequentialKeys, expand, expand_with};
pub use service::QueryService;
