//! qexpand Core - Shared types for query expansion and execution
//!
//! This crate provides the types every other qexpand crate depends on:
//!
//! - `Value` - A single bound database value
//! - `ParamValue`, `ParamSet` - Bound parameters before expansion
//! - `FlatParams` - Bound parameters after expansion, ready for a driver
//! - `Connection` - Trait implemented by drivers that run rewritten queries
//! - `QexpandError`, `ShapeError` - Error types

mod connection;
mod error;
mod params;
mod types;

pub use connection::*;
pub use error::*;
pub use params::*;
pub use types::*;
