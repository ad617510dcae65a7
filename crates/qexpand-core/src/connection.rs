//! Connection trait implemented by drivers

use crate::{FlatParams, QueryResult, Result, StatementResult};
use async_trait::async_trait;

/// A database connection that runs already-expanded queries.
///
/// Implementations receive the rewritten SQL and the flattened parameters
/// produced by expansion. Binding errors, count mismatches and execution
/// failures are reported from here, not from the expander.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE/DDL)
    async fn execute(&self, sql: &str, params: &FlatParams) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &FlatParams) -> Result<QueryResult>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
