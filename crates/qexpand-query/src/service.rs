//! Query execution service
//!
//! Expands bracketed placeholders and hands the rewritten query to a
//! connection, the same way a plain prepare-and-execute call would.

use std::sync::Arc;

use qexpand_core::{Connection, ParamSet, QueryResult, Result, StatementResult};

use crate::parameters::{Expansion, expand};

/// Runs queries with array expansion against one connection.
pub struct QueryService {
    connection: Arc<dyn Connection>,
}

impl QueryService {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }

    /// The underlying connection
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Rewrite `sql` for `params` without running it.
    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    pub fn expand(&self, sql: &str, params: ParamSet) -> Result<Expansion> {
        Ok(expand(sql, params)?)
    }

    /// Expand and run a query, returning its rows.
    ///
    /// Shape errors are reported before the connection is touched; any other
    /// failure comes from the connection unchanged.
    #[tracing::instrument(skip(self, sql, params), fields(driver = self.connection.driver_name(), sql_preview = %sql.chars().take(100).collect::<String>()))]
    pub async fn run(&self, sql: &str, params: ParamSet) -> Result<QueryResult> {
        let expansion = self.expand(sql, params)?;
        tracing::debug!(
            rewritten = %expansion.query,
            params = expansion.params.len(),
            "running expanded query"
        );

        let result = self
            .connection
            .query(&expansion.query, &expansion.params)
            .await?;

        tracing::debug!(
            row_count = result.row_count(),
            execution_time_ms = result.execution_time_ms,
            "query completed"
        );
        Ok(result)
    }

    /// Expand and execute a statement that returns no rows.
    #[tracing::instrument(skip(self, sql, params), fields(driver = self.connection.driver_name(), sql_preview = %sql.chars().take(100).collect::<String>()))]
    pub async fn execute(&self, sql: &str, params: ParamSet) -> Result<StatementResult> {
        let expansion = self.expand(sql, params)?;
        tracing::debug!(
            rewritten = %expansion.query,
            params = expansion.params.len(),
            "executing expanded statement"
        );

        let result = self
            .connection
            .execute(&expansion.query, &expansion.params)
            .await?;

        tracing::debug!(affected_rows = result.affected_rows, "statement executed");
        Ok(result)
    }
}
