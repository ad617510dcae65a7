//! SQLite connection implementation

use async_trait::async_trait;
use parking_lot::Mutex;
use qexpand_core::{
    ColumnMeta, Connection, FlatParams, QexpandError, QueryResult, Result, Row, StatementResult,
    Value,
};
use rusqlite::{Connection as RusqliteConnection, OpenFlags, Statement};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// SQLite connection wrapper
pub struct SqliteConnection {
    conn: Arc<Mutex<RusqliteConnection>>,
    closed: AtomicBool,
}

impl SqliteConnection {
    /// Open a SQLite database
    ///
    /// Accepts `:memory:`, `file:` URIs, `~/` paths and paths relative to the
    /// current directory.
    pub fn open(path: &str) -> Result<Self> {
        tracing::info!(path = %path, "opening SQLite database");
        let expanded_path = Self::expand_path(path)?;

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = if path == ":memory:" {
            RusqliteConnection::open_in_memory().map_err(|e| {
                QexpandError::Connection(format!("Failed to open in-memory database: {}", e))
            })?
        } else {
            if !expanded_path.starts_with("file:") {
                let file_path = std::path::Path::new(&expanded_path);
                if let Some(parent) = file_path.parent()
                    && !parent.exists()
                {
                    return Err(QexpandError::Connection(format!(
                        "Parent directory does not exist: {}",
                        parent.display()
                    )));
                }
            }

            let conn = RusqliteConnection::open_with_flags(&expanded_path, flags).map_err(|e| {
                QexpandError::Connection(format!(
                    "Failed to open SQLite database at '{}': {}",
                    expanded_path, e
                ))
            })?;

            conn.pragma_update(None, "journal_mode", "WAL").map_err(|e| {
                QexpandError::Connection(format!("Failed to set journal mode: {}", e))
            })?;
            conn.pragma_update(None, "synchronous", "NORMAL").map_err(|e| {
                QexpandError::Connection(format!("Failed to set synchronous mode: {}", e))
            })?;
            conn
        };

        conn.pragma_update(None, "foreign_keys", "ON").map_err(|e| {
            QexpandError::Connection(format!("Failed to enable foreign keys: {}", e))
        })?;

        tracing::info!(path = %expanded_path, "SQLite database connection established");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            closed: AtomicBool::new(false),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Expand path to handle ~ (home directory) and relative paths
    fn expand_path(path: &str) -> Result<String> {
        if path == ":memory:" || path.starts_with("file:") {
            return Ok(path.to_string());
        }

        let expanded = if let Some(rest) = path.strip_prefix("~/") {
            match std::env::var_os("HOME") {
                Some(home) => std::path::PathBuf::from(home)
                    .join(rest)
                    .to_string_lossy()
                    .to_string(),
                None => {
                    return Err(QexpandError::Configuration(
                        "Unable to determine HOME directory".into(),
                    ));
                }
            }
        } else if path.starts_with('~') {
            return Err(QexpandError::Configuration(
                "User-specific home directories (~user) are not supported".into(),
            ));
        } else {
            path.to_string()
        };

        let path_buf = std::path::PathBuf::from(&expanded);
        let result = if path_buf.is_relative() {
            std::env::current_dir()?
                .join(path_buf)
                .to_string_lossy()
                .to_string()
        } else {
            expanded
        };

        Ok(result)
    }

    /// Run several `;`-separated statements without parameters
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!("executing SQL batch");
        let conn = self.conn.lock();
        conn.execute_batch(sql)
            .map_err(|e| QexpandError::Query(format!("Failed to execute batch: {}", e)))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QexpandError::Connection("Connection is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &FlatParams) -> Result<StatementResult> {
        self.ensure_open()?;
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| QexpandError::Query(format!("Failed to prepare statement: {}", e)))?;
        bind_params(&mut stmt, params)?;

        let rows_affected = stmt
            .raw_execute()
            .map_err(|e| QexpandError::Query(format!("Failed to execute statement: {}", e)))?;

        tracing::debug!(affected_rows = rows_affected, "statement executed");
        Ok(StatementResult {
            affected_rows: rows_affected as u64,
        })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &FlatParams) -> Result<QueryResult> {
        self.ensure_open()?;
        let start_time = std::time::Instant::now();
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| QexpandError::Query(format!("Failed to prepare query: {}", e)))?;
        bind_params(&mut stmt, params)?;

        // Statements without a result set (DDL, DML) are executed in place.
        if stmt.column_count() == 0 {
            let rows_affected = stmt
                .raw_execute()
                .map_err(|e| QexpandError::Query(format!("Failed to execute query: {}", e)))?;
            let mut result = QueryResult::empty();
            result.affected_rows = rows_affected as u64;
            result.execution_time_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!(affected_rows = rows_affected, "query without result set executed");
            return Ok(result);
        }

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| ColumnMeta {
                name: col.name().to_string(),
                data_type: col.decl_type().unwrap_or("DYNAMIC").to_string(),
                ordinal: idx,
            })
            .collect();
        let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let mut rows = Vec::new();
        let mut query_rows = stmt.raw_query();
        while let Some(row) = query_rows
            .next()
            .map_err(|e| QexpandError::Query(format!("Failed to fetch row: {}", e)))?
        {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(rusqlite_to_value(row, i)?);
            }
            rows.push(Row::new(column_names.clone(), values));
        }

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            execution_time_ms = execution_time_ms,
            "query executed successfully"
        );
        Ok(QueryResult {
            id: uuid::Uuid::new_v4(),
            columns,
            rows,
            affected_rows: 0,
            execution_time_ms,
        })
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing SQLite connection");
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Bind flattened parameters to a prepared statement.
///
/// Positional values fill `?` slots in order; named values bind to `:key`.
/// The number of values must match the statement's parameter count.
fn bind_params(stmt: &mut Statement<'_>, params: &FlatParams) -> Result<()> {
    let expected = stmt.parameter_count();
    if params.len() != expected {
        return Err(QexpandError::Query(format!(
            "expected {} parameters, got {}",
            expected,
            params.len()
        )));
    }

    match params {
        FlatParams::Positional(values) => {
            for (idx, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(idx + 1, value_to_rusqlite(value)?)
                    .map_err(|e| {
                        QexpandError::Query(format!("Failed to bind parameter {}: {}", idx + 1, e))
                    })?;
            }
        }
        FlatParams::Named(map) => {
            for (key, value) in map {
                let name = format!(":{}", key);
                let idx = stmt
                    .parameter_index(&name)
                    .map_err(|e| QexpandError::Query(e.to_string()))?
                    .ok_or_else(|| {
                        QexpandError::Query(format!("unknown named parameter: {}", name))
                    })?;
                stmt.raw_bind_parameter(idx, value_to_rusqlite(value)?)
                    .map_err(|e| {
                        QexpandError::Query(format!("Failed to bind parameter {}: {}", name, e))
                    })?;
            }
        }
    }

    Ok(())
}

fn value_to_rusqlite(value: &Value) -> Result<rusqlite::types::Value> {
    Ok(match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Bool(b) => rusqlite::types::Value::Integer(if *b { 1 } else { 0 }),
        Value::Int32(i) => rusqlite::types::Value::Integer(*i as i64),
        Value::Int64(i) => rusqlite::types::Value::Integer(*i),
        Value::Float64(f) => rusqlite::types::Value::Real(*f),
        Value::Decimal(d) => rusqlite::types::Value::Text(d.clone()),
        Value::String(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Bytes(b) => rusqlite::types::Value::Blob(b.clone()),
        Value::Date(d) => rusqlite::types::Value::Text(d.to_string()),
        Value::Time(t) => rusqlite::types::Value::Text(t.to_string()),
        Value::DateTime(dt) => rusqlite::types::Value::Text(dt.to_string()),
        Value::DateTimeUtc(dt) => rusqlite::types::Value::Text(dt.to_rfc3339()),
        Value::Json(j) => rusqlite::types::Value::Text(j.to_string()),
        Value::Uuid(u) => rusqlite::types::Value::Text(u.to_string()),
        Value::Array(items) => {
            return Err(QexpandError::Query(format!(
                "cannot bind a sequence of {} values to a single placeholder; use a bracketed placeholder",
                items.len()
            )));
        }
    })
}

/// Convert rusqlite row value to our Value type
fn rusqlite_to_value(row: &rusqlite::Row, idx: usize) -> Result<Value> {
    use rusqlite::types::ValueRef;

    let value_ref = row
        .get_ref(idx)
        .map_err(|e| QexpandError::Query(e.to_string()))?;

    let value = match value_ref {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        // BLOBs holding UTF-8 are usually text stored without a declared type
        ValueRef::Blob(b) => match std::str::from_utf8(b) {
            Ok(s) => Value::String(s.to_string()),
            Err(_) => Value::Bytes(b.to_vec()),
        },
    };

    Ok(value)
}
