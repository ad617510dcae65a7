//! qexpand command line interface
//!
//! ```bash
//! # Show the rewritten query and flattened parameters
//! qexpand expand --query 'select * from t where id in ([?])' --params '[[1, 2, 3]]'
//!
//! # Run against a SQLite database and print the rows
//! qexpand run --database app.db --query 'select * from t where id in ([:ids])' \
//!     --params '{"ids": [1, 2]}'
//! ```

mod config;
mod logging;
mod params_json;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use qexpand_core::{ParamSet, QueryResult};
use qexpand_driver_sqlite::SqliteConnection;
use qexpand_query::{QueryService, SequentialKeys, expand, expand_with};
use std::path::PathBuf;
use std::sync::Arc;

use config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "qexpand")]
#[command(version)]
#[command(about = "Expand bracketed array placeholders in SQL queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config_dir>/qexpand/config.toml)
    #[arg(long, global = true, env = "QEXPAND_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directives, e.g. `debug` or `qexpand_query=trace`
    #[arg(long, global = true)]
    log_filter: Option<String>,

    /// Console log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rewritten query and its parameters as JSON
    Expand {
        #[command(flatten)]
        input: QueryInput,

        /// Number synthetic keys 0, 1, 2, ... instead of using random suffixes
        #[arg(long)]
        stable_keys: bool,
    },

    /// Expand a query and run it against SQLite
    Run {
        #[command(flatten)]
        input: QueryInput,

        /// SQLite database path, `:memory:` or a `file:` URI
        #[arg(short, long, env = "QEXPAND_DATABASE")]
        database: Option<String>,
    },
}

#[derive(Args)]
struct QueryInput {
    /// Query text
    #[arg(short, long, conflicts_with = "query_file", required_unless_present = "query_file")]
    query: Option<String>,

    /// Read the query from a file
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Parameters as a JSON array (positional) or object (named)
    #[arg(short, long)]
    params: Option<String>,
}

impl QueryInput {
    fn query(&self) -> Result<String> {
        match (&self.query, &self.query_file) {
            (Some(query), _) => Ok(query.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query from {:?}", path)),
            (None, None) => anyhow::bail!("either --query or --query-file is required"),
        }
    }

    fn params(&self) -> Result<ParamSet> {
        match &self.params {
            Some(json) => {
                params_json::parse_params(json).context("Failed to parse --params")
            }
            None => Ok(ParamSet::default()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(filter) = &cli.log_filter {
        config.logging.filter = filter.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = logging::init(&config.logging)?;

    match cli.command {
        Commands::Expand { input, stable_keys } => cmd_expand(&input, stable_keys),
        Commands::Run { input, database } => {
            let database = database.unwrap_or(config.database);
            cmd_run(&input, &database).await
        }
    }
}

fn cmd_expand(input: &QueryInput, stable_keys: bool) -> Result<()> {
    let query = input.query()?;
    let params = input.params()?;

    let expansion = if stable_keys {
        expand_with(&query, params, &mut SequentialKeys::new())?
    } else {
        expand(&query, params)?
    };

    let output = serde_json::json!({
        "query": expansion.query,
        "params": params_json::flat_params_to_json(&expansion.params),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cmd_run(input: &QueryInput, database: &str) -> Result<()> {
    let query = input.query()?;
    let params = input.params()?;

    let connection = SqliteConnection::open(database)
        .with_context(|| format!("Failed to open database {}", database))?;
    let service = QueryService::new(Arc::new(connection));

    let result = service.run(&query, params).await?;
    print_result(&result);
    Ok(())
}

fn print_result(result: &QueryResult) {
    if result.column_count() == 0 {
        println!("{} row(s) affected", result.affected_rows);
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(result.columns.iter().map(|c| c.name.as_str()));

    for row in &result.rows {
        table.add_row(row.values.iter().map(|v| v.to_string()));
    }

    println!("{table}");
    println!("{} row(s) in {} ms", result.row_count(), result.execution_time_ms);
}
