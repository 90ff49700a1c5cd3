pub mod cli;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod dataset_filter;
pub mod filter;

use crate::config::FilterConfig;
use crate::dataset::{Dataset, read_dataset};
use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, OutputFormat, cli_parse};
pub use columns::{ColumnAdapter, ColumnFormat, SourceColumn, normalize_columns};
pub use dataset_filter::{BindOptions, DatasetFilter, FilterSource};
pub use filter::{
    BasicFilter, Column, ColumnType, Condition, Connector, EvaluationError, FilterError,
    FilterOptions, Function, Literal, Operator, ResolvedFilter, Row, Scalar, filter_to_text,
    parse_filter_text, validate_filter_text,
};

/// Installs the stderr log subscriber; `RUST_LOG` wins over the flags
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn write_output_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

/// Prints to stdout and mirrors the text into the output file, if any
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    println!("{content}");
    if let Some(path) = output {
        write_output_file(path, &format!("{content}\n"))?;
    }
    Ok(())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    read_dataset(path).with_context(|| format!("Failed to load dataset '{}'", path.display()))
}

fn bind_options(config: &FilterConfig, strict_names: bool, case_insensitive: bool) -> BindOptions {
    BindOptions {
        case_insensitive_col_names: config.case_insensitive_col_names && !strict_names,
        case_insensitive_values: Some(config.case_insensitive_values || case_insensitive),
    }
}

fn dataset_columns(dataset: &Dataset, config: &FilterConfig) -> Result<(ColumnFormat, Vec<Column>)> {
    let format = config
        .column_format
        .unwrap_or_else(|| dataset.column_format());
    let columns = normalize_columns(format, &dataset.metadata.columns)?;
    Ok((format, columns))
}

fn cell_text(value: &Scalar) -> String {
    match value {
        Scalar::Null => String::new(),
        other => other.to_string(),
    }
}

fn rows_table(columns: &[Column], rows: &[&Row]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|c| Cell::new(&c.name)));
    for row in rows {
        table.add_row(row.iter().map(|value| Cell::new(cell_text(value))));
    }
    table
}

fn rows_json(columns: &[Column], rows: &[&Row]) -> Result<String> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| Ok((column.name.clone(), serde_json::to_value(value)?)))
                .collect::<Result<_, serde_json::Error>>()
        })
        .collect::<Result<_, _>>()?;
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn run() -> Result<ExitCode> {
    let cli = cli_parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = crate::config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let format = cli.format.unwrap_or(config.output.format);
    let output = cli.output.as_deref();
    let quiet = cli.quiet;

    if let Some(config_path) = &cli.config {
        debug!(path = %config_path.display(), "config loaded");
    }

    match &cli.command {
        Commands::Filter {
            file,
            expr,
            case_insensitive,
            strict_names,
            limit,
        } => {
            let dataset = load_dataset(file)?;
            let options = bind_options(&config, *strict_names, *case_insensitive);
            let column_format = config
                .column_format
                .unwrap_or_else(|| dataset.column_format());
            let filter = DatasetFilter::new(
                column_format,
                &dataset.metadata.columns,
                expr.as_str(),
                options,
            )
            .context("Failed to build filter")?;

            if filter.resolved().is_empty() && !expr.trim().is_empty() && !quiet {
                eprintln!(
                    "{} filter '{}' could not be parsed, all rows are shown",
                    "warning:".yellow().bold(),
                    expr
                );
            }

            let mut matched = filter
                .filter_rows(&dataset.rows)
                .context("Failed to evaluate filter")?;
            let total_matched = matched.len();
            let max_rows = limit.unwrap_or(config.output.max_rows);
            if max_rows > 0 {
                matched.truncate(max_rows);
            }

            let rendered = match format {
                OutputFormat::Text => rows_table(filter.columns(), &matched).to_string(),
                OutputFormat::Json => rows_json(filter.columns(), &matched)?,
            };
            emit(&rendered, output)?;

            if !quiet {
                eprintln!(
                    "Matched {} of {} rows with filter: {}",
                    total_matched,
                    dataset.rows.len(),
                    filter.to_text()
                );
            }
        }
        Commands::Validate {
            file,
            expr,
            strict_names,
        } => {
            let dataset = load_dataset(file)?;
            let (_, columns) = dataset_columns(&dataset, &config)?;
            let options = bind_options(&config, *strict_names, false);
            let valid = validate_filter_text(expr, &columns, options.case_insensitive_col_names);

            match format {
                OutputFormat::Text => {
                    let status = if valid {
                        "valid".green().bold()
                    } else {
                        "invalid".red().bold()
                    };
                    println!("{status}");
                    if let Some(path) = output {
                        let plain = if valid { "valid" } else { "invalid" };
                        write_output_file(path, &format!("{plain}\n"))?;
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({ "filter": expr, "valid": valid });
                    emit(&serde_json::to_string_pretty(&json)?, output)?;
                }
            }

            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Parse {
            file,
            expr,
            strict_names,
        } => {
            let dataset = load_dataset(file)?;
            let (_, columns) = dataset_columns(&dataset, &config)?;
            let options = bind_options(&config, *strict_names, false);
            let filter = parse_filter_text(expr, &columns, options.case_insensitive_col_names);
            emit(&serde_json::to_string_pretty(&filter)?, output)?;
        }
        Commands::Format { file } => {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read filter file '{}'", file.display()))?;
            let filter: BasicFilter = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid filter in '{}'", file.display()))?;
            emit(&filter_to_text(&filter), output)?;
        }
        Commands::Columns { file } => {
            let dataset = load_dataset(file)?;
            let (column_format, columns) = dataset_columns(&dataset, &config)?;

            let rendered = match format {
                OutputFormat::Text => {
                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .set_header(vec!["Column", "Source type", "Filter type", "Operators"]);
                    for (source, column) in dataset.metadata.columns.iter().zip(&columns) {
                        let operators: Vec<&str> = column
                            .data_type
                            .operators()
                            .iter()
                            .map(Operator::symbol)
                            .collect();
                        table.add_row(vec![
                            Cell::new(&column.name),
                            Cell::new(&source.data_type),
                            Cell::new(column.data_type),
                            Cell::new(operators.join(" ")),
                        ]);
                    }
                    table.to_string()
                }
                OutputFormat::Json => serde_json::to_string_pretty(&columns)?,
            };
            emit(&rendered, output)?;

            if !quiet {
                eprintln!("{} columns ({column_format})", columns.len());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
