use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filter rows of clinical trial datasets with a small boolean expression language
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "DATASET_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational output on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format, overrides the config file
    #[arg(short = 'F', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also write the output to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the rows of a dataset accepted by a filter
    Filter {
        /// Dataset file (NDJSON, metadata on the first line)
        file: PathBuf,

        /// Filter expression, e.g. 'AGE > 80 and SEX = "M"'
        #[arg(short = 'w', long = "where")]
        expr: String,

        /// Compare string values ignoring case
        #[arg(short = 'i', long)]
        case_insensitive: bool,

        /// Match column names exactly
        #[arg(long)]
        strict_names: bool,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Check a filter expression against the columns of a dataset
    Validate {
        /// Dataset file whose columns are checked against
        file: PathBuf,

        /// Filter expression
        #[arg(short = 'w', long = "where")]
        expr: String,

        /// Match column names exactly
        #[arg(long)]
        strict_names: bool,
    },
    /// Print the structured form of a filter expression as JSON
    Parse {
        /// Dataset file providing the columns
        file: PathBuf,

        /// Filter expression
        #[arg(short = 'w', long = "where")]
        expr: String,

        /// Match column names exactly
        #[arg(long)]
        strict_names: bool,
    },
    /// Print the canonical text of a structured filter read from JSON
    Format {
        /// JSON file holding a filter with `conditions` and `connectors`
        file: PathBuf,
    },
    /// List the columns of a dataset with their filter types
    Columns {
        /// Dataset file
        file: PathBuf,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
