use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Prepare and chart the Aids2 dashboard dataset", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the cleaned table in display column order
    Preview(PreviewArgs),
    /// Print headline statistics for the dataset
    Summary(SummaryArgs),
    /// Select one figure for a view-state and emit it as JSON
    Chart(ChartArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input Aids2 CSV file (use '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Maximum number of rows to print
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Chart category: age-distribution, by-region, or days-lived
    #[arg(long)]
    pub category: String,
    /// Split the age histogram into one series per sex
    #[arg(long = "split-by-sex")]
    pub split_by_sex: bool,
    /// Region filter for by-region charts: all, all-modes, nsw, qld, vic, other
    #[arg(long, default_value = "all")]
    pub region: String,
    /// Write the chart spec JSON to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    let normalized = raw.trim();
    if matches!(normalized.to_ascii_lowercase().as_str(), "tab" | "\\t") {
        return Ok(b'\t');
    }
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!(
            "Delimiter must be a single ASCII character or 'tab', got '{raw}'"
        )),
    }
}
