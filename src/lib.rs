pub mod cli;
pub mod dataset;
pub mod error;
pub mod figure;
pub mod io_utils;
pub mod summary;
pub mod table;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{ChartArgs, Cli, Commands, InputArgs, PreviewArgs, SummaryArgs},
    dataset::Record,
    figure::ViewState,
    summary::DatasetSummary,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("epidash", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => handle_preview(&args),
        Commands::Summary(args) => handle_summary(&args),
        Commands::Chart(args) => handle_chart(&args),
    }
}

fn load_input(input: &InputArgs) -> Result<Vec<Record>> {
    let delimiter = io_utils::resolve_input_delimiter(&input.input, input.delimiter);
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    dataset::load_records(&input.input, delimiter, encoding)
}

fn handle_preview(args: &PreviewArgs) -> Result<()> {
    let records = load_input(&args.input)?;
    let rows = records
        .iter()
        .take(args.limit)
        .map(Record::display_row)
        .collect::<Vec<_>>();
    table::print_table(&Record::display_headers(), &rows);
    info!("Previewed {} of {} row(s)", rows.len(), records.len());
    Ok(())
}

fn handle_summary(args: &SummaryArgs) -> Result<()> {
    let records = load_input(&args.input)?;
    let summary = DatasetSummary::compute(&records);
    let headers = vec!["metric".to_string(), "value".to_string()];
    table::print_table(&headers, &summary.render_rows());
    Ok(())
}

fn handle_chart(args: &ChartArgs) -> Result<()> {
    let records = load_input(&args.input)?;
    let view = ViewState::from_request(&args.category, args.split_by_sex, &args.region)?;
    let spec = figure::select(&view, &records);
    let json = serde_json::to_string_pretty(&spec).context("Serializing chart spec")?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Writing chart spec to {path:?}"))?;
            info!("Wrote '{}' chart spec to {:?}", spec.title, path);
        }
        None => println!("{json}"),
    }
    Ok(())
}
