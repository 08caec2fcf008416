// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Weekly health report card CLI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use health_report_engine::config::Config;
use health_report_engine::logging;
use health_report_engine::narrative::{HttpNarrativeGenerator, NarrativeGenerator};
use health_report_engine::pipeline::ReportPipeline;
use health_report_engine::providers::LedgerProvider;
use health_report_engine::weeks;

const DEFAULT_LEDGER_PATH: &str = "weekly_rollup.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "health-report",
    about = "Generate the weekly health report card",
    version
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Any date inside the week to report on (YYYY-MM-DD); defaults to
    /// one week before today
    #[arg(long, value_parser = parse_date)]
    reference_date: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Skip the external narrative service even when configured
    #[arg(long)]
    no_narrative: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("invalid date {raw:?}: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let cli = Cli::parse();
    let config = Config::load(cli.config).context("loading configuration")?;

    let ledger_path = config
        .ledger
        .path
        .clone()
        .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string());
    let provider = LedgerProvider::open(&ledger_path, config.goals.clone())
        .with_context(|| format!("opening rollup ledger at {ledger_path}"))?;

    let generator: Option<Box<dyn NarrativeGenerator>> = match (&config.narrative, cli.no_narrative)
    {
        (Some(narrative), false) => Some(Box::new(HttpNarrativeGenerator::new(
            narrative.endpoint.clone(),
        ))),
        _ => None,
    };

    let reference = cli
        .reference_date
        .unwrap_or_else(|| weeks::default_reference(chrono::Local::now().date_naive()));

    let pipeline = ReportPipeline::new(Box::new(provider), generator);
    let bundle = pipeline
        .run(reference)
        .await
        .context("running weekly report")?;

    match cli.output {
        OutputFormat::Text => print!("{}", bundle.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bundle.to_json())?),
    }
    Ok(())
}
