#![deny(warnings)]

//! Headless CLI: collect forecast inputs, run the engine, and print or export
//! the weekly schedule.

mod scenario;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use scenario::{Resolved, Scenario};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tour_core::{validate_input, ForecastInput, ForecastOptions, ForecastRow};
use tour_export::{export_csv, render_table, to_csv_string, Layout};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
tour-forecast: weekly ticket sales and revenue forecast for a show

Usage: tour-forecast [OPTIONS]

Options:
  --scenario <path>                 Load inputs from a YAML scenario file
  --show <YYYY-MM-DD>               Show date (required unless in scenario)
  --announce <YYYY-MM-DD>           Announcement date [default: today]
  --price <amount>                  Average ticket price [default: 50]
  --budget <amount>                 Total marketing budget [default: 1000]
  --other-costs <amount>            Other costs [default: 500]
  --capacity <tickets>              Target capacity [default: 500]
  --policy <continuous|integer>     Ticket allocation policy [default: integer]
  --other-costs-treatment <amortized|upfront>
                                    How other costs hit net profit
                                    [default: follows policy]
  --currency <label>                Currency label for money headers
  --format <table|csv|json>         Output format [default: table]
  --out <path>                      Also write the forecast CSV to <path>
  -h, --help                        Print this help";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => bail!("unknown output format: {s} (expected table, csv or json)"),
        }
    }
}

/// Parsed CLI arguments.
#[derive(Debug, Default)]
struct CliArgs {
    scenario: Option<PathBuf>,
    flags: Scenario,
    format: OutputFormat,
    out: Option<PathBuf>,
    help: bool,
}

fn parse_value<T>(flag: &str, value: Option<String>) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = value else {
        bail!("missing value for {flag}");
    };
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {flag}: {raw:?} ({e})"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let flags = &mut cli.flags;
        match arg.as_str() {
            "--scenario" => cli.scenario = Some(parse_value::<PathBuf>(&arg, it.next())?),
            "--show" => flags.show_date = Some(parse_value::<NaiveDate>(&arg, it.next())?),
            "--announce" => flags.announce_date = Some(parse_value::<NaiveDate>(&arg, it.next())?),
            "--price" => flags.avg_ticket_price = Some(parse_value::<Decimal>(&arg, it.next())?),
            "--budget" => flags.marketing_budget = Some(parse_value::<Decimal>(&arg, it.next())?),
            "--other-costs" => flags.other_costs = Some(parse_value::<Decimal>(&arg, it.next())?),
            "--capacity" => flags.target_capacity = Some(parse_value::<u64>(&arg, it.next())?),
            "--policy" => flags.policy = Some(parse_value(&arg, it.next())?),
            "--other-costs-treatment" => {
                flags.other_costs_treatment = Some(parse_value(&arg, it.next())?)
            }
            "--currency" => flags.currency = Some(parse_value::<String>(&arg, it.next())?),
            "--format" => cli.format = parse_value(&arg, it.next())?,
            "--out" => cli.out = Some(parse_value::<PathBuf>(&arg, it.next())?),
            "-h" | "--help" => cli.help = true,
            other => bail!("unknown argument: {other}\n\n{USAGE}"),
        }
    }
    Ok(cli)
}

/// Everything a chart needs: inputs, options and the three cumulative series.
#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a ForecastInput,
    options: ForecastOptions,
    rows: &'a [ForecastRow],
}

fn summary(rows: &[ForecastRow], layout: &Layout) -> String {
    match rows.last() {
        Some(last) => format!(
            "Forecast | weeks: {} | policy: {} | tickets: {} | gross: {} | net: {}",
            rows.len(),
            layout.policy,
            layout.format_tickets(last.cumulative_tickets),
            layout.format_money(last.cumulative_gross_revenue),
            layout.format_money(last.cumulative_net),
        ),
        None => "Forecast | no weeks".to_string(),
    }
}

/// Resolve inputs, compute, and return what should go to stdout.
fn run(cli: CliArgs, today: NaiveDate) -> Result<String> {
    let base = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    let Resolved {
        input,
        options,
        currency,
    } = base.overlay(cli.flags).resolve(today)?;
    let weeks = validate_input(&input)?;
    info!(
        weeks,
        show = %input.show_date,
        announce = %input.announce_date,
        capacity = input.target_capacity,
        policy = %options.policy,
        "generating forecast"
    );

    let rows = tour_forecast::compute_with(&input, options)?;
    let layout = Layout::new(options.policy, currency);

    if let Some(path) = &cli.out {
        export_csv(&rows, &layout, path)
            .with_context(|| format!("writing forecast to {}", path.display()))?;
    }

    let text = match cli.format {
        OutputFormat::Table => {
            let mut t = render_table(&rows, &layout);
            t.push('\n');
            t.push_str(&summary(&rows, &layout));
            t.push('\n');
            t
        }
        OutputFormat::Csv => to_csv_string(&rows, &layout)?,
        OutputFormat::Json => {
            let report = JsonReport {
                input: &input,
                options,
                rows: &rows,
            };
            let mut s = serde_json::to_string_pretty(&report)?;
            s.push('\n');
            s
        }
    };
    Ok(text)
}

fn main() -> Result<()> {
    // Logging setup; stdout is reserved for the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args(std::env::args().skip(1))?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }
    let today = chrono::Local::now().date_naive();
    let out = run(cli, today)?;
    print!("{out}");
    Ok(())
}
