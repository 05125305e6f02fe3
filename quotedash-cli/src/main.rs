//! quotedash CLI: show and export daily price series.
//!
//! Commands:
//! - `show`: fetch a series, print the latest rows and the key statistics
//! - `export`: fetch a series and write it, with moving averages, to CSV

mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use quotedash_core::config::DashboardConfig;
use quotedash_core::data::YahooProvider;
use quotedash_core::domain::{
    InstrumentKind, InstrumentRequest, PriceSeries, RequestError, SeriesSummary,
};
use quotedash_core::pipeline::{MarketSeriesPipeline, PipelineError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exit status when the request produced no bars.
const EXIT_NO_DATA: i32 = 2;
/// Exit status when the data source could not be reached.
const EXIT_UNREACHABLE: i32 = 1;

#[derive(Parser)]
#[command(
    name = "quotedash",
    about = "Daily prices, moving averages and key statistics for stocks, crypto and forex"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct InstrumentArgs {
    /// Instrument kind: stock, crypto or forex.
    #[arg(long, default_value = "stock")]
    kind: InstrumentKind,

    /// Ticker. Defaults to the kind's configured symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to `lookback_days` before the end date.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD, exclusive). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest rows and the key statistics.
    Show {
        #[command(flatten)]
        instrument: InstrumentArgs,

        /// Rows of history to print. Defaults to `table_rows` from config.
        #[arg(long)]
        rows: Option<usize>,

        /// Print series and summary as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the full series with moving averages to a CSV file.
    Export {
        #[command(flatten)]
        instrument: InstrumentArgs,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let outcome = match cli.command {
        Commands::Show {
            instrument,
            rows,
            json,
        } => run_show(&config, &instrument, rows, json),
        Commands::Export { instrument, out } => run_export(&config, &instrument, &out),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<PipelineError>() {
            Some(pipeline_err) => {
                eprintln!("{}", pipeline_err.user_message());
                std::process::exit(exit_code(pipeline_err));
            }
            None => Err(err),
        },
    }
}

/// Process exit status for a failed pipeline run.
fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::NoData { .. } => EXIT_NO_DATA,
        PipelineError::Fetch(_) => EXIT_UNREACHABLE,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

/// Fill unset arguments from config and turn them into a request.
fn build_request(
    config: &DashboardConfig,
    args: &InstrumentArgs,
    today: NaiveDate,
) -> Result<InstrumentRequest> {
    let symbol = args
        .symbol
        .clone()
        .unwrap_or_else(|| config.symbols.for_kind(args.kind).to_string());
    let end = args.end.unwrap_or(today);
    let start = match args.start {
        Some(start) => start,
        None => {
            let lookback = config.defaults.lookback_days;
            end.checked_sub_days(chrono::Days::new(u64::from(lookback)))
                .with_context(|| format!("{lookback} days before {end} is out of range"))?
        }
    };

    InstrumentRequest::new(args.kind, symbol, start, end).map_err(|err| match err {
        RequestError::EmptySymbol => anyhow::anyhow!(
            "{err}: enter a {} symbol ({})",
            args.kind,
            args.kind.symbol_hint()
        ),
        other => other.into(),
    })
}

/// Run the pipeline. A `PipelineError` stays downcastable for `main`.
fn fetch_series(
    config: &DashboardConfig,
    args: &InstrumentArgs,
) -> Result<(PriceSeries, SeriesSummary)> {
    let request = build_request(config, args, chrono::Local::now().date_naive())?;
    log::info!(
        "{} {} from {} to {}",
        request.kind(),
        request.symbol(),
        request.start(),
        request.end()
    );
    let provider = YahooProvider::new(&config.provider)?;
    let pipeline = MarketSeriesPipeline::new(provider);

    Ok(pipeline.run(&request)?)
}

fn run_show(
    config: &DashboardConfig,
    args: &InstrumentArgs,
    rows: Option<usize>,
    json: bool,
) -> Result<()> {
    let (series, summary) = fetch_series(config, args)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if json {
        render::write_json(&mut out, &series, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    let rows = rows.unwrap_or(config.defaults.table_rows);
    writeln!(out, "Showing data for: {}", series.symbol())?;
    writeln!(out)?;
    writeln!(out, "Historical Data (last {rows} rows)")?;
    render::write_table(&mut out, &series, rows)?;
    writeln!(out)?;
    render::write_summary(&mut out, &summary)?;
    Ok(())
}

fn run_export(config: &DashboardConfig, args: &InstrumentArgs, out: &Path) -> Result<()> {
    let (series, _) = fetch_series(config, args)?;
    let file = std::fs::File::create(out)
        .with_context(|| format!("creating {}", out.display()))?;
    render::write_csv(file, &series)?;
    println!("Wrote {} rows for {} to {}", series.len(), series.symbol(), out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedash_core::pipeline::FetchError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn args(kind: InstrumentKind) -> InstrumentArgs {
        InstrumentArgs {
            kind,
            symbol: None,
            start: None,
            end: None,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn request_defaults_from_config() {
        let config = DashboardConfig::default();
        let req = build_request(&config, &args(InstrumentKind::Crypto), d(2025, 3, 1)).unwrap();
        assert_eq!(req.symbol(), "BTC-USD");
        assert_eq!(req.end(), d(2025, 3, 1));
        assert_eq!(req.start(), d(2024, 3, 1));
    }

    #[test]
    fn explicit_args_override_defaults() {
        let config = DashboardConfig::default();
        let mut a = args(InstrumentKind::ForexPair);
        a.symbol = Some("JPY=X".into());
        a.start = Some(d(2024, 1, 1));
        a.end = Some(d(2024, 2, 1));
        let req = build_request(&config, &a, d(2025, 3, 1)).unwrap();
        assert_eq!(req.symbol(), "JPY=X");
        assert_eq!(req.start(), d(2024, 1, 1));
        assert_eq!(req.end(), d(2024, 2, 1));
    }

    #[test]
    fn inverted_dates_rejected_before_fetch() {
        let config = DashboardConfig::default();
        let mut a = args(InstrumentKind::Stock);
        a.start = Some(d(2024, 5, 1));
        a.end = Some(d(2024, 4, 1));
        assert!(build_request(&config, &a, d(2025, 1, 1)).is_err());
    }

    #[test]
    fn default_lookback_out_of_date_range_is_error() {
        let mut config = DashboardConfig::default();
        config.defaults.lookback_days = u32::MAX;
        let err = build_request(&config, &args(InstrumentKind::Stock), d(2025, 3, 1)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn blank_symbol_error_names_kind_hint() {
        let config = DashboardConfig::default();
        let mut a = args(InstrumentKind::Crypto);
        a.symbol = Some("   ".into());
        let err = build_request(&config, &a, d(2025, 3, 1)).unwrap_err().to_string();
        assert!(err.contains("symbol must not be empty"));
        assert!(err.contains(InstrumentKind::Crypto.symbol_hint()));
    }

    #[test]
    fn no_data_exits_with_two() {
        let err = PipelineError::NoData {
            symbol: "ZZZZ".into(),
        };
        assert_eq!(exit_code(&err), EXIT_NO_DATA);
        assert_eq!(err.user_message(), "No data found for given ticker. Please try again.");
    }

    #[test]
    fn unreachable_exits_with_one() {
        let err = PipelineError::Fetch(FetchError::Unreachable {
            symbol: "AAPL".into(),
            message: "network unreachable: timed out".into(),
        });
        assert_eq!(exit_code(&err), EXIT_UNREACHABLE);
        assert_eq!(
            err.user_message(),
            "Error fetching data: network unreachable: timed out"
        );
    }

    #[test]
    fn pipeline_error_survives_anyhow_for_exit_mapping() {
        let err: anyhow::Error = PipelineError::NoData {
            symbol: "ZZZZ".into(),
        }
        .into();
        let pipeline_err = err.downcast_ref::<PipelineError>().unwrap();
        assert_eq!(exit_code(pipeline_err), 2);
    }

    #[test]
    fn parses_show_command() {
        let cli = Cli::try_parse_from([
            "quotedash", "show", "--kind", "forex", "--symbol", "EURUSD=X", "--start",
            "2024-01-01", "--rows", "5", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Show {
                instrument, rows, ..
            } => {
                assert_eq!(instrument.kind, InstrumentKind::ForexPair);
                assert_eq!(instrument.start, Some(d(2024, 1, 1)));
                assert_eq!(rows, Some(5));
            }
            Commands::Export { .. } => panic!("expected show"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["quotedash", "show", "--kind", "bond"]).is_err());
    }
}
