//! Forecast one price column of a CSV file with a seasonal ARIMA model
//!
//! Usage:
//! ```text
//! price-forecast --file data/AAPL.csv --column Close -p 2 -d 1 -q 2 --period 12 -H 10
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use price_forecast::error::Result as ForecastResult;
use price_forecast::{DataLoader, ForecastConfig, ForecastPipeline, ModelOrder, PipelineReport, SeasonalOrder};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "SARIMA price forecasting")]
struct Args {
    /// Input CSV file with a date column and price columns
    #[arg(short, long)]
    file: PathBuf,

    /// Price column to forecast (default: Close)
    #[arg(short, long)]
    column: Option<String>,

    /// Date column name (detected when omitted)
    #[arg(long)]
    date_column: Option<String>,

    /// Ticker symbol, used for labels only
    #[arg(long)]
    ticker: Option<String>,

    /// First date to keep (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to keep (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// AR order (p)
    #[arg(short)]
    p: Option<usize>,

    /// Differencing order (d)
    #[arg(short)]
    d: Option<usize>,

    /// MA order (q)
    #[arg(short)]
    q: Option<usize>,

    /// Seasonal AR order (P), defaults to p
    #[arg(long)]
    seasonal_p: Option<usize>,

    /// Seasonal differencing order (D), defaults to d
    #[arg(long)]
    seasonal_d: Option<usize>,

    /// Seasonal MA order (Q), defaults to q
    #[arg(long)]
    seasonal_q: Option<usize>,

    /// Seasonal period (s)
    #[arg(long)]
    period: Option<usize>,

    /// Period used by the seasonal decomposition
    #[arg(long)]
    decompose_period: Option<usize>,

    /// Forecast horizon in days
    #[arg(short = 'H', long)]
    horizon: Option<usize>,

    /// Confidence level for prediction intervals
    #[arg(long)]
    confidence: Option<f64>,

    /// Significance level for the stationarity test
    #[arg(long)]
    significance: Option<f64>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the dated forecast to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Give up on model fitting after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn build_config(args: &Args) -> ForecastResult<ForecastConfig> {
    let mut config = match &args.config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::new(args.column.as_deref().unwrap_or("Close"))?,
    };

    if let Some(column) = &args.column {
        config = config.with_column(column.as_str())?;
    }
    if let Some(ticker) = &args.ticker {
        config = config.with_ticker(ticker.as_str());
    }
    if let Some(name) = &args.date_column {
        config = config.with_date_column(name.as_str());
    }
    if args.start.is_some() || args.end.is_some() {
        let start = args.start.or(config.start_date());
        let end = args.end.or(config.end_date());
        config = config.with_date_range(start, end)?;
    }

    let base = config.order();
    let base_seasonal = config.seasonal_order();
    let order = ModelOrder::new(
        args.p.unwrap_or(base.p),
        args.d.unwrap_or(base.d),
        args.q.unwrap_or(base.q),
    );
    let seasonal = SeasonalOrder::new(
        args.seasonal_p.or(args.p).unwrap_or(base_seasonal.p),
        args.seasonal_d.or(args.d).unwrap_or(base_seasonal.d),
        args.seasonal_q.or(args.q).unwrap_or(base_seasonal.q),
        args.period.unwrap_or(base_seasonal.s),
    )?;
    config = config.with_orders(order, seasonal)?;

    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon)?;
    }
    if let Some(period) = args.decompose_period {
        config = config.with_decomposition_period(period)?;
    }
    if let Some(level) = args.confidence {
        config = config.with_confidence_level(level)?;
    }
    if let Some(significance) = args.significance {
        config = config.with_significance(significance)?;
    }

    Ok(config)
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn print_report(config: &ForecastConfig, report: &PipelineReport) {
    let label = config.ticker().unwrap_or(config.column());
    println!("{}", "=".repeat(60));
    println!(
        "{} forecast, {} observations from {} to {}",
        label,
        report.series.len(),
        report
            .series
            .first_date()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        report
            .series
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_default()
    );
    println!("{}", "=".repeat(60));

    println!("\nStationarity");
    println!("{}", report.stationarity);

    println!("\nDecomposition (period {})", report.decomposition.period);
    if let Some(strength) = report.decomposition.trend_strength() {
        println!("Trend strength:    {:.3}", strength);
    }
    if let Some(strength) = report.decomposition.seasonal_strength() {
        println!("Seasonal strength: {:.3}", strength);
    }

    println!("\n{}", report.summary);

    println!("\n{:>12} {:>12} {:>12} {:>12}", "Date", "Lower", "Forecast", "Upper");
    println!("{}", "-".repeat(51));
    for point in report.forecast.points() {
        match (point.lower, point.upper) {
            (Some(lower), Some(upper)) => println!(
                "{:>12} {:>12.4} {:>12.4} {:>12.4}",
                point.date, lower, point.value, upper
            ),
            _ => println!("{:>12} {:>12} {:>12.4} {:>12}", point.date, "-", point.value, "-"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = build_config(&args).context("invalid forecast configuration")?;
    let frame = DataLoader::from_csv(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    info!(rows = frame.height(), file = %args.file.display(), "loaded price data");

    let pipeline = ForecastPipeline::new(config);
    let report = match args.timeout_secs {
        Some(secs) => pipeline.run_with_timeout(&frame, Duration::from_secs(secs))?,
        None => pipeline.run(&frame)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(pipeline.config(), &report);
    }

    if let Some(path) = &args.output {
        report
            .forecast
            .write_csv(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "forecast written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["price-forecast", "--file", "prices.csv"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.column(), "Close");
        assert_eq!(config.order(), ModelOrder::new(2, 1, 2));
        assert_eq!(config.seasonal_order(), SeasonalOrder::new(2, 1, 2, 12).unwrap());
        assert_eq!(config.horizon(), 10);
    }

    #[test]
    fn test_seasonal_order_mirrors_flags() {
        let args = parse(&["-p", "2", "-d", "1", "-q", "2", "--period", "5", "-H", "10"]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.order(), ModelOrder::new(2, 1, 2));
        assert_eq!(config.seasonal_order(), SeasonalOrder::new(2, 1, 2, 5).unwrap());
        assert_eq!(config.horizon(), 10);
    }

    #[test]
    fn test_seasonal_flags_override() {
        let args = parse(&["-p", "1", "--seasonal-p", "0", "--seasonal-q", "0", "--seasonal-d", "0"]);
        let config = build_config(&args).unwrap();
        assert!(!config.seasonal_order().is_seasonal());
    }

    #[test]
    fn test_zero_period_is_accepted() {
        let args = parse(&["-p", "2", "-d", "1", "-q", "2", "--period", "0"]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.seasonal_order().s, 0);
        assert!(!config.seasonal_order().is_seasonal());
    }

    #[test]
    fn test_dates_and_column() {
        let args = parse(&["-c", "Adj Close", "--start", "2023-01-01", "--end", "2023-06-30"]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.column(), "Adj Close");
        assert_eq!(config.start_date(), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(config.end_date(), NaiveDate::from_ymd_opt(2023, 6, 30));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(build_config(&parse(&["-H", "0"])).is_err());
        assert!(build_config(&parse(&["-p", "9"])).is_err());
        assert!(build_config(&parse(&["--start", "2023-06-30", "--end", "2023-01-01"])).is_err());
        assert!(Args::try_parse_from(["price-forecast", "--file", "x.csv", "--start", "June"]).is_err());
        assert!(Args::try_parse_from(["price-forecast"]).is_err());
    }
}
