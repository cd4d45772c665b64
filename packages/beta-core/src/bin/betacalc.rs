//! betacalc CLI - beta and risk metrics for stocks, portfolios and mutual funds.
//!
//! Every command prints an `ApiResponse` JSON envelope on stdout. Logs go to
//! stderr and are controlled with `RUST_LOG`.

use anyhow::Context;
use beta_core::{
    analysis::{analyze_portfolio, commentary},
    portfolio::fund_weighted_beta,
    screener::{rank, screen, ScreenerSettings},
    source::{
        fetch_all_bars, http_client, CachedSource, HoldingsProvider, JsonFileHoldings,
        MfApiSource, PriceSource, YahooChartSource,
    },
    analyze, classify, AnalysisParams, ApiResponse, Benchmark, Config, DateRange, Error, Frequency,
    Holding, PricePoint, PriceSeries, Timeframe,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "betacalc")]
#[command(about = "Beta calculator - systematic risk for stocks, portfolios and mutual funds")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $BETACALC_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Beta of one price series against another, both read from JSON files
    Beta {
        /// Asset prices: [{"date": "YYYY-MM-DD", "price": 123.4}, ...]
        #[arg(short, long)]
        asset: PathBuf,
        /// Benchmark prices, same format
        #[arg(short, long)]
        benchmark: PathBuf,
        /// daily, weekly or monthly
        #[arg(short, long)]
        frequency: Option<Frequency>,
        /// Annual risk-free rate in percent
        #[arg(short, long)]
        risk_free: Option<f64>,
    },
    /// Beta of a portfolio of holdings, prices read from a directory
    Portfolio {
        /// Holdings: [{"symbol": "TCS", "allocation": 25.0}, ...]
        #[arg(long)]
        holdings: PathBuf,
        /// Benchmark prices
        #[arg(short, long)]
        benchmark: PathBuf,
        /// Directory with one <SYMBOL>.json price file per holding
        #[arg(short, long)]
        prices_dir: PathBuf,
        #[arg(short, long)]
        frequency: Option<Frequency>,
        #[arg(short, long)]
        risk_free: Option<f64>,
    },
    /// Beta of a mutual fund from its NAV history
    Fund {
        /// AMFI scheme code
        #[arg(long)]
        amfi: String,
        /// Benchmark index (NIFTY50, SENSEX, NIFTY500, NIFTYMIDCAP)
        #[arg(short, long)]
        benchmark: Option<Benchmark>,
        /// 6M, 1Y, 3Y, 5Y or START..END
        #[arg(short, long, default_value = "1Y")]
        timeframe: Timeframe,
        /// daily, weekly or monthly; picked from the window when omitted
        #[arg(short, long)]
        frequency: Option<Frequency>,
        /// Disclosed holdings file keyed by scheme code
        #[arg(long)]
        holdings: Option<PathBuf>,
    },
    /// Beta of a listed stock
    Stock {
        /// NSE symbol or Yahoo ticker
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        benchmark: Option<Benchmark>,
        #[arg(short, long, default_value = "1Y")]
        timeframe: Timeframe,
        #[arg(short, long)]
        frequency: Option<Frequency>,
    },
    /// Score stocks on technical indicators and rank them
    Screen {
        /// Symbols to screen
        #[arg(short, long = "symbol", num_args = 1.., required = true)]
        symbols: Vec<String>,
        #[arg(short, long, default_value = "1Y")]
        timeframe: Timeframe,
    },
    /// Risk class of a beta value
    Classify {
        #[arg(long, allow_hyphen_values = true)]
        beta: f64,
    },
    /// Show the resolved configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    let output = match Config::load_from(&config_path) {
        Ok(config) => run(cli.command, config, &config_path)?,
        Err(e) => respond::<Value>(Err(e)),
    };

    println!("{}", output);
    Ok(())
}

fn run(command: Commands, config: Config, config_path: &Path) -> anyhow::Result<String> {
    let output = match command {
        Commands::Beta {
            asset,
            benchmark,
            frequency,
            risk_free,
        } => respond(handle_beta(
            &asset,
            &benchmark,
            params(&config, frequency, risk_free),
        )),
        Commands::Portfolio {
            holdings,
            benchmark,
            prices_dir,
            frequency,
            risk_free,
        } => respond(handle_portfolio(
            &holdings,
            &benchmark,
            &prices_dir,
            params(&config, frequency, risk_free),
        )),
        Commands::Classify { beta } => respond(handle_classify(beta)),
        Commands::Config => respond(Ok(json!({
            "path": config_path,
            "config": config,
        }))),
        Commands::Fund {
            amfi,
            benchmark,
            timeframe,
            frequency,
            holdings,
        } => {
            let benchmark = benchmark.unwrap_or(config.default_benchmark);
            respond(block_on(handle_fund(
                &config,
                &amfi,
                benchmark,
                timeframe,
                frequency,
                holdings.as_deref(),
            ))?)
        }
        Commands::Stock {
            symbol,
            benchmark,
            timeframe,
            frequency,
        } => {
            let benchmark = benchmark.unwrap_or(config.default_benchmark);
            respond(block_on(handle_stock(
                &config, &symbol, benchmark, timeframe, frequency,
            ))?)
        }
        Commands::Screen { symbols, timeframe } => {
            respond(block_on(handle_screen(&config, &symbols, timeframe))?)
        }
    };
    Ok(output)
}

/// Run a future on a fresh runtime; only network commands need one.
fn block_on<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn respond<T: Serialize>(result: beta_core::Result<T>) -> String {
    if let Err(e) = &result {
        tracing::debug!("Command failed: {}", e);
    }
    serde_json::to_string_pretty(&ApiResponse::from(result))
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
}

fn params(config: &Config, frequency: Option<Frequency>, risk_free: Option<f64>) -> AnalysisParams {
    let mut params = AnalysisParams::from(config);
    if let Some(frequency) = frequency {
        params.frequency = frequency;
    }
    if let Some(rate) = risk_free {
        params.risk_free_rate = rate;
    }
    params
}

/// Params for a fetched window. Without an explicit frequency, the configured
/// one is stepped down until the window holds enough returns.
fn window_params(
    config: &Config,
    range: &DateRange,
    frequency: Option<Frequency>,
) -> AnalysisParams {
    match frequency {
        Some(_) => params(config, frequency, None),
        None => AnalysisParams::from(config).fitted_to(range),
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn read_prices(path: &Path) -> beta_core::Result<PriceSeries> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let points: Vec<PricePoint> = serde_json::from_str(&content)?;
    PriceSeries::from_unsorted(points)
}

fn handle_beta(asset: &Path, benchmark: &Path, params: AnalysisParams) -> beta_core::Result<Value> {
    let asset = read_prices(asset)?;
    let benchmark = read_prices(benchmark)?;
    let report = analyze(&asset, &benchmark, &params)?;
    Ok(json!({ "report": report }))
}

fn handle_portfolio(
    holdings: &Path,
    benchmark: &Path,
    prices_dir: &Path,
    params: AnalysisParams,
) -> beta_core::Result<Value> {
    let content = fs::read_to_string(holdings).map_err(|e| {
        Error::InvalidInput(format!("Cannot read {}: {}", holdings.display(), e))
    })?;
    let holdings: Vec<Holding> = serde_json::from_str::<Vec<Holding>>(&content)?
        .into_iter()
        .map(|h| Holding::new(&h.symbol, h.allocation))
        .collect();

    let mut prices = HashMap::new();
    for holding in &holdings {
        let path = prices_dir.join(format!("{}.json", holding.symbol));
        if !path.exists() {
            return Err(Error::UnknownSymbol(holding.symbol.clone()));
        }
        prices.insert(holding.symbol.clone(), read_prices(&path)?);
    }

    let benchmark = read_prices(benchmark)?;
    let report = analyze_portfolio(&holdings, &prices, &benchmark, &params)?;
    Ok(json!({ "report": report }))
}

fn handle_classify(beta: f64) -> beta_core::Result<Value> {
    if !beta.is_finite() {
        return Err(Error::InvalidInput("beta must be a finite number".to_string()));
    }
    let class = classify(beta);
    Ok(json!({
        "beta": beta,
        "classification": class,
        "label": class.label(),
        "commentary": commentary(beta),
    }))
}

async fn handle_fund(
    config: &Config,
    scheme_code: &str,
    benchmark: Benchmark,
    timeframe: Timeframe,
    frequency: Option<Frequency>,
    holdings: Option<&Path>,
) -> beta_core::Result<Value> {
    let range = timeframe.resolve(today())?;
    let client = http_client(config)?;
    let navs = MfApiSource::from_config(client.clone(), config);
    let index = YahooChartSource::from_config(client, config);

    let ((meta, fund_prices), benchmark_prices) = futures::try_join!(
        navs.fetch_history(scheme_code, &range),
        index.fetch_prices(benchmark.ticker(), &range),
    )?;

    let params = window_params(config, &range, frequency);
    let report = analyze(&fund_prices, &benchmark_prices, &params)?;

    let holdings_beta = match holdings {
        Some(path) => {
            let disclosed = JsonFileHoldings::new(path).holdings(scheme_code).await?;
            Some(json!({
                "holdings": disclosed,
                "weighted_beta": fund_weighted_beta(&disclosed),
            }))
        }
        None => None,
    };

    Ok(json!({
        "scheme": meta,
        "benchmark": benchmark.name(),
        "months": range.months(),
        "report": report,
        "holdings": holdings_beta,
    }))
}

async fn handle_stock(
    config: &Config,
    symbol: &str,
    benchmark: Benchmark,
    timeframe: Timeframe,
    frequency: Option<Frequency>,
) -> beta_core::Result<Value> {
    let range = timeframe.resolve(today())?;
    let source = YahooChartSource::from_config(http_client(config)?, config);

    let (stock_prices, benchmark_prices) = futures::try_join!(
        source.fetch_prices(symbol, &range),
        source.fetch_prices(benchmark.ticker(), &range),
    )?;

    let params = window_params(config, &range, frequency);
    let report = analyze(&stock_prices, &benchmark_prices, &params)?;
    Ok(json!({
        "symbol": symbol.trim().to_uppercase(),
        "benchmark": benchmark.name(),
        "months": range.months(),
        "report": report,
    }))
}

async fn handle_screen(
    config: &Config,
    symbols: &[String],
    timeframe: Timeframe,
) -> beta_core::Result<Value> {
    let range = timeframe.resolve(today())?;
    let source = CachedSource::new(
        YahooChartSource::from_config(http_client(config)?, config),
        config.cache_ttl(),
    );
    let settings = ScreenerSettings::default();

    let fetched = fetch_all_bars(&source, symbols, &range, config.max_concurrent_fetches).await;

    let mut results = Vec::new();
    let mut errors = Vec::new();
    for (symbol, bars) in fetched {
        match bars.and_then(|bars| screen(&symbol, &bars, &settings)) {
            Ok(result) => results.push(result),
            Err(e) => errors.push(json!({ "symbol": symbol, "error": e.user_message() })),
        }
    }
    tracing::info!("Screened {} symbols, {} failed", results.len(), errors.len());

    Ok(json!({
        "results": rank(results),
        "errors": errors,
    }))
}
