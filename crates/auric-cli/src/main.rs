//! Command-line interface for auric
//!
//! `inspect` mirrors the data-loading workflow: parse a folder of candle
//! CSVs, print store statistics and headline technicals. `predict` wires the
//! store, the built-in tool set, and the orchestrator together for one run
//! and prints the prediction response as JSON.

use anyhow::Context as _;
use auric_agent::{HeuristicPlanner, Orchestrator, OrchestratorConfig, RuleSynthesizer};
use auric_core::request::{PredictionRequest, RiskTolerance, Strategy, TimePreference};
use auric_market::{MarketDataStore, default_tools, indicators, share};
use auric_tools::ToolRegistry;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "auric")]
#[command(about = "Agentic market prediction over local candle data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a CSV folder and print store statistics and headline technicals
    Inspect {
        /// Directory containing candle CSV files
        #[arg(long, default_value = "data/xauusd")]
        dir: PathBuf,
        #[arg(long, default_value = "XAUUSD")]
        symbol: String,
    },
    /// Run one analysis and print the prediction response
    Predict {
        /// Directory containing candle CSV files
        #[arg(long, default_value = "data/xauusd")]
        dir: PathBuf,
        #[arg(long, default_value = "XAUUSD")]
        symbol: String,
        #[arg(long, value_enum, default_value_t = StrategyArg::Comprehensive)]
        strategy: StrategyArg,
        #[arg(long, value_enum, default_value_t = RiskArg::Medium)]
        risk: RiskArg,
        /// Reported macro horizon, e.g. 2_weeks
        #[arg(long)]
        macro_window: Option<String>,
        /// Reported micro horizon, e.g. 3_days
        #[arg(long)]
        micro_window: Option<String>,
        /// Run deadline in seconds; 0 disables it
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        /// Pretty-print the response JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Comprehensive,
    Technical,
    Sentiment,
    Momentum,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Comprehensive => Self::Comprehensive,
            StrategyArg::Technical => Self::Technical,
            StrategyArg::Sentiment => Self::Sentiment,
            StrategyArg::Momentum => Self::Momentum,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RiskArg {
    Low,
    Medium,
    High,
}

impl From<RiskArg> for RiskTolerance {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Low => Self::Low,
            RiskArg::Medium => Self::Medium,
            RiskArg::High => Self::High,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    auric_utils::init_tracing();

    match Cli::parse().command {
        Command::Inspect { dir, symbol } => inspect(&dir, &symbol),
        Command::Predict {
            dir,
            symbol,
            strategy,
            risk,
            macro_window,
            micro_window,
            timeout_secs,
            pretty,
        } => {
            predict(
                &dir,
                symbol,
                strategy,
                risk,
                macro_window,
                micro_window,
                timeout_secs,
                pretty,
            )
            .await
        }
    }
}

fn load_store(dir: &Path, symbol: &str) -> anyhow::Result<MarketDataStore> {
    let store = MarketDataStore::from_folder(dir, symbol)
        .with_context(|| format!("failed to load candle CSVs from {}", dir.display()))?;
    info!(symbol, candles = store.len(), dir = %dir.display(), "candle store ready");
    Ok(store)
}

fn inspect(dir: &Path, symbol: &str) -> anyhow::Result<()> {
    let store = load_store(dir, symbol)?;
    let summary = store.summary();

    let mut table = Table::new();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec!["symbol".to_string(), symbol.to_string()]);
    table.add_row(vec!["candles".to_string(), summary.count.to_string()]);
    if let (Some(first), Some(last)) = (summary.first_time, summary.last_time) {
        table.add_row(vec!["first".to_string(), first.to_rfc3339()]);
        table.add_row(vec!["last".to_string(), last.to_rfc3339()]);
    }
    if let (Some(min), Some(max)) = (summary.min_close, summary.max_close) {
        table.add_row(vec!["close min".to_string(), format!("{min:.4}")]);
        table.add_row(vec!["close max".to_string(), format!("{max:.4}")]);
    }
    if let (Some(mean), Some(std)) = (summary.mean_close, summary.std_close) {
        table.add_row(vec!["close mean".to_string(), format!("{mean:.4}")]);
        table.add_row(vec!["close std".to_string(), format!("{std:.4}")]);
    }

    let closes = store.closes();
    let fmt = |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
    table.add_row(vec!["SMA20".to_string(), fmt(indicators::sma(&closes, 20))]);
    table.add_row(vec!["EMA20".to_string(), fmt(indicators::ema(&closes, 20))]);
    table.add_row(vec!["RSI14".to_string(), fmt(indicators::rsi(&closes, 14))]);
    table.add_row(vec![
        "ATR14".to_string(),
        fmt(indicators::atr(store.candles(), 14)),
    ]);
    if let Some(vol) = indicators::volatility(&closes, 96) {
        table.add_row(vec![
            "volatility (96 bars)".to_string(),
            format!("sd={:.3e} annualized={:.2}%", vol.sd, vol.annualized * 100.0),
        ]);
    }

    println!("{table}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn predict(
    dir: &Path,
    symbol: String,
    strategy: StrategyArg,
    risk: RiskArg,
    macro_window: Option<String>,
    micro_window: Option<String>,
    timeout_secs: u64,
    pretty: bool,
) -> anyhow::Result<()> {
    let store = share(load_store(dir, &symbol)?);

    let mut builder = ToolRegistry::builder();
    for tool in default_tools(&store) {
        builder = builder.register(tool);
    }
    let registry = Arc::new(builder.build());

    let config = OrchestratorConfig {
        run_timeout: (timeout_secs > 0).then_some(Duration::from_secs(timeout_secs)),
        ..OrchestratorConfig::default()
    };
    let mut orchestrator = Orchestrator::with_config(
        registry,
        Arc::new(HeuristicPlanner::new()),
        Arc::new(RuleSynthesizer::new()),
        config,
    );

    let mut request = PredictionRequest::new(symbol)
        .with_strategy(strategy.into())
        .with_risk_tolerance(risk.into());
    if macro_window.is_some() || micro_window.is_some() {
        request.preferences.time_preference = Some(TimePreference {
            macro_horizon: macro_window,
            micro_horizon: micro_window,
        });
    }

    let response = orchestrator.run(&request).await;

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");

    info!(
        strategy = %response.run_metadata.analysis_strategy,
        steps = response.run_metadata.reasoning_steps,
        elapsed = %response.run_metadata.total_analysis_time,
        calibration = %response.run_metadata.confidence_calibration,
        "prediction complete"
    );
    Ok(())
}
