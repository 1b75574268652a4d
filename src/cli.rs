//! CLI definition and dispatch.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::engine::{self, BacktestConfig};
use crate::domain::error::StratsimError;
use crate::domain::strategy::{Strategy, StrategyDoc};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stratsim", about = "Rule-driven trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        /// Strategy JSON file
        #[arg(short, long)]
        strategy: PathBuf,
        /// Directory of <TICKER>.csv bar files
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// INI config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Override the configured starting cash
        #[arg(long)]
        cash: Option<f64>,
    },
    /// Validate a strategy file without running it
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List tickers available in a data directory
    ListTickers {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            strategy,
            data,
            config,
            output,
            start,
            end,
            cash,
        } => run_backtest(
            &strategy,
            data.as_ref(),
            config.as_ref(),
            output.as_ref(),
            start,
            end,
            cash,
        ),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::ListTickers { data } => run_list_tickers(&data),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StratsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_strategy(path: &PathBuf) -> Result<Strategy, ExitCode> {
    let json = fs::read_to_string(path).map_err(|e| {
        let err = StratsimError::Io(e);
        eprintln!("error: failed to read {}: {err}", path.display());
        ExitCode::from(&err)
    })?;
    let doc = StrategyDoc::from_json(&json).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Strategy::compile(&doc).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_backtest(
    strategy_path: &PathBuf,
    data_dir: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    cash_override: Option<f64>,
) -> ExitCode {
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(c) => Some(c),
                Err(code) => return code,
            }
        }
        None => None,
    };

    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    eprintln!(
        "Strategy for {}: {} rules, {} indicators",
        strategy.ticker,
        strategy.rules.len(),
        strategy.indicators.len()
    );

    let data_dir = match data_dir
        .cloned()
        .or_else(|| config.as_ref().and_then(|c| c.get_string("data", "csv_dir").map(PathBuf::from)))
    {
        Some(dir) => dir,
        None => {
            let err = StratsimError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            };
            eprintln!("error: {err}; pass --data or set [data] csv_dir");
            return ExitCode::from(&err);
        }
    };

    let bt_config = build_backtest_config(config.as_ref(), cash_override);

    let start = start.unwrap_or(NaiveDate::MIN);
    let end = end.unwrap_or(NaiveDate::MAX);

    let adapter = CsvAdapter::new(data_dir);
    let bars = match adapter.fetch_ohlcv(&strategy.ticker, start, end) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    eprintln!("Loaded {} bars for {}", bars.len(), strategy.ticker);

    let result = match engine::run_backtest(&bars, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    eprintln!(
        "Final portfolio value: {:.2} ({} trades)",
        result.final_portfolio_value,
        result.trades.len()
    );

    let json = match serde_json::to_string_pretty(&result) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: failed to serialize result: {e}");
            return ExitCode::from(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                eprintln!("error: failed to write {}: {e}", path.display());
                return ExitCode::from(1);
            }
            eprintln!("Result written to {}", path.display());
        }
        None => println!("{json}"),
    }

    ExitCode::SUCCESS
}

pub fn build_backtest_config(
    config: Option<&FileConfigAdapter>,
    cash_override: Option<f64>,
) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    let Some(config) = config else {
        return BacktestConfig {
            initial_cash: cash_override.unwrap_or(defaults.initial_cash),
            ..defaults
        };
    };

    let initial_cash = cash_override
        .unwrap_or_else(|| config.get_double("backtest", "initial_cash", defaults.initial_cash));
    let allow_pyramiding = config.get_bool("backtest", "allow_pyramiding", false);
    let eval_budget = match config.get_int("backtest", "eval_budget_ms", 0) {
        ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
        _ => None,
    };

    BacktestConfig {
        initial_cash,
        allow_pyramiding,
        eval_budget,
    }
}

fn run_validate(strategy_path: &PathBuf) -> ExitCode {
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let broken = strategy.broken_rules();
    if !broken.is_empty() {
        for (index, err) in &broken {
            eprintln!("rule {}: condition does not parse", index);
            eprintln!(
                "{}",
                err.display_with_context(&strategy.rules[*index].condition_text)
            );
        }
        return ExitCode::from(4);
    }

    println!(
        "Strategy OK: ticker {}, {} rules, {} indicators",
        strategy.ticker,
        strategy.rules.len(),
        strategy.indicators.len()
    );
    ExitCode::SUCCESS
}

fn run_list_tickers(data_dir: &PathBuf) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.clone());
    match adapter.list_tickers() {
        Ok(tickers) => {
            for ticker in tickers {
                println!("{ticker}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}
