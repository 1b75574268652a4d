//! CLI integration tests: backtest and validate orchestration with real
//! files on disk.

mod common;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use stratsim::adapters::file_config_adapter::FileConfigAdapter;
use stratsim::cli::{self, Cli};
use tempfile::TempDir;

const STRATEGY_JSON: &str = r#"{
    "strategy": [
        {
            "ticker": "AAPL",
            "indicator": "SMA",
            "period": 1,
            "type": "entry",
            "condition": "close[0] > 10"
        },
        {
            "ticker": "AAPL",
            "indicator": "daysSinceEntry",
            "period": 2,
            "type": "exit",
            "condition": ""
        }
    ]
}"#;

const BARS_CSV: &str = "date,open,high,low,close,volume\n\
    2024-01-01,10.0,10.0,10.0,10.0,1000\n\
    2024-01-02,11.0,11.0,11.0,11.0,1000\n\
    2024-01-03,9.0,9.0,9.0,9.0,1000\n\
    2024-01-04,12.0,12.0,12.0,12.0,1000\n\
    2024-01-05,13.0,13.0,13.0,13.0,1000\n";

fn is_success(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

#[test]
fn backtest_end_to_end_writes_result_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("AAPL.csv"), BARS_CSV).unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(&strategy_path, STRATEGY_JSON).unwrap();
    let output_path = dir.path().join("result.json");

    let cli = Cli::try_parse_from([
        "stratsim",
        "backtest",
        "--strategy",
        strategy_path.to_str().unwrap(),
        "--data",
        dir.path().to_str().unwrap(),
        "--cash",
        "100",
        "--output",
        output_path.to_str().unwrap(),
    ])
    .unwrap();

    let code = cli::run(cli);
    assert!(is_success(code));

    let json = fs::read_to_string(&output_path).unwrap();
    let result: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(result["final_portfolio_value"].as_f64(), Some(109.0));
    assert_eq!(result["trades"][0]["quantity"].as_i64(), Some(9));
    assert_eq!(result["trades"][0]["entry_date"].as_str(), Some("2024-01-02"));
    assert_eq!(result["trades"][0]["exit_date"].as_str(), Some("2024-01-04"));
    assert_eq!(result["equity_curve"].as_array().map(|a| a.len()), Some(5));
}

#[test]
fn backtest_reads_config_for_data_dir_and_cash() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("AAPL.csv"), BARS_CSV).unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(&strategy_path, STRATEGY_JSON).unwrap();
    let config_path = dir.path().join("config.ini");
    fs::write(
        &config_path,
        format!(
            "[backtest]\ninitial_cash = 100\n\n[data]\ncsv_dir = {}\n",
            dir.path().display()
        ),
    )
    .unwrap();
    let output_path = dir.path().join("result.json");

    let cli = Cli::try_parse_from([
        "stratsim",
        "backtest",
        "--strategy",
        strategy_path.to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ])
    .unwrap();

    assert!(is_success(cli::run(cli)));

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(result["final_portfolio_value"].as_f64(), Some(109.0));
}

#[test]
fn backtest_missing_data_file_fails() {
    let dir = TempDir::new().unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(&strategy_path, STRATEGY_JSON).unwrap();

    let cli = Cli::try_parse_from([
        "stratsim",
        "backtest",
        "--strategy",
        strategy_path.to_str().unwrap(),
        "--data",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    assert!(!is_success(cli::run(cli)));
}

#[test]
fn validate_accepts_good_strategy() {
    let dir = TempDir::new().unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(&strategy_path, STRATEGY_JSON).unwrap();

    let cli = Cli::try_parse_from([
        "stratsim",
        "validate",
        "--strategy",
        strategy_path.to_str().unwrap(),
    ])
    .unwrap();

    assert!(is_success(cli::run(cli)));
}

#[test]
fn validate_rejects_unknown_indicator() {
    let dir = TempDir::new().unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(
        &strategy_path,
        r#"{"strategy": [{"ticker": "AAPL", "indicator": "Fibonacci", "type": "entry", "condition": "close > 10"}]}"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "stratsim",
        "validate",
        "--strategy",
        strategy_path.to_str().unwrap(),
    ])
    .unwrap();

    assert!(!is_success(cli::run(cli)));
}

#[test]
fn validate_rejects_malformed_condition() {
    let dir = TempDir::new().unwrap();
    let strategy_path = dir.path().join("strategy.json");
    fs::write(
        &strategy_path,
        r#"{"strategy": [{"ticker": "AAPL", "indicator": "SMA", "period": 5, "type": "entry", "condition": "close > >"}]}"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "stratsim",
        "validate",
        "--strategy",
        strategy_path.to_str().unwrap(),
    ])
    .unwrap();

    assert!(!is_success(cli::run(cli)));
}

#[test]
fn build_backtest_config_applies_budget() {
    let adapter = FileConfigAdapter::from_string(
        "[backtest]\ninitial_cash = 5000\neval_budget_ms = 200\n",
    )
    .unwrap();
    let config = cli::build_backtest_config(Some(&adapter), None);

    assert_eq!(config.initial_cash, 5000.0);
    assert_eq!(
        config.eval_budget,
        Some(std::time::Duration::from_millis(200))
    );
    assert!(!config.allow_pyramiding);
}
