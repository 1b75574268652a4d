//! Backtest engine.
//!
//! Runs one compiled strategy over one bar series. Indicator series are
//! precomputed before the bar loop, then each bar evaluates the rules in
//! their declared order against the close: an entry rule buys all-in
//! when flat, an exit rule liquidates. At most one buy and one sell
//! execute per bar. Holding-period exits fire from engine state without
//! consulting the condition evaluator.
//!
//! A condition that fails to evaluate at a bar is logged and skipped for
//! that bar; it never aborts the run. The optional evaluation budget is
//! wall-clock time checked once per bar.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::condition_eval::{self, EvalContext};
use crate::domain::error::StratsimError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::{self, OhlcvBar};
use crate::domain::portfolio::{EquityPoint, Ledger, Trade};
use crate::domain::strategy::{RuleBody, RuleKind, Strategy};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Allow entry rules to add to an already open position.
    pub allow_pyramiding: bool,
    /// Wall-clock budget for the whole simulation; `None` means unbounded.
    pub eval_budget: Option<Duration>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: 10_000.0,
            allow_pyramiding: false,
            eval_budget: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub final_portfolio_value: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratsimError> {
    ohlcv::validate_series(bars)?;

    for (index, err) in strategy.broken_rules() {
        log::warn!("rule {}: condition does not parse, skipping: {}", index, err);
    }

    let indicators: HashMap<String, IndicatorSeries> = strategy
        .indicators
        .iter()
        .map(|(name, indicator_type)| (name.clone(), indicator_type.compute(bars)))
        .collect();

    let mut ledger = Ledger::new(config.initial_cash);
    let started = Instant::now();

    for (index, bar) in bars.iter().enumerate() {
        if let Some(budget) = config.eval_budget {
            if started.elapsed() > budget {
                return Err(StratsimError::Timeout {
                    budget_ms: budget.as_millis() as u64,
                });
            }
        }

        let mut bought = false;
        let mut sold = false;

        for rule in &strategy.rules {
            let bars_since_entry = ledger.position.map(|p| index - p.entry_index);

            let triggered = match &rule.body {
                RuleBody::HoldingPeriod(period) => {
                    bars_since_entry.is_some_and(|held| held >= *period)
                }
                RuleBody::Condition(Ok(expr)) => {
                    let ctx = EvalContext {
                        bars,
                        index,
                        indicators: &indicators,
                        bars_since_entry,
                    };
                    match condition_eval::evaluate(expr, &ctx) {
                        Ok(triggered) => triggered,
                        Err(err) => {
                            log::warn!(
                                "rule {}: '{}' failed at bar {}: {}",
                                rule.index,
                                rule.condition_text,
                                index,
                                err
                            );
                            false
                        }
                    }
                }
                RuleBody::Condition(Err(_)) => false,
            };

            if !triggered {
                continue;
            }

            match rule.kind {
                RuleKind::Entry => {
                    if bought || (!ledger.is_flat() && !config.allow_pyramiding) {
                        continue;
                    }
                    let quantity = ledger.apply_buy(index, bar.date, bar.close);
                    if quantity > 0 {
                        bought = true;
                        log::debug!(
                            "bar {} {}: buy {} @ {}",
                            index,
                            bar.date,
                            quantity,
                            bar.close
                        );
                    }
                }
                RuleKind::Exit => {
                    if sold || ledger.is_flat() {
                        continue;
                    }
                    let quantity = ledger.apply_sell(index, bar.date, bar.close);
                    sold = true;
                    log::debug!(
                        "bar {} {}: sell {} @ {}",
                        index,
                        bar.date,
                        quantity,
                        bar.close
                    );
                }
            }
        }

        ledger.record_equity(bar.date, bar.close);
    }

    let last_close = bars[bars.len() - 1].close;
    log::debug!("run complete: {:?}", ledger.snapshot());
    Ok(BacktestResult {
        final_portfolio_value: ledger.mark_to_market(last_close),
        trades: ledger.trades,
        equity_curve: ledger.equity_curve,
    })
}
