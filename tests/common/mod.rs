#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stratsim::domain::error::StratsimError;
pub use stratsim::domain::ohlcv::OhlcvBar;
use stratsim::domain::strategy::{RuleSpec, Strategy, StrategyDoc};
use stratsim::ports::data_port::DataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> OhlcvBar {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
    OhlcvBar {
        date,
        open: close * 0.99,
        high: close * 1.02,
        low: close * 0.98,
        close,
        volume: 10_000,
    }
}

/// Bars with the given closes on consecutive days from `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Days::new(i as u64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10_000,
        })
        .collect()
}

pub fn rule_spec(
    ticker: &str,
    indicator: &str,
    period: Option<usize>,
    kind: &str,
    condition: &str,
) -> RuleSpec {
    RuleSpec {
        ticker: ticker.to_string(),
        indicator: indicator.to_string(),
        period,
        kind: kind.to_string(),
        condition: condition.to_string(),
    }
}

pub fn compile_strategy(specs: Vec<RuleSpec>) -> Strategy {
    Strategy::compile(&StrategyDoc { strategy: specs }).unwrap()
}

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StratsimError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StratsimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, StratsimError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}
