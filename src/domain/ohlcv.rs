//! OHLCV bar representation and series validation.

use chrono::NaiveDate;

use crate::domain::error::StratsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check a bar series is usable for simulation: non-empty, strictly
/// ascending by date, no duplicate dates, finite prices.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), StratsimError> {
    if bars.is_empty() {
        return Err(StratsimError::Data {
            reason: "bar series is empty".into(),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        if ![bar.open, bar.high, bar.low, bar.close]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(StratsimError::Data {
                reason: format!("non-finite price at {}", bar.date),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(StratsimError::Data {
                reason: format!(
                    "bar dates must be strictly ascending: {} follows {}",
                    bar.date,
                    bars[i - 1].date
                ),
            });
        }
    }

    Ok(())
}
