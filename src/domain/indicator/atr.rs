//! Average True Range.
//!
//! True range uses the previous close; the first bar's TR is high - low.
//! The ATR seed at index `period` is the simple average of the first
//! `period` true ranges measured from index 1, then Wilder smoothing:
//! ATR[i] = (ATR[i-1] * (period - 1) + TR[i]) / period.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Atr(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mut true_ranges = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        true_ranges[i] = bars[i].true_range(bars[i - 1].close);
    }

    let mut atr = vec![0.0; bars.len()];
    if bars.len() > period {
        atr[period] = true_ranges[1..=period].iter().sum::<f64>() / period as f64;
        for i in period + 1..bars.len() {
            atr[i] = (atr[i - 1] * (period - 1) as f64 + true_ranges[i]) / period as f64;
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= period,
            value: IndicatorValue::Simple(atr[i]),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
