//! On-Balance Volume.
//!
//! Running total of volume, added on up closes and subtracted on down
//! closes; unchanged closes leave it flat. Defined from the first bar
//! with OBV = 0, so there is no warmup.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_obv(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut obv = 0.0;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            if bar.close > bars[i - 1].close {
                obv += bar.volume as f64;
            } else if bar.close < bars[i - 1].close {
                obv -= bar.volume as f64;
            }
        }
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(obv),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}
