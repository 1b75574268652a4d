//! Commodity Channel Index.
//!
//! CCI = (TP - SMA(TP)) / (0.015 * mean deviation), where TP is the
//! typical price (high + low + close) / 3 and the mean deviation is the
//! average absolute distance of TP from its SMA over the window. A zero
//! mean deviation yields CCI = 0. Warmup: period - 1 bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_cci(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Cci(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
    let warmup = period - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let cci = if valid {
                let window = &typical[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let mean_dev =
                    window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
                if mean_dev == 0.0 {
                    0.0
                } else {
                    (typical[i] - mean) / (0.015 * mean_dev)
                }
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(cci),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
