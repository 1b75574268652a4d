//! Chaikin Money Flow.
//!
//! Money flow volume per bar is ((close - low) - (high - close)) /
//! (high - low) * volume, zero when high == low. CMF is the window sum
//! of money flow volume over the window sum of volume; a zero volume sum
//! yields 0. Warmup: period - 1 bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_cmf(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Cmf(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mfv: Vec<f64> = bars
        .iter()
        .map(|b| {
            if b.high == b.low {
                0.0
            } else {
                ((b.close - b.low) - (b.high - b.close)) / (b.high - b.low) * b.volume as f64
            }
        })
        .collect();

    let warmup = period - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let cmf = if valid {
                let flow: f64 = mfv[i + 1 - period..=i].iter().sum();
                let volume: f64 = bars[i + 1 - period..=i]
                    .iter()
                    .map(|b| b.volume as f64)
                    .sum();
                if volume == 0.0 { 0.0 } else { flow / volume }
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(cmf),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
