//! Momentum: close[i] - close[i-p]. Warmup: period bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_momentum(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Momentum(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= period;
            let momentum = if valid {
                bar.close - bars[i - period].close
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(momentum),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
