//! Williams %R: -100 * (HH - close) / (HH - LL) over the lookback
//! window. Ranges from 0 (close at the high) to -100 (close at the low);
//! flat windows yield -50. Warmup: period - 1 bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_williams_r(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::WilliamsR(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let warmup = period - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let r = if valid {
                let window = &bars[i + 1 - period..=i];
                let hh = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
                let ll = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
                if hh == ll {
                    -50.0
                } else {
                    -100.0 * (hh - bar.close) / (hh - ll)
                }
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(r),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
