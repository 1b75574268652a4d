//! Stochastic oscillator.
//!
//! %K = 100 * (close - LL(k)) / (HH(k) - LL(k)), %D = SMA(d) of %K.
//! Flat windows (HH == LL) yield %K = 50. A point is valid once both lines
//! are defined: warmup = (k-1) + (d-1) bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_stochastic(bars: &[OhlcvBar], k_period: usize, d_period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stochastic { k_period, d_period };

    if k_period == 0 || d_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let k_warmup = k_period - 1;
    let warmup = k_warmup + d_period - 1;

    let mut k_line = vec![0.0; bars.len()];
    for i in k_warmup..bars.len() {
        let window = &bars[i + 1 - k_period..=i];
        let hh = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let ll = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        k_line[i] = if hh == ll {
            50.0
        } else {
            100.0 * (bars[i].close - ll) / (hh - ll)
        };
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let d = if valid {
                k_line[i + 1 - d_period..=i].iter().sum::<f64>() / d_period as f64
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Stochastic { k: k_line[i], d },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
