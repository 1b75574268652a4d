//! Money Flow Index.
//!
//! Raw money flow is typical price * volume, classified positive or
//! negative by the typical price's direction versus the previous bar.
//! MFI = 100 * positive / (positive + negative) over the window; all-flat
//! windows yield 50. Warmup: period bars (the first bar has no
//! direction).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_mfi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Mfi(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();

    // Signed money flow per bar; index 0 has no direction.
    let mut positive = vec![0.0; bars.len()];
    let mut negative = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let flow = typical[i] * bars[i].volume as f64;
        if typical[i] > typical[i - 1] {
            positive[i] = flow;
        } else if typical[i] < typical[i - 1] {
            negative[i] = flow;
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= period;
            let mfi = if valid {
                let pos: f64 = positive[i + 1 - period..=i].iter().sum();
                let neg: f64 = negative[i + 1 - period..=i].iter().sum();
                if pos + neg == 0.0 {
                    50.0
                } else {
                    100.0 * pos / (pos + neg)
                }
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(mfi),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
