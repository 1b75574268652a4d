//! Rate of Change: 100 * (close[i] - close[i-p]) / close[i-p].
//! Warmup: period bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_roc(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Roc(period);

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
            let roc = if valid {
                let base = bars[i - period].close;
                100.0 * (bar.close - base) / base
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(roc),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn roc_warmup() {
        let bars = make_bars(&[10.0; 5]);
        let series = calculate_roc(&bars, 3);

        for i in 0..3 {
            assert!(!series.values[i].valid);
        }
        assert!(series.values[3].valid);
    }

    #[test]
    fn roc_known_values() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 15.0, 5.5]);
        let series = calculate_roc(&bars, 2);

        if let IndicatorValue::Simple(v) = series.values[2].value {
            assert!((v - 20.0).abs() < 1e-9);
        }
        if let IndicatorValue::Simple(v) = series.values[4].value {
            assert!((v - 100.0 * (5.5 - 12.0) / 12.0).abs() < 1e-9);
        }
    }

    #[test]
    fn roc_flat_prices_is_zero() {
        let bars = make_bars(&[10.0; 6]);
        let series = calculate_roc(&bars, 3);

        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Simple(v) = point.value {
                assert!(v.abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn roc_zero_period() {
        let bars = make_bars(&[10.0; 3]);
        assert!(calculate_roc(&bars, 0).values.is_empty());
    }
}
