//! Bollinger Bands.
//!
//! Middle band is the SMA of closes; the upper and lower bands sit
//! `mult` population standard deviations above and below it. The
//! multiplier is carried as hundredths so the indicator identity stays
//! hashable. Warmup: period - 1 bars.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(bars: &[OhlcvBar], period: usize, mult_x100: u32) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger { period, mult_x100 };

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mult = mult_x100 as f64 / 100.0;
    let warmup = period - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let value = if valid {
                let window = &bars[i + 1 - period..=i];
                let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
                let variance = window
                    .iter()
                    .map(|b| (b.close - mean) * (b.close - mean))
                    .sum::<f64>()
                    / period as f64;
                let dev = mult * variance.sqrt();
                IndicatorValue::Bollinger {
                    upper: mean + dev,
                    middle: mean,
                    lower: mean - dev,
                }
            } else {
                IndicatorValue::Bollinger {
                    upper: 0.0,
                    middle: 0.0,
                    lower: 0.0,
                }
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value,
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
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0; 6]);
        let series = calculate_bollinger(&bars, 4, 200);

        for i in 0..3 {
            assert!(!series.values[i].valid);
        }
        assert!(series.values[3].valid);
    }

    #[test]
    fn bollinger_flat_prices_collapse_bands() {
        let bars = make_bars(&[10.0; 5]);
        let series = calculate_bollinger(&bars, 3, 200);

        if let IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } = series.values[4].value
        {
            assert!((upper - 10.0).abs() < 1e-9);
            assert!((middle - 10.0).abs() < 1e-9);
            assert!((lower - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bollinger_known_values() {
        // Window [2, 4, 6]: mean 4, population stddev sqrt(8/3).
        let bars = make_bars(&[2.0, 4.0, 6.0]);
        let series = calculate_bollinger(&bars, 3, 200);

        let dev = 2.0 * (8.0_f64 / 3.0).sqrt();
        if let IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        } = series.values[2].value
        {
            assert!((middle - 4.0).abs() < 1e-9);
            assert!((upper - (4.0 + dev)).abs() < 1e-9);
            assert!((lower - (4.0 - dev)).abs() < 1e-9);
        }
    }

    #[test]
    fn bollinger_bands_are_symmetric_around_middle() {
        let bars = make_bars(&[10.0, 12.0, 9.0, 14.0, 11.0, 13.0]);
        let series = calculate_bollinger(&bars, 4, 150);

        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } = point.value
            {
                assert!(((upper - middle) - (middle - lower)).abs() < 1e-9);
                assert!(upper >= middle && middle >= lower);
            }
        }
    }

    #[test]
    fn bollinger_zero_period() {
        let bars = make_bars(&[10.0; 3]);
        assert!(calculate_bollinger(&bars, 0, 200).values.is_empty());
    }
}
