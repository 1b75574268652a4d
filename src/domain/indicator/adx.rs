//! Average Directional Index.
//!
//! DX = 100 * |+DI - -DI| / (+DI + -DI) over the Wilder-smoothed
//! directional indices; ADX seeds as the average of the first `period`
//! DX values and then Wilder-smooths. Warmup: 2 * period - 1 bars.

use crate::domain::indicator::dmi::directional_indices;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Adx(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let n = bars.len();
    let (plus_di, minus_di) = directional_indices(bars, period);

    // DX is defined from index `period`, where the DI lines become valid.
    let mut dx = vec![0.0; n];
    for i in period..n {
        let total = plus_di[i] + minus_di[i];
        if total > 0.0 {
            dx[i] = 100.0 * (plus_di[i] - minus_di[i]).abs() / total;
        }
    }

    let warmup = 2 * period - 1;
    let mut adx = vec![0.0; n];
    if n > warmup {
        adx[warmup] = dx[period..=warmup].iter().sum::<f64>() / period as f64;
        for i in warmup + 1..n {
            adx[i] = (adx[i - 1] * (period - 1) as f64 + dx[i]) / period as f64;
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= warmup,
            value: IndicatorValue::Simple(adx[i]),
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

    fn make_bars(hl: &[(f64, f64)]) -> Vec<OhlcvBar> {
        hl.iter()
            .enumerate()
            .map(|(i, &(high, low))| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: 1000,
            })
            .collect()
    }

    fn rising_bars(n: usize) -> Vec<OhlcvBar> {
        make_bars(
            &(0..n)
                .map(|i| (10.0 + i as f64, 9.0 + i as f64))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn adx_warmup() {
        let bars = rising_bars(10);
        let series = calculate_adx(&bars, 3);

        // warmup = 2 * 3 - 1 = 5
        for i in 0..5 {
            assert!(!series.values[i].valid);
        }
        assert!(series.values[5].valid);
    }

    #[test]
    fn adx_strong_trend_is_100() {
        // Pure one-way movement: -DI stays zero, so every DX is 100.
        let bars = rising_bars(12);
        let series = calculate_adx(&bars, 3);

        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Simple(v) = point.value {
                assert!((v - 100.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn adx_bounded() {
        let bars = make_bars(&[
            (10.0, 9.0),
            (12.0, 10.0),
            (11.0, 8.0),
            (13.0, 10.0),
            (12.0, 9.0),
            (14.0, 11.0),
            (13.0, 10.0),
            (15.0, 12.0),
            (14.0, 11.0),
            (16.0, 13.0),
        ]);
        let series = calculate_adx(&bars, 3);

        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Simple(v) = point.value {
                assert!((0.0..=100.0).contains(&v));
            }
        }
    }

    #[test]
    fn adx_zero_period() {
        let bars = rising_bars(3);
        assert!(calculate_adx(&bars, 0).values.is_empty());
    }
}
