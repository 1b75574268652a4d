//! Parabolic SAR.
//!
//! Standard stop-and-reverse recursion: SAR moves toward the extreme
//! point by an acceleration factor that starts at `step`, grows by
//! `step` on each new extreme and caps at `max`. In an uptrend the SAR
//! is clamped below the prior two lows (mirrored for downtrends) and a
//! penetration flips the trend. Parameters are carried as thousandths
//! so the indicator identity stays hashable. Valid from index 1; the
//! initial trend comes from the first close-to-close move.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_psar(bars: &[OhlcvBar], step_x1000: u32, max_x1000: u32) -> IndicatorSeries {
    let indicator_type = IndicatorType::Psar {
        step_x1000,
        max_x1000,
    };

    let step = step_x1000 as f64 / 1000.0;
    let max = max_x1000 as f64 / 1000.0;

    if bars.len() < 2 || step <= 0.0 {
        let values = bars
            .iter()
            .map(|bar| IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let mut sar = vec![0.0; bars.len()];
    let mut long = bars[1].close >= bars[0].close;
    let mut ep = if long { bars[1].high } else { bars[1].low };
    let mut af = step;
    sar[1] = if long { bars[0].low } else { bars[0].high };

    for i in 2..bars.len() {
        let mut next = sar[i - 1] + af * (ep - sar[i - 1]);

        if long {
            // SAR may not rise into the prior two bars' range.
            next = next.min(bars[i - 1].low).min(bars[i - 2].low);
            if bars[i].low < next {
                long = false;
                next = ep;
                ep = bars[i].low;
                af = step;
            } else if bars[i].high > ep {
                ep = bars[i].high;
                af = (af + step).min(max);
            }
        } else {
            next = next.max(bars[i - 1].high).max(bars[i - 2].high);
            if bars[i].high > next {
                long = true;
                next = ep;
                ep = bars[i].high;
                af = step;
            } else if bars[i].low < ep {
                ep = bars[i].low;
                af = (af + step).min(max);
            }
        }

        sar[i] = next;
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= 1,
            value: IndicatorValue::Simple(sar[i]),
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
    fn psar_first_bar_invalid() {
        let bars = rising_bars(5);
        let series = calculate_psar(&bars, 20, 200);

        assert!(!series.values[0].valid);
        assert!(series.values[1].valid);
    }

    #[test]
    fn psar_uptrend_stays_below_lows() {
        let bars = rising_bars(10);
        let series = calculate_psar(&bars, 20, 200);

        for (i, point) in series.values.iter().enumerate().skip(1) {
            if let IndicatorValue::Simple(v) = point.value {
                assert!(v < bars[i].low, "SAR {} not below low at {}", v, i);
            }
        }
    }

    #[test]
    fn psar_downtrend_stays_above_highs() {
        let bars = make_bars(
            &(0..10)
                .map(|i| (100.0 - i as f64, 99.0 - i as f64))
                .collect::<Vec<_>>(),
        );
        let series = calculate_psar(&bars, 20, 200);

        for (i, point) in series.values.iter().enumerate().skip(1) {
            if let IndicatorValue::Simple(v) = point.value {
                assert!(v > bars[i].high, "SAR {} not above high at {}", v, i);
            }
        }
    }

    #[test]
    fn psar_reversal_jumps_to_extreme() {
        // Sharp break: the down bar pierces the rising SAR.
        let bars = make_bars(&[
            (10.0, 9.0),
            (11.0, 10.0),
            (12.0, 11.0),
            (13.0, 12.0),
            (6.0, 5.0),
        ]);
        let series = calculate_psar(&bars, 20, 200);

        // After the reversal the SAR sits at the prior extreme point, above
        // the breaking bar.
        if let IndicatorValue::Simple(v) = series.values[4].value {
            assert!((v - 13.0).abs() < 1e-9);
        }
    }

    #[test]
    fn psar_short_series_invalid() {
        let bars = rising_bars(1);
        let series = calculate_psar(&bars, 20, 200);
        assert!(!series.values[0].valid);
    }
}
