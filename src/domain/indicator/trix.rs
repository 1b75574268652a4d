//! TRIX: one-bar percent rate of change of a triple-smoothed EMA.
//!
//! Closes are EMA-smoothed three times with the same period, then
//! TRIX[i] = 100 * (t3[i] / t3[i-1] - 1). Each EMA pass needs
//! period - 1 bars to seed, and the rate of change needs one more:
//! warmup = 3 * (period - 1) + 1 bars.

use crate::domain::indicator::ema::ema_over;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_trix(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Trix(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_warmup = period - 1;

    // Each pass is seeded from where the previous one becomes defined.
    let e1 = ema_over(&closes, period);
    let e2_tail = if e1.len() > ema_warmup {
        ema_over(&e1[ema_warmup..], period)
    } else {
        Vec::new()
    };
    let e3_tail = if e2_tail.len() > ema_warmup {
        ema_over(&e2_tail[ema_warmup..], period)
    } else {
        Vec::new()
    };

    // Align the third pass back to bar indices.
    let mut t3 = vec![0.0; bars.len()];
    for (j, &v) in e3_tail.iter().enumerate() {
        t3[2 * ema_warmup + j] = v;
    }

    let warmup = 3 * ema_warmup + 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= warmup;
            let trix = if valid && t3[i - 1] != 0.0 {
                100.0 * (t3[i] / t3[i - 1] - 1.0)
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value: IndicatorValue::Simple(trix),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
