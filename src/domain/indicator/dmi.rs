//! Directional Movement Index: +DI and -DI lines.
//!
//! Directional movement per bar is the larger of the up move
//! (high - prev high) and down move (prev low - low), kept only when
//! positive and dominant. True range, +DM and -DM are Wilder-smoothed
//! over the period, then DI = 100 * smoothed DM / smoothed TR. Valid
//! from index `period`.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Wilder-smoothed +DI/-DI lines, aligned to `bars`. Entries before
/// index `period` are zero and not meaningful.
pub(crate) fn directional_indices(bars: &[OhlcvBar], period: usize) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_di = vec![0.0; n];
    let mut minus_di = vec![0.0; n];
    if period == 0 || n <= period {
        return (plus_di, minus_di);
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        tr[i] = bars[i].true_range(bars[i - 1].close);
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    // Wilder running sums seeded with the first `period` raw values.
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    for i in period..n {
        if i > period {
            s_tr = s_tr - s_tr / period as f64 + tr[i];
            s_plus = s_plus - s_plus / period as f64 + plus_dm[i];
            s_minus = s_minus - s_minus / period as f64 + minus_dm[i];
        }
        if s_tr > 0.0 {
            plus_di[i] = 100.0 * s_plus / s_tr;
            minus_di[i] = 100.0 * s_minus / s_tr;
        }
    }

    (plus_di, minus_di)
}

pub fn calculate_dmi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Dmi(period);

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let (plus_di, minus_di) = directional_indices(bars, period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= period,
            value: IndicatorValue::Dmi {
                plus_di: plus_di[i],
                minus_di: minus_di[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
