//! Moving Average Convergence Divergence.
//!
//! Line = EMA(fast) - EMA(slow); Signal = EMA(signal) of the line (seeded
//! with the SMA of its first `signal` defined values); Histogram = line -
//! signal. Warmup: slow - 1 + signal - 1 bars.

use crate::domain::indicator::ema::ema_over;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_over(&closes, fast);
    let ema_slow = ema_over(&closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    // Signal line is an EMA over the line's defined region only.
    let line_warmup = slow.max(fast) - 1;
    let mut signal = vec![0.0; bars.len()];
    if bars.len() > line_warmup {
        let tail = ema_over(&line[line_warmup..], signal_period);
        signal[line_warmup..].copy_from_slice(&tail);
    }

    let warmup = line_warmup + signal_period - 1;
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= warmup,
            value: IndicatorValue::Macd {
                line: line[i],
                signal: signal[i],
                histogram: line[i] - signal[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
