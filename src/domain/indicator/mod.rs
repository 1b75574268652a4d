//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: one point in an indicator time series
//! - `IndicatorValue`: the output shapes (single value, MACD triple, ...)
//! - `IndicatorType`: indicator identity + parameters (serves as map key)
//! - `IndicatorSeries`: a series of points aligned index-for-index with bars
//!
//! Indicator names are resolved through [`REGISTRY`], a table mapping each
//! supported name to a constructor taking an optional period. Adding an
//! indicator means adding a table row, a variant, and a compute arm; the
//! engine control flow never changes.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod stochastic;
pub mod adx;
pub mod dmi;
pub mod bollinger;
pub mod momentum;
pub mod cci;
pub mod atr;
pub mod obv;
pub mod williams_r;
pub mod psar;
pub mod trix;
pub mod roc;
pub mod mfi;
pub mod cmf;
pub mod volatility;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::StratsimError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Dmi {
        plus_di: f64,
        minus_di: f64,
    },
}

/// Which component of a (possibly multi-valued) indicator a condition refers
/// to. `Value` selects the primary line: MACD line, %K, Bollinger middle,
/// +DI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Value,
    Line,
    Signal,
    Histogram,
    K,
    D,
    Upper,
    Middle,
    Lower,
    PlusDi,
    MinusDi,
}

impl IndicatorValue {
    /// Extract one component; `None` when the component does not exist for
    /// this value shape.
    pub fn component(&self, component: Component) -> Option<f64> {
        match (self, component) {
            (IndicatorValue::Simple(v), Component::Value) => Some(*v),
            (IndicatorValue::Macd { line, .. }, Component::Value | Component::Line) => Some(*line),
            (IndicatorValue::Macd { signal, .. }, Component::Signal) => Some(*signal),
            (IndicatorValue::Macd { histogram, .. }, Component::Histogram) => Some(*histogram),
            (IndicatorValue::Stochastic { k, .. }, Component::Value | Component::K) => Some(*k),
            (IndicatorValue::Stochastic { d, .. }, Component::D) => Some(*d),
            (IndicatorValue::Bollinger { middle, .. }, Component::Value | Component::Middle) => {
                Some(*middle)
            }
            (IndicatorValue::Bollinger { upper, .. }, Component::Upper) => Some(*upper),
            (IndicatorValue::Bollinger { lower, .. }, Component::Lower) => Some(*lower),
            (IndicatorValue::Dmi { plus_di, .. }, Component::Value | Component::PlusDi) => {
                Some(*plus_di)
            }
            (IndicatorValue::Dmi { minus_di, .. }, Component::MinusDi) => Some(*minus_di),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Adx(usize),
    Bollinger {
        period: usize,
        mult_x100: u32,
    },
    Momentum(usize),
    Cci(usize),
    Atr(usize),
    Obv,
    WilliamsR(usize),
    Psar {
        step_x1000: u32,
        max_x1000: u32,
    },
    Dmi(usize),
    Trix(usize),
    Roc(usize),
    Mfi(usize),
    Cmf(usize),
    Volatility(usize),
}

/// Registration table: wire-schema indicator name → constructor.
///
/// Names match the strategy schema exactly. The constructor applies the
/// conventional default when `period` is absent.
pub const REGISTRY: &[(&str, fn(Option<usize>) -> IndicatorType)] = &[
    ("SMA", |p| IndicatorType::Sma(p.unwrap_or(30))),
    ("EMA", |p| IndicatorType::Ema(p.unwrap_or(30))),
    ("RSI", |p| IndicatorType::Rsi(p.unwrap_or(14))),
    ("MACD", |_| IndicatorType::Macd {
        fast: 12,
        slow: 26,
        signal: 9,
    }),
    ("Stochastic", |p| IndicatorType::Stochastic {
        k_period: p.unwrap_or(14),
        d_period: 3,
    }),
    ("ADX", |p| IndicatorType::Adx(p.unwrap_or(14))),
    ("BollingerBands", |p| IndicatorType::Bollinger {
        period: p.unwrap_or(20),
        mult_x100: 200,
    }),
    ("Momentum", |p| IndicatorType::Momentum(p.unwrap_or(12))),
    ("CCI", |p| IndicatorType::Cci(p.unwrap_or(20))),
    ("ATR", |p| IndicatorType::Atr(p.unwrap_or(14))),
    ("OBV", |_| IndicatorType::Obv),
    ("WilliamsR", |p| IndicatorType::WilliamsR(p.unwrap_or(14))),
    ("ParabolicSAR", |_| IndicatorType::Psar {
        step_x1000: 20,
        max_x1000: 200,
    }),
    ("DMI", |p| IndicatorType::Dmi(p.unwrap_or(14))),
    ("TRIX", |p| IndicatorType::Trix(p.unwrap_or(15))),
    ("ROC", |p| IndicatorType::Roc(p.unwrap_or(12))),
    ("MFI", |p| IndicatorType::Mfi(p.unwrap_or(14))),
    ("ChaikinMoneyFlow", |p| IndicatorType::Cmf(p.unwrap_or(20))),
    ("Volatility", |p| IndicatorType::Volatility(p.unwrap_or(20))),
];

impl IndicatorType {
    /// Resolve a wire-schema indicator name. Unknown names are rejected here,
    /// at strategy validation time, never during simulation.
    pub fn from_name(name: &str, period: Option<usize>) -> Result<Self, StratsimError> {
        REGISTRY
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, make)| make(period))
            .ok_or_else(|| StratsimError::UnsupportedIndicator { name: name.into() })
    }

    /// Compute the full series for this indicator, aligned to `bars`.
    /// Deterministic and side-effect free.
    pub fn compute(&self, bars: &[OhlcvBar]) -> IndicatorSeries {
        match *self {
            IndicatorType::Sma(period) => sma::calculate_sma(bars, period),
            IndicatorType::Ema(period) => ema::calculate_ema(bars, period),
            IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
            IndicatorType::Macd { fast, slow, signal } => {
                macd::calculate_macd(bars, fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                stochastic::calculate_stochastic(bars, k_period, d_period)
            }
            IndicatorType::Adx(period) => adx::calculate_adx(bars, period),
            IndicatorType::Bollinger { period, mult_x100 } => {
                bollinger::calculate_bollinger(bars, period, mult_x100)
            }
            IndicatorType::Momentum(period) => momentum::calculate_momentum(bars, period),
            IndicatorType::Cci(period) => cci::calculate_cci(bars, period),
            IndicatorType::Atr(period) => atr::calculate_atr(bars, period),
            IndicatorType::Obv => obv::calculate_obv(bars),
            IndicatorType::WilliamsR(period) => williams_r::calculate_williams_r(bars, period),
            IndicatorType::Psar {
                step_x1000,
                max_x1000,
            } => psar::calculate_psar(bars, step_x1000, max_x1000),
            IndicatorType::Dmi(period) => dmi::calculate_dmi(bars, period),
            IndicatorType::Trix(period) => trix::calculate_trix(bars, period),
            IndicatorType::Roc(period) => roc::calculate_roc(bars, period),
            IndicatorType::Mfi(period) => mfi::calculate_mfi(bars, period),
            IndicatorType::Cmf(period) => cmf::calculate_cmf(bars, period),
            IndicatorType::Volatility(period) => volatility::calculate_volatility(bars, period),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value of one component at a bar index; `None` during warm-up, past the
    /// end, or for a component the indicator does not produce.
    pub fn value_at(&self, index: usize, component: Component) -> Option<f64> {
        let point = self.values.get(index)?;
        if !point.valid {
            return None;
        }
        point.value.component(component)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "Stochastic({},{})", k_period, d_period)
            }
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Bollinger { period, mult_x100 } => {
                write!(f, "BollingerBands({},{})", period, *mult_x100 as f64 / 100.0)
            }
            IndicatorType::Momentum(period) => write!(f, "Momentum({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::WilliamsR(period) => write!(f, "WilliamsR({})", period),
            IndicatorType::Psar {
                step_x1000,
                max_x1000,
            } => write!(
                f,
                "ParabolicSAR({},{})",
                *step_x1000 as f64 / 1000.0,
                *max_x1000 as f64 / 1000.0
            ),
            IndicatorType::Dmi(period) => write!(f, "DMI({})", period),
            IndicatorType::Trix(period) => write!(f, "TRIX({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Mfi(period) => write!(f, "MFI({})", period),
            IndicatorType::Cmf(period) => write!(f, "ChaikinMoneyFlow({})", period),
            IndicatorType::Volatility(period) => write!(f, "Volatility({})", period),
        }
    }
}
