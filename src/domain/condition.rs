//! Condition expression AST.
//!
//! Rule conditions are parsed once at strategy compile time into this
//! tree and interpreted per bar. The grammar deliberately admits only
//! price fields with backward offsets, indicator references, the
//! bars-since-entry counter, numeric literals, arithmetic, comparisons
//! and boolean connectives. There is no function call syntax and no way
//! to reach anything outside the evaluation context.

use std::fmt;

use crate::domain::indicator::Component;

/// OHLCV field referenced by a condition, e.g. `close[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Price field with a non-positive bar offset: 0 is the current bar,
    /// -1 the previous one.
    Price {
        field: PriceField,
        offset: i64,
    },
    /// Reference to a strategy indicator by its declared name, with an
    /// optional component suffix such as `MACD.signal`.
    Indicator {
        name: String,
        component: Component,
    },
    /// Bars elapsed since the position was opened; undefined while flat.
    BarsSinceEntry,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}
