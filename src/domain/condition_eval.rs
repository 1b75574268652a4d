//! Condition evaluation against one bar.
//!
//! Interprets a parsed [`Expr`] over the evaluation context. Undefined
//! values propagate as `None` and make the whole condition false: an
//! indicator still warming up, a bar offset reaching before the first
//! bar, division by zero, or `barsSinceEntry` while flat. Structural
//! problems such as an indicator name the strategy never declared or a
//! boolean used in arithmetic are reported as [`ConditionError`] so the
//! caller can log them.

use std::collections::HashMap;

use crate::domain::condition::{BinaryOp, Expr, PriceField, UnaryOp};
use crate::domain::error::ConditionError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;

pub struct EvalContext<'a> {
    pub bars: &'a [OhlcvBar],
    pub index: usize,
    pub indicators: &'a HashMap<String, IndicatorSeries>,
    /// Bars elapsed since entry; `None` while flat.
    pub bars_since_entry: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Num(f64),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
        }
    }

    fn as_num(&self) -> Result<f64, ConditionError> {
        match self {
            Value::Num(v) => Ok(*v),
            Value::Bool(_) => Err(ConditionError::TypeMismatch {
                expected: "number",
                found: "boolean",
            }),
        }
    }

    fn as_bool(&self) -> Result<bool, ConditionError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Num(_) => Err(ConditionError::TypeMismatch {
                expected: "boolean",
                found: "number",
            }),
        }
    }
}

/// Evaluate a condition at the context's bar. An undefined condition is
/// not a match.
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> Result<bool, ConditionError> {
    match eval(expr, ctx)? {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(value) => Err(ConditionError::TypeMismatch {
            expected: "boolean",
            found: value.type_name(),
        }),
    }
}

fn eval(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Option<Value>, ConditionError> {
    match expr {
        Expr::Number(v) => Ok(Some(Value::Num(*v))),

        Expr::Price { field, offset } => {
            let index = ctx.index as i64 + offset;
            if index < 0 {
                return Ok(None);
            }
            let bar = &ctx.bars[index as usize];
            let v = match field {
                PriceField::Open => bar.open,
                PriceField::High => bar.high,
                PriceField::Low => bar.low,
                PriceField::Close => bar.close,
                PriceField::Volume => bar.volume as f64,
            };
            Ok(Some(Value::Num(v)))
        }

        Expr::Indicator { name, component } => {
            let series = ctx
                .indicators
                .get(name)
                .ok_or_else(|| ConditionError::Unresolved { name: name.clone() })?;
            Ok(series.value_at(ctx.index, *component).map(Value::Num))
        }

        Expr::BarsSinceEntry => Ok(ctx.bars_since_entry.map(|n| Value::Num(n as f64))),

        Expr::Unary { op, operand } => {
            let Some(value) = eval(operand, ctx)? else {
                return Ok(None);
            };
            match op {
                UnaryOp::Neg => Ok(Some(Value::Num(-value.as_num()?))),
                UnaryOp::Not => Ok(Some(Value::Bool(!value.as_bool()?))),
            }
        }

        Expr::Binary { op, left, right } => {
            let lhs = eval(left, ctx)?;
            let rhs = eval(right, ctx)?;
            let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                return Ok(None);
            };
            let value = match op {
                BinaryOp::Add => Value::Num(lhs.as_num()? + rhs.as_num()?),
                BinaryOp::Sub => Value::Num(lhs.as_num()? - rhs.as_num()?),
                BinaryOp::Mul => Value::Num(lhs.as_num()? * rhs.as_num()?),
                BinaryOp::Div => {
                    let divisor = rhs.as_num()?;
                    let dividend = lhs.as_num()?;
                    if divisor == 0.0 {
                        return Ok(None);
                    }
                    Value::Num(dividend / divisor)
                }
                BinaryOp::Gt => Value::Bool(lhs.as_num()? > rhs.as_num()?),
                BinaryOp::Lt => Value::Bool(lhs.as_num()? < rhs.as_num()?),
                BinaryOp::Ge => Value::Bool(lhs.as_num()? >= rhs.as_num()?),
                BinaryOp::Le => Value::Bool(lhs.as_num()? <= rhs.as_num()?),
                BinaryOp::Eq => Value::Bool(lhs.as_num()? == rhs.as_num()?),
                BinaryOp::Ne => Value::Bool(lhs.as_num()? != rhs.as_num()?),
                BinaryOp::And => Value::Bool(lhs.as_bool()? && rhs.as_bool()?),
                BinaryOp::Or => Value::Bool(lhs.as_bool()? || rhs.as_bool()?),
            };
            Ok(Some(value))
        }
    }
}
