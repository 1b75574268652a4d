//! Strategy document model and compilation.
//!
//! Strategies arrive as JSON: a `strategy` array of rules, each naming a
//! ticker, an indicator, an optional period, a rule type (`entry` or
//! `exit`) and a condition string. Compilation validates the schema,
//! resolves indicator names through the registry and parses every
//! condition once up front.
//!
//! A condition that fails to parse does not fail compilation: the rule
//! is kept with its stored error so a single bad rule cannot take down a
//! run that also has valid rules. The `daysSinceEntry` pseudo-indicator
//! compiles to a holding-period exit handled directly by the engine.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::condition::Expr;
use crate::domain::condition_parser;
use crate::domain::error::{ParseError, StratsimError};
use crate::domain::indicator::IndicatorType;

pub const HOLDING_PERIOD_RULE: &str = "daysSinceEntry";

/// Wire format of a strategy document.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyDoc {
    pub strategy: Vec<RuleSpec>,
}

/// Wire format of one rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub ticker: String,
    pub indicator: String,
    #[serde(default)]
    pub period: Option<usize>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Entry,
    Exit,
}

/// Trigger of a compiled rule.
#[derive(Debug, Clone)]
pub enum RuleBody {
    /// Parsed condition, or the parse failure kept for per-bar reporting.
    Condition(Result<Expr, ParseError>),
    /// Exit after holding for this many bars.
    HoldingPeriod(usize),
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Declared order position, used in log messages.
    pub index: usize,
    pub kind: RuleKind,
    pub condition_text: String,
    pub body: RuleBody,
}

/// A validated, compiled strategy ready to run.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub ticker: String,
    pub rules: Vec<CompiledRule>,
    /// Declared indicators by schema name. Re-declaring a name overwrites
    /// the earlier declaration, so the last rule's parameters win.
    pub indicators: HashMap<String, IndicatorType>,
}

impl StrategyDoc {
    pub fn from_json(json: &str) -> Result<Self, StratsimError> {
        serde_json::from_str(json).map_err(|e| StratsimError::StrategySchema {
            reason: e.to_string(),
        })
    }
}

impl Strategy {
    /// Validate and compile a strategy document.
    pub fn compile(doc: &StrategyDoc) -> Result<Self, StratsimError> {
        if doc.strategy.is_empty() {
            return Err(StratsimError::StrategySchema {
                reason: "strategy has no rules".into(),
            });
        }

        let ticker = doc.strategy[0].ticker.clone();
        if ticker.is_empty() {
            return Err(StratsimError::StrategySchema {
                reason: "rule 0: ticker is empty".into(),
            });
        }

        let mut rules = Vec::with_capacity(doc.strategy.len());
        let mut indicators = HashMap::new();

        for (index, spec) in doc.strategy.iter().enumerate() {
            if spec.ticker != ticker {
                return Err(StratsimError::StrategySchema {
                    reason: format!(
                        "rule {}: ticker '{}' differs from '{}'; single-ticker strategies only",
                        index, spec.ticker, ticker
                    ),
                });
            }

            let kind = match spec.kind.as_str() {
                "entry" => RuleKind::Entry,
                "exit" => RuleKind::Exit,
                other => {
                    return Err(StratsimError::StrategySchema {
                        reason: format!(
                            "rule {}: type must be 'entry' or 'exit', found '{}'",
                            index, other
                        ),
                    });
                }
            };

            let body = if spec.indicator == HOLDING_PERIOD_RULE {
                if kind != RuleKind::Exit {
                    return Err(StratsimError::StrategySchema {
                        reason: format!("rule {}: {} is only valid on exit rules", index, HOLDING_PERIOD_RULE),
                    });
                }
                let period = spec.period.unwrap_or(0);
                if period == 0 {
                    return Err(StratsimError::StrategySchema {
                        reason: format!(
                            "rule {}: {} requires a positive period",
                            index, HOLDING_PERIOD_RULE
                        ),
                    });
                }
                RuleBody::HoldingPeriod(period)
            } else {
                let indicator_type = IndicatorType::from_name(&spec.indicator, spec.period)?;
                indicators.insert(spec.indicator.clone(), indicator_type);
                RuleBody::Condition(condition_parser::parse(&spec.condition))
            };

            rules.push(CompiledRule {
                index,
                kind,
                condition_text: spec.condition.clone(),
                body,
            });
        }

        Ok(Strategy {
            ticker,
            rules,
            indicators,
        })
    }

    /// Condition parse failures kept at compile time, with rule positions.
    pub fn broken_rules(&self) -> Vec<(usize, &ParseError)> {
        self.rules
            .iter()
            .filter_map(|rule| match &rule.body {
                RuleBody::Condition(Err(err)) => Some((rule.index, err)),
                _ => None,
            })
            .collect()
    }
}
