//! Domain error types.
//!
//! Validation-class errors (`Data`, `StrategySchema`, `UnsupportedIndicator`)
//! fail a run before simulation starts. `ConditionEval` is recoverable: the
//! engine logs it and skips the offending rule for that bar. `Timeout` aborts
//! a run that exceeded its evaluation budget.

/// A parse error with position information for condition parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// A condition that could not be evaluated at a specific bar.
///
/// These never abort a run: the engine absorbs them per-bar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unresolved reference '{name}': not declared by any rule")]
    Unresolved { name: String },

    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Top-level error type for stratsim.
#[derive(Debug, thiserror::Error)]
pub enum StratsimError {
    #[error("bad bar data: {reason}")]
    Data { reason: String },

    #[error("invalid strategy: {reason}")]
    StrategySchema { reason: String },

    #[error("unsupported indicator '{name}'")]
    UnsupportedIndicator { name: String },

    #[error("condition evaluation failed: {0}")]
    ConditionEval(#[from] ConditionError),

    #[error("simulation exceeded its evaluation budget ({budget_ms} ms)")]
    Timeout { budget_ms: u64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratsimError> for std::process::ExitCode {
    fn from(err: &StratsimError) -> Self {
        let code: u8 = match err {
            StratsimError::Io(_) => 1,
            StratsimError::ConfigParse { .. }
            | StratsimError::ConfigMissing { .. }
            | StratsimError::ConfigInvalid { .. } => 2,
            StratsimError::StrategySchema { .. }
            | StratsimError::UnsupportedIndicator { .. }
            | StratsimError::ConditionEval(_) => 4,
            StratsimError::Data { .. } => 5,
            StratsimError::Timeout { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError {
            message: "expected number".into(),
            position: 6,
        };
        assert_eq!(err.to_string(), "parse error at position 6: expected number");
    }

    #[test]
    fn parse_error_caret_context() {
        let err = ParseError {
            message: "expected ')'".into(),
            position: 3,
        };
        let ctx = err.display_with_context("abc def");
        assert!(ctx.contains("   ^"));
        assert!(ctx.contains("position 3"));
    }

    #[test]
    fn condition_error_from_parse() {
        let err: ConditionError = ParseError {
            message: "x".into(),
            position: 0,
        }
        .into();
        assert!(matches!(err, ConditionError::Parse(_)));
    }

    #[test]
    fn exit_code_mapping() {
        use std::process::ExitCode;

        let data = StratsimError::Data { reason: "x".into() };
        let _: ExitCode = (&data).into();

        let schema = StratsimError::StrategySchema { reason: "x".into() };
        let _: ExitCode = (&schema).into();

        let timeout = StratsimError::Timeout { budget_ms: 100 };
        assert!(timeout.to_string().contains("100 ms"));
    }

    #[test]
    fn unsupported_indicator_display() {
        let err = StratsimError::UnsupportedIndicator {
            name: "Fibonacci".into(),
        };
        assert_eq!(err.to_string(), "unsupported indicator 'Fibonacci'");
    }
}
