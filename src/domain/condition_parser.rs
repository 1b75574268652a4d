//! Condition grammar parser.
//!
//! Recursive descent parser for rule conditions. Converts text such as
//! `close[0] > SMA and RSI < 30` to an [`Expr`] tree with meaningful
//! error messages including character offset.
//!
//! Precedence, loosest first: `or`, `and`, `not`, comparison,
//! additive, multiplicative, unary minus. Comparisons do not chain.

use crate::domain::condition::{BinaryOp, Expr, PriceField, UnaryOp};
use crate::domain::error::ParseError;
use crate::domain::indicator::Component;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let mut parser = Parser {
            input: self.input,
            pos: self.pos,
        };
        parser.skip_whitespace();
        let remaining = parser.remaining();
        remaining.starts_with(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .map(|c| c.is_alphanumeric() || c == '_')
                .unwrap_or(false)
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.skip_whitespace();
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn consume_operator(&mut self, op: &str) -> bool {
        self.skip_whitespace();
        if self.remaining().starts_with(op) {
            self.pos += op.len();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    /// `[0]`, `[-1]`, ... after a price field. Forward offsets would read
    /// future bars and are rejected.
    fn parse_offset(&mut self) -> Result<i64, ParseError> {
        self.expect_char('[')?;
        self.skip_whitespace();
        let start = self.pos;

        let negative = self.peek() == Some('-');
        if negative {
            self.advance();
        }

        let mut digits = 0;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }
        if digits == 0 {
            return Err(ParseError {
                message: "expected bar offset".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        let offset = num_str.parse::<i64>().map_err(|_| ParseError {
            message: format!("invalid bar offset: {}", num_str),
            position: start,
        })?;
        if offset > 0 {
            return Err(ParseError {
                message: format!("bar offset must be zero or negative, found {}", offset),
                position: start,
            });
        }

        self.expect_char(']')?;
        Ok(offset)
    }

    fn parse_component(&mut self, indicator: &str) -> Result<Component, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let word = self.peek_word();
        let component = match word.as_str() {
            "line" => Component::Line,
            "signal" => Component::Signal,
            "histogram" => Component::Histogram,
            "k" => Component::K,
            "d" => Component::D,
            "upper" => Component::Upper,
            "middle" => Component::Middle,
            "lower" => Component::Lower,
            "plus" => Component::PlusDi,
            "minus" => Component::MinusDi,
            _ => {
                return Err(ParseError {
                    message: format!("unknown component '{}' on indicator '{}'", word, indicator),
                    position: start,
                });
            }
        };
        self.pos += word.len();
        Ok(component)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();

        match self.peek() {
            Some('(') => {
                self.advance();
                let expr = self.parse_or()?;
                self.expect_char(')')?;
                Ok(expr)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => Ok(Expr::Number(self.parse_number()?)),
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.parse_reference(),
            Some(ch) => Err(ParseError {
                message: format!("expected value, found '{}'", ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: "expected value, found end of input".to_string(),
                position: self.pos,
            }),
        }
    }

    fn parse_reference(&mut self) -> Result<Expr, ParseError> {
        let word = self.peek_word();

        let price_field = match word.as_str() {
            "open" => Some(PriceField::Open),
            "high" => Some(PriceField::High),
            "low" => Some(PriceField::Low),
            "close" => Some(PriceField::Close),
            "volume" => Some(PriceField::Volume),
            _ => None,
        };

        if let Some(field) = price_field {
            self.pos += word.len();
            self.skip_whitespace();
            let offset = if self.peek() == Some('[') {
                self.parse_offset()?
            } else {
                0
            };
            return Ok(Expr::Price { field, offset });
        }

        if word == "barsSinceEntry" || word == "daysSinceEntry" {
            self.pos += word.len();
            return Ok(Expr::BarsSinceEntry);
        }

        // Anything else is an indicator reference resolved against the
        // strategy's declared indicators at evaluation time.
        self.pos += word.len();
        let component = if self.consume_operator(".") {
            self.parse_component(&word)?
        } else {
            Component::Value
        };
        Ok(Expr::Indicator {
            name: word,
            component,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.consume_operator("*") {
                BinaryOp::Mul
            } else if self.consume_operator("/") {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.consume_operator("+") {
                BinaryOp::Add
            } else if self.consume_operator("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        // Multi-character operators must be tried before their prefixes.
        let op = if self.consume_operator(">=") {
            BinaryOp::Ge
        } else if self.consume_operator("<=") {
            BinaryOp::Le
        } else if self.consume_operator("==") {
            BinaryOp::Eq
        } else if self.consume_operator("!=") {
            BinaryOp::Ne
        } else if self.consume_operator(">") {
            BinaryOp::Gt
        } else if self.consume_operator("<") {
            BinaryOp::Lt
        } else {
            return Ok(left);
        };

        let right = self.parse_additive()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.consume_keyword("not") {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.consume_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.consume_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after condition: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(expr)
    }
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
