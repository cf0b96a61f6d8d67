use super::http::required_str;
use super::traits::{Tool, ToolFailure, ToolFuture, ToolPolicy};
use crate::plan::ToolKind;
use serde_json::{json, Value};

/// Safe arithmetic evaluation: `+ - * / % ^` (or `**`), unary minus, and
/// parentheses over f64. A hand-written recursive-descent parser, no eval,
/// no variables, no function calls.
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CalculatorTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Calculate
    }

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Safely evaluate basic arithmetic expressions (+, -, *, /, %, ^)."
    }

    fn policy(&self) -> ToolPolicy {
        // Local and pure: nothing to retry or cache.
        ToolPolicy::default()
    }

    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async move {
            let expression = required_str(input, "expression")?;
            let value = evaluate(expression)
                .map_err(|reason| ToolFailure::fatal(format!("calculator failed: {reason}")))?;
            Ok(json!({"expression": expression, "value": value}))
        })
    }
}

pub fn evaluate(expression: &str) -> Result<f64, String> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err("unexpected trailing input".to_string());
    }
    if !value.is_finite() {
        return Err("expression does not evaluate to a finite number".to_string());
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                // `**` is power, same as `^`.
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number: {literal}"))?;
                tokens.push(Token::Num(number));
            }
            other => return Err(format!("unsupported character: {other}")),
        }
    }

    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value + rhs,
                _ => value - rhs,
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                Token::Slash => {
                    if rhs == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value / rhs
                }
                _ => {
                    if rhs == 0.0 {
                        return Err("modulo by zero".to_string());
                    }
                    value % rhs
                }
            };
        }
        Ok(value)
    }

    // Power binds tighter than unary minus on its left operand, so
    // `-2^2 == -(2^2)` and `2^-3` both parse the conventional way.
    fn unary(&mut self) -> Result<f64, String> {
        if self.peek() == Some(Token::Minus) {
            self.advance();
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Caret) {
            self.advance();
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                if self.advance() != Some(Token::RParen) {
                    return Err("missing closing parenthesis".to_string());
                }
                Ok(value)
            }
            Some(other) => Err(format!("unexpected token: {other:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
