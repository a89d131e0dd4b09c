use std::fmt;

//
// ─── OPERATORS ─────────────────────────────────────────────────────────────────
//

/// One of the four drill operators.
///
/// Only the typographic symbols are recognised; `*` and `/` are plain
/// characters and make the surrounding operand malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Every operator in table order.
    pub const ALL: [Operator; 4] = [Operator::Mul, Operator::Add, Operator::Sub, Operator::Div];

    #[must_use]
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '×' => Some(Self::Mul),
            '÷' => Some(Self::Div),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '×',
            Self::Div => '÷',
        }
    }

    /// Apply the operator. Division by zero has no value.
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Self::Add => Some(lhs + rhs),
            Self::Sub => Some(lhs - rhs),
            Self::Mul => Some(lhs * rhs),
            Self::Div => {
                if rhs == 0.0 {
                    None
                } else {
                    Some(lhs / rhs)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

//
// ─── TOKENS ────────────────────────────────────────────────────────────────────
//

/// An expression split on its operators, separators preserved.
///
/// `operands.len() == operators.len() + 1` always holds; operand tokens are kept
/// verbatim so malformed input can still be re-rendered or mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    operands: Vec<String>,
    operators: Vec<Operator>,
}

impl Tokens {
    #[must_use]
    pub fn split(expr: &str) -> Self {
        let mut operands = Vec::new();
        let mut operators = Vec::new();
        let mut current = String::new();

        for ch in expr.chars() {
            if let Some(op) = Operator::from_char(ch) {
                operands.push(std::mem::take(&mut current));
                operators.push(op);
            } else {
                current.push(ch);
            }
        }
        operands.push(current);

        Self {
            operands,
            operators,
        }
    }

    /// Re-interleave operands and operators into an expression string.
    #[must_use]
    pub fn join(&self) -> String {
        self.render("")
    }

    /// Same as [`Tokens::join`] with a single space around every operator.
    #[must_use]
    pub fn join_spaced(&self) -> String {
        self.render(" ")
    }

    fn render(&self, pad: &str) -> String {
        let mut out = String::new();
        for (idx, operand) in self.operands.iter().enumerate() {
            if idx > 0 {
                out.push_str(pad);
                out.push(self.operators[idx - 1].symbol());
                out.push_str(pad);
            }
            out.push_str(operand.trim());
        }
        out
    }

    /// Reverse operands and, independently, operators.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let mut operands = self.operands.clone();
        let mut operators = self.operators.clone();
        operands.reverse();
        operators.reverse();
        Self {
            operands,
            operators,
        }
    }
}

fn parse_operand(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || token == "." {
        return None;
    }
    let mut dots = 0;
    for ch in token.chars() {
        match ch {
            '0'..='9' => {}
            '.' => dots += 1,
            _ => return None,
        }
    }
    if dots > 1 {
        return None;
    }
    token.parse::<f64>().ok()
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// Result of evaluating an expression.
///
/// `Invalid` is the sentinel for both malformed input and division by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Value(f64),
    Invalid,
}

impl Evaluation {
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Evaluation::Invalid)
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Evaluation::Value(v) => Some(*v),
            Evaluation::Invalid => None,
        }
    }

    /// Canonical answer string compared verbatim against user input.
    #[must_use]
    pub fn answer_string(&self) -> String {
        match self {
            Evaluation::Value(v) => format_number(*v),
            Evaluation::Invalid => INVALID_SENTINEL.to_string(),
        }
    }
}

/// Literal form of the invalid sentinel.
pub const INVALID_SENTINEL: &str = "NaN";

/// Fold the expression strictly left to right, ignoring operator precedence.
///
/// ```
/// # use drill_core::eval::{evaluate, Evaluation};
/// assert_eq!(evaluate("2+3×4"), Evaluation::Value(20.0));
/// assert!(evaluate("4÷0+1").is_invalid());
/// ```
#[must_use]
pub fn evaluate(expr: &str) -> Evaluation {
    let tokens = Tokens::split(expr);
    let mut operands = Vec::with_capacity(tokens.operands.len());
    for token in &tokens.operands {
        match parse_operand(token) {
            Some(v) => operands.push(v),
            None => return Evaluation::Invalid,
        }
    }

    let mut acc = operands[0];
    for (op, rhs) in tokens.operators.iter().zip(operands.iter().skip(1)) {
        match op.apply(acc, *rhs) {
            Some(next) => acc = next,
            None => return Evaluation::Invalid,
        }
    }
    Evaluation::Value(acc)
}

/// Convenience wrapper returning the expected-answer string.
#[must_use]
pub fn expected_answer(expr: &str) -> String {
    evaluate(expr).answer_string()
}

/// Ordering weight: `|operand₀|` plus `|accumulator|` after each step.
///
/// Accumulation stops at the first division by zero. Malformed expressions
/// weigh `f64::INFINITY`.
#[must_use]
pub fn complexity(expr: &str) -> f64 {
    let tokens = Tokens::split(expr);
    let Some(first) = tokens.operands.first().and_then(|t| parse_operand(t)) else {
        return f64::INFINITY;
    };

    let mut acc = first;
    let mut total = first.abs();
    for (op, token) in tokens.operators.iter().zip(tokens.operands.iter().skip(1)) {
        let Some(rhs) = parse_operand(token) else {
            return f64::INFINITY;
        };
        match op.apply(acc, rhs) {
            Some(next) => {
                acc = next;
                total += acc.abs();
            }
            None => break,
        }
    }
    total
}

//
// ─── NUMBER FORMATTING ─────────────────────────────────────────────────────────
//

/// Shortest round-trip decimal form of `value`.
///
/// Integral values carry no fraction, `-0` prints as `0`, very large or very
/// small magnitudes switch to exponent form (`1e+21`, `1.5e-7`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return INVALID_SENTINEL.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }

    let exp = format!("{value:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}
