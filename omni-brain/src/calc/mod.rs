//! Restricted arithmetic evaluator
//!
//! **[BRN-CALC-010]** Natural-language prefixes are stripped, then the
//! expression is run through a closed nom grammar: numbers, arithmetic and
//! boolean operators, and a fixed function allowlist. Nothing outside the
//! grammar parses, so there is no path to general code execution.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{map, opt, recognize},
    multi::{fold_many0, many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use std::fmt;
use thiserror::Error;

/// Leading phrases the launcher lets users type in front of an expression.
const NATURAL_PREFIXES: [&str; 3] = ["calculate ", "what is ", "solve "];

/// Evaluation error, rendered as a message string at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("invalid expression near '{0}'")]
    Syntax(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("wrong number of arguments for '{0}'")]
    Arity(String),
    #[error("type mismatch: {0}")]
    Type(String),
}

/// A computed value. Comparisons and boolean operators yield `Bool`,
/// everything else yields `Number`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral results print without a trailing ".0"
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A successful evaluation: the expression as evaluated (prefixes already
/// stripped) and its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub expression: String,
    pub result: Value,
}

/// Strip known natural-language prefixes ("calculate ", "what is ",
/// "solve "), each at most once, case-insensitively.
pub fn strip_prefixes(input: &str) -> &str {
    let mut rest = input.trim();
    for prefix in NATURAL_PREFIXES {
        if rest.len() >= prefix.len() && rest[..prefix.len()].eq_ignore_ascii_case(prefix) {
            rest = rest[prefix.len()..].trim_start();
        }
    }
    rest
}

/// Evaluate a raw user query: prefix strip, parse, evaluate.
pub fn evaluate_query(input: &str) -> Result<Evaluation, CalcError> {
    let expression = strip_prefixes(input);
    if expression.is_empty() {
        return Err(CalcError::Empty);
    }
    let result = evaluate(expression)?;
    Ok(Evaluation {
        expression: expression.to_string(),
        result,
    })
}

/// Evaluate an already-stripped expression.
pub fn evaluate(expression: &str) -> Result<Value, CalcError> {
    let expr = parse(expression)?;
    eval(&expr)
}

/// Render a query for the deep-answer context block: the result pair on
/// success, the error message otherwise.
pub fn context_block(input: &str) -> String {
    let expression = strip_prefixes(input);
    match evaluate_query(input) {
        Ok(ev) => format!("Expression: {}\nResult: {}", ev.expression, ev.result),
        Err(e) => format!("Error calculating '{}': {}", expression, e),
    }
}

// ========================================
// Grammar
// ========================================

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

fn parse(input: &str) -> Result<Expr, CalcError> {
    let (rest, expr) = or_expr(input).map_err(|_| CalcError::Syntax(snippet(input)))?;
    if !rest.trim().is_empty() {
        return Err(CalcError::Syntax(snippet(rest)));
    }
    Ok(expr)
}

fn snippet(s: &str) -> String {
    s.trim().chars().take(16).collect()
}

// expression = and_expr { "||" and_expr }
fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = and_expr(input)?;
    fold_many0(
        preceded(preceded(multispace0, tag("||")), and_expr),
        move || first.clone(),
        |acc, rhs| Expr::Binary(BinOp::Or, Box::new(acc), Box::new(rhs)),
    )
    .parse(input)
}

// and_expr = comparison { "&&" comparison }
fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = comparison(input)?;
    fold_many0(
        preceded(preceded(multispace0, tag("&&")), comparison),
        move || first.clone(),
        |acc, rhs| Expr::Binary(BinOp::And, Box::new(acc), Box::new(rhs)),
    )
    .parse(input)
}

// comparison = sum [ cmp_op sum ], non-associative (no chaining)
fn comparison(input: &str) -> IResult<&str, Expr> {
    let (input, lhs) = sum(input)?;
    let (input, rest) = opt(pair(
        preceded(
            multispace0,
            alt((
                tag("=="),
                tag("!="),
                tag("<="),
                tag(">="),
                tag("<"),
                tag(">"),
            )),
        ),
        sum,
    ))
    .parse(input)?;

    Ok((
        input,
        match rest {
            Some((op, rhs)) => {
                let op = match op {
                    "==" => BinOp::Eq,
                    "!=" => BinOp::Ne,
                    "<=" => BinOp::Le,
                    ">=" => BinOp::Ge,
                    "<" => BinOp::Lt,
                    _ => BinOp::Gt,
                };
                Expr::Binary(op, Box::new(lhs), Box::new(rhs))
            }
            None => lhs,
        },
    ))
}

// sum = product { ("+" | "-") product }
fn sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = product(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("+-")), product),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            Expr::Binary(op, Box::new(acc), Box::new(rhs))
        },
    )
    .parse(input)
}

// product = power { ("*" | "/" | "%") power }
fn product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = power(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("*/%")), power),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = match op {
                '*' => BinOp::Mul,
                '/' => BinOp::Div,
                _ => BinOp::Rem,
            };
            Expr::Binary(op, Box::new(acc), Box::new(rhs))
        },
    )
    .parse(input)
}

// power = unary [ "^" power ], right-associative
fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = unary(input)?;
    let (input, exponent) = opt(preceded(preceded(multispace0, char('^')), power)).parse(input)?;
    Ok((
        input,
        match exponent {
            Some(e) => Expr::Binary(BinOp::Pow, Box::new(base), Box::new(e)),
            None => base,
        },
    ))
}

// unary = "-" unary | atom
fn unary(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            map(preceded(char('-'), unary), |e| Expr::Neg(Box::new(e))),
            atom,
        )),
    )
    .parse(input)
}

// atom = call | number | "(" expression ")"
fn atom(input: &str) -> IResult<&str, Expr> {
    alt((
        call,
        map(double, Expr::Num),
        delimited(
            char('('),
            or_expr,
            preceded(multispace0, char(')')),
        ),
    ))
    .parse(input)
}

// call = identifier "(" [ expression { "," expression } ] ")"
//
// Any identifier parses here; the allowlist check happens at evaluation so
// an unknown name reports UnknownFunction instead of a bare syntax error.
fn call(input: &str) -> IResult<&str, Expr> {
    let (input, name) = identifier(input)?;
    let (input, args) = delimited(
        preceded(multispace0, char('(')),
        separated_list0(preceded(multispace0, char(',')), or_expr),
        preceded(multispace0, char(')')),
    )
    .parse(input)?;
    Ok((input, Expr::Call(name.to_string(), args)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_")))))).parse(input)
}

// ========================================
// Evaluation
// ========================================

fn eval(expr: &Expr) -> Result<Value, CalcError> {
    match expr {
        Expr::Num(n) => Ok(Value::Number(*n)),
        Expr::Neg(inner) => match eval(inner)? {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Bool(_) => Err(CalcError::Type("cannot negate a boolean".to_string())),
        },
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, eval(lhs)?, eval(rhs)?),
        Expr::Call(name, args) => eval_call(name, args),
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, CalcError> {
    use BinOp::*;
    match (op, lhs, rhs) {
        (Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        // Division by zero follows IEEE f64 (inf / NaN), matching double math
        (Div, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (Rem, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a % b)),
        (Pow, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.powf(b))),
        (Eq, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a == b)),
        (Ne, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a != b)),
        (Eq, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a == b)),
        (Ne, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a != b)),
        (Lt, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
        (Le, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
        (Gt, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
        (Ge, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
        (And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        (Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        (op, _, _) => Err(CalcError::Type(format!(
            "operator {:?} not defined for these operands",
            op
        ))),
    }
}

fn eval_call(name: &str, args: &[Expr]) -> Result<Value, CalcError> {
    let values: Vec<f64> = args
        .iter()
        .map(|a| match eval(a)? {
            Value::Number(n) => Ok(n),
            Value::Bool(_) => Err(CalcError::Type(format!(
                "function '{}' takes numeric arguments",
                name
            ))),
        })
        .collect::<Result<_, _>>()?;

    let one_arg = |f: fn(f64) -> f64| -> Result<Value, CalcError> {
        match values.as_slice() {
            [x] => Ok(Value::Number(f(*x))),
            _ => Err(CalcError::Arity(name.to_string())),
        }
    };

    match name {
        "sqrt" => one_arg(f64::sqrt),
        "abs" => one_arg(f64::abs),
        "floor" => one_arg(f64::floor),
        "ceil" => one_arg(f64::ceil),
        "round" => one_arg(f64::round),
        "min" => fold_args(name, &values, f64::min),
        "max" => fold_args(name, &values, f64::max),
        _ => Err(CalcError::UnknownFunction(name.to_string())),
    }
}

fn fold_args(name: &str, values: &[f64], f: fn(f64, f64) -> f64) -> Result<Value, CalcError> {
    let (first, rest) = values
        .split_first()
        .ok_or_else(|| CalcError::Arity(name.to_string()))?;
    Ok(Value::Number(rest.iter().fold(*first, |acc, x| f(acc, *x))))
}
