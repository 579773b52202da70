//! Sandboxed expression evaluation.
//!
//! Expressions are restricted to literals, bound names, arithmetic,
//! comparisons and boolean connectives. Names resolve only against the
//! binding set handed in by the caller; there are no calls, attribute
//! lookups or indexing, so evaluation cannot reach anything outside it.

use logos::Logos;
use maybelater_core::{Bindings, Value};
use std::cmp::Ordering;

/// Expression evaluation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// Input contains a character sequence that is not a token
    #[error("Unexpected input at offset {offset}")]
    Lex { offset: usize },

    /// Tokens do not form an expression
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Name not present in the bindings
    #[error("Unbound name: {0}")]
    Unbound(String),

    /// Operator applied to unsupported operand types
    #[error("Unsupported operand types for {op}: {left} and {right}")]
    Type {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer overflow
    #[error("Integer overflow")]
    Overflow,
}

/// Pluggable expression evaluator
pub trait Evaluator {
    /// Evaluate `expr` against `bindings`
    ///
    /// # Errors
    ///
    /// Returns `EvalError` for malformed expressions, unbound names and
    /// operations on unsupported values.
    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Value, EvalError>;
}

/// Default evaluator over the restricted expression language
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxEvaluator;

impl SandboxEvaluator {
    /// Create a new evaluator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Evaluator for SandboxEvaluator {
    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        Expr::parse(expr)?.eval(bindings)
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[token("and")]
    #[token("&&")]
    And,
    #[token("or")]
    #[token("||")]
    Or,
    #[token("not")]
    #[token("!")]
    Not,
    #[token("true")]
    #[token("True")]
    True,
    #[token("false")]
    #[token("False")]
    False,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Boolean negation
    Not,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, always yields a float
    Div,
    /// `//`, floors
    FloorDiv,
    /// `%`, sign follows the divisor
    Mod,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// Bound name
    Var(String),
    /// Unary operation
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Short-circuit `and`, yields the deciding operand
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit `or`, yields the deciding operand
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse expression text
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Lex` or `EvalError::Syntax` for malformed input
    pub fn parse(source: &str) -> Result<Self, EvalError> {
        let mut tokens = Vec::new();
        for (token, span) in Token::lexer(source).spanned() {
            match token {
                Ok(token) => tokens.push(token),
                Err(()) => return Err(EvalError::Lex { offset: span.start }),
            }
        }
        let mut parser = ExprParser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        if let Some(extra) = parser.peek() {
            return Err(EvalError::Syntax(format!("unexpected trailing token {:?}", extra)));
        }
        Ok(expr)
    }

    /// Evaluate against a binding set
    ///
    /// # Errors
    ///
    /// Returns `EvalError` for unbound names and invalid operations
    pub fn eval(&self, bindings: &Bindings) -> Result<Value, EvalError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Var(name) => bindings
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::Unbound(name.clone())),
            Self::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!inner.eval(bindings)?.is_truthy())),
            Self::Unary(UnaryOp::Neg, inner) => match inner.eval(bindings)? {
                Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
                Value::Float(f) => Ok(Value::Float(-f)),
                Value::Str(_) => Err(EvalError::Type {
                    op: "unary -",
                    left: "str",
                    right: "str",
                }),
            },
            Self::And(left, right) => {
                let l = left.eval(bindings)?;
                if l.is_truthy() { right.eval(bindings) } else { Ok(l) }
            }
            Self::Or(left, right) => {
                let l = left.eval(bindings)?;
                if l.is_truthy() { Ok(l) } else { right.eval(bindings) }
            }
            Self::Binary(op, left, right) => {
                let l = left.eval(bindings)?;
                let r = right.eval(bindings)?;
                apply_binary(*op, &l, &r)
            }
        }
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_not()?;
        while self.eat(&Token::And) {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::SlashSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("expected ')'".to_string()));
                }
                Ok(inner)
            }
            Some(other) => Err(EvalError::Syntax(format!("unexpected token {:?}", other))),
            None => Err(EvalError::Syntax("unexpected end of expression".to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Int(i64::from(*b))),
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(f) => Some(Self::Float(*f)),
            Value::Str(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

fn type_error(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::Type {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::Ne => return Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(left, right).ok_or_else(|| type_error(op, left, right))?;
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    if let (BinaryOp::Add, Value::Str(a), Value::Str(b)) = (op, left, right) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    let (Some(l), Some(r)) = (Num::of(left), Num::of(right)) else {
        return Err(type_error(op, left, right));
    };

    match (op, l, r) {
        (BinaryOp::Div, _, _) => {
            let divisor = r.as_f64();
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Float(l.as_f64() / divisor))
        }
        (BinaryOp::Add, Num::Int(a), Num::Int(b)) => {
            a.checked_add(b).map(Value::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Sub, Num::Int(a), Num::Int(b)) => {
            a.checked_sub(b).map(Value::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::Mul, Num::Int(a), Num::Int(b)) => {
            a.checked_mul(b).map(Value::Int).ok_or(EvalError::Overflow)
        }
        (BinaryOp::FloorDiv, Num::Int(a), Num::Int(b)) => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
            let floored = if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q };
            Ok(Value::Int(floored))
        }
        (BinaryOp::Mod, Num::Int(a), Num::Int(b)) => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let rem = a.checked_rem(b).ok_or(EvalError::Overflow)?;
            let adjusted = if rem != 0 && ((rem < 0) != (b < 0)) { rem + b } else { rem };
            Ok(Value::Int(adjusted))
        }
        _ => {
            let (a, b) = (l.as_f64(), r.as_f64());
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
                    return Err(EvalError::DivisionByZero);
                }
                BinaryOp::FloorDiv => (a / b).floor(),
                BinaryOp::Mod => a - b * (a / b).floor(),
                _ => return Err(type_error(op, left, right)),
            };
            Ok(Value::Float(result))
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (Num::of(left)?, Num::of(right)?) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        },
    }
}
