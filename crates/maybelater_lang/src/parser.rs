//! Source-text front end.
//!
//! Statements end with `;` or are a block header followed by a
//! brace-balanced body. Several statements may share a line. `#` starts a
//! comment running to the end of the line.

use crate::ast::Node;
use crate::expr::{EvalError, Evaluator, SandboxEvaluator};
use maybelater_core::{Bindings, CoreError, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static VAR_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(meh|maybe|paradox|yesterdaze)\s+([A-Za-z_]\w*)\s*=\s*(.+?)(?:\s+ago\s+(-?\d+)\s*s)?$",
    )
    .expect("valid regex")
});

static PRINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PRINT\s*\((.+)\)$").expect("valid regex"));

static DEADLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^deadline\s+in\s+(\d+)\s*(?:s|secs?|seconds?)?$").expect("valid regex")
});

static LOOP_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^eventually\s+([A-Za-z_]\w*)\s+from\s+(-?\d+)\s+to\s+(-?\d+)$")
        .expect("valid regex")
});

static SOMEDAY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^someday\s*\((.*)\)$").expect("valid regex"));

/// Front-end failure, lines are 1-based
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Statement matches no known form
    #[error("line {line}: unknown statement `{text}`")]
    UnknownStatement { line: usize, text: String },

    /// `{` without a matching `}`
    #[error("line {line}: block is never closed")]
    UnterminatedBlock { line: usize },

    /// `}` without a matching `{`
    #[error("line {line}: unexpected `}}`")]
    UnexpectedBrace { line: usize },

    /// Block header matches no known form
    #[error("line {line}: invalid block header `{header}`")]
    InvalidHeader { line: usize, header: String },

    /// Number out of range
    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { line: usize, text: String },

    /// Variable initialiser is not a constant expression
    #[error("line {line}: invalid literal `{text}`: {source}")]
    InvalidLiteral {
        line: usize,
        text: String,
        source: EvalError,
    },
}

impl ParseError {
    /// Line the error refers to
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnknownStatement { line, .. }
            | Self::UnterminatedBlock { line }
            | Self::UnexpectedBrace { line }
            | Self::InvalidHeader { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::InvalidLiteral { line, .. } => *line,
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        CoreError::ParseError {
            line: err.line(),
            message: err.to_string(),
        }
    }
}

/// Parse program text into AST nodes
///
/// # Errors
///
/// Returns `ParseError` naming the offending line
pub fn parse_program(source: &str) -> Result<Vec<Node>, ParseError> {
    let text = strip_comments(source);
    let mut parser = Parser { text: &text, pos: 0 };
    let nodes = parser.parse_statements(text.len())?;
    tracing::debug!(nodes = nodes.len(), "parsed program");
    Ok(nodes)
}

/// Blank out `#` comments, keeping byte offsets and newlines intact
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_comment = false;
    for c in source.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                out.push(c);
            } else {
                out.extend(std::iter::repeat_n(' ', c.len_utf8()));
            }
            continue;
        }
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None if c == '#' => {
                in_comment = true;
                out.push(' ');
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}

enum Head {
    /// Statement text ends at this `;`
    Simple(usize),
    /// Block header ends at this `{`
    Block(usize),
    /// Statement runs to the end of the region without a terminator
    Open,
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn line_at(&self, offset: usize) -> usize {
        self.text.as_bytes()[..offset.min(self.text.len())]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    fn skip_separators(&mut self, end: usize) {
        let bytes = self.text.as_bytes();
        while self.pos < end && (bytes[self.pos].is_ascii_whitespace() || bytes[self.pos] == b';') {
            self.pos += 1;
        }
    }

    fn parse_statements(&mut self, end: usize) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_separators(end);
            if self.pos >= end {
                return Ok(nodes);
            }
            let start = self.pos;
            let line = self.line_at(start);
            match self.scan_head(end)? {
                Head::Simple(semi) => {
                    let statement = self.text[start..semi].trim();
                    self.pos = semi + 1;
                    nodes.push(parse_simple(statement, line)?);
                }
                Head::Open => {
                    let statement = self.text[start..end].trim();
                    self.pos = end;
                    nodes.push(parse_simple(statement, line)?);
                }
                Head::Block(open) => {
                    let close = self.matching_brace(open, end)?;
                    let header = self.text[start..open].trim();
                    self.pos = open + 1;
                    let block = self.parse_statements(close)?;
                    self.pos = close + 1;
                    nodes.push(parse_block(header, block, line)?);
                }
            }
        }
    }

    /// Find the end of the statement starting at `self.pos`
    fn scan_head(&self, end: usize) -> Result<Head, ParseError> {
        let bytes = self.text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut escaped = false;
        let mut depth = 0usize;
        for i in self.pos..end {
            let b = bytes[i];
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    quote = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => return Ok(Head::Simple(i)),
                b'{' if depth == 0 => return Ok(Head::Block(i)),
                b'}' if depth == 0 => {
                    return Err(ParseError::UnexpectedBrace { line: self.line_at(i) });
                }
                _ => {}
            }
        }
        Ok(Head::Open)
    }

    fn matching_brace(&self, open: usize, end: usize) -> Result<usize, ParseError> {
        let bytes = self.text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut escaped = false;
        let mut depth = 0usize;
        for i in open..end {
            let b = bytes[i];
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    quote = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(ParseError::UnterminatedBlock { line: self.line_at(open) })
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, line: usize) -> Result<T, ParseError> {
    text.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        text: text.to_string(),
    })
}

fn parse_literal(text: &str, line: usize) -> Result<Value, ParseError> {
    SandboxEvaluator
        .evaluate(text, &Bindings::new())
        .map_err(|source| ParseError::InvalidLiteral {
            line,
            text: text.to_string(),
            source,
        })
}

fn parse_simple(statement: &str, line: usize) -> Result<Node, ParseError> {
    if let Some(caps) = VAR_DECL.captures(statement) {
        let name = caps[2].to_string();
        let value = parse_literal(caps[3].trim(), line)?;
        let ago = caps.get(4).map(|m| m.as_str());
        return match (&caps[1], ago) {
            ("meh", None) => Ok(Node::MehVar { name, value }),
            ("maybe", None) => Ok(Node::MaybeVar { name, value }),
            ("paradox", None) => Ok(Node::ParadoxVar { name, value }),
            ("yesterdaze", Some(ago)) => Ok(Node::YesterdazeVar {
                name,
                value,
                seconds_ago: parse_number(ago, line)?,
            }),
            _ => Err(ParseError::UnknownStatement {
                line,
                text: statement.to_string(),
            }),
        };
    }
    if let Some(caps) = PRINT.captures(statement) {
        return Ok(Node::PrintStmt {
            expr: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = DEADLINE.captures(statement) {
        return Ok(Node::Deadline {
            seconds: parse_number(&caps[1], line)?,
        });
    }
    Err(ParseError::UnknownStatement {
        line,
        text: statement.to_string(),
    })
}

fn parse_block(header: &str, block: Vec<Node>, line: usize) -> Result<Node, ParseError> {
    if header == "procrastinate" {
        return Ok(Node::ProcrastinateBlock { block });
    }
    if let Some(caps) = LOOP_HEADER.captures(header) {
        return Ok(Node::EventuallyLoop {
            var: caps[1].to_string(),
            start: parse_number(&caps[2], line)?,
            end: parse_number(&caps[3], line)?,
            block,
        });
    }
    if let Some(caps) = SOMEDAY_HEADER.captures(header) {
        return Ok(Node::SomedayCond {
            condition: caps[1].trim().to_string(),
            block,
        });
    }
    Err(ParseError::InvalidHeader {
        line,
        header: header.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(parse_program("").unwrap().is_empty());
        assert!(parse_program("  \n # only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_statements_share_a_line() {
        let nodes = parse_program("meh x = 5; PRINT(x);").unwrap();
        assert_eq!(nodes, vec![Node::meh("x", 5), Node::print("x")]);
    }

    #[test]
    fn test_variable_kinds() {
        let nodes = parse_program(
            "maybe m = 1;\nparadox p = 'soon';\nyesterdaze y = 2.5 ago 100s;\nyesterdaze f = 1 ago -10s;",
        )
        .unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::MaybeVar { name: "m".to_string(), value: Value::Int(1) },
                Node::ParadoxVar { name: "p".to_string(), value: Value::from("soon") },
                Node::YesterdazeVar { name: "y".to_string(), value: Value::Float(2.5), seconds_ago: 100 },
                Node::YesterdazeVar { name: "f".to_string(), value: Value::Int(1), seconds_ago: -10 },
            ]
        );
    }

    #[test]
    fn test_loop_block() {
        let nodes = parse_program("eventually i from 1 to 3 {\n  PRINT(i);\n}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::EventuallyLoop {
                var: "i".to_string(),
                start: 1,
                end: 3,
                block: vec![Node::print("i")],
            }]
        );
    }

    #[test]
    fn test_nested_blocks() {
        let src = r#"
            deadline in 8;
            eventually i from 1 to 4 {
                someday (i % 2 == 0) {
                    PRINT("even; {not a block}");
                }
            }
            procrastinate { PRINT("late"); }
        "#;
        let nodes = parse_program(src).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::Deadline { seconds: 8 });
        let Node::EventuallyLoop { block, .. } = &nodes[1] else {
            panic!("expected loop");
        };
        assert_eq!(
            block[0],
            Node::SomedayCond {
                condition: "i % 2 == 0".to_string(),
                block: vec![Node::print("\"even; {not a block}\"")],
            }
        );
        assert_eq!(
            nodes[2],
            Node::ProcrastinateBlock { block: vec![Node::print("\"late\"")] }
        );
    }

    #[test]
    fn test_comment_inside_string_kept() {
        let nodes = parse_program("PRINT(\"#1\"); # trailing").unwrap();
        assert_eq!(nodes, vec![Node::print("\"#1\"")]);
    }

    #[test]
    fn test_missing_final_semicolon() {
        let nodes = parse_program("PRINT(1)").unwrap();
        assert_eq!(nodes, vec![Node::print("1")]);
    }

    #[test]
    fn test_unknown_statement_reports_line() {
        let err = parse_program("meh x = 1;\nfrobnicate;").unwrap_err();
        assert_eq!(err, ParseError::UnknownStatement { line: 2, text: "frobnicate".to_string() });
    }

    #[test]
    fn test_yesterdaze_requires_offset() {
        assert!(matches!(
            parse_program("yesterdaze y = 1;"),
            Err(ParseError::UnknownStatement { line: 1, .. })
        ));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(
            parse_program("procrastinate {\n PRINT(1);").unwrap_err(),
            ParseError::UnterminatedBlock { line: 1 }
        );
        assert_eq!(parse_program("\n}").unwrap_err(), ParseError::UnexpectedBrace { line: 2 });
    }

    #[test]
    fn test_invalid_literal() {
        let err = parse_program("meh x = y + 1;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidLiteral { line: 1, .. }));
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_invalid_header() {
        assert!(matches!(
            parse_program("whenever { PRINT(1); }"),
            Err(ParseError::InvalidHeader { line: 1, .. })
        ));
    }
}
