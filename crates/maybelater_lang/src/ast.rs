//! AST node kinds.
//!
//! A program is a flat sequence of nodes. Blocks nest further nodes.
//! The serialized form uses the `type` tag with snake_case kind names
//! (`meh_var`, `eventually_loop`, ...).

use maybelater_core::Value;
use serde::{Deserialize, Serialize};

/// One parsed statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// `deadline in N;`
    Deadline {
        /// Seconds from load time
        seconds: u64,
    },
    /// `procrastinate { ... }`
    ProcrastinateBlock {
        /// Deferred statements
        block: Vec<Node>,
    },
    /// `eventually VAR from A to B { ... }`, inclusive on both ends
    EventuallyLoop {
        /// Loop variable
        var: String,
        /// First value
        start: i64,
        /// Last value
        end: i64,
        /// Loop body
        block: Vec<Node>,
    },
    /// `someday (EXPR) { ... }`
    SomedayCond {
        /// Expression source text
        condition: String,
        /// Guarded statements
        block: Vec<Node>,
    },
    /// `meh NAME = VALUE;`
    MehVar {
        /// Variable name
        name: String,
        /// Literal value
        value: Value,
    },
    /// `maybe NAME = VALUE;`
    MaybeVar {
        /// Variable name
        name: String,
        /// Literal value
        value: Value,
    },
    /// `paradox NAME = VALUE;`
    ParadoxVar {
        /// Variable name
        name: String,
        /// Literal value
        value: Value,
    },
    /// `yesterdaze NAME = VALUE ago Ns;`
    YesterdazeVar {
        /// Variable name
        name: String,
        /// Literal value
        value: Value,
        /// Offset into the past, negative moves into the future
        seconds_ago: i64,
    },
    /// `PRINT(EXPR);`
    PrintStmt {
        /// Expression source text, possibly a quoted literal
        expr: String,
    },
}

impl Node {
    /// Kind name as used in the serialized form
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Deadline { .. } => "deadline",
            Self::ProcrastinateBlock { .. } => "procrastinate_block",
            Self::EventuallyLoop { .. } => "eventually_loop",
            Self::SomedayCond { .. } => "someday_cond",
            Self::MehVar { .. } => "meh_var",
            Self::MaybeVar { .. } => "maybe_var",
            Self::ParadoxVar { .. } => "paradox_var",
            Self::YesterdazeVar { .. } => "yesterdaze_var",
            Self::PrintStmt { .. } => "print_stmt",
        }
    }

    /// Shorthand for a `print_stmt`
    #[must_use]
    pub fn print(expr: impl Into<String>) -> Self {
        Self::PrintStmt { expr: expr.into() }
    }

    /// Shorthand for a `meh_var`
    #[must_use]
    pub fn meh(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::MehVar {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_kind_tag() {
        let node = Node::meh("x", 5);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "meh_var");
        assert_eq!(json["name"], "x");
        assert_eq!(json["value"], 5);
    }

    #[test]
    fn test_deserialize_loop() {
        let json = r#"{"type":"eventually_loop","var":"i","start":1,"end":3,
            "block":[{"type":"print_stmt","expr":"i"}]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind(), "eventually_loop");
        assert!(matches!(node, Node::EventuallyLoop { start: 1, end: 3, ref block, .. } if block.len() == 1));
    }
}
