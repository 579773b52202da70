//! Scheduled events.
//!
//! Every dispatchable statement becomes an [`Event`]. Loops expand into
//! one [`Event::LoopIteration`] per value of the range; deadline and
//! procrastinate nodes never become events.

use maybelater_core::Value;
use maybelater_lang::Node;
use std::sync::Arc;

/// One unit of work on the event queue
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Deterministic write
    SetVar {
        /// Variable name
        name: String,
        /// Value to store
        value: Value,
    },
    /// Probabilistic write, which may itself not happen
    SetMaybeVar {
        /// Variable name
        name: String,
        /// Value to store
        value: Value,
    },
    /// Paradox write, resolving one to three seconds later
    SetParadoxVar {
        /// Variable name
        name: String,
        /// Value to store
        value: Value,
    },
    /// Retroactive write
    SetTemporalVar {
        /// Variable name
        name: String,
        /// Value to store
        value: Value,
        /// Offset into the past
        seconds_ago: i64,
    },
    /// A single loop iteration with its bound value
    LoopIteration {
        /// Loop variable
        var: String,
        /// Value bound for this iteration
        value: i64,
        /// Body, shared between iterations
        block: Arc<[Node]>,
    },
    /// Conditional that enqueues its block when it fires
    Conditional {
        /// Expression source text
        condition: String,
        /// Guarded statements
        block: Arc<[Node]>,
    },
    /// Output of a literal or an expression
    PrintStatement {
        /// Expression source text
        expr: String,
    },
}

impl Event {
    /// Short kind name for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetVar { .. } => "set_var",
            Self::SetMaybeVar { .. } => "set_maybe_var",
            Self::SetParadoxVar { .. } => "set_paradox_var",
            Self::SetTemporalVar { .. } => "set_temporal_var",
            Self::LoopIteration { .. } => "loop_iteration",
            Self::Conditional { .. } => "conditional",
            Self::PrintStatement { .. } => "print_statement",
        }
    }

    /// Events produced by one node
    ///
    /// Loops produce one event per iteration, in ascending order. Deadline
    /// and procrastinate nodes produce nothing.
    #[must_use]
    pub fn expand(node: &Node) -> Vec<Event> {
        match node {
            Node::Deadline { .. } | Node::ProcrastinateBlock { .. } => Vec::new(),
            Node::EventuallyLoop {
                var,
                start,
                end,
                block,
            } => Self::loop_iterations(var, *start, *end, block),
            Node::SomedayCond { condition, block } => vec![Event::Conditional {
                condition: condition.clone(),
                block: Arc::from(block.as_slice()),
            }],
            Node::MehVar { name, value } => vec![Event::SetVar {
                name: name.clone(),
                value: value.clone(),
            }],
            Node::MaybeVar { name, value } => vec![Event::SetMaybeVar {
                name: name.clone(),
                value: value.clone(),
            }],
            Node::ParadoxVar { name, value } => vec![Event::SetParadoxVar {
                name: name.clone(),
                value: value.clone(),
            }],
            Node::YesterdazeVar {
                name,
                value,
                seconds_ago,
            } => vec![Event::SetTemporalVar {
                name: name.clone(),
                value: value.clone(),
                seconds_ago: *seconds_ago,
            }],
            Node::PrintStmt { expr } => vec![Event::PrintStatement { expr: expr.clone() }],
        }
    }

    /// One iteration event for each value in `start..=end`
    ///
    /// Empty when `end < start`.
    #[must_use]
    pub fn loop_iterations(var: &str, start: i64, end: i64, block: &[Node]) -> Vec<Event> {
        if end < start {
            return Vec::new();
        }
        let block: Arc<[Node]> = Arc::from(block);
        (start..=end)
            .map(|value| Event::LoopIteration {
                var: var.to_string(),
                value,
                block: Arc::clone(&block),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_expands_inclusive() {
        let node = Node::EventuallyLoop {
            var: "i".to_string(),
            start: 1,
            end: 3,
            block: vec![Node::print("i")],
        };
        let events = Event::expand(&node);
        let values: Vec<i64> = events
            .iter()
            .map(|e| match e {
                Event::LoopIteration { value, .. } => *value,
                other => panic!("unexpected {}", other.kind()),
            })
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(Event::loop_iterations("i", 5, 4, &[]).is_empty());
    }

    #[test]
    fn test_single_value_range() {
        assert_eq!(Event::loop_iterations("i", 7, 7, &[]).len(), 1);
    }

    #[test]
    fn test_non_events() {
        assert!(Event::expand(&Node::Deadline { seconds: 3 }).is_empty());
        assert!(Event::expand(&Node::ProcrastinateBlock { block: vec![] }).is_empty());
    }

    #[test]
    fn test_statement_mapping() {
        let events = Event::expand(&Node::YesterdazeVar {
            name: "y".to_string(),
            value: Value::Int(1),
            seconds_ago: 10,
        });
        assert_eq!(
            events,
            vec![Event::SetTemporalVar {
                name: "y".to_string(),
                value: Value::Int(1),
                seconds_ago: 10
            }]
        );
        assert_eq!(Event::expand(&Node::print("\"hi\""))[0].kind(), "print_statement");
    }
}
