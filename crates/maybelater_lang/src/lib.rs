//! MAYBELATER Language
//!
//! AST node kinds consumed by the runtime, the source-text front end
//! that produces them, and the sandboxed expression evaluator used by
//! conditionals and `PRINT`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod expr;
pub mod parser;

pub use ast::Node;
pub use expr::{EvalError, Evaluator, Expr, SandboxEvaluator};
pub use parser::{ParseError, parse_program};
