//! A small null-aware string expression interpreter.
//!
//! Expressions look like
//! `get('a') != null ? get('a').concat(get('b')) : 'none'`: variable lookup
//! through `get()`, a fixed string method set (`length`, `equals`, `concat`,
//! `substring`), comparisons, `and`/`or`, and nested ternary conditionals.
//! Every evaluation produces an [`EvaluationTrace`] recording each operation
//! in order, for visualization and debugging.
//!
//! ```
//! use exprtrace::{evaluate, Bindings};
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("a", "Hello");
//! bindings.insert("b", "World");
//! let trace = evaluate(
//!     "get('a') != null ? get('a').concat(get('b')) : 'none'",
//!     &bindings,
//! )
//! .unwrap();
//! assert_eq!(trace.result, "HelloWorld");
//! ```

pub mod diagnostics;
pub mod language;
pub mod runtime;

pub use language::errors::{SyntaxError, SyntaxErrors};
pub use runtime::bindings::Bindings;
pub use runtime::trace::{EvaluationStep, EvaluationTrace, StepKind};

use runtime::Evaluator;
use tracing::debug;

/// Checks an expression without evaluating it and returns the `get()`
/// variable names it references, deduplicated in first-seen order.
/// Bindings are never consulted.
pub fn validate_syntax(expression: &str) -> Result<Vec<String>, SyntaxErrors> {
    let expr = language::parser::parse(expression)?;
    Ok(language::ast::collect_variables(&expr))
}

/// Parses and evaluates an expression against the given bindings.
///
/// Syntax errors are returned as `Err`. Runtime failures never escape:
/// they degrade to the `"Error"` result sentinel with whatever partial
/// trace was collected, so a caller always gets a trace back for a
/// well-formed expression.
pub fn evaluate(expression: &str, bindings: &Bindings) -> Result<EvaluationTrace, SyntaxErrors> {
    let expr = language::parser::parse(expression)?;
    debug!(expression, "parsed expression");
    Ok(Evaluator::new(expression, bindings).run(&expr))
}
