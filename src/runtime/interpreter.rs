use crate::language::ast::{BinaryOp, Expr, Method};
use crate::language::span::Span;
use crate::runtime::{
    bindings::Bindings,
    error::{EvalError, EvalResult},
    strings,
    trace::{EvaluationTrace, StepKind, Tracer},
    value::Value,
};
use tracing::debug;

/// Walks a parsed expression, recording one step per operation. Owns the
/// trace for exactly one evaluation; nothing is shared between calls.
pub struct Evaluator<'a> {
    source: &'a str,
    bindings: &'a Bindings,
    tracer: Tracer,
}

impl<'a> Evaluator<'a> {
    pub fn new(source: &'a str, bindings: &'a Bindings) -> Self {
        Self {
            source,
            bindings,
            tracer: Tracer::new(),
        }
    }

    /// Evaluates to completion. Runtime failures are absorbed here: the
    /// trace keeps every step recorded before the failure and the result
    /// degrades to the `"Error"` sentinel.
    pub fn run(mut self, expr: &Expr) -> EvaluationTrace {
        match self.eval(expr) {
            Ok(value) => {
                debug!(result = %value, steps = self.tracer.len(), "evaluation finished");
                EvaluationTrace {
                    result: value.to_string(),
                    steps: self.tracer.into_steps(),
                }
            }
            Err(err) => {
                debug!(error = %err, steps = self.tracer.len(), "evaluation failed");
                EvaluationTrace {
                    result: "Error".to_string(),
                    steps: self.tracer.into_steps(),
                }
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Null(_) => Ok(Value::Null),
            Expr::Bool(value, _) => Ok(Value::Bool(*value)),
            Expr::Int(value, _) => Ok(Value::Int(*value)),
            Expr::Str(value, _) => Ok(Value::Str(value.clone())),
            Expr::Get { name, .. } => Ok(self.resolve_variable(name)),
            Expr::MethodCall {
                receiver,
                method,
                args,
                ..
            } => self.eval_method(receiver, *method, args),
            Expr::Binary {
                op, left, right, ..
            } => self.eval_binary(*op, left, right),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.eval_ternary(condition, then_branch, else_branch),
        }
    }

    fn resolve_variable(&mut self, name: &str) -> Value {
        let value = self.bindings.resolve(name);
        self.tracer.record(
            StepKind::VariableAccess,
            vec![format!("get('{name}')")],
            value.render(),
            format!("Resolved variable '{}' to {}", name, value.render()),
        );
        value
    }

    fn eval_method(&mut self, receiver: &Expr, method: Method, args: &[Expr]) -> EvalResult<Value> {
        let recv = self.eval(receiver)?;
        match method {
            Method::Length => {
                let result = Value::Int(strings::length(&recv));
                self.tracer.record(
                    StepKind::StringLength,
                    vec![recv.render()],
                    result.render(),
                    format!("Applied length() to {} yielding {}", recv.render(), result),
                );
                Ok(result)
            }
            Method::Equals => {
                let other = self.eval(&args[0])?;
                let result = Value::Bool(strings::equals(&recv, &other));
                self.tracer.record(
                    StepKind::StringEquality,
                    vec![recv.render(), other.render()],
                    result.render(),
                    format!(
                        "Compared {} equals {} yielding {}",
                        recv.render(),
                        other.render(),
                        result
                    ),
                );
                Ok(result)
            }
            Method::Concat => {
                let other = self.eval(&args[0])?;
                let result = strings::concat(&recv, &other);
                self.tracer.record(
                    StepKind::StringConcatenation,
                    vec![recv.render(), other.render()],
                    result.render(),
                    format!(
                        "Concatenated {} with {} into {}",
                        recv.render(),
                        other.render(),
                        result.render()
                    ),
                );
                Ok(result)
            }
            Method::Substring => {
                let start = self.expect_int(&args[0], "substring() start")?;
                let end = self.expect_int(&args[1], "substring() end")?;
                let result = strings::substring(&recv, start, end);
                self.tracer.record(
                    StepKind::StringSubstring,
                    vec![recv.render(), start.to_string(), end.to_string()],
                    result.render(),
                    format!(
                        "Took substring({start}, {end}) of {} yielding {}",
                        recv.render(),
                        result.render()
                    ),
                );
                Ok(result)
            }
        }
    }

    fn expect_int(&mut self, arg: &Expr, what: &str) -> EvalResult<i64> {
        match self.eval(arg)? {
            Value::Int(value) => Ok(value),
            other => Err(EvalError::type_mismatch(format!(
                "{what} must be an integer, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        match op {
            BinaryOp::And | BinaryOp::Or => self.eval_logical(op, left, right),
            BinaryOp::Eq | BinaryOp::NotEq => self.eval_equality(op, left, right),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.eval_relational(op, left, right)
            }
        }
    }

    // Both operands are evaluated before combining; `and`/`or` do not
    // short-circuit.
    fn eval_logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        let (lhs, rhs) = match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) => (*a, *b),
            _ => {
                return Err(EvalError::type_mismatch(format!(
                    "logical '{}' requires boolean operands, got {} and {}",
                    op.symbol(),
                    lhs.type_name(),
                    rhs.type_name()
                )));
            }
        };
        let (kind, result) = match op {
            BinaryOp::And => (StepKind::LogicalAnd, lhs && rhs),
            _ => (StepKind::LogicalOr, lhs || rhs),
        };
        self.tracer.record(
            kind,
            vec![lhs.to_string(), rhs.to_string()],
            result.to_string(),
            format!("Combined {} {} {} yielding {}", lhs, op.symbol(), rhs, result),
        );
        Ok(Value::Bool(result))
    }

    fn eval_equality(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        // `x == null` / `x != null` is a null check on the other operand.
        if left.is_null_literal() || right.is_null_literal() {
            let (checked_expr, checked) = if left.is_null_literal() {
                (right, self.eval(right)?)
            } else {
                (left, self.eval(left)?)
            };
            let is_null = checked.is_null();
            let result = if op == BinaryOp::Eq { is_null } else { !is_null };
            let snippet = self.snippet(checked_expr.span());
            self.tracer.record(
                StepKind::NullCheck,
                vec![checked.render(), "null".to_string()],
                result.to_string(),
                format!(
                    "Checked whether {} is {} yielding {}",
                    snippet,
                    if op == BinaryOp::Eq { "null" } else { "not null" },
                    result
                ),
            );
            return Ok(Value::Bool(result));
        }

        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;

        // Integer operands compare numerically; everything else falls back
        // to null-aware, case-sensitive string comparison.
        if let (Value::Int(a), Value::Int(b)) = (&lhs, &rhs) {
            let result = if op == BinaryOp::Eq { a == b } else { a != b };
            self.tracer.record(
                StepKind::NumericComparison,
                vec![a.to_string(), b.to_string()],
                result.to_string(),
                format!("Compared {} {} {} numerically yielding {}", a, op.symbol(), b, result),
            );
            return Ok(Value::Bool(result));
        }

        let equal = strings::equals(&lhs, &rhs);
        let result = if op == BinaryOp::Eq { equal } else { !equal };
        self.tracer.record(
            StepKind::StringComparison,
            vec![lhs.render(), rhs.render()],
            result.to_string(),
            format!(
                "Compared {} {} {} yielding {}",
                lhs.render(),
                op.symbol(),
                rhs.render(),
                result
            ),
        );
        Ok(Value::Bool(result))
    }

    fn eval_relational(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        let (a, b) = match (lhs.as_numeric(), rhs.as_numeric()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(EvalError::type_mismatch(format!(
                    "'{}' requires numeric operands, got {} and {}",
                    op.symbol(),
                    lhs.type_name(),
                    rhs.type_name()
                )));
            }
        };
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            _ => a >= b,
        };
        self.tracer.record(
            StepKind::NumericComparison,
            vec![a.to_string(), b.to_string()],
            result.to_string(),
            format!("Compared {} {} {} numerically yielding {}", a, op.symbol(), b, result),
        );
        Ok(Value::Bool(result))
    }

    // The condition must reduce to an explicit boolean; any non-boolean
    // value selects the false branch. Only the selected branch is
    // evaluated, so the unselected branch contributes zero steps.
    fn eval_ternary(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> EvalResult<Value> {
        let cond_value = self.eval(condition)?;
        let truth = matches!(cond_value, Value::Bool(true));
        let chosen = if truth { then_branch } else { else_branch };
        let result = self.eval(chosen)?;

        let cond_text = self.snippet(condition.span()).to_string();
        let then_text = self.snippet(then_branch.span()).to_string();
        let else_text = self.snippet(else_branch.span()).to_string();
        self.tracer.record(
            StepKind::TernaryEvaluation,
            vec![cond_text.clone(), then_text, else_text],
            result.render(),
            format!(
                "Evaluated condition '{}' to {}, choosing {}",
                cond_text,
                truth,
                result.render()
            ),
        );
        Ok(result)
    }

    fn snippet(&self, span: Span) -> &str {
        self.source
            .get(span.start..span.end)
            .unwrap_or_default()
            .trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str, bindings: &Bindings) -> EvaluationTrace {
        let expr = parse(source).expect("parse");
        Evaluator::new(source, bindings).run(&expr)
    }

    fn operations(trace: &EvaluationTrace) -> Vec<&str> {
        trace.steps.iter().map(|s| s.operation.as_str()).collect()
    }

    #[test]
    fn variable_access_records_null_for_missing_bindings() {
        let trace = run("get('missing')", &Bindings::new());
        assert_eq!(trace.result, "null");
        assert_eq!(trace.steps.len(), 1);
        assert_eq!(trace.steps[0].operation, "Variable Access");
        assert_eq!(trace.steps[0].input, vec!["get('missing')"]);
        assert_eq!(trace.steps[0].output, "null");
    }

    #[test]
    fn selected_branch_steps_follow_condition_steps() {
        let mut bindings = Bindings::new();
        bindings.insert("a", "Hello");
        bindings.insert("b", "World");
        let trace = run(
            "get('a') != null ? get('a').concat(get('b')) : 'none'",
            &bindings,
        );
        assert_eq!(trace.result, "HelloWorld");
        assert_eq!(
            operations(&trace),
            vec![
                "Variable Access",
                "Null Check",
                "Variable Access",
                "Variable Access",
                "String Concatenation",
                "Ternary Evaluation",
            ]
        );
    }

    #[test]
    fn unselected_branch_contributes_zero_steps() {
        let mut bindings = Bindings::new();
        bindings.insert_null("a");
        bindings.insert("b", "World");
        let trace = run(
            "get('a') != null ? get('a').concat(get('b')) : 'none'",
            &bindings,
        );
        assert_eq!(trace.result, "none");
        assert_eq!(
            operations(&trace),
            vec!["Variable Access", "Null Check", "Ternary Evaluation"]
        );
        assert!(!trace
            .steps
            .iter()
            .any(|s| s.input.contains(&"get('b')".to_string())));
    }

    #[test]
    fn ternary_step_records_condition_and_both_branch_texts() {
        let mut bindings = Bindings::new();
        bindings.insert("a", "x");
        let trace = run("get('a') == null ? 'yes' : 'no'", &bindings);
        let ternary = trace.steps.last().expect("ternary step");
        assert_eq!(ternary.operation, "Ternary Evaluation");
        assert_eq!(
            ternary.input,
            vec!["get('a') == null", "'yes'", "'no'"]
        );
        assert_eq!(ternary.output, "\"no\"");
    }

    #[test]
    fn logical_operators_do_not_short_circuit() {
        let mut bindings = Bindings::new();
        bindings.insert("a", "x");
        let trace = run("true or get('a').equals('x')", &bindings);
        assert_eq!(trace.result, "true");
        // The right operand was fully evaluated even though `or true` decides.
        assert_eq!(
            operations(&trace),
            vec!["Variable Access", "String Equality", "Logical OR"]
        );
    }

    #[test]
    fn runtime_failure_keeps_partial_trace() {
        let mut bindings = Bindings::new();
        bindings.insert("a", "x");
        let trace = run("get('a').concat('y') and true", &bindings);
        assert_eq!(trace.result, "Error");
        assert_eq!(
            operations(&trace),
            vec!["Variable Access", "String Concatenation"]
        );
    }

    #[test]
    fn relational_on_non_numeric_degrades_to_error() {
        let trace = run("'abc' > 2", &Bindings::new());
        assert_eq!(trace.result, "Error");
        assert!(trace.steps.is_empty());
    }

    #[test]
    fn length_feeds_numeric_comparison() {
        let mut bindings = Bindings::new();
        bindings.insert("n", "abc");
        let trace = run("get('n').length() > 2", &bindings);
        assert_eq!(trace.result, "true");
        assert_eq!(
            operations(&trace),
            vec!["Variable Access", "String Length", "Numeric Comparison"]
        );
    }

    #[test]
    fn non_boolean_condition_selects_false_branch() {
        let trace = run("'surprise' ? 'yes' : 'no'", &Bindings::new());
        assert_eq!(trace.result, "no");
    }

    #[test]
    fn substring_argument_type_is_enforced() {
        let trace = run("'abc'.substring('a', 2)", &Bindings::new());
        assert_eq!(trace.result, "Error");
    }
}
