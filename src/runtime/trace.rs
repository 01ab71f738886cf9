//! Evaluation steps and the ordered trace consumed by visualizers.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    VariableAccess,
    StringLength,
    StringEquality,
    StringConcatenation,
    StringSubstring,
    NullCheck,
    StringComparison,
    NumericComparison,
    LogicalAnd,
    LogicalOr,
    TernaryEvaluation,
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::VariableAccess => "Variable Access",
            StepKind::StringLength => "String Length",
            StepKind::StringEquality => "String Equality",
            StepKind::StringConcatenation => "String Concatenation",
            StepKind::StringSubstring => "String Substring",
            StepKind::NullCheck => "Null Check",
            StepKind::StringComparison => "String Comparison",
            StepKind::NumericComparison => "Numeric Comparison",
            StepKind::LogicalAnd => "Logical AND",
            StepKind::LogicalOr => "Logical OR",
            StepKind::TernaryEvaluation => "Ternary Evaluation",
        }
    }
}

/// One recorded operation: what ran, on which fragments, and what came out.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationStep {
    pub operation: String,
    pub input: Vec<String>,
    pub output: String,
    pub description: String,
}

/// The final result plus every step in evaluation order. Produced fresh per
/// call and immutable once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationTrace {
    pub result: String,
    pub steps: Vec<EvaluationStep>,
}

/// Append-only step collector owned by one evaluation.
#[derive(Debug, Default)]
pub struct Tracer {
    steps: Vec<EvaluationStep>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: StepKind,
        input: Vec<String>,
        output: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.steps.push(EvaluationStep {
            operation: kind.label().to_string(),
            input,
            output: output.into(),
            description: description.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<EvaluationStep> {
        self.steps
    }
}
