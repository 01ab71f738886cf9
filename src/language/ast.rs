use crate::language::span::Span;

/// The fixed method set expressions may call on a string-valued receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Length,
    Equals,
    Concat,
    Substring,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length" => Some(Method::Length),
            "equals" => Some(Method::Equals),
            "concat" => Some(Method::Concat),
            "substring" => Some(Method::Substring),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::Length => "length",
            Method::Equals => "equals",
            Method::Concat => "concat",
            Method::Substring => "substring",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Method::Length => 0,
            Method::Equals | Method::Concat => 1,
            Method::Substring => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Null(Span),
    Bool(bool, Span),
    Int(i64, Span),
    Str(String, Span),
    Get {
        name: String,
        span: Span,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: Method,
        args: Vec<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Null(span)
            | Expr::Bool(_, span)
            | Expr::Int(_, span)
            | Expr::Str(_, span) => *span,
            Expr::Get { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. } => *span,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expr::Null(_))
    }
}

/// Collects every `get()` variable name, deduplicated in first-seen order.
pub fn collect_variables(expr: &Expr) -> Vec<String> {
    let mut names = Vec::new();
    walk_variables(expr, &mut names);
    names
}

fn walk_variables(expr: &Expr, names: &mut Vec<String>) {
    match expr {
        Expr::Null(_) | Expr::Bool(..) | Expr::Int(..) | Expr::Str(..) => {}
        Expr::Get { name, .. } => {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
        Expr::MethodCall { receiver, args, .. } => {
            walk_variables(receiver, names);
            for arg in args {
                walk_variables(arg, names);
            }
        }
        Expr::Binary { left, right, .. } => {
            walk_variables(left, names);
            walk_variables(right, names);
        }
        Expr::Ternary {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_variables(condition, names);
            walk_variables(then_branch, names);
            walk_variables(else_branch, names);
        }
    }
}
