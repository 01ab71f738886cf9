use std::fmt;

/// Runtime value domain. `Int` only ever arises from integer literals and
/// `length()`; bindings hold strings or null.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the value as it appears in trace fragments: strings are
    /// double-quoted, everything else prints bare.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Str(s) => format!("\"{}\"", s),
            Value::Int(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
        }
    }

    /// A number usable by the relational operators: an `Int`, or a string
    /// holding a base-10 integer.
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}
