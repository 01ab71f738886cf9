//! String operation engine. Pure functions over [`Value`] operands; the
//! null-propagation rules live here so the evaluator only has to thread
//! results through the trace.

use crate::runtime::value::Value;

/// Length of a string, counting characters. Null has length zero.
pub fn length(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Str(s) => s.chars().count() as i64,
        other => other.to_string().chars().count() as i64,
    }
}

/// Equality with fixed null policy: null equals null, null never equals a
/// value. Non-null operands compare by their string forms, case-sensitive.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left.is_null(), right.is_null()) {
        (true, true) => true,
        (true, false) | (false, true) => false,
        (false, false) => left.to_string() == right.to_string(),
    }
}

/// Concatenation propagates null: either operand null yields null.
pub fn concat(left: &Value, right: &Value) -> Value {
    if left.is_null() || right.is_null() {
        return Value::Null;
    }
    Value::Str(format!("{left}{right}"))
}

/// Zero-based half-open slice, clamped to the string bounds. A null
/// receiver propagates; an empty or inverted range yields "".
pub fn substring(value: &Value, start: i64, end: i64) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    let text = value.to_string();
    let chars: Vec<char> = text.chars().collect();
    let start = start.max(0) as usize;
    let end = (end.max(0) as usize).min(chars.len());
    if start >= end {
        return Value::Str(String::new());
    }
    Value::Str(chars[start..end].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn length_of_null_is_zero() {
        assert_eq!(length(&Value::Null), 0);
        assert_eq!(length(&s("")), 0);
        assert_eq!(length(&s("abc")), 3);
    }

    #[test]
    fn null_equals_null_only() {
        assert!(equals(&Value::Null, &Value::Null));
        assert!(!equals(&Value::Null, &s("a")));
        assert!(!equals(&s("a"), &Value::Null));
    }

    #[test]
    fn string_equality_is_case_sensitive() {
        assert!(equals(&s("a"), &s("a")));
        assert!(!equals(&s("a"), &s("A")));
        assert!(!equals(&s("a"), &s("b")));
    }

    #[test]
    fn concat_propagates_null() {
        assert_eq!(concat(&s("abc"), &s("def")), s("abcdef"));
        assert_eq!(concat(&Value::Null, &s("def")), Value::Null);
        assert_eq!(concat(&s("abc"), &Value::Null), Value::Null);
    }

    #[test]
    fn substring_clamps_and_never_errors() {
        assert_eq!(substring(&s("abc"), 1, 2), s("b"));
        assert_eq!(substring(&s("abc"), 5, 9), s(""));
        assert_eq!(substring(&s("abc"), 2, 1), s(""));
        assert_eq!(substring(&s("abc"), 0, 3), s("abc"));
        assert_eq!(substring(&Value::Null, 0, 2), Value::Null);
    }

    #[test]
    fn substring_counts_characters_not_bytes() {
        assert_eq!(substring(&s("héllo"), 1, 3), s("él"));
    }
}
