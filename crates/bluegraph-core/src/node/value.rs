//! Scalar values carried by terminal nodes.

use std::fmt;

use serde_json::Number;

/// The scalar payload of a value node.
///
/// Numbers reuse [`serde_json::Number`], which holds an integer or a finite
/// double. Non-finite doubles cannot be constructed, so equality is total
/// and the canonical rendering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// A text scalar.
    Text(String),
    /// A numeric scalar, integer or finite double.
    Number(Number),
    /// A boolean scalar.
    Bool(bool),
}

impl NodeValue {
    /// Returns the kind tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Number(_) => ValueKind::Number,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// Returns the text content if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number as `i64` if this is an integer value in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number.as_i64(),
            _ => None,
        }
    }

    /// Returns the boolean content if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl From<&str> for NodeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for NodeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for NodeValue {
    fn from(number: i64) -> Self {
        Self::Number(number.into())
    }
}

impl From<u64> for NodeValue {
    fn from(number: u64) -> Self {
        Self::Number(number.into())
    }
}

impl From<bool> for NodeValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<Number> for NodeValue {
    fn from(number: Number) -> Self {
        Self::Number(number)
    }
}

/// Kind tag for a [`NodeValue`], used for merge compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text scalar.
    Text,
    /// Numeric scalar.
    Number,
    /// Boolean scalar.
    Bool,
}

impl ValueKind {
    /// Returns the lowercase kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "boolean",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(NodeValue::from("x").kind(), ValueKind::Text);
        assert_eq!(NodeValue::from(3_i64).kind(), ValueKind::Number);
        assert_eq!(NodeValue::from(true).kind(), ValueKind::Bool);
    }

    #[test]
    fn accessors() {
        assert_eq!(NodeValue::from("abc").as_text(), Some("abc"));
        assert_eq!(NodeValue::from(42_i64).as_i64(), Some(42));
        assert_eq!(NodeValue::from(false).as_bool(), Some(false));
        assert_eq!(NodeValue::from("abc").as_i64(), None);
    }

    #[test]
    fn float_numbers_compare_by_value() {
        let a = NodeValue::Number(Number::from_f64(2.5).unwrap());
        let b = NodeValue::Number(Number::from_f64(2.5).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn kind_display() {
        assert_eq!(ValueKind::Text.to_string(), "text");
        assert_eq!(ValueKind::Number.to_string(), "number");
        assert_eq!(ValueKind::Bool.to_string(), "boolean");
    }
}
