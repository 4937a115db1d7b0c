use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The six kinds of value a decoded JSON document can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truthiness as a JavaScript host would judge the decoded value.
///
/// Flags such as `nullable` and `uniqueElements` are honoured whenever their
/// value is truthy, even when it is not a boolean.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify() {
        assert_eq!(JsonType::String, JsonType::of(&json!("foo")));
        assert_eq!(JsonType::Number, JsonType::of(&json!(1)));
        assert_eq!(JsonType::Number, JsonType::of(&json!(-1.5)));
        assert_eq!(JsonType::Boolean, JsonType::of(&json!(false)));
        assert_eq!(JsonType::Null, JsonType::of(&json!(null)));
        assert_eq!(JsonType::Array, JsonType::of(&json!([])));
        assert_eq!(JsonType::Object, JsonType::of(&json!({})));
    }

    #[test]
    fn serialize_lowercase() {
        assert_eq!("\"object\"", serde_json::to_string(&JsonType::Object).unwrap());
        assert_eq!("null", JsonType::Null.to_string());
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(42)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));

        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }
}
