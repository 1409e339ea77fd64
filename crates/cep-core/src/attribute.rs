use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed attribute payload. The tag and the payload always agree by
/// construction, and a value never changes once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttributeValue {
    /// Coerce a raw string into the most specific value it can
    /// represent. Total over all inputs, first match wins: the literal
    /// tokens `true`/`false` (case-sensitive), then a base-10 integer,
    /// then a float, then the string verbatim.
    ///
    /// `"1.0"` lands on Float (the integer parse rejects the decimal
    /// point) and `"TRUE"` stays a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => {
                if let Ok(i) = raw.parse::<i64>() {
                    Self::Int(i)
                } else if let Ok(f) = raw.parse::<f64>() {
                    Self::Float(f)
                } else {
                    Self::Str(raw.to_string())
                }
            }
        }
    }

    /// Short tag name for display and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

/// One named, typed value attached to a published or notified event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Build an attribute by inferring the value type from a raw string.
    pub fn inferred(name: impl Into<String>, raw: &str) -> Self {
        Self::new(name, AttributeValue::infer(raw))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} : {} = {}>", self.name, self.value.kind(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_bool_literals() {
        assert_eq!(AttributeValue::infer("true"), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::infer("false"), AttributeValue::Bool(false));
    }

    #[test]
    fn bool_literals_are_case_sensitive() {
        assert_eq!(
            AttributeValue::infer("True"),
            AttributeValue::Str("True".into())
        );
        assert_eq!(
            AttributeValue::infer("TRUE"),
            AttributeValue::Str("TRUE".into())
        );
    }

    #[test]
    fn infers_integers() {
        assert_eq!(AttributeValue::infer("42"), AttributeValue::Int(42));
        assert_eq!(AttributeValue::infer("-7"), AttributeValue::Int(-7));
    }

    #[test]
    fn decimal_point_forces_float() {
        assert_eq!(AttributeValue::infer("42.0"), AttributeValue::Float(42.0));
        assert_eq!(AttributeValue::infer("1.0"), AttributeValue::Float(1.0));
        assert_eq!(AttributeValue::infer("-3.5"), AttributeValue::Float(-3.5));
    }

    #[test]
    fn falls_back_to_string() {
        assert_eq!(
            AttributeValue::infer("abc"),
            AttributeValue::Str("abc".into())
        );
        assert_eq!(
            AttributeValue::infer(" 42"),
            AttributeValue::Str(" 42".into())
        );
        assert_eq!(AttributeValue::infer(""), AttributeValue::Str(String::new()));
    }

    #[test]
    fn inference_is_deterministic() {
        for raw in ["true", "false", "42", "42.0", "abc", "", "-0"] {
            assert_eq!(AttributeValue::infer(raw), AttributeValue::infer(raw));
        }
    }

    #[test]
    fn kind_labels() {
        assert_eq!(AttributeValue::Bool(true).kind(), "bool");
        assert_eq!(AttributeValue::Int(1).kind(), "int");
        assert_eq!(AttributeValue::Float(1.0).kind(), "float");
        assert_eq!(AttributeValue::Str("x".into()).kind(), "string");
    }

    #[test]
    fn attribute_display() {
        let attr = Attribute::inferred("area", "toto");
        assert_eq!(attr.to_string(), "<area : string = toto>");

        let attr = Attribute::inferred("value", "50");
        assert_eq!(attr.to_string(), "<value : int = 50>");
    }

    #[test]
    fn serde_roundtrip() {
        let attrs = vec![
            Attribute::new("a", AttributeValue::Bool(false)),
            Attribute::new("b", AttributeValue::Int(-12)),
            Attribute::new("c", AttributeValue::Float(0.5)),
            Attribute::new("d", AttributeValue::Str("hi".into())),
        ];
        for attr in &attrs {
            let json = serde_json::to_string(attr).unwrap();
            let parsed: Attribute = serde_json::from_str(&json).unwrap();
            assert_eq!(attr, &parsed);
        }
    }

    #[test]
    fn serde_kind_tags() {
        let json = serde_json::to_string(&AttributeValue::Int(50)).unwrap();
        assert_eq!(json, r#"{"kind":"int","value":50}"#);
    }
}
