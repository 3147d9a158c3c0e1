use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A concrete parameter value carried by a block instance.
///
/// Serialized untagged so exported documents read naturally
/// (`"period": 14`, `"operator": ">"`, `"enabled": true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Boolean(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Declared semantic kind of a template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    /// A number with no fractional part (periods, bar counts).
    Integer,
    Boolean,
    Text,
    /// One of a fixed set of text options.
    Choice { options: Vec<String> },
}

impl ParamKind {
    /// Whether `value` is acceptable for this kind. No coercion happens:
    /// `"14"` is not an integer. Numeric bounds are not checked here.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamKind::Number, ParamValue::Number(_)) => true,
            (ParamKind::Integer, ParamValue::Number(v)) => v.fract() == 0.0,
            (ParamKind::Boolean, ParamValue::Boolean(_)) => true,
            (ParamKind::Text, ParamValue::Text(_)) => true,
            (ParamKind::Choice { options }, ParamValue::Text(v)) => {
                options.iter().any(|o| o == v)
            }
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ParamKind::Number => "number".to_string(),
            ParamKind::Integer => "integer".to_string(),
            ParamKind::Boolean => "boolean".to_string(),
            ParamKind::Text => "text".to_string(),
            ParamKind::Choice { options } => format!("one of {}", options.join(" | ")),
        }
    }
}

/// Schema entry for one parameter. `min`/`max` are hints for editors;
/// the engine never enforces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParamSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub default: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ParamSpec {
    pub fn number(name: &str, default: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Number,
            default: ParamValue::Number(default),
            min: None,
            max: None,
        }
    }

    pub fn integer(name: &str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Integer,
            default: ParamValue::Number(default),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn text(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Text,
            default: ParamValue::Text(default.to_string()),
            min: None,
            max: None,
        }
    }

    pub fn choice(name: &str, options: &[&str], default: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            default: ParamValue::Text(default.to_string()),
            min: None,
            max: None,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_accepts_without_coercion() {
        assert!(ParamKind::Number.accepts(&ParamValue::Number(2.5)));
        assert!(!ParamKind::Number.accepts(&ParamValue::Text("2.5".into())));
        assert!(ParamKind::Integer.accepts(&ParamValue::Number(14.0)));
        assert!(!ParamKind::Integer.accepts(&ParamValue::Number(14.5)));
        assert!(!ParamKind::Boolean.accepts(&ParamValue::Number(1.0)));
    }

    #[test]
    fn test_choice_requires_known_option() {
        let kind = ParamKind::Choice {
            options: vec![">".into(), "<".into()],
        };
        assert!(kind.accepts(&ParamValue::Text(">".into())));
        assert!(!kind.accepts(&ParamValue::Text(">=".into())));
    }

    #[test]
    fn test_out_of_range_is_still_accepted() {
        let spec = ParamSpec::integer("period", 14.0, 1.0, 500.0);
        assert!(spec.kind.accepts(&ParamValue::Number(10_000.0)));
        assert!(spec.kind.accepts(&ParamValue::Number(-3.0)));
    }

    #[test]
    fn test_untagged_json_shape() {
        let v: ParamValue = serde_json::from_str("14").unwrap();
        assert_eq!(v, ParamValue::Number(14.0));
        let v: ParamValue = serde_json::from_str("\"close\"").unwrap();
        assert_eq!(v, ParamValue::Text("close".into()));
        let v: ParamValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ParamValue::Boolean(true));
    }
}
