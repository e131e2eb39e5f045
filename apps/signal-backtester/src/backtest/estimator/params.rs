//! Hyperparameter values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One concrete hyperparameter assignment, keyed by parameter name.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Parameter value that can be numeric, boolean or string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean parameter.
    Bool(bool),
    /// Integer parameter.
    Int(i64),
    /// Floating-point parameter.
    Float(f64),
    /// String parameter.
    String(String),
}

impl ParamValue {
    /// Get as integer if applicable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as float if applicable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as boolean if applicable.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
        }
    }
}

/// Render a parameter set as `a=1, b=x` for logs and tables.
#[must_use]
pub fn describe_params(params: &ParamSet) -> String {
    if params.is_empty() {
        return "-".to_string();
    }
    params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_conversions() {
        let int_val = ParamValue::Int(42);
        assert_eq!(int_val.as_int(), Some(42));
        assert_eq!(int_val.as_float(), Some(42.0));
        assert_eq!(int_val.to_string(), "42");

        let float_val = ParamValue::Float(3.5);
        assert_eq!(float_val.as_int(), Some(3));
        assert_eq!(float_val.as_float(), Some(3.5));

        let text = ParamValue::String("distance".to_string());
        assert_eq!(text.as_int(), None);
        assert_eq!(text.as_text(), Some("distance"));
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[true, 5, 0.5, "uniform"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParamValue::Bool(true),
                ParamValue::Int(5),
                ParamValue::Float(0.5),
                ParamValue::String("uniform".to_string()),
            ]
        );
    }

    #[test]
    fn test_describe_params() {
        let mut params = ParamSet::new();
        assert_eq!(describe_params(&params), "-");
        params.insert("k".to_string(), ParamValue::Int(5));
        params.insert("weights".to_string(), ParamValue::String("distance".to_string()));
        assert_eq!(describe_params(&params), "k=5, weights=distance");
    }
}
