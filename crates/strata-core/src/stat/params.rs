//! Parameter types for stat adapter configuration.
//!
//! Adapters declare their configurable parameters with types, defaults, and
//! constraints; the host framework supplies values through a string-keyed
//! [`StatParams`] map which is validated against those specs before any row
//! is processed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::StatError;

/// Specification for an adapter parameter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Internal parameter name (e.g., "pool")
    pub name: String,

    /// Display label (e.g., "Pooling mode")
    pub label: String,

    /// Parameter type
    pub param_type: ParameterType,

    /// Default value
    pub default_value: ParameterValue,

    /// Optional constraints
    pub constraints: Option<ParameterConstraints>,

    /// Optional description
    pub description: Option<String>,
}

/// Type of a parameter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ParameterType {
    /// 64-bit floating point
    Float,

    /// 64-bit signed integer
    Int,

    /// Boolean
    Bool,

    /// String (anchor tokens, format hints)
    String,

    /// Vector of numbers (e.g., a quadrant selection)
    Vec,

    /// Choice from a fixed token set (e.g., pooling mode)
    Choice { options: Vec<String> },
}

impl ParameterType {
    /// Human-readable type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterType::Float => "float",
            ParameterType::Int => "int",
            ParameterType::Bool => "bool",
            ParameterType::String => "string",
            ParameterType::Vec => "vec",
            ParameterType::Choice { .. } => "choice",
        }
    }

    /// Check if a value is compatible with this type.
    pub fn is_compatible_with(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (ParameterType::Float, ParameterValue::Float(_)) => true,
            (ParameterType::Float, ParameterValue::Int(_)) => true,
            (ParameterType::Int, ParameterValue::Int(_)) => true,
            (ParameterType::Bool, ParameterValue::Bool(_)) => true,
            (ParameterType::String, ParameterValue::String(_)) => true,
            (ParameterType::Vec, ParameterValue::Vec(_)) => true,
            (ParameterType::Choice { options }, ParameterValue::String(s)) => options.contains(s),
            _ => false,
        }
    }
}

/// Runtime parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
    Vec(Vec<f64>),
}

impl ParameterValue {
    /// Try to extract as f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to extract as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to extract as vec.
    pub fn as_vec(&self) -> Option<&[f64]> {
        match self {
            ParameterValue::Vec(v) => Some(v),
            _ => None,
        }
    }
}

/// Constraints on parameter values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParameterConstraints {
    /// Minimum value (numeric types)
    pub min: Option<f64>,

    /// Maximum value (numeric types)
    pub max: Option<f64>,

    /// Whether the value must be strictly positive
    pub positive: bool,

    /// Whether an integer value must be odd (window spans)
    pub odd: bool,

    /// Maximum entry count for vec parameters
    pub max_len: Option<usize>,
}

impl ParameterConstraints {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn positive() -> Self {
        Self {
            positive: true,
            ..Self::default()
        }
    }

    pub fn odd(mut self) -> Self {
        self.odd = true;
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Validate a value against these constraints.
    pub fn validate(&self, value: &ParameterValue) -> Result<(), String> {
        if let Some(v) = value.as_float() {
            if let Some(min) = self.min {
                if v < min {
                    return Err(format!("value {} is below minimum {}", v, min));
                }
            }
            if let Some(max) = self.max {
                if v > max {
                    return Err(format!("value {} is above maximum {}", v, max));
                }
            }
            if self.positive && v <= 0.0 {
                return Err("value must be positive".to_string());
            }
            if self.odd {
                let i = v as i64;
                if (i as f64) != v || i % 2 == 0 {
                    return Err(format!("{} is not an odd integer", v));
                }
            }
        }

        if let Some(v) = value.as_vec() {
            if let Some(max_len) = self.max_len {
                if v.len() > max_len {
                    return Err(format!(
                        "{} entries supplied, at most {} allowed",
                        v.len(),
                        max_len
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Container for runtime parameter values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatParams {
    values: HashMap<String, ParameterValue>,
}

impl StatParams {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a float parameter.
    pub fn set_float(&mut self, name: impl Into<String>, value: f64) {
        self.values
            .insert(name.into(), ParameterValue::Float(value));
    }

    /// Set an integer parameter.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.values.insert(name.into(), ParameterValue::Int(value));
    }

    /// Set a boolean parameter.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), ParameterValue::Bool(value));
    }

    /// Set a string parameter.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), ParameterValue::String(value.into()));
    }

    /// Set a vector parameter.
    pub fn set_vec(&mut self, name: impl Into<String>, value: Vec<f64>) {
        self.values.insert(name.into(), ParameterValue::Vec(value));
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Get a float parameter.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_float())
    }

    /// Get a float parameter or a default.
    pub fn get_float_or(&self, name: &str, default: f64) -> f64 {
        self.get_float(name).unwrap_or(default)
    }

    /// Get an integer parameter.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(|v| v.as_int())
    }

    /// Get an integer parameter or a default.
    pub fn get_int_or(&self, name: &str, default: i64) -> i64 {
        self.get_int(name).unwrap_or(default)
    }

    /// Get a boolean parameter.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(|v| v.as_bool())
    }

    /// Get a boolean parameter or a default.
    pub fn get_bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    /// Get a string parameter.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_string())
    }

    /// Get a string parameter or a default.
    pub fn get_string_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_string(name).unwrap_or(default)
    }

    /// Get a vector parameter.
    pub fn get_vec(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).and_then(|v| v.as_vec())
    }

    /// Fill in missing parameters with defaults from specs.
    pub fn fill_defaults(&mut self, specs: &[ParameterSpec]) {
        for spec in specs {
            if !self.values.contains_key(&spec.name) {
                self.values
                    .insert(spec.name.clone(), spec.default_value.clone());
            }
        }
    }

    /// Validate parameters against specs.
    pub fn validate(&self, specs: &[ParameterSpec]) -> Result<(), StatError> {
        for spec in specs {
            if let Some(value) = self.values.get(&spec.name) {
                if !spec.param_type.is_compatible_with(value) {
                    return Err(StatError::TypeMismatch {
                        name: spec.name.clone(),
                        expected: spec.param_type.type_name().to_string(),
                    });
                }

                if let Some(constraints) = &spec.constraints {
                    constraints
                        .validate(value)
                        .map_err(|reason| StatError::InvalidParameter {
                            name: spec.name.clone(),
                            reason,
                        })?;
                }
            }
        }
        Ok(())
    }

    /// Serialize to JSON (for host frameworks that record invocations).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.values)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let values = serde_json::from_str(json)?;
        Ok(Self { values })
    }
}

impl ParameterSpec {
    /// Create a new float parameter spec.
    pub fn float(name: impl Into<String>, label: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::Float,
            default_value: ParameterValue::Float(default),
            constraints: None,
            description: None,
        }
    }

    /// Create a new integer parameter spec.
    pub fn int(name: impl Into<String>, label: impl Into<String>, default: i64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::Int,
            default_value: ParameterValue::Int(default),
            constraints: None,
            description: None,
        }
    }

    /// Create a new boolean parameter spec.
    pub fn bool(name: impl Into<String>, label: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::Bool,
            default_value: ParameterValue::Bool(default),
            constraints: None,
            description: None,
        }
    }

    /// Create a new string parameter spec.
    pub fn string(name: impl Into<String>, label: impl Into<String>, default: &str) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::String,
            default_value: ParameterValue::String(default.to_string()),
            constraints: None,
            description: None,
        }
    }

    /// Create a new vector parameter spec.
    pub fn vec(name: impl Into<String>, label: impl Into<String>, default: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::Vec,
            default_value: ParameterValue::Vec(default),
            constraints: None,
            description: None,
        }
    }

    /// Create a new choice parameter spec.
    pub fn choice(
        name: impl Into<String>,
        label: impl Into<String>,
        options: &[&str],
        default: &str,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type: ParameterType::Choice {
                options: options.iter().map(|s| s.to_string()).collect(),
            },
            default_value: ParameterValue::String(default.to_string()),
            constraints: None,
            description: None,
        }
    }

    pub fn with_constraints(mut self, constraints: ParameterConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_roundtrip() {
        let mut params = StatParams::new();
        params.set_float("xintercept", 1.5);
        params.set_string("pool", "x");
        params.set_vec("quadrants", vec![1.0, 2.0]);

        let json = params.to_json().unwrap();
        let restored = StatParams::from_json(&json).unwrap();
        assert_eq!(restored.get_float("xintercept"), Some(1.5));
        assert_eq!(restored.get_string("pool"), Some("x"));
        assert_eq!(restored.get_vec("quadrants"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_int_coerces_to_float() {
        let mut params = StatParams::new();
        params.set_int("xintercept", 2);
        assert_eq!(params.get_float("xintercept"), Some(2.0));
    }

    #[test]
    fn test_choice_validation() {
        let spec = ParameterSpec::choice("pool", "Pooling mode", &["none", "x", "y"], "none");
        let mut params = StatParams::new();
        params.set_string("pool", "diagonal");
        let err = params.validate(&[spec.clone()]).unwrap_err();
        assert!(matches!(err, StatError::TypeMismatch { .. }));

        let mut ok = StatParams::new();
        ok.set_string("pool", "y");
        assert!(ok.validate(&[spec]).is_ok());
    }

    #[test]
    fn test_odd_constraint() {
        let spec = ParameterSpec::int("span", "Window span", 5)
            .with_constraints(ParameterConstraints::range(3.0, 101.0).odd());
        let mut params = StatParams::new();
        params.set_int("span", 4);
        assert!(params.validate(std::slice::from_ref(&spec)).is_err());
        params.set_int("span", 7);
        assert!(params.validate(std::slice::from_ref(&spec)).is_ok());
    }

    #[test]
    fn test_max_len_constraint() {
        let spec = ParameterSpec::vec("quadrants", "Quadrants", vec![])
            .with_constraints(ParameterConstraints::none().max_len(4));
        let mut params = StatParams::new();
        params.set_vec("quadrants", vec![1.0, 2.0, 3.0, 4.0, 1.0]);
        assert!(params.validate(std::slice::from_ref(&spec)).is_err());
    }

    #[test]
    fn test_fill_defaults() {
        let specs = vec![
            ParameterSpec::float("xintercept", "X intercept", 0.0),
            ParameterSpec::choice("pool", "Pooling mode", &["none", "x", "y"], "none"),
        ];
        let mut params = StatParams::new();
        params.set_float("xintercept", 3.0);
        params.fill_defaults(&specs);
        assert_eq!(params.get_float("xintercept"), Some(3.0));
        assert_eq!(params.get_string("pool"), Some("none"));
    }
}
