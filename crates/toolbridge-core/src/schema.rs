//! Input contracts for tools and payload validation.
//!
//! Every tool declares an [`InputSchema`] describing the parameter object it
//! accepts. The dispatch engine validates an execution payload against the
//! owning tool's schema before the handler is invoked; a payload that fails
//! validation never reaches the backend adapter.
//!
//! The contract is deliberately small: an object with named properties, each
//! with a declared [`ParamKind`], and a list of required property names.
//! Undeclared properties pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The JSON kind a declared parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    /// Check whether a JSON value has this kind.
    ///
    /// `Integer` accepts any number without a fractional part; `Number`
    /// accepts all numbers.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }
}

/// Description of a single declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub description: String,
}

impl ParamSpec {
    pub fn new(kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParamKind::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Integer, description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Number, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Boolean, description)
    }

    pub fn array(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Array, description)
    }

    pub fn object(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Object, description)
    }
}

/// A payload's violation of a tool's input contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("parameters must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("missing required parameter '{name}'")]
    MissingRequired { name: String },
    #[error("parameter '{name}' must be of type {expected}, got {found}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The input contract of a tool: named, typed parameters over a JSON object.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use toolbridge_core::schema::{InputSchema, ParamSpec};
///
/// let schema = InputSchema::new()
///     .property("repo_id", ParamSpec::integer("Repository ID"))
///     .property("title", ParamSpec::string("Issue title"))
///     .required("repo_id")
///     .required("title");
///
/// assert!(schema.validate(&json!({"repo_id": 1, "title": "bug"})).is_ok());
/// assert!(schema.validate(&json!({"repo_id": 1})).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    pub properties: BTreeMap<String, ParamSpec>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    /// Create an empty schema accepting any object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named parameter.
    pub fn property(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    /// Mark a declared parameter as required.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Validate a parameter payload against this contract.
    ///
    /// Explicit `null` values are treated as absent: a required parameter set
    /// to `null` is a [`SchemaViolation::MissingRequired`], an optional one
    /// is skipped rather than type-checked.
    pub fn validate(&self, params: &Value) -> Result<(), SchemaViolation> {
        let object = params.as_object().ok_or(SchemaViolation::NotAnObject {
            found: json_kind(params),
        })?;

        for name in &self.required {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(SchemaViolation::MissingRequired { name: name.clone() });
                }
                Some(_) => {}
            }
        }

        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            if let Some(spec) = self.properties.get(name) {
                if !spec.kind.matches(value) {
                    return Err(SchemaViolation::WrongKind {
                        name: name.clone(),
                        expected: spec.kind.as_str(),
                        found: json_kind(value),
                    });
                }
            }
        }

        Ok(())
    }
}
