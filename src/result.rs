//! The analysis result: whatever the service sent back, or the error marker.
//!
//! The service's response has no fixed schema, so fields are kept as a
//! dynamically-typed [`FieldValue`] union and the renderer pattern-matches
//! over it. Field order is the order the service sent them in.

use crate::error::ANALYSIS_FAILED_MESSAGE;
use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the reserved top-level field that signals failure.
pub const ERROR_FIELD: &str = "error";

/// One top-level value from the service's JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(a) => FieldValue::Array(a),
            Value::Object(o) => FieldValue::Object(o),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => Value::Number(n),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Array(a) => Value::Array(a),
            FieldValue::Object(o) => Value::Object(o),
        }
    }
}

impl FieldValue {
    /// Text shown next to the field label.
    ///
    /// Scalars print bare (strings without quotes); nested arrays and objects
    /// print as two-space indented JSON.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Null => "null".to_string(),
            FieldValue::Array(a) => pretty(&Value::Array(a.clone())),
            FieldValue::Object(o) => pretty(&Value::Object(o.clone())),
        }
    }

    /// Whether the value is nested (rendered as a JSON block).
    pub fn is_structured(&self) -> bool {
        matches!(self, FieldValue::Array(_) | FieldValue::Object(_))
    }

    /// JavaScript-style truthiness, used to decide if a reserved `error`
    /// field actually signals failure.
    fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Array(_) | FieldValue::Object(_) => true,
        }
    }
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

/// A named top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    /// The field name as shown to the user: underscores become spaces.
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Outcome of a completed analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// The service's fields, in response order.
    Fields(Vec<Field>),
    /// The error marker with the message to show.
    Error(String),
    /// The service answered with a truthy top-level `error`. Every field is
    /// kept; `message` is the `error` field's text.
    Rejected { message: String, fields: Vec<Field> },
}

impl AnalysisResult {
    /// The static error marker used for every failed request.
    pub fn failed() -> Self {
        AnalysisResult::Error(ANALYSIS_FAILED_MESSAGE.to_string())
    }

    /// Interpret a successfully parsed response object.
    ///
    /// A truthy top-level `error` field makes it [`AnalysisResult::Rejected`]:
    /// it renders as an error with that field's text, but the object is kept.
    pub fn from_object(object: Map<String, Value>) -> Self {
        let fields: Vec<Field> = object
            .into_iter()
            .map(|(name, value)| Field {
                name,
                value: value.into(),
            })
            .collect();

        let message = fields
            .iter()
            .find(|f| f.name == ERROR_FIELD && f.value.is_truthy())
            .map(|f| f.value.display_text());

        match message {
            Some(message) => AnalysisResult::Rejected { message, fields },
            None => AnalysisResult::Fields(fields),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    /// Every field the service sent; empty for the static error marker.
    pub fn fields(&self) -> &[Field] {
        match self {
            AnalysisResult::Fields(f) | AnalysisResult::Rejected { fields: f, .. } => f,
            AnalysisResult::Error(_) => &[],
        }
    }

    /// The message to show in place of the fields, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisResult::Error(m) | AnalysisResult::Rejected { message: m, .. } => Some(m),
            AnalysisResult::Fields(_) => None,
        }
    }

    /// Back to JSON: the object the service sent, or `{"error": message}`
    /// for the static marker.
    pub fn to_json(&self) -> Value {
        match self {
            AnalysisResult::Fields(fields) | AnalysisResult::Rejected { fields, .. } => {
                Value::Object(
                    fields
                        .iter()
                        .map(|f| (f.name.clone(), Value::from(f.value.clone())))
                        .collect(),
                )
            }
            AnalysisResult::Error(m) => {
                let mut obj = Map::new();
                obj.insert(ERROR_FIELD.to_string(), Value::String(m.clone()));
                Value::Object(obj)
            }
        }
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
