//! The fixed JSON schema requested from the model, and a structural
//! validator that checks a reply against that same schema.
//!
//! Only the keywords the funnel schema uses are interpreted: `type`,
//! `properties`, `required`, `items` and `enum`.

use crate::EmailType;
use copyfunnel_sdk::JSONSchema;
use serde_json::{json, Value};
use std::fmt;

/// Schema sent with every generation request.
pub fn funnel_response_schema() -> JSONSchema {
    let email_types: Vec<&str> = EmailType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "strategySummary": {
                "type": "string",
                "description": "A brief paragraph explaining the funnel strategy."
            },
            "landingPage": {
                "type": "object",
                "properties": {
                    "headline": { "type": "string" },
                    "subheadline": { "type": "string" },
                    "heroButton": { "type": "string" },
                    "features": { "type": "array", "items": { "type": "string" } },
                    "testimonials": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Invent 2 realistic testimonials based on the persona."
                    },
                    "cta": { "type": "string" }
                },
                "required": [
                    "headline",
                    "subheadline",
                    "heroButton",
                    "features",
                    "testimonials",
                    "cta"
                ]
            },
            "emails": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": { "type": "string", "enum": email_types },
                        "subject": { "type": "string" },
                        "body": {
                            "type": "string",
                            "description": "The email body content. Use <br> for line breaks if needed."
                        }
                    },
                    "required": ["type", "subject", "body"]
                }
            },
            "ads": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "platform": { "type": "string" },
                        "primaryText": { "type": "string" },
                        "headline": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["platform", "primaryText", "headline", "description"]
                }
            }
        },
        "required": ["strategySummary", "landingPage", "emails", "ads"]
    })
}

/// A single place where a document deviates from its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `$.emails[0].type`.
    pub path: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingField,
    WrongType {
        expected: String,
        found: &'static str,
    },
    NotInEnum {
        value: String,
        allowed: Vec<String>,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::MissingField => write!(f, "{}: missing required field", self.path),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "{}: expected {expected}, found {found}", self.path)
            }
            ViolationKind::NotInEnum { value, allowed } => write!(
                f,
                "{}: {value} is not one of [{}]",
                self.path,
                allowed.join(", ")
            ),
        }
    }
}

/// Check `value` against `schema`, collecting every violation rather than
/// stopping at the first.
pub fn validate(schema: &Value, value: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    check(schema, value, "$", &mut violations);
    violations
}

fn check(schema: &Value, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            out.push(SchemaViolation {
                path: path.to_string(),
                kind: ViolationKind::WrongType {
                    expected: expected.to_string(),
                    found: type_name(value),
                },
            });
            // Children of a mistyped value would only add noise.
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            out.push(SchemaViolation {
                path: path.to_string(),
                kind: ViolationKind::NotInEnum {
                    value: value.to_string(),
                    allowed: allowed.iter().map(enum_label).collect(),
                },
            });
        }
    }

    if let Value::Object(fields) = value {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !fields.contains_key(name) {
                    out.push(SchemaViolation {
                        path: format!("{path}.{name}"),
                        kind: ViolationKind::MissingField,
                    });
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, property_schema) in properties {
                if let Some(field) = fields.get(name) {
                    check(property_schema, field, &format!("{path}.{name}"), out);
                }
            }
        }
    }

    if let (Value::Array(items), Some(item_schema)) = (value, schema.get("items")) {
        for (index, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{path}[{index}]"), out);
        }
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn enum_label(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToString::to_string)
}
