//! Tool registry: declared input contracts and bound handlers.
//!
//! The registry is populated once at server startup through explicit
//! [`ToolRegistry::register`] calls and is read-only for the rest of the
//! session. Registration order is preserved because it drives the
//! capability-listing output.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::handlers::ToolHandler;
use super::ToolError;

// ============================================================================
// Descriptors
// ============================================================================

/// Immutable description of one registered tool: its name, a human-readable
/// description, and the JSON schema of its input mapping.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Build a descriptor whose input schema is derived from the tool's
    /// params struct.
    pub fn new<P: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: schemars::schema_for!(P).to_value(),
        }
    }
}

/// Attempt to register a second tool under an existing name.
#[derive(Debug, Error)]
#[error("tool already registered: {0}")]
pub struct DuplicateToolError(pub String);

// ============================================================================
// Validation
// ============================================================================

/// One schema violation, naming the offending parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub parameter: String,
    pub reason: String,
}

/// All violations found in one argument mapping. The policy here is to
/// collect every violation rather than stopping at the first, so a caller
/// can fix its request in one round trip.
#[derive(Debug, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.parameter, v.reason))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// An argument mapping that passed schema validation for its tool.
#[derive(Debug, Clone)]
pub struct ValidatedArguments(Map<String, Value>);

impl ValidatedArguments {
    /// Deserialize the arguments into the tool's params struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

// ============================================================================
// Registry
// ============================================================================

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Ordered mapping from tool name to descriptor and bound handler.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), DuplicateToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(DuplicateToolError(descriptor.name.clone()));
        }
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// All descriptors, in registration order.
    pub fn describe(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    /// Handler bound to `name`, if registered.
    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.index.get(name).map(|&i| self.tools[i].handler.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check `arguments` against the declared input schema of `name`.
    ///
    /// Checks required parameters, primitive type conformance, and (for
    /// closed contracts) unrecognized parameters. All violations are
    /// collected into one error.
    pub fn validate(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ValidatedArguments, ValidationError> {
        let Some(&slot) = self.index.get(name) else {
            return Err(ValidationError {
                violations: vec![Violation {
                    parameter: name.to_string(),
                    reason: "tool is not registered".to_string(),
                }],
            });
        };
        let schema = &self.tools[slot].descriptor.input_schema;
        let mut violations = Vec::new();

        let empty = Map::new();
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !arguments.contains_key(name) {
                    violations.push(Violation {
                        parameter: name.to_string(),
                        reason: "required parameter is missing".to_string(),
                    });
                }
            }
        }

        let closed = matches!(
            schema.get("additionalProperties"),
            Some(Value::Bool(false))
        );

        for (key, value) in arguments {
            match properties.get(key) {
                Some(declared) => {
                    if !type_matches(declared, value) {
                        violations.push(Violation {
                            parameter: key.clone(),
                            reason: format!(
                                "expected {}, got {}",
                                declared_type_name(declared),
                                json_type_name(value)
                            ),
                        });
                    }
                }
                None if closed => violations.push(Violation {
                    parameter: key.clone(),
                    reason: "unrecognized parameter".to_string(),
                }),
                None => {}
            }
        }

        if violations.is_empty() {
            Ok(ValidatedArguments(arguments.clone()))
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Does `value` satisfy the `type` constraint of the declared schema?
/// Schemas without a `type` member accept anything.
fn type_matches(declared: &Value, value: &Value) -> bool {
    match declared.get("type") {
        None => true,
        Some(Value::String(ty)) => primitive_matches(ty, value),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|ty| primitive_matches(ty, value)),
        Some(_) => true,
    }
}

fn primitive_matches(ty: &str, value: &Value) -> bool {
    match ty {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn declared_type_name(declared: &Value) -> String {
    match declared.get("type") {
        Some(Value::String(ty)) => ty.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        _ => "any".to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::ContentItem;
    use crate::domains::tools::ToolResult;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct EchoParams {
        text: String,
        count: Option<u32>,
    }

    struct NoopHandler;

    #[async_trait]
    impl ToolHandler for NoopHandler {
        async fn invoke(&self, _args: ValidatedArguments) -> ToolResult {
            Ok(vec![ContentItem::text("ok")])
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDescriptor::new::<EchoParams>("echo", "Echo text back"),
                Arc::new(NoopHandler),
            )
            .unwrap();
        registry
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = registry_with_echo();
        let err = registry
            .register(
                ToolDescriptor::new::<EchoParams>("echo", "again"),
                Arc::new(NoopHandler),
            )
            .unwrap_err();
        assert_eq!(err.0, "echo");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn describe_preserves_registration_order_and_is_idempotent() {
        let mut registry = registry_with_echo();
        registry
            .register(
                ToolDescriptor::new::<EchoParams>("alpha", "first after echo"),
                Arc::new(NoopHandler),
            )
            .unwrap();

        let names: Vec<_> = registry.describe().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["echo", "alpha"]);

        let again: Vec<_> = registry.describe().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn descriptor_schema_declares_required_parameters() {
        let descriptor = ToolDescriptor::new::<EchoParams>("echo", "desc");
        let required = descriptor.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("text")));
        assert!(!required.contains(&json!("count")));
    }

    #[test]
    fn validate_accepts_conforming_arguments() {
        let registry = registry_with_echo();
        let args = json!({"text": "hi", "count": 3});
        let validated = registry
            .validate("echo", args.as_object().unwrap())
            .unwrap();
        assert_eq!(validated.as_map().len(), 2);
    }

    #[test]
    fn validate_reports_missing_required_parameter() {
        let registry = registry_with_echo();
        let args = Map::new();
        let err = registry.validate("echo", &args).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].parameter, "text");
        assert!(err.to_string().contains("text"));
    }

    #[test]
    fn validate_collects_all_violations() {
        let registry = registry_with_echo();
        let args = json!({"count": "three", "extra": true});
        let err = registry
            .validate("echo", args.as_object().unwrap())
            .unwrap_err();

        let parameters: Vec<_> = err.violations.iter().map(|v| v.parameter.clone()).collect();
        assert!(parameters.contains(&"text".to_string()));
        assert!(parameters.contains(&"count".to_string()));
        assert!(parameters.contains(&"extra".to_string()));
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn validate_allows_optional_parameter_absence() {
        let registry = registry_with_echo();
        let args = json!({"text": "hi"});
        assert!(registry.validate("echo", args.as_object().unwrap()).is_ok());
    }

    #[test]
    fn validated_arguments_parse_into_params_struct() {
        let registry = registry_with_echo();
        let args = json!({"text": "hi"});
        let validated = registry
            .validate("echo", args.as_object().unwrap())
            .unwrap();
        let params: EchoParams = validated.parse().unwrap();
        assert_eq!(params.text, "hi");
        assert_eq!(params.count, None);
    }
}
