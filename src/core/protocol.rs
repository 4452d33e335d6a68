//! Wire protocol types for the line-delimited JSON tool protocol.
//!
//! Every message is one JSON object per line. A caller sends either a
//! capability listing request (`{"id": ..., "op": "list_capabilities"}`) or
//! a tool call (`{"id": ..., "toolName": "...", "arguments": {...}}`), and
//! receives exactly one message back for each.
//!
//! Malformed input is never dropped silently: decoding salvages whatever
//! `id` can be recovered from the raw message and the session answers with
//! a `ProtocolError` outcome (id `null` when nothing could be salvaged).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Classification of a failed outcome, distinguishable without parsing
/// free-text messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested tool name is not registered.
    UnknownTool,
    /// The arguments violated the tool's declared input schema.
    InvalidArguments,
    /// The transport message itself was malformed.
    ProtocolError,
    /// A backing subprocess, web service, or filesystem operation failed.
    CollaboratorFailure,
    /// An unexpected fault inside a handler.
    InternalError,
}

/// One piece of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ContentItem {
    /// Plain text (often a JSON document rendered as text).
    Text(String),
    /// Path to a file the tool produced.
    BinaryReference(String),
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn binary_reference(path: impl Into<String>) -> Self {
        Self::BinaryReference(path.into())
    }
}

/// The uniform result of one tool invocation: success with content, or a
/// classified failure. A handler produces exactly one of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ok {
        content: Vec<ContentItem>,
    },
    Error {
        #[serde(rename = "errorKind")]
        kind: ErrorKind,
        message: String,
    },
}

impl Outcome {
    pub fn success(content: Vec<ContentItem>) -> Self {
        Self::Ok { content }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }
}

/// A decoded tool call. The `id` is an opaque correlation token chosen by
/// the caller and echoed back verbatim in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub id: Value,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

/// A well-formed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListCapabilities { id: Value },
    Call(CallRequest),
}

/// Response to a tool call: the originating id plus its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Value,
    pub outcome: Outcome,
}

/// Response to a capability listing: the registered tool descriptors in
/// registration order.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityListing {
    pub id: Value,
    pub tools: Vec<Value>,
}

/// Result of decoding one raw line from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Request(Request),
    /// The line was not a well-formed request. `id` carries whatever
    /// correlation token could be salvaged, `Value::Null` otherwise.
    Malformed { id: Value, reason: String },
}

/// Decode one line into a request, salvaging the id on failure.
pub fn decode_line(line: &str) -> Decoded {
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Decoded::Malformed {
                id: Value::Null,
                reason: format!("invalid JSON: {e}"),
            };
        }
    };

    let Value::Object(mut envelope) = value else {
        return Decoded::Malformed {
            id: Value::Null,
            reason: "message is not a JSON object".to_string(),
        };
    };

    let id = envelope.get("id").cloned().unwrap_or(Value::Null);

    match envelope.remove("toolName") {
        Some(Value::String(tool_name)) => {
            if !envelope.contains_key("id") {
                return Decoded::Malformed {
                    id,
                    reason: "call message is missing 'id'".to_string(),
                };
            }
            let arguments = match envelope.remove("arguments") {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(map)) => map,
                Some(_) => {
                    return Decoded::Malformed {
                        id,
                        reason: "'arguments' must be an object".to_string(),
                    };
                }
            };
            Decoded::Request(Request::Call(CallRequest {
                id,
                tool_name,
                arguments,
            }))
        }
        Some(_) => Decoded::Malformed {
            id,
            reason: "'toolName' must be a string".to_string(),
        },
        None => match envelope.get("op").and_then(Value::as_str) {
            Some("list_capabilities") => Decoded::Request(Request::ListCapabilities { id }),
            Some(op) => Decoded::Malformed {
                id,
                reason: format!("unknown operation: {op}"),
            },
            None => Decoded::Malformed {
                id,
                reason: "message has neither 'toolName' nor 'op'".to_string(),
            },
        },
    }
}
