//! Typed request/response shapes for the chat completions wire contract.
//!
//! Validation here is structural only: fields must exist with the right
//! primitive type, but no semantic checks are applied (`role` is not matched
//! against a known enumeration and `model` is not resolved). Unknown fields in
//! server payloads are ignored so responses from newer server versions keep
//! parsing. Every boundary check collects *all* violations before failing,
//! rather than stopping at the first one.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, Violation};

/// One turn in a conversation, tagged with a role and text content.
///
/// Immutable value type; both fields are required but may be empty strings.
///
/// # Examples
///
/// ```
/// use kaiwa::schema::Message;
///
/// let msg = Message::user("what is the meaning of life ?");
/// assert_eq!(msg.role, "user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Conversation role such as `system`, `user`, or `assistant`.
    pub role: String,
    /// Plain UTF-8 text content.
    pub content: String,
}

impl Message {
    /// Creates a message with an arbitrary role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// 构造 system 角色消息
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// 构造 user 角色消息
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// 构造 assistant 角色消息
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Validates an untyped JSON value as a message.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] naming each field that is missing
    /// or not a string.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let mut violations = Vec::new();
        let message = check_message(value, "", &mut violations);
        finish(message, violations)
    }
}

/// Request body for a single completions call.
///
/// Field values mirror the constructor inputs exactly; no defaulting or
/// mutation happens on construction, and message order is preserved through
/// serialization. Ephemeral: built once per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    /// Name of the model asked to complete the conversation.
    pub model: String,
    /// Conversation turns in order.
    pub messages: Vec<Message>,
}

impl ChatCompletionRequest {
    /// Creates a request from already-typed parts.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }

    /// Validates an untyped JSON body of the shape `{"model", "messages"}`.
    ///
    /// This is the dynamic-boundary entry point used when request data arrives
    /// as decoded JSON instead of typed values.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] listing every violation: a missing
    /// or non-string `model`, a missing or non-array `messages`, and each
    /// element that fails [`Message`] validation.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let mut violations = Vec::new();

        let Some(obj) = as_object(value, "", &mut violations) else {
            return Err(ClientError::validation(violations));
        };

        let model = require_string(obj, "model", "", &mut violations);
        let messages = match obj.get("messages") {
            None => {
                violations.push(Violation::new("messages", "missing required field"));
                None
            }
            Some(Value::Array(items)) => {
                let mut parsed = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    if let Some(message) =
                        check_message(item, &format!("messages[{i}]"), &mut violations)
                    {
                        parsed.push(message);
                    }
                }
                Some(parsed)
            }
            Some(other) => {
                violations.push(Violation::new(
                    "messages",
                    format!("expected array, found {}", json_type(other)),
                ));
                None
            }
        };

        let request = match (model, messages) {
            (Some(model), Some(messages)) => Some(Self { model, messages }),
            _ => None,
        };
        finish(request, violations)
    }
}

/// One candidate completion returned by the server.
///
/// `index` is informational only; callers conventionally pick `choices[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseChoice {
    /// Position of this choice within the response.
    pub index: u64,
    /// The model-generated reply.
    pub message: Message,
}

/// Fully-typed completions response handed back to the caller.
///
/// Built from decoded server JSON; ownership transfers to the caller and the
/// value is never mutated afterwards. An empty `choices` list is accepted at
/// parse time — whether that constitutes a usable reply is a caller concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletionResponse {
    /// Server-assigned identifier for this completion.
    pub id: String,
    /// Object discriminator, typically `chat.completion`.
    pub object: String,
    /// Creation time as a unix timestamp in seconds.
    pub created: u64,
    /// Model that actually served the request.
    pub model: String,
    /// Candidate completions in server order.
    pub choices: Vec<ResponseChoice>,
}

impl ChatCompletionResponse {
    /// Validates decoded server JSON as a completions response.
    ///
    /// Extra or unknown fields anywhere in the payload are ignored so the
    /// client keeps working when the server adds fields.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] enumerating every field that is
    /// missing or mistyped, including nested `choices[i].message` failures.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let mut violations = Vec::new();

        let Some(obj) = as_object(value, "", &mut violations) else {
            return Err(ClientError::validation(violations));
        };

        let id = require_string(obj, "id", "", &mut violations);
        let object = require_string(obj, "object", "", &mut violations);
        let created = require_integer(obj, "created", "", &mut violations);
        let model = require_string(obj, "model", "", &mut violations);
        let choices = match obj.get("choices") {
            None => {
                violations.push(Violation::new("choices", "missing required field"));
                None
            }
            Some(Value::Array(items)) => {
                let mut parsed = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    if let Some(choice) =
                        check_choice(item, &format!("choices[{i}]"), &mut violations)
                    {
                        parsed.push(choice);
                    }
                }
                Some(parsed)
            }
            Some(other) => {
                violations.push(Violation::new(
                    "choices",
                    format!("expected array, found {}", json_type(other)),
                ));
                None
            }
        };

        let response = match (id, object, created, model, choices) {
            (Some(id), Some(object), Some(created), Some(model), Some(choices)) => Some(Self {
                id,
                object,
                created,
                model,
                choices,
            }),
            _ => None,
        };
        finish(response, violations)
    }
}

fn check_message(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<Message> {
    let obj = as_object(value, path, violations)?;
    let role = require_string(obj, "role", path, violations);
    let content = require_string(obj, "content", path, violations);
    Some(Message {
        role: role?,
        content: content?,
    })
}

fn check_choice(
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<ResponseChoice> {
    let obj = as_object(value, path, violations)?;
    let index = require_integer(obj, "index", path, violations);
    let message = match obj.get("message") {
        None => {
            violations.push(Violation::new(join(path, "message"), "missing required field"));
            None
        }
        Some(inner) => check_message(inner, &join(path, "message"), violations),
    };
    Some(ResponseChoice {
        index: index?,
        message: message?,
    })
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(obj) => Some(obj),
        other => {
            let path = if path.is_empty() { "$" } else { path };
            violations.push(Violation::new(
                path,
                format!("expected object, found {}", json_type(other)),
            ));
            None
        }
    }
}

fn require_string(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::new(
                join(path, field),
                format!("expected string, found {}", json_type(other)),
            ));
            None
        }
        None => {
            violations.push(Violation::new(join(path, field), "missing required field"));
            None
        }
    }
}

fn require_integer(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<u64> {
    match obj.get(field) {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(value) => Some(value),
            None => {
                violations.push(Violation::new(
                    join(path, field),
                    "expected non-negative integer",
                ));
                None
            }
        },
        Some(other) => {
            violations.push(Violation::new(
                join(path, field),
                format!("expected integer, found {}", json_type(other)),
            ));
            None
        }
        None => {
            violations.push(Violation::new(join(path, field), "missing required field"));
            None
        }
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn finish<T>(value: Option<T>, violations: Vec<Violation>) -> Result<T, ClientError> {
    match value {
        Some(value) if violations.is_empty() => Ok(value),
        _ => Err(ClientError::validation(violations)),
    }
}
