//! Chat handler: pulls the customer's message out of the JSON body, runs it through the
//! [`Responder`](shop_core::Responder), and stamps the reply with its generation time.
//!
//! The error surface has two cases only. A missing or empty message is a client error; anything
//! else that goes wrong (bad body, non-string message, a panic further down) becomes the same
//! generic server error, with details kept in the log.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::AppState;

pub(crate) const MISSING_INPUT_MESSAGE: &str = "No message provided";
pub(crate) const UNEXPECTED_FAILURE_MESSAGE: &str = "Something went wrong";

/// Boundary errors for `/chat`.
#[derive(Debug)]
pub(crate) enum ChatError {
    /// No message field, or a message that is empty.
    MissingInput,
    /// Anything else. The detail is logged, never returned to the caller.
    UnexpectedFailure(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => f.write_str(MISSING_INPUT_MESSAGE),
            Self::UnexpectedFailure(detail) => write!(f, "unexpected failure: {}", detail),
        }
    }
}

impl std::error::Error for ChatError {}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingInput => {
                tracing::info!(target: "shop::chat", "[Chat] Rejected request without a message");
                (StatusCode::BAD_REQUEST, MISSING_INPUT_MESSAGE)
            }
            Self::UnexpectedFailure(detail) => {
                tracing::error!(target: "shop::chat", detail = %detail, "[Chat] Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_FAILURE_MESSAGE)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Successful chat reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChatResponse {
    pub(crate) response: String,
    /// ISO-8601 local time the reply was generated.
    pub(crate) timestamp: String,
}

impl ChatResponse {
    /// Wraps `response` with the current local time.
    pub(crate) fn now(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            timestamp: chrono::Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

/// Returns the message text from a chat body.
///
/// Absent, `null`, and "empty" values (`""`, `false`, `0`, `[]`, `{}`) are [`ChatError::MissingInput`].
/// A body that is not an object, or a message that is not a string, is an unexpected failure.
pub(crate) fn extract_message(body: &Value) -> Result<&str, ChatError> {
    let fields = body.as_object().ok_or_else(|| {
        ChatError::UnexpectedFailure(format!("request body is not a JSON object: {}", kind(body)))
    })?;
    match fields.get("message") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(ChatError::MissingInput),
        Some(Value::String(s)) if s.is_empty() => Err(ChatError::MissingInput),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(ChatError::MissingInput),
        Some(Value::Array(a)) if a.is_empty() => Err(ChatError::MissingInput),
        Some(Value::Object(o)) if o.is_empty() => Err(ChatError::MissingInput),
        Some(other) => Err(ChatError::UnexpectedFailure(format!(
            "message is not a string: {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// POST /chat – answers one customer message.
pub(crate) async fn chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(body) = body.map_err(|e| ChatError::UnexpectedFailure(e.body_text()))?;
    let message = extract_message(&body)?;

    let correlation_id = uuid::Uuid::new_v4();
    let reply = state.responder.reply(message);
    tracing::info!(
        target: "shop::chat",
        correlation_id = %correlation_id,
        chars = message.chars().count(),
        intent = %reply.intent,
        "[Chat] Reply generated"
    );

    Ok(Json(ChatResponse::now(reply.text)))
}

/// Converts a handler panic into the generic server error.
pub(crate) fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ChatError::UnexpectedFailure(format!("handler panicked: {}", detail)).into_response()
}
