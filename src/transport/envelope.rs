//! The `{"error": {"code", "description"}}` envelope present on every response.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ErrorCode;

#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<Value>,
}

/// A failed API call as reported by the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: Option<ErrorCode>,
    pub message: String,
}

/// Decide whether a response is an API failure and describe it.
///
/// HTTP 4xx/5xx always fail. Below that, a string `error.code` other than
/// `SUCCESS` fails; anything else is left to the endpoint decoder.
pub fn decode_api_failure(http_status: u16, body: &str) -> Option<ApiFailure> {
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| match error {
            Value::Object(map) => Some(map),
            _ => None,
        });

    let code = error
        .as_ref()
        .and_then(|error| error.get("code"))
        .and_then(Value::as_str)
        .map(ErrorCode::new);

    let failed = http_status >= 400 || code.as_ref().is_some_and(|code| !code.is_success());
    if !failed {
        return None;
    }

    let description = error.as_ref().and_then(|error| error.get("description"));
    let message = describe(description, code.as_ref(), http_status);
    Some(ApiFailure { code, message })
}

fn describe(description: Option<&Value>, code: Option<&ErrorCode>, http_status: u16) -> String {
    match description {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(details)) => describe_details(details, code),
        Some(Value::Array(items)) => {
            let json = Value::Array(items.clone()).to_string();
            with_code_prefix(code, &json)
        }
        _ => match code {
            Some(code) => format!(
                "API request failed with HTTP {http_status} (error code: {})",
                code.as_str()
            ),
            None => format!("API request failed with HTTP {http_status}"),
        },
    }
}

fn describe_details(details: &serde_json::Map<String, Value>, code: Option<&ErrorCode>) -> String {
    let fails = details.get("fails").filter(|value| !value.is_null());
    let optouts = details.get("optouts").filter(|value| !value.is_null());
    if fails.is_none() && optouts.is_none() {
        return with_code_prefix(code, &Value::Object(details.clone()).to_string());
    }

    let mut parts = Vec::new();
    let fails = list_items(fails);
    if !fails.is_empty() {
        parts.push(format!("invalid numbers: {}", fails.join(", ")));
    }
    let optouts = list_items(optouts);
    if !optouts.is_empty() {
        parts.push(format!("opted-out numbers: {}", optouts.join(", ")));
    }

    if parts.is_empty() {
        return "Recipients error - all recipients are invalid or opted out".to_owned();
    }
    format!("Recipients error - {}", parts.join("; "))
}

fn list_items(value: Option<&Value>) -> Vec<String> {
    let render = |value: &Value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(render).collect(),
        Some(other) => vec![render(other)],
    }
}

fn with_code_prefix(code: Option<&ErrorCode>, json: &str) -> String {
    match code {
        Some(code) => format!("{}: {json}", code.as_str()),
        None => format!("Error details: {json}"),
    }
}
