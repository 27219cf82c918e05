//! Interpretation of bunq response bodies.

use std::collections::HashMap;

use bunq_api_base::{ApiErrorResponse, HttpResponse, StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// Successful bunq responses wrap their objects as `{"Response": [{"<Type>": {...}}, ...]}`.
#[derive(Deserialize, Debug)]
pub(crate) struct ResponseEnvelope {
    #[serde(rename = "Response", default)]
    items: Vec<HashMap<String, Value>>,
}

impl ResponseEnvelope {
    pub(crate) fn parse(response: &HttpResponse) -> Option<Self> {
        response.json().ok()
    }

    /// First object of the given type.
    pub(crate) fn find(&self, object_type: &str) -> Option<&Value> {
        self.items.iter().find_map(|item| item.get(object_type))
    }

    /// First object of any of the given types.
    pub(crate) fn find_any(&self, object_types: &[&str]) -> Option<&Value> {
        object_types.iter().find_map(|t| self.find(t))
    }
}

/// Why the server refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// The request signature did not verify against the installation key.
    Signature(String),
    /// The authentication token is unknown or expired.
    Session(String),
}

/// Description the server gave for a failed response, or the raw body when it is not a bunq error
/// document.
pub(crate) fn error_message(response: &HttpResponse) -> String {
    match ApiErrorResponse::parse(&response.body) {
        Some(error) => error.message(),
        None => response.text(),
    }
}

const INVALIDITY_WORDS: &[&str] = &[
    "invalid",
    "wrong",
    "incorrect",
    "not valid",
    "does not match",
    "mismatch",
];

fn is_auth_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

/// Whether the description says the signature itself failed, as opposed to merely naming a field
/// that contains the word.
fn describes_bad_signature(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("signature") && INVALIDITY_WORDS.iter().any(|word| message.contains(word))
}

pub(crate) fn classify_rejection(response: &HttpResponse) -> Option<Rejection> {
    if response.is_success() {
        return None;
    }

    let message = error_message(response);
    if is_auth_status(response.status) && describes_bad_signature(&message) {
        Some(Rejection::Signature(message))
    } else if response.status == StatusCode::UNAUTHORIZED {
        Some(Rejection::Session(message))
    } else {
        None
    }
}
