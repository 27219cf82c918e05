//! Canonical message construction for request and response signatures.
//!
//! A request is signed over
//!
//! ```text
//! {METHOD} {path}\n
//! {Header}: {value}\n      (Cache-Control, User-Agent and X-Bunq-*, sorted by name)
//! \n
//! {body}
//! ```
//!
//! and a response over the status code, the `X-Bunq-*` headers and the body, in the same layout.
//! The signature headers themselves are never part of the message.

use crate::{Headers, HttpRequest, HttpResponse};

#[allow(missing_docs)]
pub const HEADER_CACHE_CONTROL: &str = "Cache-Control";
#[allow(missing_docs)]
pub const HEADER_USER_AGENT: &str = "User-Agent";
#[allow(missing_docs)]
pub const HEADER_AUTHENTICATION: &str = "X-Bunq-Client-Authentication";
#[allow(missing_docs)]
pub const HEADER_CLIENT_SIGNATURE: &str = "X-Bunq-Client-Signature";
#[allow(missing_docs)]
pub const HEADER_REQUEST_ID: &str = "X-Bunq-Client-Request-Id";
#[allow(missing_docs)]
pub const HEADER_GEOLOCATION: &str = "X-Bunq-Geolocation";
#[allow(missing_docs)]
pub const HEADER_LANGUAGE: &str = "X-Bunq-Language";
#[allow(missing_docs)]
pub const HEADER_REGION: &str = "X-Bunq-Region";
#[allow(missing_docs)]
pub const HEADER_SERVER_SIGNATURE: &str = "X-Bunq-Server-Signature";

const BUNQ_HEADER_PREFIX: &str = "x-bunq-";

/// Normalise a header name to `Word-Word` casing, so that lower-cased names as returned by HTTP
/// clients produce the same message as the server computed.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn is_bunq_header(name: &str) -> bool {
    name.as_bytes()
        .get(..BUNQ_HEADER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BUNQ_HEADER_PREFIX.as_bytes()))
}

fn write_headers(message: &mut String, headers: &Headers, include: impl Fn(&str) -> bool) {
    let mut selected: Vec<(String, &str)> = headers
        .iter()
        .filter(|(name, _)| include(name))
        .map(|(name, value)| (canonical_header_name(name), value.as_str()))
        .collect();
    selected.sort();

    for (name, value) in selected {
        message.push_str(&name);
        message.push_str(": ");
        message.push_str(value);
        message.push('\n');
    }
    message.push('\n');
}

/// The exact bytes a client signs for `request`.
pub fn canonical_request(request: &HttpRequest) -> Vec<u8> {
    let mut message = format!("{} {}\n", request.method, request.path);
    write_headers(&mut message, &request.headers, |name| {
        !name.eq_ignore_ascii_case(HEADER_CLIENT_SIGNATURE)
            && (name.eq_ignore_ascii_case(HEADER_CACHE_CONTROL)
                || name.eq_ignore_ascii_case(HEADER_USER_AGENT)
                || is_bunq_header(name))
    });

    let mut bytes = message.into_bytes();
    bytes.extend_from_slice(&request.body);
    bytes
}

/// The exact bytes the server signs for `response`.
pub fn canonical_response(response: &HttpResponse) -> Vec<u8> {
    let mut message = format!("{}\n", response.status.as_u16());
    write_headers(&mut message, &response.headers, |name| {
        !name.eq_ignore_ascii_case(HEADER_SERVER_SIGNATURE) && is_bunq_header(name)
    });

    let mut bytes = message.into_bytes();
    bytes.extend_from_slice(&response.body);
    bytes
}
