use std::{collections::BTreeMap, fmt};

use serde::de::DeserializeOwned;

use crate::Error;

/// Header map. Ordered by name so that iteration is stable.
pub type Headers = BTreeMap<String, String>;

/// HTTP methods used by the bunq API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper case method name, as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request ready to be handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    #[allow(missing_docs)]
    pub method: Method,
    /// Absolute path including the API version, e.g. `/v1/session-server`.
    pub path: String,
    #[allow(missing_docs)]
    pub headers: Headers,
    #[allow(missing_docs)]
    pub body: Vec<u8>,
}

impl HttpRequest {
    #[allow(missing_docs)]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The response as received, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    #[allow(missing_docs)]
    pub status: reqwest::StatusCode,
    #[allow(missing_docs)]
    pub headers: Headers,
    #[allow(missing_docs)]
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[allow(missing_docs)]
    pub fn new(status: reqwest::StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Response with a JSON body.
    pub fn json_body(status: reqwest::StatusCode, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string());
        response
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        response
    }

    #[allow(missing_docs)]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
