use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::{Error, Headers, HttpRequest, HttpResponse, Transport};

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport sending requests to `base_url`, e.g. `https://api.bunq.com`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = new_http_client_builder().build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a transport using an existing client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    #[allow(missing_docs)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn new_http_client_builder() -> reqwest::ClientBuilder {
    #[allow(unused_mut)]
    let mut client_builder = reqwest::Client::builder();

    // Enforce HTTPS for all requests in non-debug builds
    #[cfg(not(debug_assertions))]
    {
        client_builder = client_builder.https_only(true);
    }

    client_builder
}

fn to_header_map(headers: &Headers) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || Error::InvalidHeader { name: name.clone() };
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?,
            HeaderValue::from_str(value).map_err(|_| invalid())?,
        );
    }
    Ok(map)
}

fn from_header_map(map: &HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(value) => Some((name.as_str().to_string(), value.to_string())),
            Err(_) => {
                tracing::warn!("Dropping non-ASCII response header {name}");
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, path = %request.path, "Sending request");

        let response = self
            .client
            .request(request.method.into(), url)
            .headers(to_header_map(&request.headers)?)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = from_header_map(response.headers());
        let body = response.bytes().await?.to_vec();
        debug!(%status, path = %request.path, "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    use super::*;
    use crate::Method;

    #[tokio::test]
    async fn test_sends_method_path_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/session-server"))
            .and(matchers::header("X-Bunq-Client-Authentication", "installation"))
            .and(matchers::body_string(r#"{"secret":"s"}"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Bunq-Client-Response-Id", "abc")
                    .set_body_string(r#"{"Response":[]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(server.uri()).unwrap();
        let mut request = HttpRequest::new(Method::Post, "/v1/session-server");
        request.headers.insert(
            "X-Bunq-Client-Authentication".to_string(),
            "installation".to_string(),
        );
        request.body = br#"{"secret":"s"}"#.to_vec();

        let response = transport.send(request).await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.header("X-Bunq-Client-Response-Id"), Some("abc"));
        assert_eq!(response.text(), r#"{"Response":[]}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"Error":[{"error_description":"Insufficient authorisation."}]}"#,
            ))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(format!("{}/", server.uri())).unwrap();
        let response = transport
            .send(HttpRequest::new(Method::Get, "/v1/user"))
            .await
            .unwrap();

        assert_eq!(response.status, reqwest::StatusCode::UNAUTHORIZED);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.path(), "/v1/user");
    }

    #[tokio::test]
    async fn test_invalid_header_is_rejected_before_sending() {
        let transport = ReqwestTransport::new("http://127.0.0.1:9").unwrap();
        let mut request = HttpRequest::new(Method::Get, "/v1/user");
        request
            .headers
            .insert("X-Bunq-Language".to_string(), "en\nUS".to_string());

        let result = transport.send(request).await;
        assert!(matches!(result, Err(Error::InvalidHeader { name }) if name == "X-Bunq-Language"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_connected() {
        // Nothing listens on the discard port in the test environment.
        let transport = ReqwestTransport::new("http://127.0.0.1:9").unwrap();
        let result = transport
            .send(HttpRequest::new(Method::Get, "/v1/user"))
            .await;
        assert!(matches!(result, Err(Error::NotConnected(_))));
    }
}
