use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use bunq_api_base::{
    ApiErrorResponse, Error, HttpRequest, HttpResponse, Method, StatusCode, Transport,
    canonical::{
        HEADER_AUTHENTICATION, HEADER_CLIENT_SIGNATURE, HEADER_SERVER_SIGNATURE, canonical_request,
        canonical_response,
    },
};
use bunq_crypto::{KeyMaterial, PublicKey};
use serde_json::{Value, json};

use crate::fixtures;

const INSTALLATION_PATH: &str = "/v1/installation";
const DEVICE_SERVER_PATH: &str = "/v1/device-server";
const SESSION_SERVER_PATH: &str = "/v1/session-server";
const CREATED: &str = "2024-05-01 12:00:00.000000";

/// In-memory stand-in for the bunq API.
///
/// Accepts requests signed with [`fixtures::key`] and authenticated with
/// [`fixtures::INSTALLATION_TOKEN`] (for device registration and the session handshake) or a
/// session token it issued. Every response is signed with [`fixtures::server_key`].
pub struct FakeBunqServer {
    state: Mutex<ServerState>,
    handshake_delay: Option<Duration>,
}

struct ServerState {
    client_key: PublicKey,
    server_key: KeyMaterial,
    handshakes: usize,
    active_sessions: HashSet<String>,
    reject_sessions: bool,
    disconnected: bool,
    requests: Vec<HttpRequest>,
    resources: HashMap<(Method, String), Value>,
}

impl Default for FakeBunqServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBunqServer {
    /// Server with the fixture installation and the fixture user, account and payments.
    pub fn new() -> Self {
        let payments = format!(
            "/v1/user/{}/monetary-account/{}/payment",
            fixtures::USER_ID,
            fixtures::ACCOUNT_ID
        );
        let resources = HashMap::from([
            (
                (Method::Get, "/v1/user".to_string()),
                fixtures::user_response(),
            ),
            (
                (
                    Method::Get,
                    format!("/v1/user/{}/monetary-account-bank", fixtures::USER_ID),
                ),
                fixtures::monetary_account_bank_response(),
            ),
            ((Method::Get, payments.clone()), fixtures::payments_response()),
            ((Method::Post, payments), fixtures::send_payment_response()),
        ]);

        Self {
            state: Mutex::new(ServerState {
                client_key: fixtures::key().public_key(),
                server_key: fixtures::server_key(),
                handshakes: 0,
                active_sessions: HashSet::new(),
                reject_sessions: false,
                disconnected: false,
                requests: Vec::new(),
                resources,
            }),
            handshake_delay: None,
        }
    }

    /// Delay every session handshake, so concurrent callers overlap.
    pub fn with_handshake_delay(mut self, delay: Duration) -> Self {
        self.handshake_delay = Some(delay);
        self
    }

    /// Number of session handshakes that returned a token.
    pub fn handshake_count(&self) -> usize {
        self.state().handshakes
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    /// Forget all issued session tokens, as if they expired.
    pub fn expire_sessions(&self) {
        self.state().active_sessions.clear();
    }

    /// Answer every session-authenticated request with `401`, including those using fresh
    /// tokens.
    pub fn reject_sessions(&self, reject: bool) {
        self.state().reject_sessions = reject;
    }

    /// Fail every request with [`Error::NotConnected`].
    pub fn disconnect(&self, disconnected: bool) {
        self.state().disconnected = disconnected;
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().expect("Mutex is not poisoned")
    }
}

#[async_trait::async_trait]
impl Transport for FakeBunqServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        if request.method == Method::Post && request.path == SESSION_SERVER_PATH {
            if let Some(delay) = self.handshake_delay {
                tokio::time::sleep(delay).await;
            }
        }

        let mut state = self.state();
        if state.disconnected {
            return Err(Error::NotConnected("connection refused".to_string()));
        }
        state.requests.push(request.clone());

        let response = state.handle(&request);
        Ok(state.sign(response))
    }
}

impl ServerState {
    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        // Installation is the only unsigned call
        if request.method == Method::Post && request.path == INSTALLATION_PATH {
            return self.install();
        }

        if !self.signature_is_valid(request) {
            return error(StatusCode::BAD_REQUEST, "The request signature is invalid.");
        }

        let authentication = request.header(HEADER_AUTHENTICATION).unwrap_or_default();
        match (request.method, request.path.as_str()) {
            (Method::Post, DEVICE_SERVER_PATH) | (Method::Post, SESSION_SERVER_PATH)
                if authentication != fixtures::INSTALLATION_TOKEN =>
            {
                error(StatusCode::UNAUTHORIZED, "Insufficient authorisation.")
            }
            (Method::Post, DEVICE_SERVER_PATH) | (Method::Post, SESSION_SERVER_PATH)
                if !secret_matches(request) =>
            {
                error(StatusCode::BAD_REQUEST, "The device-server secret is incorrect.")
            }
            (Method::Post, DEVICE_SERVER_PATH) => ok(json!({"Response": [
                {"Id": {"id": fixtures::DEVICE_ID}},
            ]})),
            (Method::Post, SESSION_SERVER_PATH) => self.open_session(),
            _ if self.reject_sessions || !self.active_sessions.contains(authentication) => {
                error(StatusCode::UNAUTHORIZED, "Insufficient authorisation.")
            }
            (method, path) => match self.resources.get(&(method, path.to_string())) {
                Some(body) => ok(body.clone()),
                None => error(StatusCode::NOT_FOUND, "Route not found."),
            },
        }
    }

    fn install(&self) -> HttpResponse {
        let server_public_key = self
            .server_key
            .public_key()
            .to_pem()
            .expect("fixture key encodes");
        ok(json!({"Response": [
            {"Id": {"id": fixtures::INSTALLATION_ID}},
            {"Token": {
                "id": 2,
                "created": CREATED,
                "updated": CREATED,
                "token": fixtures::INSTALLATION_TOKEN,
            }},
            {"ServerPublicKey": {"server_public_key": server_public_key}},
        ]}))
    }

    fn open_session(&mut self) -> HttpResponse {
        self.handshakes += 1;
        let token = format!("session-token-{}", self.handshakes);
        self.active_sessions.insert(token.clone());

        ok(json!({"Response": [
            {"Id": {"id": 100 + self.handshakes}},
            {"Token": {
                "id": 200 + self.handshakes,
                "created": CREATED,
                "updated": CREATED,
                "token": token,
            }},
            {"UserCompany": fixtures::user_response()["Response"][0]["UserCompany"].clone()},
        ]}))
    }

    fn signature_is_valid(&self, request: &HttpRequest) -> bool {
        request
            .header(HEADER_CLIENT_SIGNATURE)
            .is_some_and(|signature| {
                self.client_key
                    .verify_base64(&canonical_request(request), signature)
                    .is_ok()
            })
    }

    fn sign(&self, mut response: HttpResponse) -> HttpResponse {
        response.headers.insert(
            "x-bunq-client-response-id".to_string(),
            format!("response-{}", self.requests.len()),
        );
        let signature = self
            .server_key
            .sign_base64(&canonical_response(&response))
            .expect("fixture key signs");
        response
            .headers
            .insert(HEADER_SERVER_SIGNATURE.to_lowercase(), signature);
        response
    }
}

fn secret_matches(request: &HttpRequest) -> bool {
    serde_json::from_slice::<Value>(&request.body)
        .ok()
        .is_some_and(|body| body["secret"] == fixtures::DEVICE_SERVER_SECRET)
}

fn ok(body: Value) -> HttpResponse {
    HttpResponse::json_body(StatusCode::OK, &body)
}

fn error(status: StatusCode, description: &str) -> HttpResponse {
    HttpResponse::json_body(
        status,
        &serde_json::to_value(ApiErrorResponse::single(description))
            .expect("error body serializes"),
    )
}
