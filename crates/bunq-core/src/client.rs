use std::sync::Arc;

use bunq_api_base::{HttpResponse, Method, Transport};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    ClientSettings, InstallationContext, SessionManager, SessionStore,
    error::{AuthenticationError, CallError, SessionInvalidError},
    response::{Rejection, classify_rejection, error_message},
    signing::{prepare_request, sign_request},
};

/// Sends signed, session-authenticated requests to bunq.
///
/// Cloning is cheap, all clones share the same session.
#[derive(Clone)]
pub struct SignedRequestClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    settings: Arc<ClientSettings>,
    context: Arc<InstallationContext>,
    transport: Arc<dyn Transport>,
    sessions: SessionManager,
}

enum Outcome {
    Done(Value),
    SessionRejected(String),
}

impl SignedRequestClient {
    #[allow(missing_docs)]
    pub fn new(
        settings: ClientSettings,
        context: InstallationContext,
        transport: Arc<dyn Transport>,
        store: SessionStore,
    ) -> Self {
        let settings = Arc::new(settings);
        let context = Arc::new(context);
        let sessions = SessionManager::new(
            settings.clone(),
            context.clone(),
            transport.clone(),
            store,
        );

        Self {
            inner: Arc::new(InnerClient {
                settings,
                context,
                transport,
                sessions,
            }),
        }
    }

    #[allow(missing_docs)]
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    #[allow(missing_docs)]
    pub fn installation(&self) -> &InstallationContext {
        &self.inner.context
    }

    /// Send a signed request and return the JSON response body.
    ///
    /// When the server rejects the session, the session is renewed and the request is sent once
    /// more. A second rejection is returned as [`SessionInvalidError`].
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CallError> {
        let body = match body {
            Some(body) => serde_json::to_vec(body)?,
            None => Vec::new(),
        };

        let token = self.inner.sessions.ensure_session().await?;
        let message = match self.send(method, path, &body, &token).await? {
            Outcome::Done(value) => return Ok(value),
            Outcome::SessionRejected(message) => message,
        };

        info!(%path, "Session rejected ({message}), renewing session and retrying");
        self.inner.sessions.invalidate(&token)?;
        let token = self.inner.sessions.ensure_session().await?;

        match self.send(method, path, &body, &token).await? {
            Outcome::Done(value) => Ok(value),
            Outcome::SessionRejected(message) => {
                warn!(%path, "Renewed session rejected as well");
                self.inner.sessions.invalidate(&token)?;
                Err(SessionInvalidError { message }.into())
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: &[u8],
        token: &str,
    ) -> Result<Outcome, CallError> {
        let mut request = prepare_request(
            &self.inner.settings,
            method,
            path,
            body.to_vec(),
            Some(token),
        );
        sign_request(&mut request, self.inner.context.key())?;

        let response = self.inner.transport.send(request).await?;
        match classify_rejection(&response) {
            Some(Rejection::Signature(_)) => Err(AuthenticationError.into()),
            Some(Rejection::Session(message)) => Ok(Outcome::SessionRejected(message)),
            None if response.is_success() => Ok(Outcome::Done(parse_body(&response)?)),
            None => Err(CallError::ResponseContent {
                status: response.status,
                message: error_message(&response),
            }),
        }
    }
}

fn parse_body(response: &HttpResponse) -> Result<Value, serde_json::Error> {
    if response.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body)
}
