//! One-off steps that precede any session: registering the client key as an installation and
//! registering this device for the installation.

use std::sync::Arc;

use bunq_api_base::{HttpResponse, Method, StatusCode, Transport};
use bunq_crypto::{KeyMaterial, PublicKey};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    ClientSettings, InstallationContext,
    error::{AuthenticationError, MissingFieldError, SetupError},
    response::{Rejection, ResponseEnvelope, classify_rejection, error_message},
    signing::{prepare_request, sign_request},
};

const INSTALLATION_PATH: &str = "/v1/installation";
const DEVICE_SERVER_PATH: &str = "/v1/device-server";

/// Result of [`InstallationSetup::install`].
#[derive(Debug, Clone)]
pub struct Installation {
    #[allow(missing_docs)]
    pub id: Option<u64>,
    /// Token authenticating the device registration and every session handshake.
    pub token: String,
    /// Key the server signs its responses with.
    pub server_public_key: PublicKey,
}

#[derive(Serialize)]
struct InstallationRequest {
    client_public_key: String,
}

#[derive(Serialize)]
struct DeviceServerRequest<'a> {
    description: &'a str,
    secret: &'a str,
    permitted_ips: &'a [String],
}

#[allow(missing_docs)]
pub struct InstallationSetup {
    settings: Arc<ClientSettings>,
    transport: Arc<dyn Transport>,
}

impl InstallationSetup {
    #[allow(missing_docs)]
    pub fn new(settings: ClientSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
        }
    }

    /// Register the public half of `key` with bunq. This request is neither signed nor
    /// authenticated.
    #[instrument(skip_all, err)]
    pub async fn install(&self, key: &KeyMaterial) -> Result<Installation, SetupError> {
        let body = serde_json::to_vec(&InstallationRequest {
            client_public_key: key.public_key().to_pem()?,
        })?;
        let request = prepare_request(&self.settings, Method::Post, INSTALLATION_PATH, body, None);

        let response = self.transport.send(request).await?;
        let envelope = parse_success(&response)?;

        let token = envelope
            .find("Token")
            .and_then(|t| t["token"].as_str())
            .ok_or(MissingFieldError("Token.token"))?;
        let server_public_key = envelope
            .find("ServerPublicKey")
            .and_then(|k| k["server_public_key"].as_str())
            .ok_or(MissingFieldError("ServerPublicKey.server_public_key"))?;

        let installation = Installation {
            id: envelope.find("Id").and_then(|id| id["id"].as_u64()),
            token: token.to_string(),
            server_public_key: PublicKey::from_pem(server_public_key)?,
        };
        info!(id = ?installation.id, "Created installation");
        Ok(installation)
    }

    /// Register this device for the installation, allowing sessions to be opened from
    /// `permitted_ips` (any address when empty). Returns the id of the device.
    #[instrument(skip_all, err)]
    pub async fn register_device(
        &self,
        context: &InstallationContext,
        description: &str,
        permitted_ips: &[String],
    ) -> Result<u64, SetupError> {
        let body = serde_json::to_vec(&DeviceServerRequest {
            description,
            secret: context.device_server_secret(),
            permitted_ips,
        })?;
        let mut request = prepare_request(
            &self.settings,
            Method::Post,
            DEVICE_SERVER_PATH,
            body,
            Some(context.installation_token()),
        );
        sign_request(&mut request, context.key())?;

        let response = self.transport.send(request).await?;
        let envelope = parse_success(&response)?;
        let id = envelope
            .find("Id")
            .and_then(|id| id["id"].as_u64())
            .ok_or(MissingFieldError("Id.id"))?;

        info!(id, "Registered device");
        Ok(id)
    }
}

fn parse_success(response: &HttpResponse) -> Result<ResponseEnvelope, SetupError> {
    match classify_rejection(response) {
        Some(Rejection::Signature(_)) => return Err(AuthenticationError.into()),
        Some(Rejection::Session(message)) => {
            return Err(SetupError::ResponseContent {
                status: StatusCode::UNAUTHORIZED,
                message,
            })
        }
        None => {}
    }
    if !response.is_success() {
        return Err(SetupError::ResponseContent {
            status: response.status,
            message: error_message(response),
        });
    }

    Ok(ResponseEnvelope::parse(response).ok_or(MissingFieldError("Response"))?)
}
