//! The `session-server` handshake.

use bunq_api_base::{HttpResponse, Method, Transport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use super::SessionToken;
use crate::{
    ClientSettings, InstallationContext,
    error::{AuthenticationError, SessionCreationError, SessionError},
    response::{Rejection, ResponseEnvelope, classify_rejection, error_message},
    signing::{prepare_request, sign_request, verify_response},
};

pub(super) const SESSION_SERVER_PATH: &str = "/v1/session-server";

const USER_OBJECT_TYPES: &[&str] = &[
    "UserCompany",
    "UserPerson",
    "UserApiKey",
    "UserPaymentServiceProvider",
];

#[derive(Serialize)]
struct SessionServerRequest<'a> {
    secret: &'a str,
}

/// Open a new session with the device-server secret, authenticated with the installation token.
#[instrument(skip_all, err)]
pub(super) async fn create_session(
    settings: &ClientSettings,
    context: &InstallationContext,
    transport: &dyn Transport,
) -> Result<SessionToken, SessionError> {
    let body = serde_json::to_vec(&SessionServerRequest {
        secret: context.device_server_secret(),
    })
    .map_err(|e| SessionCreationError {
        status: None,
        message: e.to_string(),
    })?;

    let mut request = prepare_request(
        settings,
        Method::Post,
        SESSION_SERVER_PATH,
        body,
        Some(context.installation_token()),
    );
    sign_request(&mut request, context.key())?;

    let response = transport
        .send(request)
        .await
        .map_err(|e| SessionCreationError {
            status: None,
            message: e.to_string(),
        })?;

    if let Some(Rejection::Signature(_)) = classify_rejection(&response) {
        return Err(AuthenticationError.into());
    }
    if !response.is_success() {
        return Err(SessionCreationError {
            status: Some(response.status),
            message: error_message(&response),
        }
        .into());
    }

    if let Some(server_key) = context.server_public_key() {
        verify_response(&response, server_key).map_err(|_| SessionCreationError {
            status: Some(response.status),
            message: "Server signature of the session response does not verify".to_string(),
        })?;
    }

    let token = parse_session_token(&response)?;
    info!(session_id = ?token.session_id, "Created new session");
    Ok(token)
}

fn parse_session_token(response: &HttpResponse) -> Result<SessionToken, SessionCreationError> {
    let missing = |what: &str| SessionCreationError {
        status: Some(response.status),
        message: format!("Session response is missing {what}"),
    };

    let envelope = ResponseEnvelope::parse(response).ok_or_else(|| missing("a Response list"))?;
    let token = envelope
        .find("Token")
        .ok_or_else(|| missing("the Token object"))?;
    let value = token["token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("the token value"))?;

    // bunq formats timestamps as `2017-07-26 11:34:06.000000`, always in UTC
    let created_at = token["created"]
        .as_str()
        .and_then(|c| chrono::NaiveDateTime::parse_from_str(c, "%Y-%m-%d %H:%M:%S%.f").ok())
        .map(|c| DateTime::<Utc>::from_naive_utc_and_offset(c, Utc))
        .unwrap_or_else(Utc::now);

    Ok(SessionToken {
        value: value.to_string(),
        created_at,
        session_id: envelope.find("Id").and_then(|id| id["id"].as_u64()),
        user_id: envelope
            .find_any(USER_OBJECT_TYPES)
            .and_then(|user| user["id"].as_u64()),
    })
}

#[cfg(test)]
mod tests {
    use bunq_api_base::StatusCode;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_session_token() {
        let response = HttpResponse::json_body(
            StatusCode::OK,
            &serde_json::json!({"Response": [
                {"Id": {"id": 7}},
                {"Token": {
                    "id": 8,
                    "created": "2017-07-26 11:34:06.000000",
                    "updated": "2017-07-26 11:34:06.000000",
                    "token": "session-token",
                }},
                {"UserCompany": {"id": 42, "name": "bunq"}},
            ]}),
        );

        let token = parse_session_token(&response).unwrap();
        assert_eq!(
            token,
            SessionToken {
                value: "session-token".to_string(),
                created_at: Utc.with_ymd_and_hms(2017, 7, 26, 11, 34, 6).unwrap(),
                session_id: Some(7),
                user_id: Some(42),
            }
        );
    }

    #[test]
    fn test_parse_session_token_missing_token() {
        let response = HttpResponse::json_body(
            StatusCode::OK,
            &serde_json::json!({"Response": [{"Id": {"id": 7}}]}),
        );

        let error = parse_session_token(&response).unwrap_err();
        assert_eq!(error.status, Some(StatusCode::OK));
        assert_eq!(error.message, "Session response is missing the Token object");
    }

    #[test]
    fn test_parse_session_token_not_json() {
        let response = HttpResponse::new(StatusCode::OK, "<html></html>");
        assert!(parse_session_token(&response).is_err());
    }
}
