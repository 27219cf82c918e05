//! Request construction and signing.

use bunq_api_base::{
    HttpRequest, HttpResponse, Method,
    canonical::{
        HEADER_AUTHENTICATION, HEADER_CLIENT_SIGNATURE, HEADER_REQUEST_ID, HEADER_SERVER_SIGNATURE,
        canonical_request, canonical_response,
    },
};
use bunq_crypto::{CryptoError, KeyMaterial, PublicKey};
use uuid::Uuid;

use crate::ClientSettings;

/// Build a request carrying the default headers, a fresh request id and, when given, the
/// authentication token. The request is not signed yet.
pub(crate) fn prepare_request(
    settings: &ClientSettings,
    method: Method,
    path: &str,
    body: Vec<u8>,
    authentication: Option<&str>,
) -> HttpRequest {
    let mut request = HttpRequest::new(method, path);
    request.headers = settings.default_headers();
    request
        .headers
        .insert(HEADER_REQUEST_ID.to_string(), Uuid::new_v4().to_string());
    if let Some(token) = authentication {
        request
            .headers
            .insert(HEADER_AUTHENTICATION.to_string(), token.to_string());
    }
    if !body.is_empty() {
        request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
    }
    request.body = body;
    request
}

/// Sign `request` in place, adding the `X-Bunq-Client-Signature` header.
///
/// Any header change after signing invalidates the signature.
pub fn sign_request(request: &mut HttpRequest, key: &KeyMaterial) -> Result<(), CryptoError> {
    let signature = key.sign_base64(&canonical_request(request))?;
    request
        .headers
        .insert(HEADER_CLIENT_SIGNATURE.to_string(), signature);
    Ok(())
}

/// Verify the `X-Bunq-Server-Signature` header of `response` with the server's public key.
pub fn verify_response(response: &HttpResponse, server_key: &PublicKey) -> Result<(), CryptoError> {
    let signature = response
        .header(HEADER_SERVER_SIGNATURE)
        .ok_or(CryptoError::InvalidSignature)?;
    server_key.verify_base64(&canonical_response(response), signature)
}
