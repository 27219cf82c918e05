use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{
    Pkcs1v15Sign, RsaPublicKey,
    pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::{
    Fingerprint,
    error::{CryptoError, Result},
};

/// Public half of an RSA key pair. Used to register the client with bunq, and to verify
/// signatures produced by the matching [`KeyMaterial`](crate::KeyMaterial) or by the server.
#[derive(Clone, PartialEq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    pub(crate) fn new(inner: RsaPublicKey) -> Self {
        Self { inner }
    }

    /// Parse a SubjectPublicKeyInfo PEM (`-----BEGIN PUBLIC KEY-----`).
    #[instrument(skip_all, err)]
    pub fn from_pem(pem: &str) -> Result<Self> {
        Ok(Self {
            inner: RsaPublicKey::from_public_key_pem(pem).map_err(|_| CryptoError::InvalidKey)?,
        })
    }

    /// SubjectPublicKeyInfo PEM with `\n` line endings, the format bunq expects as
    /// `client_public_key` when installing.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_public_key_pem(LineEnding::LF)
            .map_err(|_| CryptoError::InvalidKey)
    }

    /// Verify an RSASSA-PKCS1-v1_5 SHA-256 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let digest = Sha256::digest(message);
        self.inner
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    /// Same as [`PublicKey::verify`], with the signature base64 encoded as sent in headers.
    pub fn verify_base64(&self, message: &[u8], signature: &str) -> Result<()> {
        let signature = STANDARD
            .decode(signature.trim())
            .map_err(|_| CryptoError::InvalidEncoding)?;
        self.verify(message, &signature)
    }

    /// Fingerprint over the modulus and public exponent.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_parts(&[self.inner.n().to_bytes_be(), self.inner.e().to_bytes_be()])
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_pem(s)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("fingerprint", &self.fingerprint().to_hex())
            .finish()
    }
}
