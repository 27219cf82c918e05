use std::path::PathBuf;

use thiserror::Error;

/// The private key could not be loaded. Not recoverable without different key material.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("Failed to read key file {}: {source}", path.display())]
    #[allow(missing_docs)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a PKCS#8 nor a PKCS#1 encoded RSA private key.
    #[error("Key is not a valid PEM encoded RSA private key")]
    InvalidPem,
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key")]
    InvalidKey,
    #[error("Invalid signature encoding")]
    InvalidEncoding,
    #[error("Signature does not match the message")]
    InvalidSignature,

    #[error("Rsa error, {0}")]
    Rsa(#[from] rsa::Error),
}

pub(crate) type Result<T, E = CryptoError> = std::result::Result<T, E>;
