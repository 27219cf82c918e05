use std::fmt;

use bunq_crypto::{KeyMaterial, PublicKey};
use sha2::{Digest, Sha256};

/// Everything that identifies this device to bunq: the installation token, the device-server
/// secret and the key the installation was registered with.
///
/// Constructed once and shared read-only by the session manager and the request client.
#[derive(Clone)]
pub struct InstallationContext {
    installation_token: String,
    device_server_secret: String,
    key: KeyMaterial,
    server_public_key: Option<PublicKey>,
}

impl InstallationContext {
    #[allow(missing_docs)]
    pub fn new(
        installation_token: impl Into<String>,
        device_server_secret: impl Into<String>,
        key: KeyMaterial,
    ) -> Self {
        Self {
            installation_token: installation_token.into(),
            device_server_secret: device_server_secret.into(),
            key,
            server_public_key: None,
        }
    }

    /// Verify the session handshake response against the key bunq returned at installation.
    pub fn with_server_public_key(mut self, server_public_key: PublicKey) -> Self {
        self.server_public_key = Some(server_public_key);
        self
    }

    #[allow(missing_docs)]
    pub fn installation_token(&self) -> &str {
        &self.installation_token
    }

    #[allow(missing_docs)]
    pub fn device_server_secret(&self) -> &str {
        &self.device_server_secret
    }

    #[allow(missing_docs)]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    #[allow(missing_docs)]
    pub fn server_public_key(&self) -> Option<&PublicKey> {
        self.server_public_key.as_ref()
    }

    /// Stable identifier of the installation, safe to persist: hex encoded SHA-256 of the
    /// installation token.
    pub fn installation_id(&self) -> String {
        hex::encode(Sha256::digest(self.installation_token.as_bytes()))
    }
}

// We manually implement these to make sure we don't print any sensitive data
impl fmt::Debug for InstallationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationContext")
            .field("installation_id", &self.installation_id())
            .field("key", &self.key)
            .field("server_public_key", &self.server_public_key)
            .finish()
    }
}
