use std::sync::{Arc, RwLock};

use bunq_api_base::Transport;
use tracing::{debug, info, warn};

use super::{SessionState, SessionStore, SessionToken, StoreError, handshake::create_session};
use crate::{ClientSettings, InstallationContext, error::SessionError};

/// Owns the session token of one installation.
///
/// A token is looked up in memory first, then in the [`SessionStore`], and only created through
/// the `session-server` handshake when neither has one. Tokens carry no expiry, they are dropped
/// when the server rejects them (see [`SessionManager::invalidate`]).
pub struct SessionManager {
    settings: Arc<ClientSettings>,
    context: Arc<InstallationContext>,
    transport: Arc<dyn Transport>,
    store: SessionStore,

    // Never held across an await point
    state: RwLock<SessionState>,
    // Serializes session creation so that concurrent callers share a single handshake
    handshake: tokio::sync::Mutex<()>,
}

impl SessionManager {
    #[allow(missing_docs)]
    pub fn new(
        settings: Arc<ClientSettings>,
        context: Arc<InstallationContext>,
        transport: Arc<dyn Transport>,
        store: SessionStore,
    ) -> Self {
        Self {
            settings,
            context,
            transport,
            store,
            state: RwLock::new(SessionState::NoSession),
            handshake: tokio::sync::Mutex::new(()),
        }
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> SessionState {
        self.state.read().expect("RwLock is not poisoned").clone()
    }

    /// The token held in memory, or an empty string when there is none. Never touches the store
    /// or the network.
    pub fn current_token(&self) -> String {
        self.active_session()
            .map(|token| token.value)
            .unwrap_or_default()
    }

    /// The session held in memory, if any.
    pub fn active_session(&self) -> Option<SessionToken> {
        match &*self.state.read().expect("RwLock is not poisoned") {
            SessionState::SessionActive(token) => Some(token.clone()),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Return a usable session token, loading or creating one when none is held in memory.
    ///
    /// Repeated calls return the same token until it is invalidated.
    pub async fn ensure_session(&self) -> Result<String, SessionError> {
        if let Some(token) = self.active_session() {
            return Ok(token.value);
        }

        let _guard = self.handshake.lock().await;

        // Another caller may have completed the handshake while we were waiting for the lock
        if let Some(token) = self.active_session() {
            debug!("Using session created by a concurrent caller");
            return Ok(token.value);
        }

        if let Some(token) = self.load_stored_session() {
            info!(session_id = ?token.session_id, "Reusing stored session");
            let value = token.value.clone();
            self.set_state(SessionState::SessionActive(token));
            return Ok(value);
        }

        self.set_state(SessionState::SessionRequested);
        let token = match create_session(&self.settings, &self.context, &*self.transport).await {
            Ok(token) => token,
            Err(e) => {
                self.set_state(SessionState::NoSession);
                return Err(e);
            }
        };

        let mut state = self.state.write().expect("RwLock is not poisoned");
        if let Err(e) = self
            .store
            .save(&token.to_record(self.context.installation_id()))
        {
            *state = SessionState::NoSession;
            return Err(e.into());
        }
        let value = token.value.clone();
        *state = SessionState::SessionActive(token);
        Ok(value)
    }

    /// Drop `rejected_token` from memory and from the store after the server refused it.
    ///
    /// A token that has already been replaced by a newer one is left untouched, so callers that
    /// saw the same rejection concurrently only discard it once.
    pub fn invalidate(&self, rejected_token: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("RwLock is not poisoned");

        match &*state {
            SessionState::SessionActive(token) if token.value == rejected_token => {
                info!(session_id = ?token.session_id, "Invalidating rejected session");
                *state = SessionState::NoSession;
            }
            SessionState::SessionActive(_) => {
                debug!("Rejected session was already replaced");
                return Ok(());
            }
            _ => {}
        }

        match self.store.load() {
            Ok(Some(record)) if record.token == rejected_token => self.store.clear(),
            _ => Ok(()),
        }
    }

    /// Forget the current session, in memory and in the store, whatever its value.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("RwLock is not poisoned");
        *state = SessionState::NoSession;
        self.store.clear()
    }

    fn set_state(&self, new_state: SessionState) {
        *self.state.write().expect("RwLock is not poisoned") = new_state;
    }

    /// Stored session issued to this installation. Unusable records are logged and ignored, the
    /// caller then creates a new session which overwrites them.
    fn load_stored_session(&self) -> Option<SessionToken> {
        match self.store.load() {
            Ok(Some(record)) if record.installation_id == self.context.installation_id() => {
                Some(record.into())
            }
            Ok(Some(_)) => {
                warn!("Ignoring stored session issued to a different installation");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unusable stored session: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bunq_crypto::KeyMaterial;
    use bunq_test::{FakeBunqServer, fixtures};
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::{error::AuthenticationError, session::SessionRecord};

    fn context(key: KeyMaterial) -> Arc<InstallationContext> {
        Arc::new(InstallationContext::new(
            fixtures::INSTALLATION_TOKEN,
            fixtures::DEVICE_SERVER_SECRET,
            key,
        ))
    }

    fn manager(server: &Arc<FakeBunqServer>, key: KeyMaterial, dir: &TempDir) -> SessionManager {
        SessionManager::new(
            Arc::new(ClientSettings::default()),
            context(key),
            server.clone(),
            SessionStore::new(dir.path().join("bunqSession.json"))
                .with_history_dir(dir.path().join("sessions")),
        )
    }

    #[tokio::test]
    async fn test_no_token_before_ensure_session() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);

        assert_eq!(sessions.current_token(), "");
        assert_eq!(sessions.state(), SessionState::NoSession);

        let token = sessions.ensure_session().await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(sessions.current_token(), token);
    }

    #[tokio::test]
    async fn test_handshake_creates_and_persists_session() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);

        let token = sessions.ensure_session().await.unwrap();

        assert_eq!(server.handshake_count(), 1);
        let record = sessions.store().load().unwrap().unwrap();
        assert_eq!(record.token, token);
        assert_eq!(record.installation_id, context(fixtures::key()).installation_id());
        assert_eq!(record.user_id, Some(fixtures::USER_ID));
        assert!(matches!(sessions.state(), SessionState::SessionActive(t) if t.value == token));
    }

    #[tokio::test]
    async fn test_repeated_calls_return_the_same_token() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);

        let first = sessions.ensure_session().await.unwrap();
        let second = sessions.ensure_session().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(server.handshake_count(), 1);
    }

    #[tokio::test]
    async fn test_stored_session_is_reused_without_handshake() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());

        let token = manager(&server, fixtures::key(), &dir)
            .ensure_session()
            .await
            .unwrap();

        // A new process starts from the persisted record
        let sessions = manager(&server, fixtures::key(), &dir);
        assert_eq!(sessions.current_token(), "");
        assert_eq!(sessions.ensure_session().await.unwrap(), token);
        assert_eq!(server.handshake_count(), 1);
    }

    #[tokio::test]
    async fn test_record_of_other_installation_is_ignored() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        sessions
            .store()
            .save(&SessionRecord {
                token: "foreign-token".to_string(),
                installation_id: "some-other-installation".to_string(),
                created_at: Utc::now(),
                session_id: None,
                user_id: None,
            })
            .unwrap();

        let token = sessions.ensure_session().await.unwrap();

        assert_ne!(token, "foreign-token");
        assert_eq!(server.handshake_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_triggers_handshake() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        std::fs::write(sessions.store().path(), "{\"token\":").unwrap();

        let token = sessions.ensure_session().await.unwrap();

        assert_eq!(server.handshake_count(), 1);
        assert_eq!(sessions.store().load().unwrap().unwrap().token, token);
    }

    #[tokio::test]
    async fn test_wrong_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::wrong_key(), &dir);

        let error = sessions.ensure_session().await.unwrap_err();

        assert!(matches!(error, SessionError::Authentication(AuthenticationError)));
        assert_eq!(error.to_string(), "signature wrong");
        assert_eq!(sessions.current_token(), "");
        assert_eq!(sessions.state(), SessionState::NoSession);
        assert!(!sessions.store().path().exists());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_a_creation_error() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = SessionManager::new(
            Arc::new(ClientSettings::default()),
            Arc::new(InstallationContext::new(
                fixtures::INSTALLATION_TOKEN,
                "not-the-secret",
                fixtures::key(),
            )),
            server.clone(),
            SessionStore::new(dir.path().join("bunqSession.json")),
        );

        let error = sessions.ensure_session().await.unwrap_err();

        assert!(matches!(error, SessionError::Creation(ref e) if e.status.is_some()));
        assert_eq!(sessions.state(), SessionState::NoSession);
        assert!(!sessions.store().path().exists());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_creation_error() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        server.disconnect(true);

        let error = sessions.ensure_session().await.unwrap_err();

        assert!(matches!(error, SessionError::Creation(ref e) if e.status.is_none()));
        assert_eq!(sessions.current_token(), "");
        assert_eq!(sessions.state(), SessionState::NoSession);
        assert!(!sessions.store().path().exists());

        server.disconnect(false);
        let token = sessions.ensure_session().await.unwrap();
        assert_eq!(sessions.store().load().unwrap().unwrap().token, token);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_handshake() {
        let dir = TempDir::new().unwrap();
        let server =
            Arc::new(FakeBunqServer::new().with_handshake_delay(Duration::from_millis(50)));
        let sessions = manager(&server, fixtures::key(), &dir);

        let (a, b, c) = tokio::join!(
            sessions.ensure_session(),
            sessions.ensure_session(),
            sessions.ensure_session()
        );

        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(server.handshake_count(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_drops_the_rejected_token() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        let first = sessions.ensure_session().await.unwrap();

        sessions.invalidate(&first).unwrap();

        assert_eq!(sessions.current_token(), "");
        assert!(sessions.store().load().unwrap().is_none());

        let second = sessions.ensure_session().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(server.handshake_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_a_newer_token() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        let first = sessions.ensure_session().await.unwrap();
        sessions.invalidate(&first).unwrap();
        let second = sessions.ensure_session().await.unwrap();

        // A late caller reporting the old token must not discard the new one
        sessions.invalidate(&first).unwrap();

        assert_eq!(sessions.current_token(), second);
        assert_eq!(sessions.store().load().unwrap().unwrap().token, second);
    }

    #[tokio::test]
    async fn test_clear_session() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(FakeBunqServer::new());
        let sessions = manager(&server, fixtures::key(), &dir);
        sessions.ensure_session().await.unwrap();

        sessions.clear_session().unwrap();

        assert_eq!(sessions.current_token(), "");
        assert!(!sessions.store().path().exists());
    }
}
