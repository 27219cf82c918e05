use chrono::{DateTime, Utc};

use super::SessionRecord;

/// Session token as issued by the session server.
///
/// There is no expiry: a token is valid until the server rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    #[allow(missing_docs)]
    pub value: String,
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    /// Id of the session-server object, when the server returned one.
    pub session_id: Option<u64>,
    /// Id of the user owning the session, when the server returned one.
    pub user_id: Option<u64>,
}

impl SessionToken {
    pub(crate) fn to_record(&self, installation_id: String) -> SessionRecord {
        SessionRecord {
            token: self.value.clone(),
            installation_id,
            created_at: self.created_at,
            session_id: self.session_id,
            user_id: self.user_id,
        }
    }
}

impl From<SessionRecord> for SessionToken {
    fn from(record: SessionRecord) -> Self {
        Self {
            value: record.token,
            created_at: record.created_at,
            session_id: record.session_id,
            user_id: record.user_id,
        }
    }
}

/// Where the [`SessionManager`](super::SessionManager) is in the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No usable token, the next call starts by loading or creating one.
    NoSession,
    /// A handshake is in flight.
    SessionRequested,
    /// A token is held in memory.
    SessionActive(SessionToken),
}
