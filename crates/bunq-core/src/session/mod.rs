//! Session lifecycle: in-memory token, persistence and the session-server handshake.

mod handshake;
mod manager;
pub use manager::SessionManager;
mod store;
pub use store::{SessionRecord, SessionStore, StoreCorruptError, StoreError};
mod token;
pub use token::{SessionState, SessionToken};
