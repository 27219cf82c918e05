#![doc = include_str!("../README.md")]

pub mod api;
mod client;
pub use client::SignedRequestClient;
mod client_settings;
pub use client_settings::ClientSettings;
pub mod error;
mod installation;
pub use installation::InstallationContext;
mod response;
pub mod session;
pub use session::{SessionManager, SessionState, SessionStore, SessionToken};
pub mod setup;
pub mod signing;
