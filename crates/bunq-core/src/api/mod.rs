//! Requests for the bunq resources this SDK exposes. Response bodies are returned as JSON, the
//! caller picks out the fields it needs.

mod monetary_account;
mod payment;
pub use payment::{Amount, CounterpartyAlias, PaymentRequest};
mod user;
