#![doc = include_str!("../README.md")]

mod api;
pub use api::start_api_mock;
mod fake_server;
pub use fake_server::FakeBunqServer;
pub mod fixtures;
