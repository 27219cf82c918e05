#![doc = include_str!("../README.md")]

pub mod canonical;
mod error;
pub use error::Error;
mod error_response;
pub use error_response::{ApiErrorDetail, ApiErrorResponse};
mod http;
pub use http::{Headers, HttpRequest, HttpResponse, Method};
mod reqwest_transport;
pub use reqwest_transport::ReqwestTransport;
mod transport;
pub use transport::Transport;

pub use reqwest::StatusCode;
