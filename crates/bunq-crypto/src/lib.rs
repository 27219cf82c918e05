#![doc = include_str!("../README.md")]

mod error;
pub use error::{CryptoError, KeyLoadError};
mod fingerprint;
pub use fingerprint::Fingerprint;
mod key_material;
pub use key_material::KeyMaterial;
mod public_key;
pub use public_key::PublicKey;
