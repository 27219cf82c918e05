//! Fixed installation values. [`FakeBunqServer`](crate::FakeBunqServer) accepts exactly these.

use bunq_crypto::KeyMaterial;
use serde_json::{Value, json};

/// Private key registered with the fake installation (PKCS#8).
pub const PRIVATE_KEY_PEM: &str = include_str!("../data/private_key.pem");
/// A valid key that was never registered (PKCS#1).
pub const WRONG_PRIVATE_KEY_PEM: &str = include_str!("../data/wrong_private_key.pem");
/// Key the fake server signs its responses with.
pub const SERVER_PRIVATE_KEY_PEM: &str = include_str!("../data/server_private_key.pem");

#[allow(missing_docs)]
pub const INSTALLATION_TOKEN: &str =
    "a4f9e1c8b2d7e3f6a9c1b4d8e2f7a3c6b9d1e4f8a2c7b3d6e9f1a4c8b2d7e3f6";
#[allow(missing_docs)]
pub const DEVICE_SERVER_SECRET: &str = "c2VjcmV0LWRldmljZS1zZXJ2ZXItc2VjcmV0";

#[allow(missing_docs)]
pub const INSTALLATION_ID: u64 = 1;
#[allow(missing_docs)]
pub const DEVICE_ID: u64 = 9;
#[allow(missing_docs)]
pub const USER_ID: u64 = 42;
#[allow(missing_docs)]
pub const ACCOUNT_ID: u64 = 31;
#[allow(missing_docs)]
pub const PAYMENT_ID: u64 = 20;

#[allow(missing_docs)]
pub fn key() -> KeyMaterial {
    KeyMaterial::from_pem(PRIVATE_KEY_PEM).expect("fixture key is valid")
}

#[allow(missing_docs)]
pub fn wrong_key() -> KeyMaterial {
    KeyMaterial::from_pem(WRONG_PRIVATE_KEY_PEM).expect("fixture key is valid")
}

#[allow(missing_docs)]
pub fn server_key() -> KeyMaterial {
    KeyMaterial::from_pem(SERVER_PRIVATE_KEY_PEM).expect("fixture key is valid")
}

/// `GET /v1/user`
pub fn user_response() -> Value {
    json!({"Response": [{"UserCompany": {
        "id": USER_ID,
        "name": "bunq",
        "display_name": "bunq",
        "status": "ACTIVE",
    }}]})
}

/// `GET /v1/user/{USER_ID}/monetary-account-bank`
pub fn monetary_account_bank_response() -> Value {
    json!({"Response": [{"MonetaryAccountBank": {
        "id": ACCOUNT_ID,
        "description": "Main account",
        "currency": "EUR",
        "balance": {"value": "12.50", "currency": "EUR"},
        "status": "ACTIVE",
    }}]})
}

/// `GET /v1/user/{USER_ID}/monetary-account/{ACCOUNT_ID}/payment`
pub fn payments_response() -> Value {
    json!({"Response": [{"Payment": {
        "id": PAYMENT_ID,
        "monetary_account_id": ACCOUNT_ID,
        "amount": {"value": "12.50", "currency": "EUR"},
        "description": "simple payment",
        "type": "BUNQ",
    }}]})
}

/// `POST /v1/user/{USER_ID}/monetary-account/{ACCOUNT_ID}/payment`
pub fn send_payment_response() -> Value {
    json!({"Response": [{"Id": {"id": PAYMENT_ID}}]})
}
