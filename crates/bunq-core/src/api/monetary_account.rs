use bunq_api_base::Method;
use serde_json::Value;

use crate::{SignedRequestClient, error::CallError};

impl SignedRequestClient {
    /// `GET /v1/user/{user_id}/monetary-account-bank`: the user's bank accounts, including their
    /// balances.
    pub async fn request_monetary_account_bank(&self, user_id: u64) -> Result<Value, CallError> {
        self.call(
            Method::Get,
            &format!("/v1/user/{user_id}/monetary-account-bank"),
            None,
        )
        .await
    }
}
