use bunq_api_base::Method;
use serde_json::Value;

use crate::{SignedRequestClient, error::CallError};

impl SignedRequestClient {
    /// `GET /v1/user`: the users this session has access to.
    pub async fn request_user(&self) -> Result<Value, CallError> {
        self.call(Method::Get, "/v1/user", None).await
    }
}
