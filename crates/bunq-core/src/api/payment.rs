use bunq_api_base::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{SignedRequestClient, error::CallError};

#[allow(missing_docs)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    /// Decimal string, e.g. `"12.50"`.
    pub value: String,
    pub currency: String,
}

/// Pointer to the other party of a payment.
#[allow(missing_docs)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyAlias {
    #[serde(rename = "type")]
    pub alias_type: String,
    pub value: String,
    pub name: String,
}

/// Body of `POST /v1/user/{user_id}/monetary-account/{account_id}/payment`.
#[allow(missing_docs)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub amount: Amount,
    pub counterparty_alias: CounterpartyAlias,
    pub description: String,
}

impl PaymentRequest {
    /// Payment in euro to an IBAN.
    pub fn iban_in_euro(amount: &str, iban: &str, name: &str, description: &str) -> Self {
        Self {
            amount: Amount {
                value: amount.to_string(),
                currency: "EUR".to_string(),
            },
            counterparty_alias: CounterpartyAlias {
                alias_type: "IBAN".to_string(),
                value: iban.to_string(),
                name: name.to_string(),
            },
            description: description.to_string(),
        }
    }
}

fn payments_path(user_id: u64, account_id: u64) -> String {
    format!("/v1/user/{user_id}/monetary-account/{account_id}/payment")
}

impl SignedRequestClient {
    /// Payments of the given account, most recent first.
    pub async fn request_payments(&self, user_id: u64, account_id: u64) -> Result<Value, CallError> {
        self.call(Method::Get, &payments_path(user_id, account_id), None)
            .await
    }

    /// Pay `amount` euro from the given account to `iban`. The response holds the id of the
    /// created payment.
    pub async fn send_payment(
        &self,
        user_id: u64,
        account_id: u64,
        amount: &str,
        iban: &str,
        name: &str,
        description: &str,
    ) -> Result<Value, CallError> {
        let payment = PaymentRequest::iban_in_euro(amount, iban, name, description);
        self.call(
            Method::Post,
            &payments_path(user_id, account_id),
            Some(&serde_json::to_value(payment)?),
        )
        .await
    }
}
