use serde::{Deserialize, Serialize};

/// Error body returned by bunq for any failed request.
///
/// ```json
/// {"Error": [{"error_description": "...", "error_description_translated": "..."}]}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    #[serde(rename = "Error", default)]
    #[allow(missing_docs)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub error_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description_translated: Option<String>,
}

impl ApiErrorResponse {
    /// Build an error body with a single description, as the server would send it.
    pub fn single(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            errors: vec![ApiErrorDetail {
                error_description_translated: Some(description.clone()),
                error_description: description,
            }],
        }
    }

    /// Parse an error body. Returns `None` when the body is not a bunq error document.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .filter(|e| !e.errors.is_empty())
    }

    /// All descriptions joined with `"; "`.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.error_description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
