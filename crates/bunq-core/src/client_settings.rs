use bunq_api_base::{
    Headers,
    canonical::{
        HEADER_CACHE_CONTROL, HEADER_GEOLOCATION, HEADER_LANGUAGE, HEADER_REGION,
        HEADER_USER_AGENT,
    },
};
use serde::{Deserialize, Serialize};

/// Basic client behavior settings. These settings specify the target of the client and the values
/// of the informational headers sent with every request.
///
/// Defaults to
///
/// ```
/// # use bunq_core::ClientSettings;
/// let settings = ClientSettings {
///     api_url: "https://api.bunq.com".to_string(),
///     user_agent: "bunq Rust-SDK".to_string(),
///     language: "en_US".to_string(),
///     region: "nl_NL".to_string(),
///     geolocation: "0 0 0 0 000".to_string(),
/// };
/// let default = ClientSettings::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientSettings {
    /// The api url of the targeted bunq environment. Defaults to `https://api.bunq.com`
    pub api_url: String,
    /// The user_agent to send to bunq. Defaults to `bunq Rust-SDK`
    pub user_agent: String,
    /// Value of `X-Bunq-Language`. Defaults to `en_US`
    pub language: String,
    /// Value of `X-Bunq-Region`. Defaults to `nl_NL`
    pub region: String,
    /// Value of `X-Bunq-Geolocation`, `longitude latitude altitude radius country`.
    /// Defaults to `0 0 0 0 000`
    pub geolocation: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.bunq.com".into(),
            user_agent: "bunq Rust-SDK".into(),
            language: "en_US".into(),
            region: "nl_NL".into(),
            geolocation: "0 0 0 0 000".into(),
        }
    }
}

impl ClientSettings {
    /// Headers sent with every request, before the per-request id and authentication.
    pub(crate) fn default_headers(&self) -> Headers {
        Headers::from([
            (HEADER_CACHE_CONTROL.to_string(), "no-cache".to_string()),
            (HEADER_USER_AGENT.to_string(), self.user_agent.clone()),
            (HEADER_GEOLOCATION.to_string(), self.geolocation.clone()),
            (HEADER_LANGUAGE.to_string(), self.language.clone()),
            (HEADER_REGION.to_string(), self.region.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"apiUrl": "https://public-api.sandbox.bunq.com"}"#).unwrap();

        assert_eq!(settings.api_url, "https://public-api.sandbox.bunq.com");
        assert_eq!(settings.language, "en_US");
        assert_eq!(settings.geolocation, "0 0 0 0 000");
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_str::<ClientSettings>(r#"{"apiUrll": "x"}"#);
        assert!(result.is_err());
    }
}
