use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use bunq_api_base::ReqwestTransport;
use bunq_core::{ClientSettings, InstallationContext, SessionStore, SignedRequestClient};
use bunq_crypto::KeyMaterial;
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

/// The CLI configuration file. Paths are relative to the directory containing it.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CliConfig {
    pub device_server_config_file: PathBuf,
    pub private_key_file: PathBuf,
    pub installation_token_file: PathBuf,
    pub session_file: PathBuf,
    #[serde(default)]
    pub session_history_dir: Option<PathBuf>,
    #[serde(default)]
    pub api: ClientSettings,
}

/// Written when the device was registered.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeviceServerConfig {
    pub secret: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub account_id: Option<u64>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let mut config: CliConfig = read_json(path)?;

        let base = path.parent().unwrap_or(Path::new(""));
        for file in [
            &mut config.device_server_config_file,
            &mut config.private_key_file,
            &mut config.installation_token_file,
            &mut config.session_file,
        ] {
            *file = base.join(&*file);
        }
        if let Some(dir) = &mut config.session_history_dir {
            *dir = base.join(&*dir);
        }

        Ok(config)
    }

    pub fn device_server(&self) -> Result<DeviceServerConfig> {
        read_json(&self.device_server_config_file)
    }

    /// The installation token file holds the raw installation response.
    pub fn installation_token(&self) -> Result<String> {
        let response: Value = read_json(&self.installation_token_file)?;
        response["Response"]
            .as_array()
            .and_then(|items| items.iter().find_map(|item| item["Token"]["token"].as_str()))
            .map(str::to_string)
            .ok_or_else(|| {
                eyre!(
                    "{} does not contain an installation token",
                    self.installation_token_file.display()
                )
            })
    }

    pub fn session_store(&self) -> SessionStore {
        let store = SessionStore::new(&self.session_file);
        match &self.session_history_dir {
            Some(dir) => store.with_history_dir(dir),
            None => store,
        }
    }

    pub fn client(&self) -> Result<SignedRequestClient> {
        let key = KeyMaterial::from_pem_file(&self.private_key_file)?;
        let context = InstallationContext::new(
            self.installation_token()?,
            self.device_server()?.secret,
            key,
        );
        let transport = ReqwestTransport::new(&self.api.api_url)?;

        Ok(SignedRequestClient::new(
            self.api.clone(),
            context,
            Arc::new(transport),
            self.session_store(),
        ))
    }
}
