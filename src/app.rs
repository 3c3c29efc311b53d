use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str =
    "https://5suknmbyc2.execute-api.us-west-2.amazonaws.com/forwardDisruptiv3WorkInquiryToTelegram";

pub const ENDPOINT_ENV: &str = "CONTACT_FORM_ENDPOINT";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid endpoint `{0}`: {1}")]
    Endpoint(String, url::ParseError),
    #[error("could not encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("contact-form.toml"))
    }

    /// Reads the settings file, falling back to defaults, then applies the
    /// endpoint override from the environment.
    pub fn load() -> Self {
        let mut settings = Self::toml_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|text| Self::from_toml(&text))
            .unwrap_or_default();
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            settings.endpoint = endpoint;
        }
        settings
    }

    pub fn from_toml(text: &str) -> Self {
        toml::from_str(text).unwrap_or_else(|e| {
            log::warn!("ignoring malformed settings file: {e}");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::toml_path()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, SettingsError> {
        let normalized = crate::utils::normalize_url(&self.endpoint);
        Url::parse(&normalized).map_err(|e| SettingsError::Endpoint(self.endpoint.clone(), e))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
