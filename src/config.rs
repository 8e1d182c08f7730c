use thiserror::Error;

pub const ACCESS_KEY_VAR: &str = "WEB3FORMS_ACCESS_KEY";
pub const CONTACT_EMAIL_VAR: &str = "CONTACT_EMAIL";
pub const ENDPOINT_VAR: &str = "WEB3FORMS_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "https://api.web3forms.com/submit";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is not a valid http(s) url: {1}")]
    InvalidUrl(&'static str, String),
}

/// Server-side site settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub access_key: String,
    pub contact_email: Option<String>,
    pub endpoint: String,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_key = get(ACCESS_KEY_VAR).ok_or(ConfigError::Missing(ACCESS_KEY_VAR))?;
        let endpoint = get(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(ENDPOINT_VAR, endpoint));
        }

        Ok(Self {
            access_key,
            contact_email: get(CONTACT_EMAIL_VAR),
            endpoint,
        })
    }
}
