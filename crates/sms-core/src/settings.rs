use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::SmsError;

fn default_timeout_seconds() -> u64 {
    30
}

/// Per-provider settings as they appear in configuration.
///
/// Only `api_key` is required; everything else falls back to the
/// connector's [`ProviderDefaults`].
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API credential issued by the provider
    pub api_key: String,
    /// Default sender line used when a message names none
    #[serde(default)]
    pub line_number: Option<String>,
    /// Override for the provider's API root (testing, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Override for the header that carries `api_key`
    #[serde(default)]
    pub auth_header: Option<String>,
    /// Upper bound for each outbound request (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[REDACTED]")
            .field("line_number", &self.line_number)
            .field("base_url", &self.base_url)
            .field("auth_header", &self.auth_header)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            line_number: None,
            base_url: None,
            auth_header: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    pub fn with_line_number(mut self, line: impl Into<String>) -> Self {
        self.line_number = Some(line.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_auth_header(mut self, name: impl Into<String>) -> Self {
        self.auth_header = Some(name.into());
        self
    }

    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// Validates the settings against a connector's defaults.
    ///
    /// Fails with [`SmsError::Configuration`] on a blank key, a base URL that
    /// is not absolute http(s), or a zero timeout.
    pub fn resolve(
        &self,
        provider: &'static str,
        defaults: &ProviderDefaults,
    ) -> Result<ProviderSettings, SmsError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(SmsError::Configuration(format!(
                "{provider}: api_key must not be empty"
            )));
        }

        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);
        let parsed = Url::parse(base_url).map_err(|e| {
            SmsError::Configuration(format!("{provider}: invalid base_url '{base_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SmsError::Configuration(format!(
                "{provider}: base_url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(SmsError::Configuration(format!(
                "{provider}: timeout_seconds must be positive"
            )));
        }

        let auth_header = self
            .auth_header
            .clone()
            .or_else(|| defaults.auth_header.map(str::to_string));

        Ok(ProviderSettings {
            provider,
            api_key: api_key.to_string(),
            line_number: self
                .line_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

/// Values a connector uses when configuration leaves them out.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDefaults {
    pub base_url: &'static str,
    pub auth_header: Option<&'static str>,
}

/// Validated, read-only settings a connector is bound to.
#[derive(Clone)]
pub struct ProviderSettings {
    provider: &'static str,
    api_key: String,
    line_number: Option<String>,
    base_url: String,
    auth_header: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("line_number", &self.line_number)
            .field("base_url", &self.base_url)
            .field("auth_header", &self.auth_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderSettings {
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn line_number(&self) -> Option<&str> {
        self.line_number.as_deref()
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_header(&self) -> Option<&str> {
        self.auth_header.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
