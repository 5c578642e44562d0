use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use sms_core::ProviderConfig;
use std::collections::HashMap;
use std::env;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Gateway configuration
    pub sms: GatewayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Provider selection and per-provider settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Name of the provider `driver()` selects (default: smsir)
    pub default: String,
    /// Settings keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default: "smsir".to_string(),
            providers: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Same settings with a different default provider.
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = name.into();
        self
    }

    /// Adds or replaces the settings block for `name`.
    ///
    /// Names are stored trimmed and lowercased, the same way the `config`
    /// crate stores keys read from files and the environment.
    pub fn with_provider(mut self, name: impl Into<String>, config: ProviderConfig) -> Self {
        self.providers
            .insert(name.into().trim().to_ascii_lowercase(), config);
        self
    }

    /// Settings block for `name`, ignoring case and surrounding whitespace.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        let name = name.trim();
        self.providers.get(name).or_else(|| {
            self.providers
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (e.g. SMSGATE__SMS__DEFAULT=kavenegar)
            .add_source(Environment::with_prefix("SMSGATE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Defaults overlaid with an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sms: GatewayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
