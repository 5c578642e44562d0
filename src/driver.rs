//! Provider selection.
//!
//! A [`ConnectorRegistry`] maps provider names to factories. Selection
//! always resolves against the [`GatewayConfig`] it is handed and never
//! caches, so changing `default` between calls changes what the next call
//! gets without touching connectors already built.

use std::collections::HashMap;
use std::sync::Arc;

use sms_core::{Connector, HttpTransport, ProviderConfig, ReqwestTransport, SmsError};
use sms_kavenegar::KavenegarConnector;
use sms_smsir::SmsIrConnector;
use tracing::{debug, warn};

use crate::config::GatewayConfig;

/// Builds a connector from its settings block and a shared transport.
pub type ConnectorFactory = Arc<
    dyn Fn(&ProviderConfig, Arc<dyn HttpTransport>) -> Result<Arc<dyn Connector>, SmsError>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct ConnectorRegistry {
    transport: Arc<dyn HttpTransport>,
    factories: Arc<HashMap<String, ConnectorFactory>>,
}

impl ConnectorRegistry {
    /// Empty registry; every connector it builds shares `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            factories: Arc::new(HashMap::new()),
        }
    }

    /// Registry with every provider this crate ships.
    pub fn builtin(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport)
            .with(sms_smsir::PROVIDER, Arc::new(smsir))
            .with(sms_kavenegar::PROVIDER, Arc::new(kavenegar))
    }

    pub fn with(mut self, name: &str, factory: ConnectorFactory) -> Self {
        let mut m = (*self.factories).clone();
        m.insert(name.to_ascii_lowercase(), factory);
        self.factories = Arc::new(m);
        self
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Connector for `config.default`.
    pub fn driver(&self, config: &GatewayConfig) -> Result<Arc<dyn Connector>, SmsError> {
        self.connector(&config.default, config)
    }

    /// Connector for `name`, built from its settings block in `config`.
    ///
    /// Fails with [`SmsError::Configuration`] when `name` is not registered,
    /// has no settings block, or its settings do not validate.
    pub fn connector(
        &self,
        name: &str,
        config: &GatewayConfig,
    ) -> Result<Arc<dyn Connector>, SmsError> {
        let key = name.trim().to_ascii_lowercase();
        let factory = self.factories.get(&key).ok_or_else(|| {
            warn!(provider = %key, "unknown provider requested");
            SmsError::Configuration(format!(
                "unknown provider '{}' (known: {})",
                name.trim(),
                self.providers().join(", ")
            ))
        })?;
        let settings = config.provider(&key).ok_or_else(|| {
            SmsError::Configuration(format!("provider '{key}' is not configured"))
        })?;
        let connector = factory(settings, Arc::clone(&self.transport))?;
        debug!(provider = connector.provider(), "connector selected");
        Ok(connector)
    }
}

fn smsir(cfg: &ProviderConfig, t: Arc<dyn HttpTransport>) -> Result<Arc<dyn Connector>, SmsError> {
    Ok(Arc::new(SmsIrConnector::new(cfg, t)?))
}

fn kavenegar(
    cfg: &ProviderConfig,
    t: Arc<dyn HttpTransport>,
) -> Result<Arc<dyn Connector>, SmsError> {
    Ok(Arc::new(KavenegarConnector::new(cfg, t)?))
}

/// Default connector for `config` over a fresh reqwest transport.
pub fn driver(config: &GatewayConfig) -> Result<Arc<dyn Connector>, SmsError> {
    ConnectorRegistry::builtin(Arc::new(ReqwestTransport::new())).driver(config)
}
