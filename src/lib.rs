//! # smsgate
//!
//! A multi-provider SMS gateway for Rust.
//!
//! ## Features
//!
//! - **Uniform contract**: `send`, `verify`, `account` and `outbox` on every provider
//! - **One error model**: transport, malformed-response, provider, invalid-request
//!   and configuration failures, identical across providers and operations
//! - **Providers**: SMS.ir and Kavenegar out of the box; register your own
//! - **Pluggable transport**: reqwest by default, an in-memory mock for tests
//! - **Configuration**: files plus `SMSGATE__*` environment variables
//! - **Observability**: structured `tracing` events tagged with a per-call id
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use smsgate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     smsgate::logging::init(&config.logging)?;
//!
//!     let connector = smsgate::driver(&config.sms)?;
//!     let envelope = connector
//!         .send(&Message::text(["989121234567"], "Hello from smsgate!")?)
//!         .await?;
//!
//!     println!("{}: {}", envelope.status, envelope.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [sms]
//! default = "kavenegar"
//!
//! [sms.providers.kavenegar]
//! api_key = "..."
//!
//! [sms.providers.smsir]
//! api_key = "..."
//! line_number = "30004505"
//! ```

pub mod config;
pub mod driver;
pub mod logging;

pub use crate::config::*;
pub use crate::driver::{driver, ConnectorFactory, ConnectorRegistry};

/// Common imports for smsgate usage
pub mod prelude {
    pub use crate::config::{AppConfig, GatewayConfig, LoggingConfig};
    pub use crate::driver::{driver, ConnectorRegistry};
    pub use sms_core::*;
    pub use sms_kavenegar::KavenegarConnector;
    pub use sms_smsir::SmsIrConnector;
}
