//! # SMS Core
//!
//! Connector contract and shared plumbing for the smsgate SMS gateway.
//!
//! This crate provides the building blocks every provider crate uses:
//! - [`Connector`] trait with `send`, `verify`, `account` and `outbox`
//! - [`Message`] value type for plain-text and templated messages
//! - [`classify`] which turns raw provider responses into a
//!   [`ResponseEnvelope`] or a typed [`SmsError`]
//! - [`HttpTransport`] capability, with a reqwest-backed default and an
//!   in-memory [`MockTransport`] for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{Connector, Message};
//!
//! // Any SMS provider implements Connector
//! let msg = Message::text(["09120000000"], "Hello world!")?;
//! let envelope = connector.send(&msg).await?;
//! println!("{} {}", envelope.status, envelope.data);
//! ```

mod classify;
mod connector;
mod envelope;
mod error;
mod message;
pub mod mock;
mod settings;
pub mod transport;

pub use classify::{classify, ResponseLayout};
pub use connector::{
    compose_endpoint, with_query, ApiClient, Connector, OutboxQuery, DEFAULT_PAGE_SIZE,
};
pub use envelope::{AccountFields, AccountInfo, OutboxFields, OutboxRecord, ResponseEnvelope};
pub use error::SmsError;
pub use message::{Content, Message, Token};
pub use mock::MockTransport;
pub use settings::{ProviderConfig, ProviderDefaults, ProviderSettings};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};

/// Ordered name/value pairs sent with every request.
pub type Headers = Vec<(String, String)>;
