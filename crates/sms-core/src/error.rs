/// Errors that can occur during gateway operations.
///
/// Every connector operation, on every provider, fails with one of these
/// five kinds. Nothing is retried or recovered internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmsError {
    /// Network, connection or timeout failure before a response body existed.
    #[error("transport error: {0}")]
    Transport(String),
    /// A response arrived but its body could not be read as a provider envelope.
    #[error("malformed response{}: {reason}", http_suffix(.http_status))]
    MalformedResponse {
        http_status: Option<u16>,
        reason: String,
    },
    /// The provider parsed our request and reported a failure of its own.
    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },
    /// The caller asked for something that cannot be sent; no request was issued.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Unknown provider or unusable provider settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl SmsError {
    pub fn malformed(http_status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            http_status,
            reason: reason.into(),
        }
    }

    /// Provider status code, when the provider reported the failure itself.
    pub fn provider_code(&self) -> Option<i64> {
        match self {
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}
