use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::classify::{classify, ResponseLayout};
use crate::transport::{HttpRequest, HttpTransport, Method, RequestBody};
use crate::{
    AccountInfo, Headers, Message, OutboxRecord, ProviderSettings, ResponseEnvelope, SmsError,
};

/// Default page size for outbox queries.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// One page of outbox history. No auto-pagination: the caller asks for
/// each page explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxQuery {
    pub page_size: i64,
    pub page_number: i64,
}

impl Default for OutboxQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

impl OutboxQuery {
    pub fn new(page_size: i64, page_number: i64) -> Self {
        Self {
            page_size,
            page_number,
        }
    }

    /// Both values must be positive.
    pub fn validate(&self) -> Result<(), SmsError> {
        if self.page_size < 1 {
            return Err(SmsError::InvalidRequest(format!(
                "page size must be positive, got {}",
                self.page_size
            )));
        }
        if self.page_number < 1 {
            return Err(SmsError::InvalidRequest(format!(
                "page number must be positive, got {}",
                self.page_number
            )));
        }
        Ok(())
    }
}

/// Uniform contract every provider implements.
///
/// Each call is independent: a connector holds only its validated settings
/// and a transport handle, so one instance can serve concurrent callers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable provider key, e.g. "smsir" or "kavenegar".
    fn provider(&self) -> &'static str;

    /// Composes the provider's base URL with `segments`. Pure.
    fn endpoint(&self, segments: &[&str]) -> String;

    /// Send a plain-text message to one or more recipients.
    async fn send(&self, message: &Message) -> Result<ResponseEnvelope, SmsError>;

    /// Send a templated message (typically an OTP) to its single recipient.
    async fn verify(&self, message: &Message) -> Result<ResponseEnvelope, SmsError>;

    /// Credit left on the account.
    async fn account(&self) -> Result<AccountInfo, SmsError>;

    /// One page of previously sent messages.
    async fn outbox(&self, query: OutboxQuery) -> Result<Vec<OutboxRecord>, SmsError>;
}

/// `base` joined with non-empty `segments`, one slash between each.
pub fn compose_endpoint(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}

/// Appends `params` to `url` as an urlencoded query string.
pub fn with_query(url: &str, params: &[(&str, String)]) -> Result<String, SmsError> {
    if params.is_empty() {
        return Ok(url.to_string());
    }
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| SmsError::InvalidRequest(format!("cannot encode query: {e}")))?;
    Ok(format!("{url}?{query}"))
}

/// HTTP plumbing shared by every connector.
///
/// Providers compose one of these and supply only request shapes; all
/// responses, read or write, go through the same [`classify`] gate.
#[derive(Clone)]
pub struct ApiClient {
    settings: ProviderSettings,
    layout: ResponseLayout,
    headers: Headers,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("settings", &self.settings)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Fixes the header set once; the auth header comes from `settings`.
    pub fn new(
        settings: ProviderSettings,
        layout: ResponseLayout,
        extra_headers: Headers,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut headers = Headers::new();
        if let Some(name) = settings.auth_header() {
            headers.push((name.to_string(), settings.api_key().to_string()));
        }
        headers.extend(extra_headers);
        Self {
            settings,
            layout,
            headers,
            transport,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn endpoint(&self, segments: &[&str]) -> String {
        compose_endpoint(self.settings.base_url(), segments)
    }

    /// Write path: POST `body` to `url`, then classify.
    pub async fn perform_api(
        &self,
        operation: &'static str,
        url: String,
        body: RequestBody,
    ) -> Result<ResponseEnvelope, SmsError> {
        self.dispatch(operation, Method::Post, url, Some(body)).await
    }

    /// Read path: GET `url`, then classify.
    pub async fn fetch(
        &self,
        operation: &'static str,
        url: String,
    ) -> Result<ResponseEnvelope, SmsError> {
        self.dispatch(operation, Method::Get, url, None).await
    }

    async fn dispatch(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        body: Option<RequestBody>,
    ) -> Result<ResponseEnvelope, SmsError> {
        let span = tracing::debug_span!(
            "sms_call",
            call_id = %Uuid::new_v4(),
            provider = self.settings.provider(),
            operation
        );
        let request = HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
            timeout: self.settings.timeout(),
        };
        async move {
            debug!(?method, "issuing request");
            let response = self.transport.execute(request).await.map_err(|e| {
                tracing::error!("transport failure: {}", e);
                e
            })?;
            debug!(status = response.status, "received response");
            classify(&self.layout, &response)
        }
        .instrument(span)
        .await
    }
}
