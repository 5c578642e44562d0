use std::time::Duration;

use async_trait::async_trait;

use crate::{Headers, SmsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A fully-built outbound call; connectors never talk HTTP directly.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<RequestBody>,
    /// Upper bound for the whole exchange. Transports must fail with
    /// [`SmsError::Transport`] once it elapses.
    pub timeout: Duration,
}

/// Raw status and body, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Pluggable HTTP capability.
///
/// A connector may be shared by many tasks at once; implementations must
/// therefore be safe for concurrent use, and must honour
/// [`HttpRequest::timeout`] so no call hangs.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, SmsError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_impl::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use tracing::debug;

    /// [`HttpTransport`] backed by a pooled `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a preconfigured client (proxies, TLS roots, ...).
        pub fn with_client(http: reqwest::Client) -> Self {
            Self { http }
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, SmsError> {
            let timeout = request.timeout;
            let mut builder = match request.method {
                Method::Get => self.http.get(&request.url),
                Method::Post => self.http.post(&request.url),
            }
            .timeout(timeout);

            for (k, v) in &request.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder = match &request.body {
                Some(RequestBody::Json(v)) => builder.json(v),
                Some(RequestBody::Form(params)) => builder.form(params),
                None => builder,
            };

            let res = builder.send().await.map_err(|e| map_reqwest(e, timeout))?;
            let status = res.status().as_u16();
            let body = res.text().await.map_err(|e| map_reqwest(e, timeout))?;
            debug!(status, bytes = body.len(), "response received");
            Ok(HttpResponse { status, body })
        }
    }

    fn map_reqwest(e: reqwest::Error, timeout: Duration) -> SmsError {
        if e.is_timeout() {
            SmsError::Transport(format!("request timed out after {timeout:?}"))
        } else {
            // without_url keeps path-embedded credentials out of the message
            SmsError::Transport(e.without_url().to_string())
        }
    }
}
