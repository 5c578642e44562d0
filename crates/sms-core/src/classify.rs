use serde_json::Value;
use tracing::{error, warn};

use crate::transport::HttpResponse;
use crate::{ResponseEnvelope, SmsError};

/// Where a provider puts its application status, message and payload.
///
/// Fields are JSON pointers into the response body.
#[derive(Debug, Clone, Copy)]
pub struct ResponseLayout {
    pub status: &'static str,
    pub message: &'static str,
    pub data: &'static str,
    /// Status value that marks success.
    pub success: i64,
}

/// The shared gate every raw provider response passes through.
///
/// 1. body must parse as JSON and carry an integer status marker,
///    otherwise `MalformedResponse`;
/// 2. a marker other than `layout.success` is a `Provider` error carrying
///    the provider's own code and message;
/// 3. anything else becomes a [`ResponseEnvelope`].
///
/// The HTTP status code is only used for diagnostics: the body decides.
pub fn classify(layout: &ResponseLayout, response: &HttpResponse) -> Result<ResponseEnvelope, SmsError> {
    let http_status = Some(response.status);

    let body: Value = serde_json::from_str(&response.body).map_err(|e| {
        error!(status = response.status, "response is not valid JSON: {}", e);
        SmsError::malformed(http_status, "response is not valid JSON")
    })?;

    let status = body
        .pointer(layout.status)
        .and_then(status_marker)
        .ok_or_else(|| {
            error!(status = response.status, "response has no status marker");
            SmsError::malformed(
                http_status,
                format!("response has no status marker at '{}'", layout.status),
            )
        })?;

    let message = body
        .pointer(layout.message)
        .map(|m| match m {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    if status != layout.success {
        warn!(status, http_status = response.status, "provider reported failure: {}", message);
        return Err(SmsError::Provider {
            code: status,
            message,
        });
    }

    if !(200..300).contains(&response.status) {
        warn!(
            http_status = response.status,
            "success marker on a non-2xx response; trusting the body"
        );
    }

    Ok(ResponseEnvelope::new(
        status,
        message,
        body.pointer(layout.data).cloned(),
    ))
}

fn status_marker(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
