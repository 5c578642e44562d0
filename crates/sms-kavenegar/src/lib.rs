use std::sync::Arc;

use async_trait::async_trait;
use sms_core::{
    with_query, AccountFields, AccountInfo, ApiClient, Connector, HttpTransport, Message,
    OutboxFields, OutboxQuery, OutboxRecord, ProviderConfig, ProviderDefaults, RequestBody,
    ResponseEnvelope, ResponseLayout, SmsError,
};
use tracing::debug;

pub const PROVIDER: &str = "kavenegar";

/// Largest page `latestoutbox.json` will return.
pub const MAX_OUTBOX_PAGE: i64 = 500;

const DEFAULTS: ProviderDefaults = ProviderDefaults {
    base_url: "https://api.kavenegar.com/v1",
    auth_header: None,
};

const LAYOUT: ResponseLayout = ResponseLayout {
    status: "/return/status",
    message: "/return/message",
    data: "/entries",
    success: 200,
};

const ACCOUNT: AccountFields = AccountFields {
    balance: "/remaincredit",
    expires_at: Some("/expiredate"),
    unit: Some("IRR"),
};

const OUTBOX: OutboxFields = OutboxFields {
    message_id: "messageid",
    recipient: "receptor",
    body: "message",
    sent_at: "date",
    sender: "sender",
    cost: "cost",
};

/// Lookup parameter names, in the order template tokens fill them.
const TOKEN_SLOTS: [&str; 5] = ["token", "token2", "token3", "token10", "token20"];

/// Kavenegar REST connector.
///
/// Kavenegar authenticates by API key in the URL path
/// (`/v1/{key}/sms/send.json`), so no auth header is attached.
#[derive(Clone, Debug)]
pub struct KavenegarConnector {
    api: ApiClient,
}

impl KavenegarConnector {
    /// Fails with [`SmsError::Configuration`] when the key holds anything
    /// besides unreserved URL characters, since it becomes a path segment.
    pub fn new(config: &ProviderConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, SmsError> {
        let settings = config.resolve(PROVIDER, &DEFAULTS)?;
        if !settings.api_key().chars().all(is_unreserved) {
            return Err(SmsError::Configuration(format!(
                "{PROVIDER}: api_key may only contain letters, digits, '-', '.', '_' or '~'"
            )));
        }
        let headers = vec![("Accept".to_string(), "application/json".to_string())];
        Ok(Self {
            api: ApiClient::new(settings, LAYOUT, headers, transport),
        })
    }

    #[cfg(feature = "reqwest")]
    pub fn from_config(config: &ProviderConfig) -> Result<Self, SmsError> {
        Self::new(config, Arc::new(sms_core::ReqwestTransport::new()))
    }

    /// Endpoint with the API key inserted after the version segment.
    fn keyed(&self, segments: &[&str]) -> String {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push(self.api.settings().api_key());
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }
}

/// RFC 3986 unreserved set; these never need percent-encoding in a path.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

fn form(pairs: Vec<(&str, String)>) -> RequestBody {
    RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[async_trait]
impl Connector for KavenegarConnector {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        self.api.endpoint(segments)
    }

    async fn send(&self, message: &Message) -> Result<ResponseEnvelope, SmsError> {
        let text = message.require_body()?;
        let mut params = vec![
            ("receptor", message.recipients().join(",")),
            ("message", text.to_string()),
        ];
        // without a sender Kavenegar picks the account's default line
        if let Some(line) = message.sender_or(self.api.settings().line_number()) {
            params.push(("sender", line.to_string()));
        }
        if let Some(at) = message.scheduled_at() {
            params.push(("date", at.unix_timestamp().to_string()));
        }
        debug!(recipients = message.recipients().len(), "kavenegar send");
        self.api
            .perform_api("send", self.keyed(&["sms", "send.json"]), form(params))
            .await
    }

    async fn verify(&self, message: &Message) -> Result<ResponseEnvelope, SmsError> {
        let (receptor, template) = message.require_template()?;
        let tokens = message.tokens();
        if tokens.is_empty() {
            return Err(SmsError::InvalidRequest(
                "lookup needs at least one token".into(),
            ));
        }
        if tokens.len() > TOKEN_SLOTS.len() {
            return Err(SmsError::InvalidRequest(format!(
                "lookup takes at most {} tokens, got {}",
                TOKEN_SLOTS.len(),
                tokens.len()
            )));
        }
        let mut params = vec![
            ("receptor", receptor.to_string()),
            ("template", template.to_string()),
        ];
        for (slot, token) in TOKEN_SLOTS.iter().zip(tokens) {
            // only token10 and token20 may contain spaces
            if matches!(*slot, "token" | "token2" | "token3")
                && token.value.chars().any(char::is_whitespace)
            {
                return Err(SmsError::InvalidRequest(format!(
                    "{slot} must not contain whitespace"
                )));
            }
            params.push((*slot, token.value.clone()));
        }
        self.api
            .perform_api("verify", self.keyed(&["verify", "lookup.json"]), form(params))
            .await
    }

    async fn account(&self) -> Result<AccountInfo, SmsError> {
        self.api
            .fetch("account", self.keyed(&["account", "info.json"]))
            .await?
            .account_info(&ACCOUNT)
    }

    async fn outbox(&self, query: OutboxQuery) -> Result<Vec<OutboxRecord>, SmsError> {
        query.validate()?;
        if query.page_number != 1 {
            return Err(SmsError::InvalidRequest(
                "kavenegar only serves the latest page of the outbox".into(),
            ));
        }
        if query.page_size > MAX_OUTBOX_PAGE {
            return Err(SmsError::InvalidRequest(format!(
                "page size must be at most {MAX_OUTBOX_PAGE}, got {}",
                query.page_size
            )));
        }
        let url = with_query(
            &self.keyed(&["sms", "latestoutbox.json"]),
            &[("pagesize", query.page_size.to_string())],
        )?;
        self.api.fetch("outbox", url).await?.outbox_records(&OUTBOX)
    }
}
