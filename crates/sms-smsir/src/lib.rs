use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sms_core::{
    with_query, AccountFields, AccountInfo, ApiClient, Connector, HttpTransport, Message,
    OutboxFields, OutboxQuery, OutboxRecord, ProviderConfig, ProviderDefaults, RequestBody,
    ResponseEnvelope, ResponseLayout, SmsError,
};
use tracing::debug;

pub const PROVIDER: &str = "smsir";

const DEFAULTS: ProviderDefaults = ProviderDefaults {
    base_url: "https://api.sms.ir/v1",
    auth_header: Some("x-api-key"),
};

const LAYOUT: ResponseLayout = ResponseLayout {
    status: "/status",
    message: "/message",
    data: "/data",
    success: 1,
};

/// `credit` answers with a bare number in `data`.
const ACCOUNT: AccountFields = AccountFields {
    balance: "",
    expires_at: None,
    unit: None,
};

const OUTBOX: OutboxFields = OutboxFields {
    message_id: "messageId",
    recipient: "mobile",
    body: "messageText",
    sent_at: "sendDateTime",
    sender: "lineNumber",
    cost: "cost",
};

/// SMS.ir REST connector.
#[derive(Clone, Debug)]
pub struct SmsIrConnector {
    api: ApiClient,
}

impl SmsIrConnector {
    /// Builds a connector on top of `transport`.
    ///
    /// The `x-api-key` header is fixed here and sent with every request.
    pub fn new(config: &ProviderConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, SmsError> {
        let settings = config.resolve(PROVIDER, &DEFAULTS)?;
        let headers = vec![
            ("Accept".to_string(), "text/plain".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        Ok(Self {
            api: ApiClient::new(settings, LAYOUT, headers, transport),
        })
    }

    /// Connector backed by a fresh [`sms_core::ReqwestTransport`].
    #[cfg(feature = "reqwest")]
    pub fn from_config(config: &ProviderConfig) -> Result<Self, SmsError> {
        Self::new(config, Arc::new(sms_core::ReqwestTransport::new()))
    }
}

#[derive(Debug, Serialize)]
struct BulkSend<'a> {
    #[serde(rename = "lineNumber")]
    line_number: u64,
    #[serde(rename = "MessageText")]
    message_text: &'a str,
    #[serde(rename = "Mobiles")]
    mobiles: &'a [String],
    /// Unix seconds; `null` sends immediately.
    #[serde(rename = "SendDateTime")]
    send_date_time: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifySend<'a> {
    mobile: &'a str,
    template_id: u64,
    parameters: Vec<VerifyParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct VerifyParameter<'a> {
    name: &'a str,
    value: &'a str,
}

fn numeric(what: &str, raw: &str) -> Result<u64, SmsError> {
    raw.trim()
        .parse()
        .map_err(|_| SmsError::InvalidRequest(format!("{what} must be numeric, got '{raw}'")))
}

fn json_body<T: Serialize>(payload: &T) -> Result<RequestBody, SmsError> {
    serde_json::to_value(payload)
        .map(RequestBody::Json)
        .map_err(|e| SmsError::InvalidRequest(format!("cannot encode payload: {e}")))
}

#[async_trait]
impl Connector for SmsIrConnector {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        self.api.endpoint(segments)
    }

    async fn send(&self, message: &Message) -> Result<ResponseEnvelope, SmsError> {
        let text = message.require_body()?;
        let line = message
            .sender_or(self.api.settings().line_number())
            .ok_or_else(|| {
                SmsError::InvalidRequest(
                    "no sender line: set one on the message or configure line_number".into(),
                )
            })?;
        let payload = BulkSend {
            line_number: numeric("sender line", line)?,
            message_text: text,
            mobiles: message.recipients(),
            send_date_time: message.scheduled_at().map(|at| at.unix_timestamp()),
        };
        debug!(recipients = payload.mobiles.len(), "smsir bulk send");
        self.api
            .perform_api("send", self.endpoint(&["send", "bulk"]), json_body(&payload)?)
            .await
    }

    async fn verify(&self, message: &Message) -> Result<ResponseEnvelope, SmsError> {
        let (mobile, template) = message.require_template()?;
        let payload = VerifySend {
            mobile,
            template_id: numeric("template id", template)?,
            parameters: message
                .tokens()
                .iter()
                .map(|t| VerifyParameter {
                    name: &t.name,
                    value: &t.value,
                })
                .collect(),
        };
        self.api
            .perform_api("verify", self.endpoint(&["send", "verify"]), json_body(&payload)?)
            .await
    }

    async fn account(&self) -> Result<AccountInfo, SmsError> {
        self.api
            .fetch("account", self.endpoint(&["credit"]))
            .await?
            .account_info(&ACCOUNT)
    }

    async fn outbox(&self, query: OutboxQuery) -> Result<Vec<OutboxRecord>, SmsError> {
        query.validate()?;
        let url = with_query(
            &self.endpoint(&["send", "live"]),
            &[
                ("PageSize", query.page_size.to_string()),
                ("PageNumber", query.page_number.to_string()),
            ],
        )?;
        self.api.fetch("outbox", url).await?.outbox_records(&OUTBOX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sms_core::{Method, MockTransport, Token};
    use time::OffsetDateTime;

    fn connector(mock: &MockTransport) -> SmsIrConnector {
        let config = ProviderConfig::new("k").with_line_number("30004505");
        SmsIrConnector::new(&config, Arc::new(mock.clone())).unwrap()
    }

    fn json_of(mock: &MockTransport) -> serde_json::Value {
        match mock.last_request().unwrap().body {
            Some(RequestBody::Json(v)) => v,
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_is_pure() {
        let mock = MockTransport::new();
        let c = connector(&mock);
        assert_eq!(c.endpoint(&["send", "bulk"]), "https://api.sms.ir/v1/send/bulk");
        assert_eq!(c.endpoint(&["credit"]), c.endpoint(&["credit"]));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn blank_key_fails_at_construction() {
        let err = SmsIrConnector::new(&ProviderConfig::new(""), Arc::new(MockTransport::new()))
            .unwrap_err();
        assert!(matches!(err, SmsError::Configuration(_)));
    }

    #[tokio::test]
    async fn send_posts_bulk_payload() {
        let mock = MockTransport::responding(
            200,
            r#"{"status":1,"message":"ok","data":{"packId":"p1","messageIds":[1,2]}}"#,
        );
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let msg = Message::text(["989121234567", "989351234567"], "hi")
            .unwrap()
            .schedule(at);

        let env = connector(&mock).send(&msg).await.unwrap();
        assert_eq!(env.status, 1);
        assert_eq!(env.data["packId"], "p1");

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.url, "https://api.sms.ir/v1/send/bulk");
        assert!(req.headers.contains(&("x-api-key".to_string(), "k".to_string())));
        assert_eq!(
            json_of(&mock),
            json!({
                "lineNumber": 30004505u64,
                "MessageText": "hi",
                "Mobiles": ["989121234567", "989351234567"],
                "SendDateTime": 1_700_000_000
            })
        );
    }

    #[tokio::test]
    async fn message_sender_overrides_configured_line() {
        let mock = MockTransport::responding(200, r#"{"status":1,"message":"ok","data":null}"#);
        let msg = Message::text(["989121234567"], "hi").unwrap().from("30001111");
        let env = connector(&mock).send(&msg).await.unwrap();
        assert_eq!(env.data, json!({}));
        let body = json_of(&mock);
        assert_eq!(body["lineNumber"], 30001111u64);
        assert_eq!(body["SendDateTime"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn send_without_any_line_is_rejected_locally() {
        let mock = MockTransport::new();
        let c = SmsIrConnector::new(&ProviderConfig::new("k"), Arc::new(mock.clone())).unwrap();
        let msg = Message::text(["989121234567"], "hi").unwrap();
        assert!(matches!(c.send(&msg).await, Err(SmsError::InvalidRequest(_))));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn verify_posts_template_and_parameters() {
        let mock = MockTransport::responding(
            200,
            r#"{"status":1,"message":"ok","data":{"messageId":88,"cost":1.0}}"#,
        );
        let msg = Message::template(
            "989121234567",
            "100200",
            vec![Token::new("Code", "4821"), Token::new("Name", "Ali")],
        )
        .unwrap();

        let env = connector(&mock).verify(&msg).await.unwrap();
        assert_eq!(env.data["messageId"], 88);
        assert_eq!(mock.last_request().unwrap().url, "https://api.sms.ir/v1/send/verify");
        assert_eq!(
            json_of(&mock),
            json!({
                "mobile": "989121234567",
                "templateId": 100200,
                "parameters": [
                    {"name": "Code", "value": "4821"},
                    {"name": "Name", "value": "Ali"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn verify_rejects_missing_or_non_numeric_template_without_network() {
        let mock = MockTransport::new();
        let c = connector(&mock);
        let plain = Message::text(["989121234567"], "hi").unwrap();
        let blank = Message::template("989121234567", " ", vec![]).unwrap();
        let wordy = Message::template("989121234567", "otp-login", vec![]).unwrap();
        for msg in [plain, blank, wordy] {
            assert!(matches!(c.verify(&msg).await, Err(SmsError::InvalidRequest(_))));
        }
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn account_reads_bare_credit() {
        let mock = MockTransport::responding(200, r#"{"status":1,"message":"ok","data":1520.5}"#);
        let info = connector(&mock).account().await.unwrap();
        assert_eq!(info.balance, 1520.5);
        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url, "https://api.sms.ir/v1/credit");
    }

    #[tokio::test]
    async fn outbox_maps_records_and_sends_paging() {
        let mock = MockTransport::responding(
            200,
            r#"{"status":1,"message":"ok","data":[
                {"messageId":1,"mobile":"989121234567","messageText":"a","sendDateTime":1700000000,"lineNumber":30004505,"cost":1.0},
                {"messageId":2,"mobile":"989351234567","messageText":"b","sendDateTime":null,"lineNumber":30004505,"cost":2.0}
            ]}"#,
        );
        let records = connector(&mock)
            .outbox(OutboxQuery::new(10, 2))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message_id, "1");
        assert_eq!(records[0].sender.as_deref(), Some("30004505"));
        assert_eq!(records[0].sent_at.unwrap().unix_timestamp(), 1_700_000_000);
        assert_eq!(records[1].sent_at, None);
        assert_eq!(records[1].cost, Some(2.0));
        assert_eq!(
            mock.last_request().unwrap().url,
            "https://api.sms.ir/v1/send/live?PageSize=10&PageNumber=2"
        );
    }

    #[tokio::test]
    async fn outbox_rejects_bad_paging_without_network() {
        let mock = MockTransport::new();
        let c = connector(&mock);
        for q in [OutboxQuery::new(0, 1), OutboxQuery::new(10, -1)] {
            assert!(matches!(c.outbox(q).await, Err(SmsError::InvalidRequest(_))));
        }
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_and_malformed_bodies() {
        let mock = MockTransport::new();
        mock.push_response(418, r#"{"status":418,"message":"Insufficient credit"}"#);
        mock.push_response(404, "");
        let c = connector(&mock);

        let err = c.account().await.unwrap_err();
        assert_eq!(
            err,
            SmsError::Provider {
                code: 418,
                message: "Insufficient credit".into()
            }
        );
        let err = c.outbox(OutboxQuery::default()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsError::MalformedResponse {
                http_status: Some(404),
                ..
            }
        ));
    }

    #[cfg(feature = "reqwest")]
    #[tokio::test]
    async fn reqwest_round_trip_carries_api_key_header() {
        use wiremock::matchers::{header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/send/live"))
            .and(query_param("PageSize", "100"))
            .and(query_param("PageNumber", "1"))
            .and(header("x-api-key", "k"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status":1,"message":"ok","data":[]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = ProviderConfig::new("k").with_base_url(format!("{}/v1", server.uri()));
        let records = SmsIrConnector::from_config(&config)
            .unwrap()
            .outbox(OutboxQuery::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
