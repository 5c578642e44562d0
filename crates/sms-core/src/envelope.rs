use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::SmsError;

/// Normalized result of any connector operation.
///
/// `data` is the provider's payload passed through as-is, except that an
/// absent or `null` payload becomes an empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: i64,
    pub message: String,
    #[serde(default = "empty_data", deserialize_with = "non_null_data")]
    pub data: Value,
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

fn non_null_data<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let data = Option::<Value>::deserialize(deserializer)?;
    Ok(data.filter(|v| !v.is_null()).unwrap_or_else(empty_data))
}

impl ResponseEnvelope {
    pub fn new(status: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        let data = match data {
            None | Some(Value::Null) => empty_data(),
            Some(v) => v,
        };
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// True when `data` holds nothing (empty object, list or string).
    pub fn is_empty(&self) -> bool {
        match &self.data {
            Value::Object(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Reads the payload as an account-credit answer.
    pub fn account_info(&self, fields: &AccountFields) -> Result<AccountInfo, SmsError> {
        let balance = self
            .data
            .pointer(fields.balance)
            .and_then(as_f64)
            .ok_or_else(|| {
                SmsError::malformed(None, format!("no numeric balance at '{}'", fields.balance))
            })?;
        let expires_at = fields
            .expires_at
            .and_then(|p| self.data.pointer(p))
            .and_then(as_timestamp);
        Ok(AccountInfo {
            balance,
            unit: fields.unit.map(str::to_string),
            expires_at,
        })
    }

    /// Reads the payload as one page of outbox history.
    pub fn outbox_records(&self, fields: &OutboxFields) -> Result<Vec<OutboxRecord>, SmsError> {
        let items = match &self.data {
            Value::Array(items) => items,
            _ if self.is_empty() => return Ok(Vec::new()),
            other => {
                return Err(SmsError::malformed(
                    None,
                    format!("outbox data is not a list: {other}"),
                ))
            }
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| OutboxRecord::from_value(idx, item, fields))
            .collect()
    }
}

/// Credit left on the provider account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance: f64,
    /// Unit of `balance` when the provider documents one (e.g. `"IRR"`).
    pub unit: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

/// One previously sent message as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub message_id: String,
    pub recipient: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub sent_at: Option<OffsetDateTime>,
    pub sender: Option<String>,
    pub cost: Option<f64>,
}

impl OutboxRecord {
    fn from_value(idx: usize, item: &Value, f: &OutboxFields) -> Result<Self, SmsError> {
        let required = |key: &str| {
            item.get(key).and_then(as_string).ok_or_else(|| {
                SmsError::malformed(None, format!("outbox record {idx} has no '{key}'"))
            })
        };
        Ok(Self {
            message_id: required(f.message_id)?,
            recipient: required(f.recipient)?,
            body: required(f.body)?,
            sent_at: item.get(f.sent_at).and_then(as_timestamp),
            sender: item.get(f.sender).and_then(as_string),
            cost: item.get(f.cost).and_then(as_f64),
        })
    }
}

/// Where a provider keeps account fields inside `data` (JSON pointers).
///
/// An empty pointer addresses `data` itself, for providers that answer
/// with a bare number.
#[derive(Debug, Clone, Copy)]
pub struct AccountFields {
    pub balance: &'static str,
    pub expires_at: Option<&'static str>,
    pub unit: Option<&'static str>,
}

/// Object keys of an outbox record in a provider's payload.
#[derive(Debug, Clone, Copy)]
pub struct OutboxFields {
    pub message_id: &'static str,
    pub recipient: &'static str,
    pub body: &'static str,
    pub sent_at: &'static str,
    pub sender: &'static str,
    pub cost: &'static str,
}

fn as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Unix seconds (number or numeric string) or an RFC 3339 string.
fn as_timestamp(v: &Value) -> Option<OffsetDateTime> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => OffsetDateTime::from_unix_timestamp(secs).ok(),
                Err(_) => OffsetDateTime::parse(s, &Rfc3339).ok(),
            }
        }
        _ => None,
    }
}
