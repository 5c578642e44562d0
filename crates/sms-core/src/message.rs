use time::OffsetDateTime;

use crate::SmsError;

/// One named substitution for a provider-rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub value: String,
}

impl Token {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What the provider should deliver: literal text, or a template it renders itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Template { id: String, tokens: Vec<Token> },
}

/// An outbound request for a connector.
///
/// Plain messages may target several recipients; templated (verify) messages
/// always target exactly one. Values are immutable once built: the builder
/// methods consume `self` and return a new message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    recipients: Vec<String>,
    sender: Option<String>,
    content: Content,
    scheduled_at: Option<OffsetDateTime>,
}

impl Message {
    /// Plain-send message with a literal body.
    pub fn text<I, S>(recipients: I, body: impl Into<String>) -> Result<Self, SmsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let recipients = recipients
            .into_iter()
            .map(|r| r.into().trim().to_string())
            .collect::<Vec<_>>();
        if recipients.is_empty() {
            return Err(SmsError::InvalidRequest(
                "message needs at least one recipient".into(),
            ));
        }
        if recipients.iter().any(String::is_empty) {
            return Err(SmsError::InvalidRequest("recipient must not be blank".into()));
        }
        let body = body.into();
        if body.trim().is_empty() {
            return Err(SmsError::InvalidRequest("message body must not be blank".into()));
        }
        Ok(Self {
            recipients,
            sender: None,
            content: Content::Text(body),
            scheduled_at: None,
        })
    }

    /// Templated (verify) message for a single recipient.
    ///
    /// The template id is not checked here; `verify` rejects a blank one
    /// before anything goes on the wire.
    pub fn template(
        recipient: impl Into<String>,
        template_id: impl Into<String>,
        tokens: Vec<Token>,
    ) -> Result<Self, SmsError> {
        let recipient = recipient.into().trim().to_string();
        if recipient.is_empty() {
            return Err(SmsError::InvalidRequest("recipient must not be blank".into()));
        }
        Ok(Self {
            recipients: vec![recipient],
            sender: None,
            content: Content::Template {
                id: template_id.into().trim().to_string(),
                tokens,
            },
            scheduled_at: None,
        })
    }

    /// Send from a specific line instead of the provider's default.
    pub fn from(mut self, sender: impl Into<String>) -> Self {
        let sender = sender.into();
        self.sender = (!sender.trim().is_empty()).then_some(sender);
        self
    }

    /// Ask the provider to hold the message until `at`.
    pub fn schedule(mut self, at: OffsetDateTime) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn scheduled_at(&self) -> Option<OffsetDateTime> {
        self.scheduled_at
    }

    /// Body text for plain messages.
    pub fn body(&self) -> Option<&str> {
        match &self.content {
            Content::Text(body) => Some(body),
            Content::Template { .. } => None,
        }
    }

    /// Template id for templated messages, `None` when blank or in plain mode.
    pub fn template_id(&self) -> Option<&str> {
        match &self.content {
            Content::Template { id, .. } if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        match &self.content {
            Content::Template { tokens, .. } => tokens,
            Content::Text(_) => &[],
        }
    }

    /// Sender to put on the wire: the message's own, else `default_line`.
    pub fn sender_or<'a>(&'a self, default_line: Option<&'a str>) -> Option<&'a str> {
        self.sender().or(default_line)
    }

    /// Checks the message is a plain send and returns its body.
    pub fn require_body(&self) -> Result<&str, SmsError> {
        self.body().ok_or_else(|| {
            SmsError::InvalidRequest("send requires a plain-text message, got a template".into())
        })
    }

    /// Checks the message is templated with a non-empty id and returns
    /// its single recipient and the id.
    pub fn require_template(&self) -> Result<(&str, &str), SmsError> {
        let id = self.template_id().ok_or_else(|| {
            SmsError::InvalidRequest("verify requires a message with a template id".into())
        })?;
        Ok((self.recipients[0].as_str(), id))
    }
}
