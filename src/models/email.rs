use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// An outgoing email.
///
/// # Examples
/// ```
/// use resend_client::EmailMessage;
///
/// let message = EmailMessage::new("Acme <onboarding@acme.dev>", ["delivered@resend.dev"], "Hello")
///     .html("<p>It works!</p>")
///     .header("X-Entity-Ref-ID", "123");
/// assert_eq!(message.to, vec!["delivered@resend.dev".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    /// Sender address, optionally with a display name.
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain-text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Extra MIME headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<EmailAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EmailTag>>,
    /// Deliver at this instant instead of immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl EmailMessage {
    pub fn new<I, S>(from: impl Into<String>, to: I, subject: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            cc: None,
            bcc: None,
            reply_to: None,
            html: None,
            text: None,
            headers: None,
            attachments: None,
            tags: None,
            scheduled_at: None,
        }
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.get_or_insert_with(Vec::new).push(address.into());
        self
    }

    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.get_or_insert_with(Vec::new).push(address.into());
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.get_or_insert_with(Vec::new).push(address.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(EmailTag {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// A file attached to an [`EmailMessage`], either inline or fetched by Resend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64-encoded file content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// URL Resend downloads the file from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl EmailAttachment {
    /// Attach raw bytes; they are base64-encoded for the wire.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: Some(STANDARD.encode(bytes)),
            path: None,
            content_type: None,
        }
    }

    /// Attach a remote file by URL.
    pub fn from_path(filename: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: None,
            path: Some(path.into()),
            content_type: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Custom key/value tag attached to an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTag {
    pub name: String,
    pub value: String,
}

/// Most recent delivery event recorded for an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Scheduled,
    Sent,
    Delivered,
    DeliveryDelayed,
    Opened,
    Clicked,
    Bounced,
    Complained,
    Canceled,
    /// Value this client does not know. Received only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// A previously sent email as reported by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailReceipt {
    pub id: Uuid,
    pub from: String,
    #[serde(default, deserialize_with = "address_list")]
    pub to: Vec<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub cc: Vec<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub bcc: Vec<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub reply_to: Vec<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_event: Option<DeliveryStatus>,
}

// The API reports unset address lists as `null` or `[null]`.
fn address_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw.into_iter().flatten().flatten().collect())
}
