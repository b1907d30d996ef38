//! Data transfer records mirroring the Resend API's JSON shapes.

mod api_key;
mod audience;
mod contact;
mod domain;
mod email;
mod webhook;

pub use api_key::{ApiKey, ApiKeyData, Permission};
pub(crate) use api_key::ApiKeyCreateRequest;
pub use audience::Audience;
pub(crate) use audience::AudienceAddRequest;
pub use contact::{Contact, ContactData};
pub use domain::{DeliveryRegion, DnsRecord, Domain, DomainStatus, DomainUpdateData, TlsMode};
pub(crate) use domain::DomainAddRequest;
pub use email::{DeliveryStatus, EmailAttachment, EmailMessage, EmailReceipt, EmailTag};
pub use webhook::Webhook;

use serde::Deserialize;
use uuid::Uuid;

/// `{"id": "..."}` body returned by create endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectId {
    pub id: Option<Uuid>,
}

impl ObjectId {
    pub(crate) fn into_id(self) -> Result<Uuid, String> {
        self.id.ok_or_else(|| "response has no `id` field".to_string())
    }
}

/// `{"data": [...]}` envelope returned by list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ListOf<T> {
    pub data: Option<Vec<T>>,
}

impl<T> ListOf<T> {
    pub(crate) fn into_data(self) -> Result<Vec<T>, String> {
        self.data.ok_or_else(|| "response has no `data` array".to_string())
    }
}
