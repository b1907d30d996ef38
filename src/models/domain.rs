use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// AWS region a sending domain is provisioned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryRegion {
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "eu-west-1")]
    EuWest1,
    #[serde(rename = "sa-east-1")]
    SaEast1,
    #[serde(rename = "ap-northeast-1")]
    ApNortheast1,
    /// Value this client does not know. Received only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Verification state of a domain or one of its DNS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    NotStarted,
    Pending,
    Verified,
    Failure,
    TemporaryFailure,
    /// Value this client does not know. Received only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// DNS record the domain owner must publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Purpose of the record, e.g. `SPF` or `DKIM`.
    pub record: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: String,
    pub status: DomainStatus,
    pub value: String,
    pub priority: Option<u32>,
}

/// A sending domain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    pub name: String,
    pub status: DomainStatus,
    pub region: DeliveryRegion,
    pub created_at: DateTime<Utc>,
    /// Only present on create and retrieve.
    pub records: Option<Vec<DnsRecord>>,
}

/// TLS policy for outgoing mail from a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    Opportunistic,
    Enforced,
}

/// Tracking and TLS settings changed by a domain update. Unset fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainUpdateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsMode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DomainAddRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<DeliveryRegion>,
}
