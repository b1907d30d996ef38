use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    FullAccess,
    SendingAccess,
}

/// API key metadata as listed by the API. The secret is never returned here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A freshly created API key, including its secret token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKeyData {
    pub id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiKeyCreateRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<Uuid>,
}
