use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// A registered webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub endpoint: String,
    /// Event names delivered to the endpoint, e.g. `email.delivered`.
    #[serde(default)]
    pub events: Vec<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}
