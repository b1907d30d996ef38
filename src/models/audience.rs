use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named list of contacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Audience {
    pub id: Uuid,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AudienceAddRequest<'a> {
    pub name: &'a str,
}
