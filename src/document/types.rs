use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field holding the document id inside `data`.
pub const ID_FIELD: &str = "_id";
/// Field holding the creation timestamp inside `data`; the default sort key.
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    #[must_use]
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self { created_at, updated_at: Utc::now() }
    }
}
