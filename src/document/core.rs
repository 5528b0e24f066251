use crate::document::types::{CREATED_AT_FIELD, ID_FIELD, Metadata};
use crate::errors::DbError;
use crate::types::DocumentId;
use bson::{Bson, Document as BsonDocument};
use chrono::{DateTime, Utc};

/// A stored document. `data` always carries `_id` (hex string) and `createdAt` (BSON date).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
    pub metadata: Metadata,
}

impl Document {
    /// Wrap `data` as a document, honoring a caller-supplied `_id` and `createdAt`.
    ///
    /// A string `createdAt` is accepted in RFC 3339 form and normalized to a BSON date.
    ///
    /// # Errors
    /// Returns `DbError::InvalidDocumentId` for a malformed `_id` and
    /// `DbError::InvalidDocument` for an unparseable `createdAt`.
    pub fn new(mut data: BsonDocument) -> Result<Self, DbError> {
        let id = match data.get(ID_FIELD) {
            Some(Bson::String(s)) => s.parse::<DocumentId>()?,
            Some(Bson::ObjectId(oid)) => DocumentId(*oid),
            Some(other) => return Err(DbError::InvalidDocumentId(other.to_string())),
            None => DocumentId::new(),
        };
        data.insert(ID_FIELD, Bson::String(id.to_hex()));

        let created_at = match data.get(CREATED_AT_FIELD) {
            Some(Bson::DateTime(dt)) => {
                DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_else(Utc::now)
            }
            Some(Bson::String(s)) => DateTime::parse_from_rfc3339(s)
                .map_err(|e| DbError::InvalidDocument(format!("{CREATED_AT_FIELD}: {e}")))?
                .with_timezone(&Utc),
            Some(other) => {
                return Err(DbError::InvalidDocument(format!("{CREATED_AT_FIELD}: {other}")));
            }
            None => Utc::now(),
        };
        data.insert(
            CREATED_AT_FIELD,
            Bson::DateTime(bson::DateTime::from_millis(created_at.timestamp_millis())),
        );

        Ok(Self { id, data, metadata: Metadata::new(created_at) })
    }

    /// Merge `patch` into the document at the top level. `_id` and `createdAt` are never overwritten.
    ///
    /// Returns `true` if any field changed.
    pub fn update(&mut self, patch: &BsonDocument) -> bool {
        let mut changed = false;
        for (k, v) in patch {
            if k == ID_FIELD || k == CREATED_AT_FIELD {
                continue;
            }
            if self.data.get(k) != Some(v) {
                self.data.insert(k.clone(), v.clone());
                changed = true;
            }
        }
        if changed {
            self.metadata.updated_at = Utc::now();
        }
        changed
    }
}
