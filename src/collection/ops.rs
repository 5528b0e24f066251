use super::core::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::types::DocumentId;
use bson::{Bson, Document as BsonDocument};

impl Collection {
    /// # Errors
    /// Fails on a missing required field, a unique-field clash or an id already present.
    pub fn insert_document(&self, document: Document) -> Result<DocumentId, DbError> {
        self.validate(&document.data)?;
        let mut docs = self.docs.write();
        if docs.iter().any(|d| d.id == document.id) {
            return Err(DbError::DuplicateKey("_id".into()));
        }
        self.check_unique(&docs, &document)?;
        let id = document.id;
        docs.push(document);
        log::debug!("insert {} into {}", id, self.name_str());
        Ok(id)
    }

    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().iter().find(|d| d.id == *id).cloned()
    }

    /// Merge `patch` into the document and re-run validation. Returns the updated document,
    /// or `None` when no document has this id.
    ///
    /// # Errors
    /// Fails when the merged document breaks a rule; the stored document is left untouched.
    pub fn update_document(
        &self,
        id: &DocumentId,
        patch: &BsonDocument,
    ) -> Result<Option<Document>, DbError> {
        let mut docs = self.docs.write();
        let Some(pos) = docs.iter().position(|d| d.id == *id) else {
            return Ok(None);
        };
        let mut updated = docs[pos].clone();
        if updated.update(patch) {
            self.validate(&updated.data)?;
            self.check_unique(&docs, &updated)?;
            docs[pos] = updated.clone();
            log::debug!("update {} in {}", id, self.name_str());
        }
        Ok(Some(updated))
    }

    pub fn delete_document(&self, id: &DocumentId) -> Option<Document> {
        let mut docs = self.docs.write();
        let pos = docs.iter().position(|d| d.id == *id)?;
        log::debug!("delete {} from {}", id, self.name_str());
        Some(docs.remove(pos))
    }

    pub fn get_all_documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    /// Visit every document under a single read lock, without cloning.
    pub fn scan<F: FnMut(&Document)>(&self, mut f: F) {
        for d in self.docs.read().iter() {
            f(d);
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Remove every document; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut docs = self.docs.write();
        let n = docs.len();
        docs.clear();
        n
    }

    fn validate(&self, data: &BsonDocument) -> Result<(), DbError> {
        let missing: Vec<String> = self
            .rules
            .required
            .iter()
            .filter(|r| match data.get(&r.field) {
                None | Some(Bson::Null) => true,
                Some(Bson::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|r| r.message.clone())
            .collect();
        if missing.is_empty() { Ok(()) } else { Err(DbError::Validation(missing)) }
    }

    fn check_unique(&self, docs: &[Document], candidate: &Document) -> Result<(), DbError> {
        for field in &self.rules.unique {
            let Some(v) = candidate.data.get(field) else { continue };
            if docs.iter().any(|d| d.id != candidate.id && d.data.get(field) == Some(v)) {
                return Err(DbError::DuplicateKey(field.clone()));
            }
        }
        Ok(())
    }
}
