use crate::document::Document;
use parking_lot::RwLock;

/// A field that must be present and non-empty, with the message reported when it is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField {
    pub field: String,
    pub message: String,
}

/// Per-collection write rules, checked on insert and update.
#[derive(Debug, Clone, Default)]
pub struct CollectionRules {
    pub required: Vec<RequiredField>,
    pub unique: Vec<String>,
}

impl CollectionRules {
    #[must_use]
    pub fn require(mut self, field: &str, message: &str) -> Self {
        self.required.push(RequiredField {
            field: field.to_string(),
            message: message.to_string(),
        });
        self
    }

    #[must_use]
    pub fn unique(mut self, field: &str) -> Self {
        self.unique.push(field.to_string());
        self
    }
}

/// An ordered, in-memory set of documents. Insertion order is the natural order of scans.
pub struct Collection {
    pub name: String,
    pub rules: CollectionRules,
    pub(crate) docs: RwLock<Vec<Document>>,
}

impl Collection {
    pub fn new(name: String) -> Self {
        Self::with_rules(name, CollectionRules::default())
    }

    pub fn with_rules(name: String, rules: CollectionRules) -> Self {
        Self { name, rules, docs: RwLock::new(Vec::new()) }
    }

    pub fn name_str(&self) -> &str {
        &self.name
    }
}
