//! The document store interface the query layer is written against.
//!
//! A store hands out [`PendingQuery`] values through [`DocumentStoreExt::find`]. Each builder
//! call returns a new pending query; nothing touches the store until [`PendingQuery::exec`].
//! Counting is a separate, independently awaited operation.

pub mod memory;

use crate::errors::DbError;
use crate::query::Filter;
use async_trait::async_trait;
use bson::Document as BsonDocument;

pub use memory::{MemoryStore, Relation};

/// Relation resolution requested by a route: which reference to follow, and which of the
/// referenced document's fields to keep (space-separated, store syntax).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populate {
    pub path: String,
    pub select: Option<String>,
}

impl Populate {
    #[must_use]
    pub fn path(path: &str) -> Self {
        Self { path: path.to_string(), select: None }
    }

    #[must_use]
    pub fn select(mut self, fields: &str) -> Self {
        self.select = Some(fields.to_string());
        self
    }
}

impl From<&str> for Populate {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

/// Everything a store needs to execute one read.
///
/// `select` and `sort` are space-separated lists in store syntax (`"name description"`,
/// `"-createdAt name"`).
#[derive(Debug, Clone, PartialEq)]
pub struct FindPlan {
    pub filter: Filter,
    pub select: Option<String>,
    pub sort: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub populate: Vec<Populate>,
}

impl FindPlan {
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self { filter, select: None, sort: None, skip: None, limit: None, populate: Vec::new() }
    }

    /// Selected field names in request order.
    #[must_use]
    pub fn select_fields(&self) -> Vec<&str> {
        self.select.as_deref().map(|s| s.split_whitespace().collect()).unwrap_or_default()
    }

    /// Sort keys in precedence order, `-` prefix meaning descending.
    #[must_use]
    pub fn sort_keys(&self) -> Vec<&str> {
        self.sort.as_deref().map(|s| s.split_whitespace().collect()).unwrap_or_default()
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the underlying collection, for logs.
    fn name(&self) -> &str;

    /// # Errors
    /// Store failures are returned unchanged; no retry is attempted.
    async fn execute(&self, plan: FindPlan) -> Result<Vec<BsonDocument>, DbError>;

    /// Count documents matching `filter`, or every document when `filter` is `None`.
    ///
    /// # Errors
    /// Store failures are returned unchanged.
    async fn count(&self, filter: Option<&Filter>) -> Result<u64, DbError>;
}

/// Query-building entry point available on every store, including `dyn DocumentStore`.
pub trait DocumentStoreExt: DocumentStore {
    fn find(&self, filter: Filter) -> PendingQuery<'_, Self> {
        PendingQuery { store: self, plan: FindPlan::new(filter) }
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}

/// A composable, not yet executed read.
#[must_use = "a pending query does nothing until exec() is awaited"]
pub struct PendingQuery<'a, S: ?Sized> {
    store: &'a S,
    plan: FindPlan,
}

impl<S: DocumentStore + ?Sized> PendingQuery<'_, S> {
    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.plan.select = Some(fields.into());
        self
    }

    pub fn sort(mut self, keys: impl Into<String>) -> Self {
        self.plan.sort = Some(keys.into());
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.plan.skip = Some(n);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.plan.limit = Some(n);
        self
    }

    pub fn populate(mut self, spec: impl Into<Populate>) -> Self {
        self.plan.populate.push(spec.into());
        self
    }

    #[must_use]
    pub fn plan(&self) -> &FindPlan {
        &self.plan
    }

    /// # Errors
    /// Propagates the store's failure unchanged.
    pub async fn exec(self) -> Result<Vec<BsonDocument>, DbError> {
        self.store.execute(self.plan).await
    }
}
