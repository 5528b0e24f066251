//! Advanced results: one query string in, one paginated result envelope out.
//!
//! The pipeline strips the control parameters (`select`, `sort`, `page`, `limit`), turns the
//! rest into a filter (bare `gt`/`gte`/`lt`/`lte`/`in` keys become store operators), applies
//! the route's populate, projection and sort, counts, pages and executes. Results are
//! returned by value; nothing is stashed on the request.

mod filter;
mod pagination;

pub use filter::{
    BARE_OPERATORS, RESERVED_KEYS, coerce_scalar, filter_document, rewrite_operators,
    select_fields, sort_keys,
};
pub use pagination::{
    CountMode, DEFAULT_LIMIT, DEFAULT_MAX_LIMIT, DEFAULT_PAGE, PageLink, PaginationConfig,
    PaginationResult, PaginationState,
};

use crate::errors::{ApiError, DbError};
use crate::query::{Filter, parse_filter_document};
use crate::query_string::QuerySpec;
use crate::store::{DocumentStore, DocumentStoreExt, Populate};
use crate::utils::json::{bson_document_to_json, bson_to_json};
use crate::utils::num::usize_to_u64;
use bson::{Bson, Document as BsonDocument};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Sort applied when the client names none: newest first.
pub const DEFAULT_SORT: &str = "-createdAt";

/// Response body of every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    pub count: u64,
    pub pagination: PaginationResult,
    pub data: Vec<serde_json::Value>,
}

/// Per-route pipeline configuration, fixed at wiring time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedResults {
    populate: Vec<Populate>,
    pagination: PaginationConfig,
}

impl AdvancedResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_populate(mut self, populate: impl Into<Populate>) -> Self {
        self.populate.push(populate.into());
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// # Errors
    /// `ApiError::ClientInput` for filters the store cannot express; store failures are
    /// passed through as `ApiError::Store`.
    pub async fn run<S>(&self, store: &S, spec: &QuerySpec) -> Result<ResultEnvelope, ApiError>
    where
        S: DocumentStore + ?Sized,
    {
        self.run_scoped(store, spec, BsonDocument::new()).await
    }

    /// Like [`run`](Self::run), with route-supplied equality constraints (such as the parent
    /// id of a nested route) that override any client value for the same field.
    ///
    /// # Errors
    /// See [`run`](Self::run).
    pub async fn run_scoped<S>(
        &self,
        store: &S,
        spec: &QuerySpec,
        scope: BsonDocument,
    ) -> Result<ResultEnvelope, ApiError>
    where
        S: DocumentStore + ?Sized,
    {
        let started = Instant::now();

        let mut filter_doc = filter_document(spec)?;
        for (field, value) in scope {
            filter_doc.insert(field, value);
        }
        let filter = parse_filter_document(&filter_doc).map_err(|e| match e {
            DbError::QueryError(m) => ApiError::ClientInput(m),
            other => ApiError::Store(other),
        })?;

        let mut query = store.find(filter.clone());
        for p in &self.populate {
            query = query.populate(p.clone());
        }
        if let Some(fields) = select_fields(spec) {
            query = query.select(fields.join(" "));
        }
        let sort = sort_keys(spec).map_or_else(|| DEFAULT_SORT.to_string(), |k| k.join(" "));
        query = query.sort(sort.as_str());

        let state = PaginationState::from_query(spec, &self.pagination);
        let total = match self.pagination.count_mode {
            CountMode::Filtered => store.count(Some(&filter)).await?,
            CountMode::Collection => store.count(None).await?,
        };
        let state = state.with_total(total);

        let docs = query.skip(state.start_index).limit(state.limit).exec().await?;
        let data: Vec<serde_json::Value> = docs.iter().map(bson_document_to_json).collect();
        let count = usize_to_u64(data.len());

        log::info!(
            target: "devcamper::query",
            "{}",
            serde_json::json!({
                "collection": store.name(),
                "filter": bson_to_json(&Bson::Document(filter_doc)),
                "sort": sort,
                "skip": state.start_index,
                "limit": state.limit,
                "total": total,
                "result_count": count,
                "duration_ms": started.elapsed().as_millis(),
            })
        );

        Ok(ResultEnvelope { success: true, count, pagination: state.links(), data })
    }
}

/// Convenience for routes that scope by a single field.
#[must_use]
pub fn scope(field: &str, value: impl Into<Bson>) -> BsonDocument {
    let mut d = BsonDocument::new();
    d.insert(field, value.into());
    d
}

/// The filter a request would run with, for diagnostics.
///
/// # Errors
/// Same classification as [`AdvancedResults::run`].
pub fn build_filter(spec: &QuerySpec) -> Result<Filter, ApiError> {
    let doc = filter_document(spec)?;
    parse_filter_document(&doc).map_err(|e| match e {
        DbError::QueryError(m) => ApiError::ClientInput(m),
        other => ApiError::Store(other),
    })
}
