//! Bootcamp directory REST API over an embedded document store.
//!
//! The interesting part is [`advanced`]: it turns a request's query string into a filtered,
//! projected, sorted and paginated read against any [`store::DocumentStore`], and wraps the
//! result in a [`advanced::ResultEnvelope`].

pub mod advanced;
pub mod collection;
pub mod config;
pub mod document;
pub mod engine;
pub mod errors;
pub mod http;
pub mod logger;
pub mod query;
pub mod query_string;
pub mod resources;
pub mod seed;
pub mod store;
pub mod types;
pub mod utils;

pub use advanced::{AdvancedResults, ResultEnvelope};
pub use errors::{ApiError, DbError};
pub use query_string::QuerySpec;

use crate::config::AppConfig;
use crate::engine::Engine;
use std::sync::Arc;

/// Build the HTTP application over `engine`, seeding it first when `cfg.seed_dir` is set.
///
/// # Errors
/// Returns the seeding failure, if any.
pub fn build_app(engine: Arc<Engine>, cfg: &AppConfig) -> Result<axum::Router, DbError> {
    if let Some(dir) = &cfg.seed_dir {
        seed::import_dir(&engine, dir)?;
    }
    let state = http::AppState::new(engine, cfg.pagination.clone());
    Ok(http::router(state))
}
