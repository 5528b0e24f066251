//! Loading and clearing sample data.
//!
//! A seed directory holds one JSON array per collection (`bootcamps.json`, `courses.json`,
//! `reviews.json`, `users.json`). Missing files are skipped.

use crate::document::Document;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::resources;
use crate::utils::json::json_value_to_bson_document;
use serde_json::Value;
use std::path::Path;

/// Documents affected per collection, in seeding order.
pub type SeedReport = Vec<(String, usize)>;

/// # Errors
/// Fails on unreadable files, JSON that is not an array of objects, or documents that break
/// a collection rule. Documents inserted before the failure stay in place.
pub fn import_dir(engine: &Engine, dir: &Path) -> Result<SeedReport, DbError> {
    resources::install(engine);
    let mut report = Vec::new();
    for name in resources::ALL {
        let path = dir.join(format!("{name}.json"));
        if !path.exists() {
            log::debug!("seed: {} not present, skipping", path.display());
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        let n = import_json(engine, name, &text)?;
        log::info!("seed: imported {n} documents into {name}");
        report.push((name.to_string(), n));
    }
    Ok(report)
}

/// Insert every object of a JSON array into `collection`.
///
/// # Errors
/// See [`import_dir`].
pub fn import_json(engine: &Engine, collection: &str, text: &str) -> Result<usize, DbError> {
    let col = engine.collection(collection)?;
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(DbError::InvalidDocument(format!("{collection}: expected a JSON array")));
    };
    let mut n = 0;
    for item in &items {
        col.insert_document(Document::new(json_value_to_bson_document(item)?)?)?;
        n += 1;
    }
    Ok(n)
}

/// Remove every document from the known collections.
pub fn delete_all(engine: &Engine) -> SeedReport {
    resources::ALL
        .iter()
        .filter_map(|name| engine.get_collection(name).map(|c| ((*name).to_string(), c.clear())))
        .inspect(|(name, n)| log::info!("seed: deleted {n} documents from {name}"))
        .collect()
}
