use crate::collection::Collection;
use crate::document::Document;
use crate::utils::num::usize_to_u64;
use std::time::Instant;

use super::eval::{compare_docs, eval_filter, project_fields};
use super::types::{Filter, FindOptions, MAX_SORT_FIELDS};

/// Run a find against one collection: filter, stable sort, skip/limit window, then projection.
pub fn find_docs(col: &Collection, filter: &Filter, opts: &FindOptions) -> Vec<Document> {
    let start = Instant::now();
    let mut docs: Vec<Document> = Vec::new();
    col.scan(|d| {
        if eval_filter(&d.data, filter) {
            docs.push(d.clone());
        }
    });
    let matched = docs.len();

    if let Some(sort) = &opts.sort {
        if sort.len() > MAX_SORT_FIELDS {
            log::warn!("sort spec too long: {}", sort.len());
        }
        docs.sort_by(|a, b| compare_docs(&a.data, &b.data, sort));
    }

    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX);
    let mut docs: Vec<Document> = docs.into_iter().skip(skip).take(limit).collect();

    if let Some(projection) = &opts.projection {
        for d in &mut docs {
            d.data = project_fields(&d.data, projection);
        }
    }

    log::trace!(
        target: "devcamper::query",
        "{{\"op\":\"find\",\"collection\":\"{}\",\"duration_ms\":{},\"matched\":{},\"result_count\":{},\"skip\":{},\"limit\":{}}}",
        col.name_str(),
        start.elapsed().as_millis(),
        usize_to_u64(matched),
        usize_to_u64(docs.len()),
        usize_to_u64(skip),
        usize_to_u64(opts.limit.unwrap_or(0))
    );
    docs
}

#[must_use]
pub fn count_docs(col: &Collection, filter: &Filter) -> usize {
    if matches!(filter, Filter::True) {
        return col.len();
    }
    let mut n = 0usize;
    col.scan(|d| {
        if eval_filter(&d.data, filter) {
            n += 1;
        }
    });
    n
}
