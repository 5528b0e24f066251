use crate::query_string::QuerySpec;
use crate::utils::num::parse_leading_int;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
/// No cap on `limit` unless configured.
pub const DEFAULT_MAX_LIMIT: u64 = 0;

/// What `total` counts when deciding whether a next page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Documents matching the request's filter.
    #[default]
    Filtered,
    /// Every document in the collection, regardless of filter.
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    pub count_mode: CountMode,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            count_mode: CountMode::Filtered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u64,
    pub limit: u64,
    pub start_index: u64,
    pub end_index: u64,
    pub total: u64,
}

impl PaginationState {
    /// Read `page` and `limit` from the query. Missing, non-numeric and non-positive values
    /// fall back to the defaults; `limit` is capped at `max_limit` when that is non-zero.
    #[must_use]
    pub fn from_query(spec: &QuerySpec, cfg: &PaginationConfig) -> Self {
        let default_limit = cfg.default_limit.max(1);
        let page = positive_param(spec, "page").unwrap_or(DEFAULT_PAGE);
        let limit = positive_param(spec, "limit").unwrap_or(default_limit);
        let limit = if cfg.max_limit > 0 { limit.min(cfg.max_limit) } else { limit };
        Self::new(page, limit)
    }

    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            page,
            limit,
            start_index: (page - 1).saturating_mul(limit),
            end_index: page.saturating_mul(limit),
            total: 0,
        }
    }

    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    #[must_use]
    pub fn links(&self) -> PaginationResult {
        PaginationResult {
            next: (self.end_index < self.total)
                .then(|| PageLink { page: self.page + 1, limit: self.limit }),
            prev: (self.start_index > 0)
                .then(|| PageLink { page: self.page - 1, limit: self.limit }),
        }
    }
}

fn positive_param(spec: &QuerySpec, key: &str) -> Option<u64> {
    let raw = spec.get(key)?.first_str()?;
    let n = parse_leading_int(raw)?;
    u64::try_from(n).ok().filter(|n| *n > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}
