//! QuerySpec to FilterDocument translation.

use crate::errors::{ApiError, DbError};
use crate::query::OPERATOR_MARKER;
use crate::query_string::{QuerySpec, QueryValue};
use bson::{Bson, Document as BsonDocument};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Control parameters; never part of the filter.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Operator names a client may write bare (`averageCost[lte]=10000`).
pub const BARE_OPERATORS: [&str; 5] = ["gt", "gte", "lt", "lte", "in"];

// Key position only: an object key is always preceded by `{` or `,` in compact JSON, and
// quotes inside string values are escaped, so values and longer names never match.
static OPERATOR_KEY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(&format!(r#"([{{,])"({})":"#, BARE_OPERATORS.join("|"))));

/// Prefix every bare operator key in a compact JSON text with the operator marker.
///
/// # Errors
/// Only if the operator pattern fails to compile.
pub fn rewrite_operators(json: &str) -> Result<String, DbError> {
    let re = OPERATOR_KEY.as_ref().map_err(|e| DbError::Pattern(e.clone()))?;
    let marked = re.replace_all(json, |c: &regex::Captures<'_>| {
        format!("{}\"{OPERATOR_MARKER}{}\":", &c[1], &c[2])
    });
    Ok(marked.into_owned())
}

/// Build the store-native filter document for a query: reserved keys removed, bare operators
/// marked, operand strings coerced.
///
/// # Errors
/// `ApiError::ClientInput` when the client names an operator with the marker already
/// attached, or when the rewritten text no longer parses.
pub fn filter_document(spec: &QuerySpec) -> Result<BsonDocument, ApiError> {
    let subset = spec.without(&RESERVED_KEYS);
    for (key, value) in subset.iter() {
        reject_marked_keys(key, value)?;
    }
    let json = serde_json::to_string(&subset).map_err(DbError::from)?;
    let rewritten = rewrite_operators(&json)?;
    let value: Value = serde_json::from_str(&rewritten)
        .map_err(|e| ApiError::ClientInput(format!("Invalid filter: {e}")))?;
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, coerce(v))).collect()),
        _ => Err(ApiError::ClientInput("Invalid filter: expected an object".into())),
    }
}

fn reject_marked_keys(key: &str, value: &QueryValue) -> Result<(), ApiError> {
    if key.starts_with(OPERATOR_MARKER) {
        return Err(ApiError::ClientInput(format!("Invalid filter key '{key}'")));
    }
    match value {
        QueryValue::Map(m) => m.iter().try_for_each(|(k, v)| reject_marked_keys(k, v)),
        QueryValue::List(items) => items.iter().try_for_each(|v| reject_marked_keys("", v)),
        QueryValue::Str(_) => Ok(()),
    }
}

/// Query strings carry only text; numbers and booleans are recovered here so that
/// `averageCost[lte]=10000` compares numerically.
#[must_use]
pub fn coerce_scalar(s: &str) -> Bson {
    // zip codes and similar zero-padded identifiers stay text
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    if unsigned.len() > 1 && unsigned.starts_with('0') && !unsigned.starts_with("0.") {
        return Bson::String(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return Bson::Int64(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() && !s.trim().is_empty() {
            return Bson::Double(f);
        }
    }
    match s {
        "true" => Bson::Boolean(true),
        "false" => Bson::Boolean(false),
        _ => Bson::String(s.to_string()),
    }
}

fn coerce(v: Value) -> Bson {
    match v {
        Value::String(s) => coerce_scalar(&s),
        Value::Array(items) => Bson::Array(items.into_iter().map(coerce).collect()),
        Value::Object(map) => {
            Bson::Document(map.into_iter().map(|(k, v)| (k, coerce(v))).collect())
        }
        other => crate::utils::json::json_to_bson(&other),
    }
}

/// `select=name,description` as the field list, request order kept. Repeated `select`
/// parameters concatenate.
#[must_use]
pub fn select_fields(spec: &QuerySpec) -> Option<Vec<String>> {
    comma_list(spec.get("select")?)
}

/// `sort=-createdAt,name` as store sort keys; `-` marks descending.
#[must_use]
pub fn sort_keys(spec: &QuerySpec) -> Option<Vec<String>> {
    comma_list(spec.get("sort")?)
}

fn comma_list(value: &QueryValue) -> Option<Vec<String>> {
    let fields: Vec<String> = value
        .strings()
        .into_iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() { None } else { Some(fields) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn reserved_keys_are_stripped() {
        let q = QuerySpec::parse("select=name&sort=-name&page=2&limit=5&housing=true");
        assert_eq!(filter_document(&q).unwrap(), doc! {"housing": true});
    }

    #[test]
    fn bare_operators_get_marked_once() {
        let q = QuerySpec::parse("averageCost[lte]=10000&averageCost[gt]=500&careers[in]=Business");
        let d = filter_document(&q).unwrap();
        assert_eq!(
            d,
            doc! {
                "averageCost": {"$gt": 500_i64, "$lte": 10000_i64},
                "careers": {"$in": "Business"},
            }
        );
    }

    #[test]
    fn whole_token_keys_only() {
        let json = r#"{"gting":{"lte":"1"},"ingredient":"in","name":{"gte":"in"}}"#;
        assert_eq!(
            rewrite_operators(json).unwrap(),
            r#"{"gting":{"$lte":"1"},"ingredient":"in","name":{"$gte":"in"}}"#
        );
    }

    #[test]
    fn rewriting_is_idempotent_on_marked_text() {
        let once = rewrite_operators(r#"{"a":{"gt":"1","in":["x"]}}"#).unwrap();
        assert_eq!(rewrite_operators(&once).unwrap(), once);
    }

    #[test]
    fn client_marker_keys_are_rejected() {
        let q = QuerySpec::parse("averageCost[%24ne]=1");
        assert!(matches!(filter_document(&q), Err(ApiError::ClientInput(_))));
        let q = QuerySpec::parse("%24where=1");
        assert!(matches!(filter_document(&q), Err(ApiError::ClientInput(_))));
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(coerce_scalar("42"), Bson::Int64(42));
        assert_eq!(coerce_scalar("-1.5"), Bson::Double(-1.5));
        assert_eq!(coerce_scalar("true"), Bson::Boolean(true));
        assert_eq!(coerce_scalar("NaN"), Bson::String("NaN".into()));
        assert_eq!(coerce_scalar("inf"), Bson::String("inf".into()));
        assert_eq!(coerce_scalar("MA"), Bson::String("MA".into()));
        assert_eq!(coerce_scalar("02118"), Bson::String("02118".into()));
        assert_eq!(coerce_scalar("0"), Bson::Int64(0));
        assert_eq!(coerce_scalar("0.5"), Bson::Double(0.5));
    }

    #[test]
    fn list_operands_are_coerced_item_by_item() {
        let q = QuerySpec::parse("rating[in][]=8&rating[in][]=10");
        let d = filter_document(&q).unwrap();
        assert_eq!(d, doc! {"rating": {"$in": [8_i64, 10_i64]}});
    }

    #[test]
    fn select_and_sort_split_on_commas() {
        let q = QuerySpec::parse("select=name,description&sort=-createdAt,name");
        assert_eq!(select_fields(&q).unwrap(), vec!["name", "description"]);
        assert_eq!(sort_keys(&q).unwrap(), vec!["-createdAt", "name"]);
        assert_eq!(sort_keys(&QuerySpec::parse("sort=")), None);
        assert_eq!(select_fields(&QuerySpec::default()), None);
    }
}
