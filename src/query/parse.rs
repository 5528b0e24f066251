use crate::errors::DbError;
use bson::{Bson, Document as BsonDocument};

use super::types::{CmpOp, Filter, MAX_IN_SET};

/// Marker that distinguishes query operators from field names in a filter document.
pub const OPERATOR_MARKER: char = '$';

/// Translate a store-native filter document into a `Filter`.
///
/// Each top-level key is a field path. Its value is either a literal (equality) or a
/// document whose keys are all operators: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
/// `$in`, `$nin`. Sibling fields are combined with AND.
///
/// # Errors
/// Returns `DbError::QueryError` for unknown operators, operators in field position,
/// or documents that mix operators with plain keys.
pub fn parse_filter_document(doc: &BsonDocument) -> Result<Filter, DbError> {
    let mut parts = Vec::new();
    for (field, value) in doc {
        if field.starts_with(OPERATOR_MARKER) {
            return Err(DbError::QueryError(format!("unsupported top-level operator '{field}'")));
        }
        if field.is_empty() {
            return Err(DbError::QueryError("empty field name".into()));
        }
        match value {
            Bson::Document(ops) if ops.keys().any(|k| k.starts_with(OPERATOR_MARKER)) => {
                for (op, operand) in ops {
                    parts.push(parse_operator(field, op, operand)?);
                }
            }
            literal => parts.push(Filter::Cmp {
                path: field.clone(),
                op: CmpOp::Eq,
                value: literal.clone(),
            }),
        }
    }
    Ok(match parts.len() {
        0 => Filter::True,
        1 => parts.remove(0),
        _ => Filter::And(parts),
    })
}

fn parse_operator(field: &str, op: &str, operand: &Bson) -> Result<Filter, DbError> {
    let cmp = |op| Filter::Cmp { path: field.to_string(), op, value: operand.clone() };
    Ok(match op {
        "$eq" => cmp(CmpOp::Eq),
        "$ne" => cmp(CmpOp::Ne),
        "$gt" => cmp(CmpOp::Gt),
        "$gte" => cmp(CmpOp::Gte),
        "$lt" => cmp(CmpOp::Lt),
        "$lte" => cmp(CmpOp::Lte),
        "$in" => Filter::In { path: field.to_string(), values: operand_set(op, operand)? },
        "$nin" => Filter::Nin { path: field.to_string(), values: operand_set(op, operand)? },
        _ if op.starts_with(OPERATOR_MARKER) => {
            return Err(DbError::QueryError(format!("unsupported operator '{op}' on '{field}'")));
        }
        _ => {
            return Err(DbError::QueryError(format!(
                "cannot mix operators and plain keys on '{field}'"
            )));
        }
    })
}

fn operand_set(op: &str, operand: &Bson) -> Result<Vec<Bson>, DbError> {
    match operand {
        Bson::Array(items) => Ok(items.iter().take(MAX_IN_SET).cloned().collect()),
        Bson::Document(_) => Err(DbError::QueryError(format!("{op} needs a list of values"))),
        scalar => Ok(vec![scalar.clone()]),
    }
}

/// # Errors
/// Returns an error if the JSON string is not an object or names an unsupported operator.
pub fn parse_filter_json(json: &str) -> Result<Filter, DbError> {
    let doc = crate::utils::json::parse_json_to_bson_document(json)?;
    parse_filter_document(&doc)
}
