use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{
    CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, Projection, SortSpec,
};
use crate::document::ID_FIELD;

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::In { path, values } => matches_in(get_path(doc, path), values),
        Filter::Nin { path, values } => !matches_in(get_path(doc, path), values),
        Filter::Cmp { path, op, value } => {
            let found = get_path(doc, path);
            match op {
                CmpOp::Eq => matches_eq(found, value),
                CmpOp::Ne => !matches_eq(found, value),
                CmpOp::Gt => matches_order(found, value, |o| o == Ordering::Greater),
                CmpOp::Gte => matches_order(found, value, |o| o != Ordering::Less),
                CmpOp::Lt => matches_order(found, value, |o| o == Ordering::Less),
                CmpOp::Lte => matches_order(found, value, |o| o != Ordering::Greater),
            }
        }
    }
}

// Array-valued fields match when the whole array or any element matches.
fn matches_eq(found: Option<&Bson>, value: &Bson) -> bool {
    match found {
        None => matches!(value, Bson::Null),
        Some(v) if values_equal(v, value) => true,
        Some(Bson::Array(items)) => items.iter().any(|x| values_equal(x, value)),
        Some(_) => false,
    }
}

fn matches_in(found: Option<&Bson>, set: &[Bson]) -> bool {
    let set = &set[..set.len().min(MAX_IN_SET)];
    set.iter().any(|candidate| matches_eq(found, candidate))
}

fn matches_order(found: Option<&Bson>, value: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    match found {
        Some(Bson::Array(items)) => {
            items.iter().any(|x| compare_values(x, value).is_some_and(&accept))
        }
        Some(v) => compare_values(v, value).is_some_and(accept),
        None => false,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match compare_values(a, b) {
        Some(o) => o == Ordering::Equal,
        None => match (a, b) {
            (Bson::String(text), other) | (other, Bson::String(text)) => {
                scalar_text(other).is_some_and(|t| t == *text)
            }
            _ => a == b,
        },
    }
}

// Text fields still match operands that were coerced from their spelling (`zipcode=10001`).
fn scalar_text(v: &Bson) -> Option<String> {
    match v {
        Bson::Int32(i) => Some(i.to_string()),
        Bson::Int64(i) => Some(i.to_string()),
        Bson::Double(f) if f.is_finite() => Some(f.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Order two values of the same comparable kind; `None` when they cannot be ordered.
///
/// Numbers compare across integer and floating representations.
pub fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    use bson::Bson as T;
    match (a, b) {
        (T::String(x), T::String(y)) => Some(x.cmp(y)),
        (T::Boolean(x), T::Boolean(y)) => Some(x.cmp(y)),
        (T::DateTime(x), T::DateTime(y)) => Some(x.timestamp_millis().cmp(&y.timestamp_millis())),
        (T::ObjectId(x), T::ObjectId(y)) => Some(x.cmp(y)),
        _ => match (as_f64_num(a), as_f64_num(b)) {
            (Some(x), Some(y)) => Some(x.total_cmp(&y)),
            _ => None,
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> Option<f64> {
    match x {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok(),
        _ => None,
    }
}

/// Total order used for sorting: values of one kind by `compare_values`, otherwise by kind.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    compare_values(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let ord = match (get_path(a, &s.field), get_path(b, &s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::MaxKey => 255,
        _ => 12,
    }
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for (depth, part) in parts.enumerate() {
        if depth + 1 >= MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Bson::Document(d) => cur = d.get(part)?,
            _ => return None,
        }
    }
    Some(cur)
}

/// Apply a projection. Inclusion always keeps `_id` and preserves the requested field order.
pub fn project_fields(doc: &BsonDocument, projection: &Projection) -> BsonDocument {
    match projection {
        Projection::Include(fields) => {
            let mut out = BsonDocument::new();
            if let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD, id.clone());
            }
            for f in fields {
                if let Some(v) = doc.get(f) {
                    out.insert(f.clone(), v.clone());
                }
            }
            out
        }
        Projection::Exclude(fields) => {
            let mut out = doc.clone();
            for f in fields {
                out.remove(f);
            }
            out
        }
    }
}
