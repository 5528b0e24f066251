use crate::errors::DbError;
use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Number, Value};

/// Convert a `serde_json::Value` that must be an object into a `bson::Document`.
///
/// # Errors
/// Returns `DbError::InvalidDocument` when the value is not a JSON object.
pub fn json_value_to_bson_document(val: &Value) -> Result<BsonDocument, DbError> {
    let obj = val
        .as_object()
        .ok_or_else(|| DbError::InvalidDocument("expected JSON object".into()))?;
    Ok(json_object_to_bson(obj))
}

/// Parse a JSON string into a `bson::Document`. The JSON must be a top-level object.
///
/// # Errors
/// Returns an error on malformed JSON or a non-object top level.
pub fn parse_json_to_bson_document(json: &str) -> Result<BsonDocument, DbError> {
    let val: Value = serde_json::from_str(json)?;
    json_value_to_bson_document(&val)
}

#[must_use]
pub fn json_object_to_bson(obj: &Map<String, Value>) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (k, v) in obj {
        out.insert(k.clone(), json_to_bson(v));
    }
    out
}

#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(obj) => Bson::Document(json_object_to_bson(obj)),
    }
}

/// Render a BSON value as plain JSON. Dates become RFC 3339 strings; ids become hex strings.
#[must_use]
pub fn bson_to_json(val: &Bson) -> Value {
    match val {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => bson_document_to_json(d),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
            .map_or(Value::Null, |t| {
                Value::String(t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            }),
        other => Value::String(other.to_string()),
    }
}

#[must_use]
pub fn bson_document_to_json(doc: &BsonDocument) -> Value {
    let mut out = Map::new();
    for (k, v) in doc {
        out.insert(k.clone(), bson_to_json(v));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_to_bson_success() {
        let d = parse_json_to_bson_document("{\"a\":1,\"b\":\"x\",\"c\":2.5}").unwrap();
        assert_eq!(d.get("a"), Some(&Bson::Int64(1)));
        assert_eq!(d.get("b"), Some(&Bson::String("x".into())));
        assert_eq!(d.get("c"), Some(&Bson::Double(2.5)));
    }

    #[test]
    fn json_to_bson_rejects_array() {
        let e = parse_json_to_bson_document("[1,2,3]").unwrap_err();
        assert!(matches!(e, DbError::InvalidDocument(_)));
    }

    #[test]
    fn dates_render_as_rfc3339() {
        let v = bson_to_json(&Bson::DateTime(bson::DateTime::from_millis(0)));
        assert_eq!(v, Value::String("1970-01-01T00:00:00.000Z".into()));
    }
}
