use super::error::ApiResult;
use super::{AppState, Listing};
use crate::advanced::{ResultEnvelope, scope};
use crate::document::Document;
use crate::errors::ApiError;
use crate::query_string::QuerySpec;
use crate::resources::{self, BOOTCAMPS, COURSES, REVIEWS};
use crate::types::DocumentId;
use crate::utils::json::{bson_document_to_json, json_value_to_bson_document};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use bson::{Bson, Document as BsonDocument};
use serde_json::{Value, json};

pub async fn hello() -> &'static str {
    "Hello"
}

async fn list(
    listing: &Listing,
    raw: Option<String>,
    scoped: Option<BsonDocument>,
) -> ApiResult<Json<ResultEnvelope>> {
    let spec = QuerySpec::parse(raw.as_deref().unwrap_or_default());
    let store = listing.store.as_ref();
    let envelope = match scoped {
        Some(s) => listing.results.run_scoped(store, &spec, s).await?,
        None => listing.results.run(store, &spec).await?,
    };
    Ok(Json(envelope))
}

pub async fn list_bootcamps(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ResultEnvelope>> {
    list(&state.bootcamps, raw, None).await
}

pub async fn list_courses(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ResultEnvelope>> {
    list(&state.courses, raw, None).await
}

pub async fn list_reviews(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ResultEnvelope>> {
    list(&state.reviews, raw, None).await
}

pub async fn list_bootcamp_courses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ResultEnvelope>> {
    let id: DocumentId = id.parse()?;
    list(&state.courses, raw, Some(scope("bootcamp", id.to_hex()))).await
}

pub async fn list_bootcamp_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ResultEnvelope>> {
    let id: DocumentId = id.parse()?;
    list(&state.reviews, raw, Some(scope("bootcamp", id.to_hex()))).await
}

fn not_found(collection: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{} not found with id of {id}", resources::label(collection)))
}

fn single(doc: &BsonDocument) -> Json<Value> {
    Json(json!({ "success": true, "data": bson_document_to_json(doc) }))
}

fn get_one(state: &AppState, collection: &str, raw_id: &str) -> ApiResult<Json<Value>> {
    let id: DocumentId = raw_id.parse()?;
    let doc = state
        .engine()
        .collection(collection)?
        .find_document(&id)
        .ok_or_else(|| not_found(collection, raw_id))?;
    Ok(single(&doc.data))
}

pub async fn get_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    get_one(&state, BOOTCAMPS, &id)
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    get_one(&state, COURSES, &id)
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    get_one(&state, REVIEWS, &id)
}

fn parse_body(body: &[u8]) -> ApiResult<BsonDocument> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::ClientInput(format!("Invalid JSON body: {e}")))?;
    Ok(json_value_to_bson_document(&value)?)
}

// A course may only point at a bootcamp that exists.
fn check_bootcamp(state: &AppState, data: &BsonDocument) -> ApiResult<()> {
    let Some(reference) = data.get("bootcamp") else { return Ok(()) };
    let raw = match reference {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    };
    let missing = || ApiError::NotFound(format!("No bootcamp with the id of {raw}"));
    let id: DocumentId = raw.parse().map_err(|_| missing())?;
    let camps = state.engine().collection(BOOTCAMPS)?;
    camps.find_document(&id).map(|_| ()).ok_or_else(missing)
}

fn insert_course(state: &AppState, data: BsonDocument) -> ApiResult<(StatusCode, Json<Value>)> {
    check_bootcamp(state, &data)?;
    let doc = Document::new(data)?;
    let stored = doc.data.clone();
    state.engine().collection(COURSES)?.insert_document(doc)?;
    Ok((StatusCode::CREATED, single(&stored)))
}

pub async fn create_course(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let data = parse_body(&body)?;
    insert_course(&state, data)
}

pub async fn create_bootcamp_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut data = parse_body(&body)?;
    let id: DocumentId = id.parse()?;
    data.insert("bootcamp", id.to_hex());
    insert_course(&state, data)
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let id: DocumentId = raw_id.parse()?;
    let patch = parse_body(&body)?;
    check_bootcamp(&state, &patch)?;
    let updated = state
        .engine()
        .collection(COURSES)?
        .update_document(&id, &patch)?
        .ok_or_else(|| not_found(COURSES, &raw_id))?;
    Ok(single(&updated.data))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: DocumentId = raw_id.parse()?;
    state
        .engine()
        .collection(COURSES)?
        .delete_document(&id)
        .ok_or_else(|| not_found(COURSES, &raw_id))?;
    Ok(StatusCode::NO_CONTENT)
}
