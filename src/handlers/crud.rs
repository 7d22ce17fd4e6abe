//! Read, list, create, update, delete against the storage contract.
//! Handlers return `ApiError`; the registry turns it into a response.

use super::Page;
use crate::config::UpdateResponse;
use crate::context::Contexter;
use crate::error::{ApiError, StoreError};
use crate::resource::{Record, Resource};
use crate::response;
use crate::routes::Params;
use crate::state::ApiState;
use axum::body::Body;
use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn parse_id(params: &Params) -> Result<i64, ApiError> {
    let raw = params.get("id").map(String::as_str).unwrap_or("");
    raw.parse().map_err(|_| ApiError::InvalidIdentity(raw.to_string()))
}

async fn read_body(body: Body) -> Result<axum::body::Bytes, ApiError> {
    // size is capped by the router's body limit layer
    axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ApiError::DecodeFailure(e.to_string()))
}

/// Registration guarantees records serialize to objects.
fn to_object<T: Record>(record: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn from_row<T: Record>(row: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(row)?)
}

/// `GET base`: one page of records, as a bare JSON array.
pub async fn index<T: Record>(state: &ApiState, resource: &Resource, parts: &Parts) -> Result<Response, ApiError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let page = Page::from_query(&query, state.config.default_limit);
    let rows = state
        .storage()
        .find(resource.table(), page.limit, page.offset)
        .await
        .map_err(ApiError::query)?;
    let records = rows
        .into_iter()
        .map(from_row::<T>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::query)?;
    Ok(response::json(StatusCode::OK, &state.config.content_type, &records))
}

/// `GET base/:id`
pub async fn read<T: Record>(state: &ApiState, resource: &Resource, params: &Params) -> Result<Response, ApiError> {
    let id = parse_id(params)?;
    let row = state
        .storage()
        .find_by_id(resource.table(), id)
        .await
        .map_err(ApiError::query)?
        .ok_or(ApiError::NotFound("record not found"))?;
    let record: T = from_row(row).map_err(ApiError::query)?;
    Ok(response::json(StatusCode::OK, &state.config.content_type, &record))
}

/// `POST base`: decode into a fresh record, persist, answer with what the store kept.
pub async fn create<T: Record>(
    state: &ApiState,
    resource: &Resource,
    ctx: &mut dyn Contexter,
    body: Body,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to create object";
    let bytes = read_body(body).await?;
    let record: T = serde_json::from_slice(&bytes).map_err(|e| ApiError::DecodeFailure(e.to_string()))?;
    let row = to_object(&record).map_err(|e| ApiError::DecodeFailure(e.to_string()))?;

    let stored = state
        .storage()
        .create(resource.table(), &row)
        .await
        .map_err(|source| ApiError::PersistFailure { message: FAILED, source })?;
    let created: T = from_row(stored).map_err(|source| ApiError::PersistFailure { message: FAILED, source })?;

    let mut resp = response::json(StatusCode::OK, &state.config.content_type, &created);
    if let (Some(id), Some(info)) = (created.id(), ctx.url_info()) {
        let location = info.url_for(&format!("{}/{}", resource.base_path(), id));
        if let Ok(value) = HeaderValue::from_str(&location) {
            resp.headers_mut().insert(header::LOCATION, value);
        }
    }
    Ok(resp)
}

/// `PATCH base/:id`: partial update. Only fields present in the body are written.
pub async fn update<T: Record>(
    state: &ApiState,
    resource: &Resource,
    params: &Params,
    body: Body,
) -> Result<Response, ApiError> {
    let id = parse_id(params)?;
    let bytes = read_body(body).await?;
    let patch = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ApiError::DecodeFailure("body must be a JSON object".into())),
        Err(e) => return Err(ApiError::DecodeFailure(e.to_string())),
    };

    // decode against the zero value so absent fields stay untouched
    let mut merged = to_object(&T::zero_value()).map_err(|e| ApiError::DecodeFailure(e.to_string()))?;
    merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
    let mut payload: T =
        serde_json::from_value(Value::Object(merged)).map_err(|e| ApiError::DecodeFailure(e.to_string()))?;
    // the path names the record; a body id never retargets the update
    payload.set_id(id);

    let normalized = to_object(&payload).map_err(|e| ApiError::DecodeFailure(e.to_string()))?;
    let fields: Map<String, Value> = patch
        .keys()
        .filter(|k| k.as_str() != T::ID_FIELD)
        .filter_map(|k| normalized.get(k).map(|v| (k.clone(), v.clone())))
        .collect();

    const MISSING: &str = "Unable to find object for update";
    let storage = state.storage();
    storage
        .find_by_id(resource.table(), id)
        .await
        .map_err(|source| ApiError::QueryFailure { message: MISSING, source })?
        .ok_or(ApiError::NotFound(MISSING))?;
    let row = storage
        .update_fields(resource.table(), id, &fields)
        .await
        .map_err(|source| ApiError::PersistFailure {
            message: "Failed to update object",
            source,
        })?
        .ok_or(ApiError::NotFound(MISSING))?;

    match state.config.update_response {
        UpdateResponse::Payload => Ok(response::json(StatusCode::OK, &state.config.content_type, &payload)),
        UpdateResponse::Merged => {
            let persisted: T = from_row(row).map_err(|source| ApiError::PersistFailure {
                message: "Failed to update object",
                source,
            })?;
            Ok(response::json(StatusCode::OK, &state.config.content_type, &persisted))
        }
    }
}

/// `DELETE base/:id`: the identity is passed to the store as an opaque string.
pub async fn delete(state: &ApiState, resource: &Resource, params: &Params) -> Result<Response, ApiError> {
    let id = params.get("id").map(String::as_str).unwrap_or("");
    let removed = state
        .storage()
        .delete_by_id(resource.table(), id)
        .await
        .map_err(ApiError::DeleteFailure)?;
    if removed == 0 {
        return Err(ApiError::NotFound("record not found"));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}
