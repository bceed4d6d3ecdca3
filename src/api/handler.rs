//! HTTP handlers for the fragments API
//!
//! Provides 6 REST endpoints, all scoped to the authenticated owner:
//! - GET    /v1/fragments            list ids, or records with `?expand=1`
//! - POST   /v1/fragments            create from a raw body
//! - GET    /v1/fragments/:id[.ext]  content, optionally converted
//! - GET    /v1/fragments/:id/info   metadata record
//! - PUT    /v1/fragments/:id        replace content (same type only)
//! - DELETE /v1/fragments/:id        delete metadata and content

use super::auth::OwnerId;
use super::response::{ok, ApiError};
use crate::fragment::{Fragment, FragmentBuilder, MediaType};
use crate::retrieval::Retriever;
use crate::storage::FragmentStore;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

/// Shared state for fragment handlers
#[derive(Clone)]
pub struct FragmentsState {
    pub store: FragmentStore,
    pub retriever: Retriever,
}

impl FragmentsState {
    pub fn new(store: FragmentStore) -> Self {
        Self {
            retriever: Retriever::new(store.clone()),
            store,
        }
    }
}

/// Create the `/fragments` router (mounted under `/v1`)
pub fn fragments_router(state: FragmentsState) -> Router {
    Router::new()
        .route("/fragments", get(list_fragments).post(create_fragment))
        .route(
            "/fragments/:id",
            get(get_fragment).put(update_fragment).delete(delete_fragment),
        )
        .route("/fragments/:id/info", get(get_fragment_info))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    expand: Option<String>,
}

fn request_content_type(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::unsupported_media_type("Missing Content-Type header"))
}

fn location_for(headers: &HeaderMap, id: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}/v1/fragments/{}", host, id)
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /v1/fragments
async fn list_fragments(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let expand = params.expand.as_deref() == Some("1");
    let fragments = Fragment::by_owner(&state.store, &owner.0, expand).await?;
    Ok(ok(json!({ "fragments": fragments })))
}

/// POST /v1/fragments
async fn create_fragment(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = request_content_type(&headers)?;
    if !MediaType::is_supported(content_type) {
        return Err(ApiError::unsupported_media_type(format!(
            "Unsupported Content-Type: {}",
            content_type
        )));
    }

    let mut fragment = FragmentBuilder::new()
        .owner_id(owner.0)
        .content_type(content_type)
        .build()?;
    fragment.set_data(&state.store, body).await?;
    tracing::info!(
        id = %fragment.id,
        content_type = %fragment.content_type,
        size = fragment.size,
        "Created fragment"
    );

    let location = location_for(&headers, &fragment.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ok(json!({ "fragment": fragment })),
    ))
}

/// GET /v1/fragments/:id[.ext]
async fn get_fragment(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let retrieved = state.retriever.fetch(&owner.0, &id).await?;
    Ok((
        [(header::CONTENT_TYPE, retrieved.content_type)],
        retrieved.bytes,
    ))
}

/// GET /v1/fragments/:id/info
async fn get_fragment_info(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let fragment = Fragment::by_id(&state.store, &owner.0, &id).await?;
    Ok(ok(json!({ "fragment": fragment })))
}

/// PUT /v1/fragments/:id
async fn update_fragment(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = request_content_type(&headers)?;
    let mut fragment = Fragment::by_id(&state.store, &owner.0, &id).await?;
    fragment
        .replace_data(&state.store, content_type, body)
        .await?;
    tracing::info!(id = %fragment.id, size = fragment.size, "Replaced fragment data");

    let formats = fragment.formats();
    Ok(ok(json!({ "fragment": fragment, "formats": formats })))
}

/// DELETE /v1/fragments/:id
async fn delete_fragment(
    State(state): State<FragmentsState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Fragment::by_id(&state.store, &owner.0, &id).await?;
    Fragment::delete(&state.store, &owner.0, &id).await?;
    tracing::info!(%id, "Deleted fragment");
    Ok(ok(json!({})))
}
