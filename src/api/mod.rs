//! HTTP API for the fragments service
//!
//! ## Endpoint Map
//!
//! | Path                         | Auth  | Description                     |
//! |------------------------------|-------|---------------------------------|
//! | `/`                          | none  | Health check                    |
//! | `/v1/fragments`              | Basic | List, create                    |
//! | `/v1/fragments/:id[.ext]`    | Basic | Read (converted), replace, delete |
//! | `/v1/fragments/:id/info`     | Basic | Metadata                        |

pub mod auth;
pub mod handler;
pub mod response;

pub use auth::{BasicAuth, OwnerId};
pub use handler::{fragments_router, FragmentsState};
pub use response::ApiError;

use crate::config::ServerConfig;
use crate::storage::FragmentStore;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete HTTP application
pub fn build_app(store: FragmentStore, auth: BasicAuth, server: &ServerConfig) -> Router {
    let auth = Arc::new(auth);
    let v1 = fragments_router(FragmentsState::new(store))
        .route_layer(middleware::from_fn_with_state(auth, auth::require_auth));

    Router::new()
        .route("/", get(health_check))
        .nest("/v1", v1)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&server.cors_origins))
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(app: Router, addr: SocketAddr, shutdown: F) -> crate::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Fragments API listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    author: &'static str,
}

async fn health_check() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            author: env!("CARGO_PKG_AUTHORS"),
        }),
    )
}

async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::LOCATION]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
