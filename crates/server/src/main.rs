use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{ActionFields, ActionId, ActionRecord, ProjectId},
    error::ApiError,
    protocol::{ActionOrderRequest, SaveActionResponse},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod store;

use api::{create_action, delete_action, list_actions, set_action_order, update_action, ApiContext};
use config::load_settings;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let app = build_router(ApiContext::default(), settings.max_body_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(ctx: ApiContext, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/project/:project_id/action",
            get(http_list_actions)
                .post(http_create_action)
                .put(http_create_action),
        )
        .route(
            "/project/:project_id/action/:action_id",
            get(http_action_get)
                .post(http_update_action)
                .put(http_update_action)
                .delete(http_delete_action),
        )
        .route("/project/:project_id/action-order", post(http_set_action_order))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(ctx)
}

fn http_error(err: ApiError) -> HttpError {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_actions(
    State(ctx): State<ApiContext>,
    Path(project_id): Path<i64>,
) -> Json<Vec<ActionRecord>> {
    Json(list_actions(&ctx, ProjectId(project_id)).await)
}

async fn http_create_action(
    State(ctx): State<ApiContext>,
    Path(project_id): Path<i64>,
    Json(fields): Json<ActionFields>,
) -> Json<SaveActionResponse> {
    Json(create_action(&ctx, ProjectId(project_id), fields).await)
}

async fn http_action_get(Path((_project_id, _action_id)): Path<(i64, i64)>) -> HttpError {
    http_error(ApiError::bad_request("actions are read through the list endpoint"))
}

async fn http_update_action(
    State(ctx): State<ApiContext>,
    Path((project_id, action_id)): Path<(i64, i64)>,
    Json(fields): Json<ActionFields>,
) -> Result<Json<SaveActionResponse>, HttpError> {
    update_action(&ctx, ProjectId(project_id), ActionId(action_id), fields)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_delete_action(
    State(ctx): State<ApiContext>,
    Path((project_id, action_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, HttpError> {
    delete_action(&ctx, ProjectId(project_id), ActionId(action_id))
        .await
        .map_err(http_error)?;
    Ok(Json(json!({})))
}

async fn http_set_action_order(
    State(ctx): State<ApiContext>,
    Path(project_id): Path<i64>,
    Json(req): Json<ActionOrderRequest>,
) -> Result<Json<Value>, HttpError> {
    set_action_order(&ctx, ProjectId(project_id), &req.order)
        .await
        .map_err(http_error)?;
    Ok(Json(json!({})))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
