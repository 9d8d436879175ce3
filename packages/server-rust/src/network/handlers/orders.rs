//! `/api/admin/orders` handlers. All of them forward to the order service.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{passthrough, AppState};
use crate::clients::OrderStatsQuery;
use crate::network::auth::AdminUser;
use crate::network::error::ApiError;

/// Raw `GET /orders/stats` parameters, interpreted by
/// [`OrderStatsQuery::from_raw`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    include_recent: Option<String>,
    recent_limit: Option<String>,
}

/// `GET /api/admin/orders`
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
) -> Result<Json<Value>, ApiError> {
    let orders = state.clients.orders.fetch_all_orders(Some(&admin.token)).await?;
    Ok(passthrough(orders))
}

/// `GET /api/admin/orders/paged`, query passed through.
pub async fn list_orders_paged(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let orders = state
        .clients
        .orders
        .fetch_orders_paged(Some(&admin.token), query)
        .await?;
    Ok(passthrough(orders))
}

/// `GET /api/admin/orders/stats`
pub async fn order_stats(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Value>, ApiError> {
    let stats = OrderStatsQuery::from_raw(
        params.include_recent.as_deref(),
        params.recent_limit.as_deref(),
    );
    let body = state
        .clients
        .orders
        .fetch_order_stats(Some(&admin.token), stats)
        .await?;
    Ok(passthrough(body))
}

/// `GET /api/admin/orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let order = state
        .clients
        .orders
        .fetch_order_by_id(&id, Some(&admin.token))
        .await?;
    Ok(passthrough(order))
}

/// `GET /api/admin/orders/{id}/tracking`
pub async fn order_tracking(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let tracking = state
        .clients
        .orders
        .fetch_order_tracking(&id, Some(&admin.token))
        .await?;
    Ok(passthrough(tracking))
}

/// `PUT /api/admin/orders/{id}/status`, body forwarded as-is.
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let status: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("Invalid status payload".to_string()))?;

    info!(actor_id = %admin.principal.id, order_id = %id, "admin updating order status");

    let updated = state
        .clients
        .orders
        .update_order_status(&id, status, Some(&admin.token))
        .await?;
    Ok(passthrough(updated))
}

/// `DELETE /api/admin/orders/{id}`
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!(actor_id = %admin.principal.id, order_id = %id, "admin deleting order");

    state
        .clients
        .orders
        .delete_order_by_id(&id, Some(&admin.token))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
