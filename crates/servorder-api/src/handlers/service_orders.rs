// ============================================================================
// Servorder API - Service Order Handlers
// File: crates/servorder-api/src/handlers/service_orders.rs
// ============================================================================

use axum::extract::State;
use uuid::Uuid;

use servorder_core::domain::{ServiceOrder, StatusChange};
use servorder_shared::Page;

use crate::dto::query::OrderListQuery;
use crate::dto::service_order::{
    ChangeStatusRequest, CreateServiceOrderRequest, StatusChangeResponse, UpdateServiceOrderRequest,
};
use crate::extract::{ApiPath, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{created, ok, ApiResult, Created};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> ApiResult<Page<ServiceOrder>> {
    ok(state
        .order_service
        .list(&actor, query.filters(), query.pagination())
        .await?)
}

/// Responds with the order and its initial history entry, so the caller sees
/// whether the RECEIVED notice went out.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateServiceOrderRequest>,
) -> Created<StatusChangeResponse> {
    let result = state.order_service.create(&actor, payload.into()).await?;
    created(result.into())
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ServiceOrder> {
    ok(state.order_service.get(&actor, &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateServiceOrderRequest>,
) -> ApiResult<ServiceOrder> {
    ok(state.order_service.update(&actor, &id, payload.into()).await?)
}

pub async fn delete(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    state.order_service.delete(&actor, &id).await?;
    ok(())
}

/// PATCH /api/v1/service-orders/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ChangeStatusRequest>,
) -> ApiResult<StatusChangeResponse> {
    let result = state.order_service.change_status(&actor, &id, payload.into()).await?;
    ok(result.into())
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<StatusChange>> {
    ok(state.order_service.history(&actor, &id).await?)
}
