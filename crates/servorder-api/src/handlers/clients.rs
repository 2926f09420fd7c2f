use axum::extract::State;
use uuid::Uuid;

use servorder_core::domain::Client;
use servorder_shared::Page;

use crate::dto::client::{CreateClientRequest, UpdateClientRequest};
use crate::dto::query::ListQuery;
use crate::extract::{ApiPath, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{created, ok, ApiResult, Created};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Page<Client>> {
    let pagination = query.pagination();
    ok(state
        .client_service
        .list(&actor, query.company_id, query.store_id, query.search, pagination)
        .await?)
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateClientRequest>,
) -> Created<Client> {
    created(state.client_service.create(&actor, payload.into()).await?)
}

pub async fn get(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Client> {
    ok(state.client_service.get(&actor, &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateClientRequest>,
) -> ApiResult<Client> {
    ok(state.client_service.update(&actor, &id, payload.into()).await?)
}

pub async fn delete(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    state.client_service.delete(&actor, &id).await?;
    ok(())
}
