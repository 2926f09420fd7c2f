use axum::extract::State;
use uuid::Uuid;

use servorder_core::domain::Store;
use servorder_shared::Page;

use crate::dto::query::ListQuery;
use crate::dto::store::{CreateStoreRequest, UpdateStoreRequest};
use crate::extract::{ApiPath, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{created, ok, ApiResult, Created};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Page<Store>> {
    let pagination = query.pagination();
    ok(state
        .store_service
        .list(&actor, query.company_id, query.search, pagination)
        .await?)
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateStoreRequest>,
) -> Created<Store> {
    created(state.store_service.create(&actor, payload.into()).await?)
}

pub async fn get(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Store> {
    ok(state.store_service.get(&actor, &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStoreRequest>,
) -> ApiResult<Store> {
    ok(state.store_service.update(&actor, &id, payload.into()).await?)
}

pub async fn delete(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    state.store_service.delete(&actor, &id).await?;
    ok(())
}
