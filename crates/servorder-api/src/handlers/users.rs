use axum::extract::State;
use uuid::Uuid;

use servorder_core::domain::User;
use servorder_shared::Page;

use crate::dto::query::ListQuery;
use crate::dto::user::{CreateUserRequest, UpdateUserRequest};
use crate::extract::{ApiPath, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{created, ok, ApiResult, Created};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Page<User>> {
    let pagination = query.pagination();
    ok(state
        .user_service
        .list(&actor, query.company_id, query.store_id, query.role, query.search, pagination)
        .await?)
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Created<User> {
    created(state.user_service.create(&actor, payload.into()).await?)
}

pub async fn get(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<User> {
    ok(state.user_service.get(&actor, &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<User> {
    ok(state.user_service.update(&actor, &id, payload.into()).await?)
}

pub async fn delete(State(state): State<AppState>, AuthUser(actor): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    state.user_service.delete(&actor, &id).await?;
    ok(())
}
