use axum::extract::State;
use uuid::Uuid;

use servorder_core::domain::Company;
use servorder_shared::Page;

use crate::dto::company::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::dto::query::ListQuery;
use crate::extract::{ApiPath, ApiQuery, AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{created, ok, ApiResult, Created};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Page<Company>> {
    let pagination = query.pagination();
    ok(state.company_service.list(&actor, query.search, pagination).await?)
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateCompanyRequest>,
) -> Created<Company> {
    created(state.company_service.create(&actor, payload.into()).await?)
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Company> {
    ok(state.company_service.get(&actor, &id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyRequest>,
) -> ApiResult<Company> {
    ok(state.company_service.update(&actor, &id, payload.into()).await?)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.company_service.delete(&actor, &id).await?;
    ok(())
}
