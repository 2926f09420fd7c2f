use axum::extract::State;

use servorder_core::services::DashboardSummary;

use crate::dto::query::DashboardQuery;
use crate::extract::{ApiQuery, AuthUser};
use crate::state::AppState;

use super::{ok, ApiResult};

pub async fn summary(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> ApiResult<DashboardSummary> {
    ok(state
        .dashboard_service
        .summary(&actor, query.company_id, query.store_id)
        .await?)
}
