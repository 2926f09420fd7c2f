// ============================================================================
// Servorder API - Auth Handlers
// File: crates/servorder-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, refresh, me, password change)

use axum::extract::State;
use tracing::warn;

use servorder_core::domain::User;
use servorder_shared::utils::mask_email;

use crate::dto::auth::{AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest};
use crate::error::ApiError;
use crate::extract::{AuthUser, ValidatedJson};
use crate::state::AppState;

use super::{ok, ApiResult};

/// Login handler - POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let key = payload.email.trim().to_lowercase();
    if state.login_limiter.check_key(&key).is_err() {
        warn!("Login rate limit exceeded for {}", mask_email(&key));
        return Err(ApiError::RateLimited);
    }

    let result = state.auth_service.login(&payload.email, &payload.password).await?;
    ok(result.into())
}

/// Refresh token handler - POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    let result = state.auth_service.refresh(&payload.refresh_token).await?;
    ok(result.into())
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<User> {
    ok(state.auth_service.me(&actor).await?)
}

/// POST /api/v1/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .auth_service
        .change_password(&actor, &payload.current_password, &payload.new_password)
        .await?;
    ok(())
}
