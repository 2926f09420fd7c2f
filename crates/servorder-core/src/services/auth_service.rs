// ============================================================================
// Servorder Core - Authentication Service
// File: crates/servorder-core/src/services/auth_service.rs
// ============================================================================
//! Authentication service with login, token refresh and password changes

use std::sync::Arc;
use tracing::{error, info, warn};

use servorder_security::{JwtError, JwtService, PasswordService, TokenPair, TokenSubject, TokenType};
use servorder_shared::utils::mask_email;

use crate::access::Actor;
use crate::domain::User;
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// Authentication service for handling login and session flows
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    min_password_score: u8,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt: Arc<JwtService>, min_password_score: u8) -> Self {
        Self {
            user_repo,
            jwt,
            min_password_score,
        }
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let masked = mask_email(email);
        info!("Login attempt for email: {}", masked);

        // 1. Find user by email
        let user = self.user_repo.find_by_email(email.trim()).await?.ok_or_else(|| {
            warn!("Login failed: email not found: {}", masked);
            DomainError::InvalidCredentials
        })?;

        // 2. Verify password before revealing account state
        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_e| DomainError::InvalidCredentials)?;
        if !password_valid {
            warn!("Login failed: invalid password for: {}", masked);
            return Err(DomainError::InvalidCredentials);
        }

        // 3. Check if user can login
        if !user.can_login() {
            warn!("Login failed: user {} is not active", user.id);
            return Err(DomainError::UserNotActive);
        }

        // 4. Generate tokens
        let tokens = self.issue_tokens(&user)?;

        // 5. Update last login
        let mut updated_user = user.clone();
        updated_user.record_login();
        let user = match self.user_repo.update(&updated_user).await {
            Ok(saved) => saved,
            Err(e) => {
                // Don't fail login for this
                error!("Failed to update last login: {}", e);
                user
            }
        };

        info!("Login successful for: {}", masked);
        Ok(LoginResult { user, tokens })
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResult, DomainError> {
        let claims = self
            .jwt
            .validate_typed(refresh_token, TokenType::Refresh)
            .map_err(token_error)?;

        let user = self.active_user(&claims.sub).await?;
        let tokens = self.issue_tokens(&user)?;
        info!("Tokens refreshed for user {}", user.id);
        Ok(LoginResult { user, tokens })
    }

    /// Resolve an access token into the calling actor.
    ///
    /// The user row is reloaded so deactivation and role changes apply to
    /// tokens issued before them.
    pub async fn authenticate(&self, access_token: &str) -> Result<Actor, DomainError> {
        let claims = self
            .jwt
            .validate_typed(access_token, TokenType::Access)
            .map_err(token_error)?;

        let user = self.active_user(&claims.sub).await?;
        Ok(Actor::from_user(&user))
    }

    pub async fn me(&self, actor: &Actor) -> Result<User, DomainError> {
        self.user_repo
            .find_by_id(&actor.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    pub async fn change_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let mut user = self.me(actor).await?;

        if !PasswordService::verify(current_password, &user.password_hash)? {
            warn!("Password change rejected for user {}: wrong current password", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        PasswordService::check_strength(
            new_password,
            self.min_password_score,
            &[user.name.as_str(), user.email.as_str()],
        )?;
        let hash = PasswordService::hash(new_password)?;
        user.set_password_hash(hash, actor.user_id);
        self.user_repo.update(&user).await?;

        info!("Password changed for user {}", user.id);
        Ok(())
    }

    async fn active_user(&self, id: &uuid::Uuid) -> Result<User, DomainError> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::InvalidToken("user no longer exists".to_string()))?;
        if !user.can_login() {
            return Err(DomainError::UserNotActive);
        }
        Ok(user)
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        let subject = TokenSubject {
            user_id: user.id,
            role: user.role.as_str().to_string(),
            company_id: user.company_id,
            store_id: user.store_id,
        };
        self.jwt
            .generate_pair(&subject)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }
}

fn token_error(e: JwtError) -> DomainError {
    DomainError::InvalidToken(e.to_string())
}

/// Result of successful login or refresh
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub tokens: TokenPair,
}
