//! Shared application state

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sqlx::PgPool;

use servorder_core::notifier::StatusNotifier;
use servorder_core::repositories::{
    ClientRepository, CompanyRepository, ServiceOrderRepository, StoreRepository, UserRepository,
};
use servorder_core::services::{
    AuthService, ClientService, CompanyService, DashboardService, ServiceOrderService, StoreService, UserService,
};
use servorder_security::JwtService;
use servorder_shared::config::{JwtSettings, SecuritySettings};

/// Repository ports the services are built from
#[derive(Clone)]
pub struct Repositories {
    pub companies: Arc<dyn CompanyRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub users: Arc<dyn UserRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub orders: Arc<dyn ServiceOrderRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub company_service: Arc<CompanyService>,
    pub store_service: Arc<StoreService>,
    pub user_service: Arc<UserService>,
    pub client_service: Arc<ClientService>,
    pub order_service: Arc<ServiceOrderService>,
    pub dashboard_service: Arc<DashboardService>,
    /// Login attempts keyed by normalized email
    pub login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    /// `None` when running on in-memory repositories.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        notifier: Option<Arc<dyn StatusNotifier>>,
        jwt: &JwtSettings,
        security: &SecuritySettings,
        country_code: &str,
        db: Option<PgPool>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &jwt.secret,
            jwt.access_token_expiry,
            jwt.refresh_token_expiry,
        ));
        let per_minute = NonZeroU32::new(security.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            auth_service: Arc::new(AuthService::new(
                repos.users.clone(),
                jwt_service,
                security.min_password_score,
            )),
            company_service: Arc::new(CompanyService::new(repos.companies.clone())),
            store_service: Arc::new(StoreService::new(repos.stores.clone(), repos.companies.clone())),
            user_service: Arc::new(UserService::new(
                repos.users.clone(),
                repos.stores.clone(),
                repos.companies.clone(),
                security.min_password_score,
            )),
            client_service: Arc::new(ClientService::new(
                repos.clients.clone(),
                repos.stores.clone(),
                country_code,
            )),
            order_service: Arc::new(ServiceOrderService::new(
                repos.orders.clone(),
                repos.clients.clone(),
                repos.stores.clone(),
                notifier,
            )),
            dashboard_service: Arc::new(DashboardService::new(repos.orders)),
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            db,
        }
    }
}
