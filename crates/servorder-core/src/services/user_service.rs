// ============================================================================
// Servorder Core - User Service
// File: crates/servorder-core/src/services/user_service.rs
// ============================================================================
//! Staff account management. Callers may only manage roles below their own
//! (SUPER_ADMIN excepted) and only inside their tenant.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use servorder_security::PasswordService;
use servorder_shared::utils::mask_email;
use servorder_shared::{Page, Pagination};

use crate::access::Actor;
use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::repositories::{CompanyRepository, StoreRepository, UserFilter, UserRepository};

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub store_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    store_repo: Arc<dyn StoreRepository>,
    company_repo: Arc<dyn CompanyRepository>,
    min_password_score: u8,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        store_repo: Arc<dyn StoreRepository>,
        company_repo: Arc<dyn CompanyRepository>,
        min_password_score: u8,
    ) -> Self {
        Self {
            user_repo,
            store_repo,
            company_repo,
            min_password_score,
        }
    }

    pub async fn create(&self, actor: &Actor, input: CreateUser) -> Result<User, DomainError> {
        if !actor.can_assign(input.role) {
            warn!("User {} tried to create a {} account", actor.user_id, input.role.as_str());
            return Err(DomainError::Forbidden(format!(
                "Cannot create users with role {}",
                input.role.as_str()
            )));
        }

        let (company_id, store_id) = self
            .resolve_tenancy(actor, input.role, input.company_id, input.store_id)
            .await?;

        self.ensure_email_free(&input.email, None).await?;
        PasswordService::check_strength(
            &input.password,
            self.min_password_score,
            &[input.name.as_str(), input.email.as_str()],
        )?;
        let hash = PasswordService::hash(&input.password)?;

        let user = User::new(
            input.name,
            input.email,
            hash,
            input.role,
            company_id,
            store_id,
            Some(actor.user_id),
        )?;
        let created = self.user_repo.create(&user).await?;
        info!(
            "User {} ({}, {}) created by {}",
            created.id,
            mask_email(&created.email),
            created.role.as_str(),
            actor.user_id
        );
        Ok(created)
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<User, DomainError> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        if user.id == actor.user_id {
            return Ok(user);
        }
        if !Self::visible_to(actor, &user) {
            return Err(DomainError::UserNotFound);
        }
        actor.require_role(Role::Manager)?;
        Ok(user)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
        role: Option<Role>,
        search: Option<String>,
        pagination: Pagination,
    ) -> Result<Page<User>, DomainError> {
        actor.require_role(Role::Manager)?;
        let filter = UserFilter {
            scope: actor.narrow(company_id, store_id)?,
            role,
            search,
        };
        self.user_repo.list(&filter, pagination).await
    }

    pub async fn update(&self, actor: &Actor, id: &Uuid, input: UpdateUser) -> Result<User, DomainError> {
        let mut user = self.get(actor, id).await?;
        let is_self = user.id == actor.user_id;

        if is_self {
            if input.role.is_some() || input.store_id.is_some() || input.is_active.is_some() {
                return Err(DomainError::Forbidden(
                    "Cannot change your own role, store or status".to_string(),
                ));
            }
            if input.password.is_some() {
                return Err(DomainError::Forbidden(
                    "Use /auth/password to change your own password".to_string(),
                ));
            }
        } else if !actor.can_assign(user.role) {
            return Err(DomainError::Forbidden(format!(
                "Cannot manage users with role {}",
                user.role.as_str()
            )));
        }

        if let Some(email) = &input.email {
            self.ensure_email_free(email, Some(user.id)).await?;
            user.email = email.trim().to_lowercase();
        }
        if let Some(name) = input.name {
            user.name = name.trim().to_string();
        }
        if let Some(password) = &input.password {
            PasswordService::check_strength(
                password,
                self.min_password_score,
                &[user.name.as_str(), user.email.as_str()],
            )?;
            user.password_hash = PasswordService::hash(password)?;
        }

        if input.role.is_some() || input.store_id.is_some() {
            let role = input.role.unwrap_or(user.role);
            if !actor.can_assign(role) {
                return Err(DomainError::Forbidden(format!(
                    "Cannot assign role {}",
                    role.as_str()
                )));
            }
            let company_id = if role == Role::SuperAdmin { None } else { user.company_id };
            let store_id = if role.is_store_bound() {
                input.store_id.or(user.store_id)
            } else {
                None
            };
            let (company_id, store_id) = self.resolve_tenancy(actor, role, company_id, store_id).await?;
            user.assign_role(role, company_id, store_id, actor.user_id)?;
        }

        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }

        user.touch(actor.user_id);
        validator::Validate::validate(&user)?;

        let updated = self.user_repo.update(&user).await?;
        info!("User {} updated by {}", updated.id, actor.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        if *id == actor.user_id {
            return Err(DomainError::Forbidden("Cannot delete your own account".to_string()));
        }
        let mut user = self.get(actor, id).await?;
        if !actor.can_assign(user.role) {
            return Err(DomainError::Forbidden(format!(
                "Cannot manage users with role {}",
                user.role.as_str()
            )));
        }

        user.soft_delete(actor.user_id);
        self.user_repo.update(&user).await?;
        info!("User {} deleted by {}", id, actor.user_id);
        Ok(())
    }

    /// Creates the first SUPER_ADMIN unless an account with that email exists.
    /// Returns `None` when nothing was created.
    pub async fn bootstrap_super_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(None);
        }
        let hash = PasswordService::hash(password)?;
        let user = User::new(
            name.to_string(),
            email.to_string(),
            hash,
            Role::SuperAdmin,
            None,
            None,
            None,
        )?;
        let created = self.user_repo.create(&user).await?;
        info!("Bootstrapped super admin {}", mask_email(&created.email));
        Ok(Some(created))
    }

    fn visible_to(actor: &Actor, user: &User) -> bool {
        match user.company_id {
            Some(company_id) => actor.scope().contains(company_id, user.store_id),
            None => actor.is_super_admin(),
        }
    }

    /// Works out the company/store pair for a user with `role`, checking that
    /// both exist, are active and lie inside the actor's scope.
    async fn resolve_tenancy(
        &self,
        actor: &Actor,
        role: Role,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
    ) -> Result<(Option<Uuid>, Option<Uuid>), DomainError> {
        match role {
            Role::SuperAdmin => Ok((None, None)),
            Role::CompanyAdmin => {
                let company_id = company_id
                    .or(actor.company_id)
                    .ok_or_else(|| DomainError::ValidationError("company_id is required".to_string()))?;
                if !actor.can_access_company(company_id) {
                    return Err(DomainError::CompanyNotFound);
                }
                let company = self
                    .company_repo
                    .find_by_id(&company_id)
                    .await?
                    .ok_or(DomainError::CompanyNotFound)?;
                if !company.is_active {
                    return Err(DomainError::ValidationError("Company is not active".to_string()));
                }
                Ok((Some(company.id), None))
            }
            Role::Manager | Role::Employee => {
                let store_id = actor.target_store(store_id)?;
                let store = self
                    .store_repo
                    .find_by_id(&store_id)
                    .await?
                    .ok_or(DomainError::StoreNotFound)?;
                if !actor.can_access_store(store.company_id, store.id) {
                    return Err(DomainError::StoreNotFound);
                }
                if company_id.is_some_and(|c| c != store.company_id) {
                    return Err(DomainError::ValidationError(
                        "Store does not belong to the given company".to_string(),
                    ));
                }
                if !store.is_active {
                    return Err(DomainError::ValidationError("Store is not active".to_string()));
                }
                Ok((Some(store.company_id), Some(store.id)))
            }
        }
    }

    async fn ensure_email_free(&self, email: &str, own_id: Option<Uuid>) -> Result<(), DomainError> {
        match self.user_repo.find_by_email(email.trim()).await? {
            Some(existing) if Some(existing.id) != own_id => {
                Err(DomainError::EmailAlreadyExists(email.trim().to_lowercase()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockCompanyRepository, MockStoreRepository, MockUserRepository};
    use crate::services::test_support::{company, company_admin, store, store_actor, super_admin, user};

    const STRONG: &str = "Qz7!mVx2#Lp9wT";

    fn service(users: MockUserRepository, stores: MockStoreRepository, companies: MockCompanyRepository) -> UserService {
        UserService::new(Arc::new(users), Arc::new(stores), Arc::new(companies), 2)
    }

    fn create_input(role: Role, company_id: Option<Uuid>, store_id: Option<Uuid>) -> CreateUser {
        CreateUser {
            name: "Carlos Lima".to_string(),
            email: "Carlos@Example.com".to_string(),
            password: STRONG.to_string(),
            role,
            company_id,
            store_id,
        }
    }

    #[tokio::test]
    async fn test_manager_creates_employee_in_own_store() {
        let store = store(Uuid::new_v4());
        let actor = store_actor(Role::Manager, &store);
        let (company_id, store_id) = (store.company_id, store.id);

        let mut stores = MockStoreRepository::new();
        stores.expect_find_by_id().returning(move |_| Ok(Some(store.clone())));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(move |u| {
                u.role == Role::Employee
                    && u.company_id == Some(company_id)
                    && u.store_id == Some(store_id)
                    && u.email == "carlos@example.com"
                    && u.password_hash.starts_with("$argon2")
            })
            .returning(|u| Ok(u.clone()));

        let created = service(users, stores, MockCompanyRepository::new())
            .create(&actor, create_input(Role::Employee, None, None))
            .await
            .unwrap();
        assert_eq!(created.store_id, Some(store_id));
    }

    #[tokio::test]
    async fn test_manager_cannot_create_manager() {
        let store = store(Uuid::new_v4());
        let err = service(MockUserRepository::new(), MockStoreRepository::new(), MockCompanyRepository::new())
            .create(&store_actor(Role::Manager, &store), create_input(Role::Manager, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_company_admin_cannot_use_foreign_store() {
        let foreign = store(Uuid::new_v4());
        let foreign_id = foreign.id;
        let mut stores = MockStoreRepository::new();
        stores.expect_find_by_id().returning(move |_| Ok(Some(foreign.clone())));

        let err = service(MockUserRepository::new(), stores, MockCompanyRepository::new())
            .create(
                &company_admin(Uuid::new_v4()),
                create_input(Role::Employee, None, Some(foreign_id)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StoreNotFound));
    }

    #[tokio::test]
    async fn test_super_admin_creates_company_admin() {
        let company = company();
        let company_id = company.id;
        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_id().returning(move |_| Ok(Some(company.clone())));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().returning(|u| Ok(u.clone()));

        let created = service(users, MockStoreRepository::new(), companies)
            .create(&super_admin(), create_input(Role::CompanyAdmin, Some(company_id), None))
            .await
            .unwrap();
        assert_eq!(created.company_id, Some(company_id));
        assert_eq!(created.store_id, None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let company = company();
        let company_id = company.id;
        let existing = user(Role::CompanyAdmin, Some(company_id), None);
        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_id().returning(move |_| Ok(Some(company.clone())));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| Ok(Some(existing.clone())));
        users.expect_create().never();

        let err = service(users, MockStoreRepository::new(), companies)
            .create(&super_admin(), create_input(Role::CompanyAdmin, Some(company_id), None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let company = company();
        let company_id = company.id;
        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_id().returning(move |_| Ok(Some(company.clone())));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().never();

        let mut input = create_input(Role::CompanyAdmin, Some(company_id), None);
        input.password = "password".to_string();
        let err = service(users, MockStoreRepository::new(), companies)
            .create(&super_admin(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PasswordTooWeak));
    }

    #[tokio::test]
    async fn test_employee_cannot_list_users() {
        let store = store(Uuid::new_v4());
        let err = service(MockUserRepository::new(), MockStoreRepository::new(), MockCompanyRepository::new())
            .list(&store_actor(Role::Employee, &store), None, None, None, None, Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_user_in_other_store_is_not_found() {
        let mine = store(Uuid::new_v4());
        let target = user(Role::Employee, Some(mine.company_id), Some(Uuid::new_v4()));
        let target_id = target.id;
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(target.clone())));

        let err = service(users, MockStoreRepository::new(), MockCompanyRepository::new())
            .get(&store_actor(Role::Manager, &mine), &target_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound));
    }

    #[tokio::test]
    async fn test_cannot_change_own_role() {
        let store = store(Uuid::new_v4());
        let me = user(Role::Manager, Some(store.company_id), Some(store.id));
        let actor = Actor::from_user(&me);
        let my_id = me.id;
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(me.clone())));

        let err = service(users, MockStoreRepository::new(), MockCompanyRepository::new())
            .update(
                &actor,
                &my_id,
                UpdateUser {
                    role: Some(Role::CompanyAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_own_password_cannot_be_reset_through_update() {
        let store = store(Uuid::new_v4());
        let me = user(Role::Employee, Some(store.company_id), Some(store.id));
        let actor = Actor::from_user(&me);
        let my_id = me.id;
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(me.clone())));
        users.expect_update().never();

        let err = service(users, MockStoreRepository::new(), MockCompanyRepository::new())
            .update(
                &actor,
                &my_id,
                UpdateUser {
                    password: Some("Hijacked-Walrus-Tundra-77".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_company_admin_promotes_employee_to_manager() {
        let store = store(Uuid::new_v4());
        let target = user(Role::Employee, Some(store.company_id), Some(store.id));
        let target_id = target.id;
        let actor = company_admin(store.company_id);

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(target.clone())));
        users
            .expect_update()
            .withf(|u| u.role == Role::Manager)
            .returning(|u| Ok(u.clone()));
        let mut stores = MockStoreRepository::new();
        stores.expect_find_by_id().returning(move |_| Ok(Some(store.clone())));

        let updated = service(users, stores, MockCompanyRepository::new())
            .update(
                &actor,
                &target_id,
                UpdateUser {
                    role: Some(Role::Manager),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.modified_by, Some(actor.user_id));
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let actor = super_admin();
        let err = service(MockUserRepository::new(), MockStoreRepository::new(), MockCompanyRepository::new())
            .delete(&actor, &actor.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let existing = user(Role::SuperAdmin, None, None);
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| Ok(Some(existing.clone())));
        users.expect_create().never();

        let created = service(users, MockStoreRepository::new(), MockCompanyRepository::new())
            .bootstrap_super_admin("Root", "root@example.com", STRONG)
            .await
            .unwrap();
        assert!(created.is_none());
    }
}
