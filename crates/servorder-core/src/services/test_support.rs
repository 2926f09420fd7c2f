//! Fixtures shared by the service tests

use servorder_security::PasswordService;
use uuid::Uuid;

use crate::access::Actor;
use crate::domain::{Client, Company, Role, Store, User};

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret!";

pub fn user_with_password(role: Role, company_id: Option<Uuid>, store_id: Option<Uuid>, password: &str) -> User {
    let hash = PasswordService::hash(password).unwrap();
    User::new(
        "Root Admin".to_string(),
        "root@example.com".to_string(),
        hash,
        role,
        company_id,
        store_id,
        None,
    )
    .unwrap()
}

pub fn user(role: Role, company_id: Option<Uuid>, store_id: Option<Uuid>) -> User {
    User::new(
        "Staff Member".to_string(),
        format!("{}@example.com", Uuid::new_v4().simple()),
        "$argon2id$placeholder".to_string(),
        role,
        company_id,
        store_id,
        None,
    )
    .unwrap()
}

pub fn super_admin() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        role: Role::SuperAdmin,
        company_id: None,
        store_id: None,
    }
}

pub fn company_admin(company_id: Uuid) -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        role: Role::CompanyAdmin,
        company_id: Some(company_id),
        store_id: None,
    }
}

pub fn store_actor(role: Role, store: &Store) -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        role,
        company_id: Some(store.company_id),
        store_id: Some(store.id),
    }
}

pub fn company() -> Company {
    Company::new("Assistência Técnica".to_string(), None, None, None, None).unwrap()
}

pub fn store(company_id: Uuid) -> Store {
    Store::new(company_id, "Loja Centro".to_string(), None, None, None).unwrap()
}

pub fn client(store: &Store) -> Client {
    Client::new(
        store.company_id,
        store.id,
        "Maria Souza".to_string(),
        "5511987654321".to_string(),
        None,
        None,
        None,
        None,
    )
    .unwrap()
}
